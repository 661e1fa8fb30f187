use crate::{MlErr, Result};

/// The ordered layer widths `[n0, n1, ..., nL]` of a feedforward network.
///
/// `n0` is the input dimension, `nL` the output dimension and everything in between are hidden
/// widths. A topology always describes at least one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    widths: Vec<usize>,
}

impl Topology {
    /// Creates a new `Topology`.
    ///
    /// # Arguments
    /// * `widths` - The width of every layer, input and output included.
    ///
    /// # Returns
    /// `MlErr::DegenerateTopology` if there are fewer than two widths, or
    /// `MlErr::InvalidConfiguration` if any width is zero.
    pub fn new(widths: Vec<usize>) -> Result<Self> {
        if widths.len() < 2 {
            return Err(MlErr::DegenerateTopology { len: widths.len() });
        }

        if let Some(i) = widths.iter().position(|&w| w == 0) {
            return Err(MlErr::InvalidConfiguration(format!(
                "layer width {i} of the topology is zero"
            )));
        }

        Ok(Self { widths })
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Returns `L`, the amount of weighted layers.
    pub fn num_layers(&self) -> usize {
        self.widths.len() - 1
    }

    pub fn input_dim(&self) -> usize {
        self.widths[0]
    }

    pub fn output_dim(&self) -> usize {
        self.widths[self.widths.len() - 1]
    }

    /// Whether the output of the network can be fed back as its input.
    pub fn is_autonomous(&self) -> bool {
        self.input_dim() == self.output_dim()
    }

    /// Returns the `(fan_in, fan_out)` pair of every layer, in order.
    pub fn layer_dims(&self) -> impl ExactSizeIterator<Item = (usize, usize)> + '_ {
        self.widths.windows(2).map(|w| (w[0], w[1]))
    }

    /// The shape of the weight matrix of layer `l` (1-based), `(n_l, n_{l-1})`.
    ///
    /// # Panics
    /// If `l` is not in `1..=L`.
    pub fn weight_shape(&self, l: usize) -> (usize, usize) {
        (self.widths[l], self.widths[l - 1])
    }

    /// The shape of the bias column of layer `l` (1-based), `(n_l, 1)`.
    ///
    /// # Panics
    /// If `l` is not in `1..=L`.
    pub fn bias_shape(&self, l: usize) -> (usize, usize) {
        (self.widths[l], 1)
    }

    /// Returns the total amount of scalar parameters.
    pub fn size(&self) -> usize {
        self.layer_dims().map(|(n, m)| (n + 1) * m).sum()
    }
}
