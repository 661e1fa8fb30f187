use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Normal;

use super::Topology;
use crate::{MlErr, Result, error::check_shape};

/// The weights and biases of a single dense layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerParams {
    /// Shape `(n_l, n_{l-1})`.
    pub weights: Array2<f64>,
    /// Shape `(n_l, 1)`.
    pub biases: Array2<f64>,
}

/// The parameter store of a network: one `LayerParams` per layer, in order.
///
/// Layers are addressed by their 1-based index `l` in `1..=L`, following the usual notation
/// where layer 0 is the input.
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    layers: Vec<LayerParams>,
}

impl Params {
    /// Draws a fresh set of parameters for the given topology.
    ///
    /// Weights are sampled from a zero-mean normal distribution with standard deviation
    /// `sqrt(6 / (n_{l-1} + n_l))`, biases start at exactly zero.
    ///
    /// # Arguments
    /// * `topology` - The shape of the network.
    /// * `rng` - The random source, seed it to reproduce the exact draws.
    pub fn initialize<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> Result<Self> {
        let layers = topology
            .layer_dims()
            .map(|(fan_in, fan_out)| {
                let std_dev = (6. / (fan_in + fan_out) as f64).sqrt();
                let normal = Normal::new(0., std_dev)
                    .map_err(|e| MlErr::InvalidConfiguration(e.to_string()))?;

                Ok(LayerParams {
                    weights: Array2::random_using((fan_out, fan_in), normal, &mut *rng),
                    biases: Array2::zeros((fan_out, 1)),
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self { layers })
    }

    /// All weights and biases set to zero.
    pub fn zeros(topology: &Topology) -> Self {
        let layers = topology
            .layer_dims()
            .map(|(fan_in, fan_out)| LayerParams {
                weights: Array2::zeros((fan_out, fan_in)),
                biases: Array2::zeros((fan_out, 1)),
            })
            .collect();

        Self { layers }
    }

    /// Builds a parameter store out of already existing tensors.
    ///
    /// # Returns
    /// An error if the amount of layers or the shape of any tensor doesn't match the topology.
    pub fn from_layers(topology: &Topology, layers: Vec<LayerParams>) -> Result<Self> {
        let params = Self { layers };
        params.check(topology)?;
        Ok(params)
    }

    /// Checks that every tensor has the shape the topology dictates.
    pub fn check(&self, topology: &Topology) -> Result<()> {
        if self.layers.len() != topology.num_layers() {
            return Err(MlErr::SizeMismatch {
                a: "parameter layers",
                b: "topology",
                got: self.layers.len(),
                expected: topology.num_layers(),
            });
        }

        for (i, layer) in self.layers.iter().enumerate() {
            let l = i + 1;
            check_shape(
                || format!("W{l}"),
                layer.weights.dim(),
                topology.weight_shape(l),
            )?;
            check_shape(|| format!("b{l}"), layer.biases.dim(), topology.bias_shape(l))?;
        }

        Ok(())
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the parameters of layer `l` (1-based).
    pub fn layer(&self, l: usize) -> Option<&LayerParams> {
        self.layers.get(l.checked_sub(1)?)
    }

    pub fn layers(&self) -> &[LayerParams] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [LayerParams] {
        &mut self.layers
    }

    /// Returns `Σ_l Σ W_l²`, biases excluded.
    pub fn weights_sq_sum(&self) -> f64 {
        self.layers
            .iter()
            .map(|layer| layer.weights.iter().map(|w| w * w).sum::<f64>())
            .sum()
    }
}
