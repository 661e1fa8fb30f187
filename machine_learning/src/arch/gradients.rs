use ndarray::Array2;

/// The gradient of the cost with respect to the parameters of a single layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerGrads {
    /// Same shape as the layer's weights.
    pub dw: Array2<f64>,
    /// Same shape as the layer's biases.
    pub db: Array2<f64>,
}

/// The gradient of the cost with respect to every parameter of a network, one entry per layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    layers: Vec<LayerGrads>,
}

impl Gradients {
    pub fn new(layers: Vec<LayerGrads>) -> Self {
        Self { layers }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the gradients of layer `l` (1-based).
    pub fn layer(&self, l: usize) -> Option<&LayerGrads> {
        self.layers.get(l.checked_sub(1)?)
    }

    pub fn layers(&self) -> &[LayerGrads] {
        &self.layers
    }
}
