use crate::arch::Params;

/// L2 weight penalty `(λ / 2m) Σ_l Σ W_l²`. Biases are never penalized.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct L2 {
    lambda: f64,
}

impl L2 {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// The penalty added to the cost of a batch of `m` samples.
    pub fn penalty(&self, params: &Params, m: usize) -> f64 {
        self.lambda * params.weights_sq_sum() / (2. * m as f64)
    }

    /// The factor `λ / m` the weights are scaled by when added to their gradient.
    pub fn weight_decay(&self, m: usize) -> f64 {
        self.lambda / m as f64
    }
}
