use super::optimizer::check_grads;
use crate::{
    Result,
    arch::{Gradients, Params},
};

/// Gradient descent optimization algorithm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update`.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Updates the parameters according to the algorithm's learning rule, that is, making a step in
    /// the opposite direction of the gradient, with a length of `learning_rate`.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grads` - The gradient used for taking the step.
    pub fn update(&self, params: &mut Params, grads: &Gradients) -> Result<()> {
        check_grads(params, grads)?;

        let lr = self.learning_rate;
        for (p, g) in params.layers_mut().iter_mut().zip(grads.layers()) {
            p.weights.scaled_add(-lr, &g.dw);
            p.biases.scaled_add(-lr, &g.db);
        }

        Ok(())
    }
}
