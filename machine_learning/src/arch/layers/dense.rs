use ndarray::{Array2, ArrayView2, Axis};

use crate::arch::{LayerGrads, LayerParams, activations::ActFn};

/// A fully connected layer, `z = W·x + b` followed by an optional activation function.
///
/// Samples are the columns of `x`. A `Dense` holds no tensors of its own: its parameters live in
/// the network's `Params` and its intermediate values in a `ForwardPass`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
}

impl Dense {
    /// Creates a new `Dense`.
    ///
    /// # Arguments
    /// * `dim` - The `(fan_in, fan_out)` of the layer.
    /// * `act_fn` - The activation function, `None` for a linear layer.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self { dim, act_fn }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn act_fn(&self) -> Option<ActFn> {
        self.act_fn
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }

    /// Computes the pre-activation `W·x + b`, the bias column is broadcast over every sample.
    pub fn linear(&self, params: &LayerParams, x: ArrayView2<f64>) -> Array2<f64> {
        params.weights.dot(&x) + &params.biases
    }

    /// Applies the activation function in place, a linear layer returns `z` untouched.
    pub fn activate(&self, z: Array2<f64>) -> Array2<f64> {
        match self.act_fn {
            Some(act_fn) => z.mapv_into(|z| act_fn.f(z)),
            None => z,
        }
    }

    pub fn forward(&self, params: &LayerParams, x: ArrayView2<f64>) -> Array2<f64> {
        self.activate(self.linear(params, x))
    }

    /// Propagates the error signal of this layer's output back to its input.
    ///
    /// # Arguments
    /// * `params` - The parameters of this layer.
    /// * `x` - The input this layer received on the forward pass.
    /// * `z` - The pre-activation this layer computed on the forward pass.
    /// * `d` - The derivative of the cost with respect to this layer's output.
    /// * `weight_decay` - The factor the weights are scaled by before being added to `dW`.
    ///
    /// # Returns
    /// The gradients of this layer and the derivative of the cost with respect to `x`.
    pub fn backward(
        &self,
        params: &LayerParams,
        x: ArrayView2<f64>,
        z: &Array2<f64>,
        mut d: Array2<f64>,
        weight_decay: f64,
    ) -> (LayerGrads, Array2<f64>) {
        if let Some(act_fn) = self.act_fn {
            d.zip_mut_with(z, |d, &z| *d *= act_fn.df(z));
        }

        let mut dw = d.dot(&x.t());
        dw.scaled_add(weight_decay, &params.weights);
        let db = d.sum_axis(Axis(1)).insert_axis(Axis(1));
        let d_prev = params.weights.t().dot(&d);

        (LayerGrads { dw, db }, d_prev)
    }
}
