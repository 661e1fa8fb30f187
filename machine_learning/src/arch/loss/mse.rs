use ndarray::{Array2, ArrayView2};

use super::LossFn;

/// Half the summed squared error, averaged over the samples (columns):
/// `(1 / 2m) Σ (y_pred - y)²`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> f64 {
        let m = y.ncols() as f64;
        (&y_pred - &y).mapv(|x| x.powi(2)).sum() / (2. * m)
    }

    fn loss_prime(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Array2<f64> {
        let m = y.ncols() as f64;
        (&y_pred - &y) / m
    }
}
