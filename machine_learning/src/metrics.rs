use ndarray::{Array1, ArrayView2, Axis};

use crate::{Result, error::check_shape};

/// The relative error `‖pred − truth‖ / ‖truth‖` under the Frobenius norm.
///
/// A zero `truth` yields an infinite (or NaN) error.
pub fn relative_error(pred: ArrayView2<f64>, truth: ArrayView2<f64>) -> Result<f64> {
    check_shape(|| "prediction".to_string(), pred.dim(), truth.dim())?;

    let diff = (&pred - &truth).mapv(|x| x * x).sum().sqrt();
    let norm = truth.mapv(|x| x * x).sum().sqrt();
    Ok(diff / norm)
}

/// The relative error of every row (state component) on its own.
pub fn row_relative_errors(pred: ArrayView2<f64>, truth: ArrayView2<f64>) -> Result<Array1<f64>> {
    check_shape(|| "prediction".to_string(), pred.dim(), truth.dim())?;

    let diff = (&pred - &truth).mapv(|x| x * x).sum_axis(Axis(1));
    let norm = truth.mapv(|x| x * x).sum_axis(Axis(1));
    Ok((diff / norm).mapv(f64::sqrt))
}
