use ndarray::{Array2, ArrayView2, s};

use crate::{MlErr, Result, error::check_shape};

/// A full batch of samples: inputs `x` and targets `y`, one sample per column.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array2<f64>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if `x` and `y` don't have the same amount of columns.
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Result<Self> {
        check_shape(
            || "dataset targets".to_string(),
            y.dim(),
            (y.nrows(), x.ncols()),
        )?;

        Ok(Self { x, y })
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView2<'_, f64> {
        self.y.view()
    }

    /// The amount of samples.
    pub fn len(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn x_dim(&self) -> usize {
        self.x.nrows()
    }

    pub fn y_dim(&self) -> usize {
        self.y.nrows()
    }

    /// Splits the samples in two windows without shuffling them.
    ///
    /// # Arguments
    /// * `fraction` - The share of samples, in `[0, 1]`, that go to the first window.
    ///
    /// # Returns
    /// The first `floor(fraction · m)` samples and the rest.
    pub fn split(&self, fraction: f64) -> Result<(Dataset, Dataset)> {
        let at = split_point(self.len(), fraction)?;

        let head = Self {
            x: self.x.slice(s![.., ..at]).to_owned(),
            y: self.y.slice(s![.., ..at]).to_owned(),
        };
        let tail = Self {
            x: self.x.slice(s![.., at..]).to_owned(),
            y: self.y.slice(s![.., at..]).to_owned(),
        };

        Ok((head, tail))
    }

    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>) {
        (self.x, self.y)
    }
}

/// The column at which `fraction` of `len` samples end.
pub fn split_point(len: usize, fraction: f64) -> Result<usize> {
    if !(0. ..=1.).contains(&fraction) {
        return Err(MlErr::InvalidConfiguration(format!(
            "split fraction must be within [0, 1], got {fraction}"
        )));
    }

    Ok((fraction * len as f64).floor() as usize)
}
