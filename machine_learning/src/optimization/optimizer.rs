use std::fmt;

use super::{Adam, GradientDescent};
use crate::{
    MlErr, Result,
    arch::{Gradients, Params},
    error::check_shape,
};

/// The registered optimization algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimizerKind {
    GradientDescent,
    Adam,
}

impl OptimizerKind {
    /// Resolves an optimizer by its registered name.
    ///
    /// # Arguments
    /// * `name` - Either `gradientDescent` or `adam`.
    ///
    /// # Returns
    /// The optimizer kind or `MlErr::InvalidConfiguration` if the name is unknown.
    pub fn resolve(name: &str) -> Result<Self> {
        match name {
            "gradientDescent" => Ok(Self::GradientDescent),
            "adam" => Ok(Self::Adam),
            other => Err(MlErr::InvalidConfiguration(format!(
                "unknown optimizer: {other}"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GradientDescent => "gradientDescent",
            Self::Adam => "adam",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An optimizer together with whatever state it carries between updates.
#[derive(Clone, Debug, PartialEq)]
pub enum Optimizer {
    GradientDescent(GradientDescent),
    Adam(Adam),
}

impl Optimizer {
    /// Creates a new `Optimizer` with zeroed state shaped after `params`.
    pub fn new(kind: OptimizerKind, learning_rate: f64, params: &Params) -> Self {
        match kind {
            OptimizerKind::GradientDescent => {
                Self::GradientDescent(GradientDescent::new(learning_rate))
            }
            OptimizerKind::Adam => Self::Adam(Adam::new(learning_rate, params)),
        }
    }

    pub fn kind(&self) -> OptimizerKind {
        match self {
            Self::GradientDescent(_) => OptimizerKind::GradientDescent,
            Self::Adam(_) => OptimizerKind::Adam,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        match self {
            Self::GradientDescent(o) => o.learning_rate(),
            Self::Adam(o) => o.learning_rate(),
        }
    }

    /// Takes one optimization step.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grads` - The gradient of the cost at `params`.
    /// * `t` - The 1-based, cumulative iteration counter.
    ///
    /// # Returns
    /// An error if the shapes of `params`, `grads` or the optimizer state don't line up.
    pub fn update(&mut self, params: &mut Params, grads: &Gradients, t: usize) -> Result<()> {
        match self {
            Self::GradientDescent(o) => o.update(params, grads),
            Self::Adam(o) => o.update(params, grads, t),
        }
    }
}

/// Checks that there is one gradient per parameter and that their shapes agree.
pub(super) fn check_grads(params: &Params, grads: &Gradients) -> Result<()> {
    if params.num_layers() != grads.num_layers() {
        return Err(MlErr::SizeMismatch {
            a: "gradient layers",
            b: "parameter layers",
            got: grads.num_layers(),
            expected: params.num_layers(),
        });
    }

    for (i, (p, g)) in params.layers().iter().zip(grads.layers()).enumerate() {
        let l = i + 1;
        check_shape(|| format!("dW{l}"), g.dw.dim(), p.weights.dim())?;
        check_shape(|| format!("db{l}"), g.db.dim(), p.biases.dim())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_names() {
        for kind in [OptimizerKind::GradientDescent, OptimizerKind::Adam] {
            assert_eq!(OptimizerKind::resolve(kind.name()).unwrap(), kind);
        }

        assert!(matches!(
            OptimizerKind::resolve("sgd"),
            Err(MlErr::InvalidConfiguration(_))
        ));
    }
}
