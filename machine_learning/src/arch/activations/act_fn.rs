use std::{fmt, str::FromStr};

use super::{Elu, Sigmoid, Tanh};
use crate::{MlErr, Result};

/// The elementwise nonlinearity applied to every hidden layer.
///
/// The output layer of a network never goes through an `ActFn`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActFn {
    Tanh(Tanh),
    Sigmoid(Sigmoid),
    Elu(Elu),
}

impl ActFn {
    pub fn tanh() -> Self {
        Self::Tanh(Tanh)
    }

    pub fn sigmoid() -> Self {
        Self::Sigmoid(Sigmoid)
    }

    pub fn elu() -> Self {
        Self::Elu(Elu)
    }

    /// Resolves an activation function by its registered name.
    ///
    /// # Arguments
    /// * `name` - One of `tanh`, `sigmoid` or `elu`.
    ///
    /// # Returns
    /// The activation function or `MlErr::InvalidConfiguration` if the name is unknown.
    pub fn resolve(name: &str) -> Result<Self> {
        match name {
            "tanh" => Ok(Self::tanh()),
            "sigmoid" => Ok(Self::sigmoid()),
            "elu" => Ok(Self::elu()),
            other => Err(MlErr::InvalidConfiguration(format!(
                "unknown activation function: {other}"
            ))),
        }
    }

    /// Returns the name this function is registered under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tanh(_) => "tanh",
            Self::Sigmoid(_) => "sigmoid",
            Self::Elu(_) => "elu",
        }
    }

    pub fn f(&self, x: f64) -> f64 {
        match self {
            Self::Tanh(a) => a.f(x),
            Self::Sigmoid(a) => a.f(x),
            Self::Elu(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f64) -> f64 {
        match self {
            Self::Tanh(a) => a.df(x),
            Self::Sigmoid(a) => a.df(x),
            Self::Elu(a) => a.df(x),
        }
    }
}

impl FromStr for ActFn {
    type Err = MlErr;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s)
    }
}

impl fmt::Display for ActFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const H: f64 = 1e-6;

    fn numeric_df(act_fn: &ActFn, x: f64) -> f64 {
        (act_fn.f(x + H) - act_fn.f(x - H)) / (2. * H)
    }

    #[test]
    fn resolves_every_registered_name() {
        for name in ["tanh", "sigmoid", "elu"] {
            let act_fn = ActFn::resolve(name).unwrap();
            assert_eq!(act_fn.name(), name);
            assert_eq!(act_fn.to_string(), name);
        }
    }

    #[test]
    fn unknown_name_is_an_invalid_configuration() {
        let err = "relu".parse::<ActFn>().unwrap_err();
        assert!(matches!(err, MlErr::InvalidConfiguration(_)));
    }

    #[test]
    fn values_at_zero() {
        assert_eq!(ActFn::tanh().f(0.), 0.);
        assert_eq!(ActFn::sigmoid().f(0.), 0.5);
        assert_eq!(ActFn::elu().f(0.), 0.);

        assert_eq!(ActFn::tanh().df(0.), 1.);
        assert_eq!(ActFn::sigmoid().df(0.), 0.25);
        assert_eq!(ActFn::elu().df(0.), 1.);
    }

    #[test]
    fn elu_is_linear_for_positive_inputs() {
        let elu = ActFn::elu();
        assert_eq!(elu.f(2.5), 2.5);
        assert_eq!(elu.df(2.5), 1.);
        assert_abs_diff_eq!(elu.f(-1.), (-1f64).exp() - 1., epsilon = 1e-15);
        assert_abs_diff_eq!(elu.df(-1.), (-1f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let points = [-2.0, -0.7, -0.1, 0.3, 1.1, 2.4];

        for act_fn in [ActFn::tanh(), ActFn::sigmoid(), ActFn::elu()] {
            for &x in &points {
                assert_abs_diff_eq!(act_fn.df(x), numeric_df(&act_fn, x), epsilon = 1e-6);
            }
        }
    }
}
