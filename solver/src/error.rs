use std::{
    error::Error,
    fmt::{self, Display},
};

pub type Result<T> = std::result::Result<T, SolverErr>;

#[derive(Debug, Clone, PartialEq)]
pub enum SolverErr {
    InvalidInput(String),
    /// The derivative function returned something other than a column of the state's dimension.
    DimensionMismatch {
        got: (usize, usize),
        expected: (usize, usize),
    },
}

impl Display for SolverErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverErr::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            SolverErr::DimensionMismatch { got, expected } => write!(
                f,
                "the derivative function returned a {got:?} matrix, expected {expected:?}"
            ),
        }
    }
}

impl Error for SolverErr {}
