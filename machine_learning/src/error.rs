use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// A model or trainer could not be built from the given configuration.
    InvalidConfiguration(String),
    /// The topology has fewer than two entries.
    DegenerateTopology {
        len: usize,
    },
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    ShapeMismatch {
        what: String,
        got: (usize, usize),
        expected: (usize, usize),
    },
    MissingParameter(String),
    Io(io::Error),
    Serialization(serde_json::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MlErr::InvalidConfiguration(msg) => format!("invalid configuration: {msg}"),
            MlErr::DegenerateTopology { len } => format!(
                "invalid configuration: degenerate topology, got {len} layer widths and at least 2 are needed"
            ),
            MlErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => {
                format!("size mismatch between {a} and {b}: got {got}, expected {expected}")
            }
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => format!("shape mismatch for {what}: got {got:?}, expected {expected:?}"),
            MlErr::MissingParameter(name) => {
                format!("the persisted model has no parameter tensor named {name}")
            }
            MlErr::Io(e) => format!("io error: {e}"),
            MlErr::Serialization(e) => format!("serialization error: {e}"),
        };

        write!(f, "{s}")
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            MlErr::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Checks that a matrix has the expected shape.
///
/// # Arguments
/// * `what` - What is being checked, used in the error message.
/// * `got` - The actual shape.
/// * `expected` - The expected shape.
pub(crate) fn check_shape(
    what: impl FnOnce() -> String,
    got: (usize, usize),
    expected: (usize, usize),
) -> Result<()> {
    if got != expected {
        return Err(MlErr::ShapeMismatch {
            what: what(),
            got,
            expected,
        });
    }

    Ok(())
}
