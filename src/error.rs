use std::{fmt, io, path::PathBuf};

use machine_learning::MlErr;
use solver::SolverErr;

pub type Result<T> = std::result::Result<T, SurrogateError>;

/// All errors that can occur while running the surrogate pipeline.
#[derive(Debug)]
pub enum SurrogateError {
    /// Invalid run configuration, caught before loading any data.
    InvalidConfig(String),
    /// A data file was read but its contents are unusable.
    BadData { path: PathBuf, msg: String },
    Model(MlErr),
    Solver(SolverErr),
    Csv(csv::Error),
    Json(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for SurrogateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::BadData { path, msg } => write!(f, "bad data in {}: {msg}", path.display()),
            Self::Model(e) => write!(f, "model error: {e}"),
            Self::Solver(e) => write!(f, "solver error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for SurrogateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(e) => Some(e),
            Self::Solver(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for SurrogateError {
    fn from(e: MlErr) -> Self {
        Self::Model(e)
    }
}

impl From<SolverErr> for SurrogateError {
    fn from(e: SolverErr) -> Self {
        Self::Solver(e)
    }
}

impl From<csv::Error> for SurrogateError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<serde_json::Error> for SurrogateError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<io::Error> for SurrogateError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
