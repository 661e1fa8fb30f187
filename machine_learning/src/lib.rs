pub mod arch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod optimization;
pub mod persistence;
pub mod training;

pub use error::{MlErr, Result};
