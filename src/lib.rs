pub mod config;
pub mod data;
mod error;
pub mod hyperopt;
pub mod pipeline;

pub use error::{Result, SurrogateError};
