mod error;
mod rk4;
mod trajectory;

pub use error::{Result, SolverErr};
pub use rk4::Rk4;
pub use trajectory::Trajectory;
