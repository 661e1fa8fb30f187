mod builder;
mod fit;
mod trainer;

pub use builder::TrainerBuilder;
pub use fit::{Fit, Progress, REPORT_EVERY};
pub use trainer::Trainer;
