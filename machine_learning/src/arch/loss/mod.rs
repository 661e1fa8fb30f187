mod l2;
mod loss_fn;
mod mse;

pub use l2::L2;
pub use loss_fn::LossFn;
pub use mse::Mse;
