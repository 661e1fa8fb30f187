mod act_fn;
mod elu;
mod sigmoid;
mod tanh;

pub use act_fn::ActFn;
pub use elu::Elu;
pub use sigmoid::Sigmoid;
pub use tanh::Tanh;
