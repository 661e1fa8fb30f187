pub mod activations;
mod gradients;
pub mod layers;
pub mod loss;
mod network;
mod params;
mod predictor;
mod topology;

pub use activations::ActFn;
pub use gradients::{Gradients, LayerGrads};
pub use network::{ForwardPass, Network};
pub use params::{LayerParams, Params};
pub use predictor::Predictor;
pub use topology::Topology;
