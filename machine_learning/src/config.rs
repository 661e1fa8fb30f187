use serde::{Deserialize, Serialize};

/// The configuration of a model and of how it's trained.
///
/// Names are kept as plain strings here, they are resolved into their typed counterparts by the
/// `TrainerBuilder` before any training starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// The layer widths `[n0, ..., nL]`.
    pub topology: Vec<usize>,
    /// `tanh`, `sigmoid` or `elu`.
    pub activation: String,
    /// `gradientDescent` or `adam`.
    pub optimizer: String,
    pub learning_rate: f64,
    pub l2_regularization: f64,
    /// The amount of full-batch iterations of every `fit` call.
    pub iterations: usize,
    /// The seed for the weight initialization, drawn from the OS when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_optional() {
        let json = r#"{
            "topology": [2, 45, 2],
            "activation": "tanh",
            "optimizer": "adam",
            "learning_rate": 0.001,
            "l2_regularization": 1.4e-6,
            "iterations": 20000
        }"#;

        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.topology, [2, 45, 2]);
        assert_eq!(config.optimizer, "adam");
        assert_eq!(config.seed, None);

        let back = serde_json::to_string(&config).unwrap();
        assert!(!back.contains("seed"));
    }
}
