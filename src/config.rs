use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use machine_learning::config::ModelConfig;
use serde::{Deserialize, Serialize};

use crate::{Result, SurrogateError};

fn default_training_fraction() -> f64 {
    0.25
}

fn default_step() -> f64 {
    0.01
}

fn default_output_model() -> PathBuf {
    PathBuf::from("model.json")
}

fn default_output_trajectory() -> PathBuf {
    PathBuf::from("trajectory.csv")
}

fn default_trial_dir() -> PathBuf {
    PathBuf::from("trials")
}

/// A full run: where the data lives, how the model is trained and where the results go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunConfig {
    /// The sampled states, one sample per line.
    pub data: PathBuf,
    /// The derivative of every sampled state, one sample per line.
    pub derivatives: PathBuf,
    /// Whether the first field of every line in `data` is the sampling time.
    #[serde(default)]
    pub has_time_column: bool,
    /// The leading share of samples used for training, the rest is kept for testing.
    #[serde(default = "default_training_fraction")]
    pub training_fraction: f64,
    /// The integration step.
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "default_output_model")]
    pub output_model: PathBuf,
    #[serde(default = "default_output_trajectory")]
    pub output_trajectory: PathBuf,
    pub model: ModelConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchConfig>,
}

/// The ranges random search draws from. The topology of the `model` block is ignored, only its
/// first and last widths are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// Minimum and maximum amount of layer widths, input and output included.
    pub n_layers_range: (usize, usize),
    /// Minimum and maximum width of every hidden layer.
    pub n_hidden_range: (usize, usize),
    pub learning_rate_range: (f64, f64),
    pub l2_range: (f64, f64),
    pub n_models: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Where every trial model is saved.
    #[serde(default = "default_trial_dir")]
    pub trial_dir: PathBuf,
}

impl RunConfig {
    /// Reads a run configuration from a JSON file and validates it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything the model configuration doesn't cover.
    pub fn validate(&self) -> Result<()> {
        if !(0. ..=1.).contains(&self.training_fraction) {
            return Err(SurrogateError::InvalidConfig(format!(
                "training_fraction must be within [0, 1], got {}",
                self.training_fraction
            )));
        }

        if !self.step.is_finite() || self.step <= 0. {
            return Err(SurrogateError::InvalidConfig(format!(
                "step must be positive, got {}",
                self.step
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN: &str = r#"{
        "data": "data.txt",
        "derivatives": "derivative.txt",
        "has_time_column": true,
        "model": {
            "topology": [2, 45, 2],
            "activation": "tanh",
            "optimizer": "adam",
            "learning_rate": 0.001,
            "l2_regularization": 1.4e-6,
            "iterations": 20000
        }
    }"#;

    #[test]
    fn defaults_are_filled_in() {
        let config: RunConfig = serde_json::from_str(RUN).unwrap();

        assert_eq!(config.training_fraction, 0.25);
        assert_eq!(config.step, 0.01);
        assert_eq!(config.output_model, PathBuf::from("model.json"));
        assert!(config.has_time_column);
        assert!(config.search.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn search_block_is_parsed() {
        let mut json: serde_json::Value = serde_json::from_str(RUN).unwrap();
        json["search"] = serde_json::json!({
            "n_layers_range": [3, 5],
            "n_hidden_range": [30, 80],
            "learning_rate_range": [1e-4, 1e-2],
            "l2_range": [1e-6, 1e-2],
            "n_models": 3
        });

        let config: RunConfig = serde_json::from_value(json).unwrap();
        let search = config.search.unwrap();
        assert_eq!(search.n_layers_range, (3, 5));
        assert_eq!(search.n_models, 3);
        assert_eq!(search.trial_dir, PathBuf::from("trials"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config: RunConfig = serde_json::from_str(RUN).unwrap();
        config.training_fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(SurrogateError::InvalidConfig(_))
        ));

        config.training_fraction = 0.5;
        config.step = 0.;
        assert!(config.validate().is_err());
    }
}
