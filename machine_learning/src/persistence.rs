use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::BufReader,
    path::Path,
};

use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    MlErr, Result,
    arch::{ActFn, LayerParams, Network, Params, Topology, loss::LossFn},
    config::ModelConfig,
    training::Trainer,
};

/// The on-disk representation of a trained model.
///
/// Every tensor is stored flattened in row-major order under `W<l>` or `b<l>`; its shape is
/// derived back from `nn_structure` on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub nn_structure: Vec<usize>,
    pub activation: String,
    pub optimizer: String,
    pub learning_rate: f64,
    pub l2_regularization: f64,
    pub num_iterations: usize,
    pub parameters: BTreeMap<String, Vec<f64>>,
}

impl ModelRecord {
    /// Snapshots a network together with the configuration it's trained with.
    pub fn new(network: &Network, config: &ModelConfig) -> Self {
        Self {
            nn_structure: network.topology().widths().to_vec(),
            activation: network.act_fn().name().to_string(),
            optimizer: config.optimizer.clone(),
            learning_rate: config.learning_rate,
            l2_regularization: config.l2_regularization,
            num_iterations: config.iterations,
            parameters: flatten(network.params()),
        }
    }

    pub fn from_trainer<L: LossFn>(trainer: &Trainer<L>) -> Self {
        let network = trainer.network();
        let optimizer = trainer.optimizer();

        Self {
            nn_structure: network.topology().widths().to_vec(),
            activation: network.act_fn().name().to_string(),
            optimizer: optimizer.kind().name().to_string(),
            learning_rate: optimizer.learning_rate(),
            l2_regularization: trainer.l2().lambda(),
            num_iterations: trainer.iterations(),
            parameters: flatten(network.params()),
        }
    }

    /// The configuration the model was trained with. It carries no seed.
    pub fn config(&self) -> ModelConfig {
        ModelConfig {
            topology: self.nn_structure.clone(),
            activation: self.activation.clone(),
            optimizer: self.optimizer.clone(),
            learning_rate: self.learning_rate,
            l2_regularization: self.l2_regularization,
            iterations: self.num_iterations,
            seed: None,
        }
    }

    /// Rebuilds the network this record was taken from.
    ///
    /// # Returns
    /// An error if the structure or activation are invalid, a tensor is missing, or a tensor has
    /// the wrong amount of elements.
    pub fn to_network(&self) -> Result<Network> {
        let topology = Topology::new(self.nn_structure.clone())?;
        let act_fn = ActFn::resolve(&self.activation)?;

        let layers = (1..=topology.num_layers())
            .map(|l| {
                Ok(LayerParams {
                    weights: self.tensor(&format!("W{l}"), topology.weight_shape(l))?,
                    biases: self.tensor(&format!("b{l}"), topology.bias_shape(l))?,
                })
            })
            .collect::<Result<_>>()?;

        let params = Params::from_layers(&topology, layers)?;
        Network::from_params(topology, act_fn, params)
    }

    /// Writes the record as indented JSON, replacing the file if it exists.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        debug!(path:? = path; "saved model");
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let record = serde_json::from_reader(reader)?;

        debug!(path:? = path; "loaded model");
        Ok(record)
    }

    fn tensor(&self, name: &str, shape: (usize, usize)) -> Result<Array2<f64>> {
        let data = self
            .parameters
            .get(name)
            .ok_or_else(|| MlErr::MissingParameter(name.to_string()))?;

        Array2::from_shape_vec(shape, data.clone()).map_err(|_| MlErr::ShapeMismatch {
            what: name.to_string(),
            got: (data.len(), 1),
            expected: shape,
        })
    }
}

/// Loads a persisted model and rebuilds its network.
///
/// # Returns
/// The network and the configuration it was trained with.
pub fn load_network<P: AsRef<Path>>(path: P) -> Result<(Network, ModelConfig)> {
    let record = ModelRecord::load(path)?;
    Ok((record.to_network()?, record.config()))
}

fn flatten(params: &Params) -> BTreeMap<String, Vec<f64>> {
    params
        .layers()
        .iter()
        .enumerate()
        .flat_map(|(i, layer)| {
            let l = i + 1;
            [
                (format!("W{l}"), layer.weights.iter().copied().collect::<Vec<_>>()),
                (format!("b{l}"), layer.biases.iter().copied().collect::<Vec<_>>()),
            ]
        })
        .collect()
}
