use log::debug;
use rand::{SeedableRng, rngs::StdRng};

use super::Trainer;
use crate::{
    MlErr, Result,
    arch::{
        ActFn, Network, Topology,
        loss::{L2, Mse},
    },
    config::ModelConfig,
    optimization::{Optimizer, OptimizerKind},
};

/// Builds `Trainer`s given a configuration.
///
/// Every name in the configuration is resolved, and every value validated, before anything is
/// allocated.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` with a freshly initialized network following a configuration.
    ///
    /// # Arguments
    /// * `config` - The configuration of the model and its training.
    pub fn build(&self, config: &ModelConfig) -> Result<Trainer> {
        let topology = self.resolve_topology(config)?;
        let act_fn = self.resolve_act_fn(config)?;
        let kind = self.resolve_optimizer(config)?;
        let l2 = self.resolve_l2(config)?;

        let mut rng = self.generate_rng(config.seed);
        let network = Network::new(topology, act_fn, &mut rng)?;

        Ok(self.terminate_build(config, network, kind, l2))
    }

    /// Builds a new `Trainer` around an already trained network, with fresh optimizer state.
    ///
    /// # Arguments
    /// * `config` - The configuration of the model and its training.
    /// * `network` - The network to keep training, it must match the configured model.
    pub fn resume(&self, config: &ModelConfig, network: Network) -> Result<Trainer> {
        let topology = self.resolve_topology(config)?;
        let act_fn = self.resolve_act_fn(config)?;
        let kind = self.resolve_optimizer(config)?;
        let l2 = self.resolve_l2(config)?;

        if network.topology() != &topology || network.act_fn() != act_fn {
            return Err(MlErr::InvalidConfiguration(format!(
                "the network ({:?}, {}) doesn't match the configured model ({:?}, {})",
                network.topology().widths(),
                network.act_fn(),
                topology.widths(),
                act_fn,
            )));
        }

        Ok(self.terminate_build(config, network, kind, l2))
    }

    fn resolve_topology(&self, config: &ModelConfig) -> Result<Topology> {
        Topology::new(config.topology.clone())
    }

    fn resolve_act_fn(&self, config: &ModelConfig) -> Result<ActFn> {
        ActFn::resolve(&config.activation)
    }

    fn resolve_optimizer(&self, config: &ModelConfig) -> Result<OptimizerKind> {
        let lr = config.learning_rate;
        if !lr.is_finite() || lr <= 0. {
            return Err(MlErr::InvalidConfiguration(format!(
                "the learning rate must be positive, got {lr}"
            )));
        }

        OptimizerKind::resolve(&config.optimizer)
    }

    fn resolve_l2(&self, config: &ModelConfig) -> Result<L2> {
        let lambda = config.l2_regularization;
        if !lambda.is_finite() || lambda < 0. {
            return Err(MlErr::InvalidConfiguration(format!(
                "the l2 regularization must be non negative, got {lambda}"
            )));
        }

        Ok(L2::new(lambda))
    }

    fn terminate_build(
        &self,
        config: &ModelConfig,
        network: Network,
        kind: OptimizerKind,
        l2: L2,
    ) -> Trainer {
        let optimizer = Optimizer::new(kind, config.learning_rate, network.params());

        debug!(
            optimizer = kind.name(),
            learning_rate = config.learning_rate,
            l2 = l2.lambda(),
            iterations = config.iterations;
            "built trainer"
        );

        Trainer::new(network, optimizer, Mse, l2, config.iterations)
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig {
            topology: vec![2, 8, 2],
            activation: "elu".to_string(),
            optimizer: "adam".to_string(),
            learning_rate: 1e-3,
            l2_regularization: 1e-6,
            iterations: 100,
            seed: Some(17),
        }
    }

    #[test]
    fn builds_from_a_valid_config() {
        let trainer = TrainerBuilder::new().build(&config()).unwrap();

        assert_eq!(trainer.network().topology().widths(), [2, 8, 2]);
        assert_eq!(trainer.network().act_fn(), ActFn::elu());
        assert_eq!(trainer.optimizer().kind(), OptimizerKind::Adam);
        assert_eq!(trainer.optimizer().learning_rate(), 1e-3);
        assert_eq!(trainer.l2().lambda(), 1e-6);
        assert_eq!(trainer.iterations(), 100);
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let a = TrainerBuilder::new().build(&config()).unwrap();
        let b = TrainerBuilder::new().build(&config()).unwrap();

        assert_eq!(a.network(), b.network());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let builder = TrainerBuilder::new();
        let cases = [
            ModelConfig {
                activation: "relu".to_string(),
                ..config()
            },
            ModelConfig {
                optimizer: "rmsprop".to_string(),
                ..config()
            },
            ModelConfig {
                learning_rate: 0.,
                ..config()
            },
            ModelConfig {
                learning_rate: f64::NAN,
                ..config()
            },
            ModelConfig {
                l2_regularization: -1.,
                ..config()
            },
        ];

        for config in cases {
            assert!(matches!(
                builder.build(&config),
                Err(MlErr::InvalidConfiguration(_))
            ));
        }

        let degenerate = ModelConfig {
            topology: vec![2],
            ..config()
        };
        assert!(matches!(
            builder.build(&degenerate),
            Err(MlErr::DegenerateTopology { len: 1 })
        ));
    }

    #[test]
    fn resume_requires_a_matching_network() {
        let builder = TrainerBuilder::new();
        let network = builder.build(&config()).unwrap().into_parts().0;

        let resumed = builder.resume(&config(), network.clone()).unwrap();
        assert_eq!(resumed.network(), &network);
        assert_eq!(resumed.steps(), 0);

        let other = ModelConfig {
            activation: "tanh".to_string(),
            ..config()
        };
        assert!(builder.resume(&other, network).is_err());
    }
}
