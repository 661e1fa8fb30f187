use std::path::Path;

use ndarray::ArrayView2;

use super::{Fit, Progress};
use crate::{
    MlErr, Result,
    arch::{
        Network,
        loss::{L2, LossFn, Mse},
    },
    error::check_shape,
    optimization::Optimizer,
    persistence::ModelRecord,
};

/// Owns a network and its optimizer state while training it.
///
/// The optimizer state and the step counter are never reset: calling `fit` again resumes where
/// the previous call left off.
#[derive(Clone, Debug)]
pub struct Trainer<L: LossFn = Mse> {
    network: Network,
    optimizer: Optimizer,
    loss_fn: L,
    l2: L2,
    iterations: usize,
    steps: usize,
}

impl<L: LossFn> Trainer<L> {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `network` - The network to train.
    /// * `optimizer` - The optimizer, its state must be shaped after the network's parameters.
    /// * `loss_fn` - The data loss.
    /// * `l2` - The weight penalty.
    /// * `iterations` - The amount of iterations every `fit` call runs.
    pub fn new(
        network: Network,
        optimizer: Optimizer,
        loss_fn: L,
        l2: L2,
        iterations: usize,
    ) -> Self {
        Self {
            network,
            optimizer,
            loss_fn,
            l2,
            iterations,
            steps: 0,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    pub fn loss_fn(&self) -> &L {
        &self.loss_fn
    }

    pub fn l2(&self) -> L2 {
        self.l2
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The amount of optimization steps taken over the lifetime of this trainer.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Runs a single full-batch iteration: forward, cost, backward and update.
    ///
    /// # Returns
    /// The cost of the parameters before the update.
    pub fn step(&mut self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<f64> {
        let network = &self.network;
        let pass = network.forward(x)?;
        let cost = network.cost(pass.output(), y, &self.loss_fn, &self.l2);
        let grads = network.backward(&pass, y, &self.loss_fn, &self.l2)?;

        let t = self.steps + 1;
        self.optimizer
            .update(self.network.params_mut(), &grads, t)?;
        self.steps = t;

        Ok(cost)
    }

    /// Trains the network on a full batch for `iterations` iterations.
    ///
    /// # Arguments
    /// * `x` - The inputs, `(n0, m)`.
    /// * `y` - The targets, `(nL, m)`.
    ///
    /// # Returns
    /// A lazy sequence of progress samples, or an error if the batch doesn't fit the network.
    pub fn fit<'t>(
        &'t mut self,
        x: ArrayView2<'t, f64>,
        y: ArrayView2<'t, f64>,
    ) -> Result<Fit<'t, L>> {
        let topology = self.network.topology();

        if x.ncols() == 0 {
            return Err(MlErr::InvalidConfiguration(
                "can't train on an empty batch".to_string(),
            ));
        }

        check_shape(
            || "training inputs".to_string(),
            x.dim(),
            (topology.input_dim(), x.ncols()),
        )?;
        check_shape(
            || "training targets".to_string(),
            y.dim(),
            (topology.output_dim(), x.ncols()),
        )?;

        Ok(Fit::new(self, x, y))
    }

    /// Runs `fit` to completion.
    ///
    /// # Returns
    /// Every progress sample, in order.
    pub fn train(&mut self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<Vec<Progress>> {
        self.fit(x, y)?.collect()
    }

    /// Persists the network along with the configuration it's being trained with.
    ///
    /// A failure leaves the trainer untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ModelRecord::from_trainer(self).save(path)
    }

    /// Hands back the trained network and the optimizer state.
    pub fn into_parts(self) -> (Network, Optimizer) {
        (self.network, self.optimizer)
    }
}
