use std::fs;

use log::{info, warn};
use machine_learning::{
    MlErr,
    arch::Network,
    dataset::Dataset,
    metrics,
    training::{Progress, TrainerBuilder},
};
use ndarray::{Array1, ArrayView1};
use solver::{Rk4, Trajectory};

use crate::{
    Result, SurrogateError,
    config::RunConfig,
    data::{self, Samples},
    hyperopt::{Direction, RandomSearch, SearchSpace, Trial},
};

/// What a training run produced.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub progress: Vec<Progress>,
    /// The relative error of the network on the held out samples, if there are any.
    pub test_error: Option<f64>,
    /// The relative error of the rollout against the sampled states, per state component.
    pub extrapolation_errors: Array1<f64>,
    pub trajectory: Trajectory,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub trials: Vec<Trial>,
    pub best: Option<Trial>,
}

/// Loads the sampled states and their derivatives.
///
/// # Returns
/// The raw states, needed as reference for the rollout, and the `(state, derivative)` dataset.
pub fn load_data(run: &RunConfig) -> Result<(Samples, Dataset)> {
    let states = data::load_samples(&run.data, run.has_time_column)?;
    let derivatives = data::load_samples(&run.derivatives, false)?;

    let dataset = Dataset::new(states.values().to_owned(), derivatives.into_values())?;
    Ok((states, dataset))
}

/// Integrates the network as the right hand side of `dx/dt = f(x)`.
///
/// # Arguments
/// * `network` - An autonomous network.
/// * `x0` - The initial condition.
/// * `steps` - The amount of states, `x0` included.
/// * `h` - The integration step.
///
/// # Returns
/// The trajectory, or an error if the network isn't autonomous or `x0` doesn't have its dimension.
pub fn rollout(network: &Network, x0: ArrayView1<f64>, steps: usize, h: f64) -> Result<Trajectory> {
    let predictor = network.predictor()?;
    if x0.len() != predictor.dim() {
        return Err(MlErr::ShapeMismatch {
            what: "initial condition".to_string(),
            got: (x0.len(), 1),
            expected: (predictor.dim(), 1),
        }
        .into());
    }

    Rk4::new(h)?.try_integrate(
        |x| predictor.derivative(x).map_err(SurrogateError::from),
        x0,
        steps,
    )
}

/// Trains a model on the leading window of the data and rolls it out over the full horizon.
pub fn train(run: &RunConfig) -> Result<TrainReport> {
    let (states, dataset) = load_data(run)?;
    let (train, test) = dataset.split(run.training_fraction)?;
    info!(train = train.len(), test = test.len(); "split dataset");

    let mut trainer = TrainerBuilder::new().build(&run.model)?;
    let progress = trainer.train(train.x(), train.y())?;

    if let Err(e) = trainer.save(&run.output_model) {
        warn!("could not save the model to {}: {e}", run.output_model.display());
    }

    let network = trainer.network();
    let test_error = if test.is_empty() {
        None
    } else {
        Some(network.evaluate(test.x(), test.y())?)
    };

    let trajectory = rollout(network, train.x().column(0), states.len(), run.step)?;
    data::write_trajectory(&run.output_trajectory, &trajectory)?;

    let extrapolation_errors = metrics::row_relative_errors(trajectory.states(), states.values())?;
    info!(
        test_error:? = test_error,
        extrapolation_errors:? = extrapolation_errors.as_slice();
        "finished training run"
    );

    Ok(TrainReport {
        progress,
        test_error,
        extrapolation_errors,
        trajectory,
    })
}

/// Random search over the hyperparameters, scoring every trial by its relative error on the held
/// out samples.
pub fn search(run: &RunConfig) -> Result<SearchReport> {
    let search = run.search.as_ref().ok_or_else(|| {
        SurrogateError::InvalidConfig("the run has no search block".to_string())
    })?;

    let (_, dataset) = load_data(run)?;
    let (train, test) = dataset.split(run.training_fraction)?;
    if test.is_empty() {
        return Err(SurrogateError::InvalidConfig(
            "search needs held out samples, lower the training_fraction".to_string(),
        ));
    }

    let space = SearchSpace {
        input_dim: train.x_dim(),
        output_dim: train.y_dim(),
        n_layers_range: search.n_layers_range,
        n_hidden_range: search.n_hidden_range,
        learning_rate_range: search.learning_rate_range,
        l2_range: search.l2_range,
        n_models: search.n_models,
    };

    fs::create_dir_all(&search.trial_dir)?;
    let mut random_search = RandomSearch::new(space, search.seed)?;

    let best = random_search
        .run(Direction::Minimize, |id, params| {
            let config = params.model_config(&run.model);
            let mut trainer = TrainerBuilder::new().build(&config)?;
            trainer.train(train.x(), train.y())?;

            let path = search.trial_dir.join(format!("model{id}.json"));
            if let Err(e) = trainer.save(&path) {
                warn!("could not save trial {id} to {}: {e}", path.display());
            }

            Ok(trainer.network().evaluate(test.x(), test.y())?)
        })?
        .cloned();

    if let Some(best) = &best {
        info!(trial = best.id, score = best.score, topology:? = best.params.topology; "best trial");
    }

    Ok(SearchReport {
        trials: random_search.trials().to_vec(),
        best,
    })
}
