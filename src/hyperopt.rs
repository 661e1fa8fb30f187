use std::ops::RangeInclusive;

use log::info;
use machine_learning::config::ModelConfig;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{Result, SurrogateError};

/// Whether lower or higher objective values are better.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// Whether `score` beats `best`. NaN never wins.
    pub fn is_better(&self, score: f64, best: f64) -> bool {
        match self {
            Self::Minimize => score < best,
            Self::Maximize => score > best,
        }
    }
}

/// The ranges every trial is drawn from. Ranges are inclusive on both ends.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSpace {
    pub input_dim: usize,
    pub output_dim: usize,
    /// The amount of layer widths, input and output included.
    pub n_layers_range: (usize, usize),
    pub n_hidden_range: (usize, usize),
    /// Sampled log-uniformly.
    pub learning_rate_range: (f64, f64),
    /// Sampled log-uniformly.
    pub l2_range: (f64, f64),
    pub n_models: usize,
}

impl SearchSpace {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SurrogateError::InvalidConfig(msg));

        if self.input_dim == 0 || self.output_dim == 0 {
            return invalid("input and output dimensions must be positive".to_string());
        }

        let (lo, hi) = self.n_layers_range;
        if lo < 2 || lo > hi {
            return invalid(format!(
                "n_layers_range must satisfy 2 <= min <= max, got {lo}..={hi}"
            ));
        }

        let (lo, hi) = self.n_hidden_range;
        if lo == 0 || lo > hi {
            return invalid(format!(
                "n_hidden_range must satisfy 1 <= min <= max, got {lo}..={hi}"
            ));
        }

        check_log_range("learning_rate_range", self.learning_rate_range, false)?;
        check_log_range("l2_range", self.l2_range, true)?;

        Ok(())
    }
}

fn check_log_range(name: &str, (lo, hi): (f64, f64), allow_zero: bool) -> Result<()> {
    let zero = allow_zero && lo == 0. && hi == 0.;
    if !zero && !(lo.is_finite() && hi.is_finite() && lo > 0. && lo <= hi) {
        return Err(SurrogateError::InvalidConfig(format!(
            "{name} must satisfy 0 < min <= max, got {lo}..={hi}"
        )));
    }

    Ok(())
}

/// The hyperparameters of a single trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialParams {
    pub topology: Vec<usize>,
    pub learning_rate: f64,
    pub l2_regularization: f64,
}

impl TrialParams {
    /// The model configuration of this trial, everything but the searched values is taken from
    /// `base`.
    pub fn model_config(&self, base: &ModelConfig) -> ModelConfig {
        ModelConfig {
            topology: self.topology.clone(),
            learning_rate: self.learning_rate,
            l2_regularization: self.l2_regularization,
            ..base.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trial {
    pub id: usize,
    pub params: TrialParams,
    pub score: f64,
}

/// Random search over a `SearchSpace`.
pub struct RandomSearch {
    space: SearchSpace,
    rng: StdRng,
    trials: Vec<Trial>,
    best: Option<usize>,
}

impl RandomSearch {
    /// Creates a new `RandomSearch`.
    ///
    /// # Arguments
    /// * `space` - The ranges to draw from.
    /// * `seed` - The seed of the draws, taken from the OS when absent.
    pub fn new(space: SearchSpace, seed: Option<u64>) -> Result<Self> {
        space.validate()?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            space,
            rng,
            trials: Vec::new(),
            best: None,
        })
    }

    /// Draws the hyperparameters of a new trial.
    pub fn sample(&mut self) -> TrialParams {
        let space = &self.space;
        let rng = &mut self.rng;

        let n_layers = rng.random_range(range(space.n_layers_range));
        let mut topology = Vec::with_capacity(n_layers);
        topology.push(space.input_dim);
        for _ in 2..n_layers {
            topology.push(rng.random_range(range(space.n_hidden_range)));
        }
        topology.push(space.output_dim);

        TrialParams {
            topology,
            learning_rate: log_uniform(rng, space.learning_rate_range),
            l2_regularization: log_uniform(rng, space.l2_range),
        }
    }

    /// Runs `n_models` trials.
    ///
    /// # Arguments
    /// * `direction` - Whether the objective is minimized or maximized.
    /// * `objective` - Scores a trial given its id and hyperparameters.
    ///
    /// # Returns
    /// The best trial, `None` if every score was NaN, or the first error of the objective.
    pub fn run<F>(&mut self, direction: Direction, mut objective: F) -> Result<Option<&Trial>>
    where
        F: FnMut(usize, &TrialParams) -> Result<f64>,
    {
        for _ in 0..self.space.n_models {
            let id = self.trials.len();
            let params = self.sample();
            let score = objective(id, &params)?;

            info!(
                trial = id,
                topology:? = params.topology,
                learning_rate = params.learning_rate,
                l2 = params.l2_regularization,
                score = score;
                "trial finished"
            );

            let improves = match self.best() {
                Some(best) => direction.is_better(score, best.score),
                None => !score.is_nan(),
            };
            if improves {
                self.best = Some(id);
            }

            self.trials.push(Trial { id, params, score });
        }

        Ok(self.best())
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn best(&self) -> Option<&Trial> {
        self.trials.get(self.best?)
    }
}

fn range((lo, hi): (usize, usize)) -> RangeInclusive<usize> {
    lo..=hi
}

fn log_uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if lo == hi {
        return lo;
    }

    rng.random_range(lo.ln()..=hi.ln()).exp().clamp(lo, hi)
}
