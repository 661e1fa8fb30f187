use std::iter::FusedIterator;

use log::info;
use ndarray::ArrayView2;

use super::Trainer;
use crate::{Result, arch::loss::LossFn};

/// Progress is reported on the first iteration and then every `REPORT_EVERY` iterations.
pub const REPORT_EVERY: usize = 1000;

/// A cost sample taken during training.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// The 1-based iteration within the `fit` call.
    pub iteration: usize,
    /// The regularized cost of the forward pass right before this iteration's update.
    pub cost: f64,
}

/// A training run in progress, see `Trainer::fit`.
///
/// Iterations only run as the sequence is consumed. Once the last progress sample is yielded the
/// remaining iterations run on the following call to `next`, which then returns `None`. Dropping
/// a `Fit` early stops the training where it was.
pub struct Fit<'t, L: LossFn> {
    trainer: &'t mut Trainer<L>,
    x: ArrayView2<'t, f64>,
    y: ArrayView2<'t, f64>,
    iteration: usize,
    done: bool,
}

impl<'t, L: LossFn> Fit<'t, L> {
    pub(super) fn new(
        trainer: &'t mut Trainer<L>,
        x: ArrayView2<'t, f64>,
        y: ArrayView2<'t, f64>,
    ) -> Self {
        Self {
            trainer,
            x,
            y,
            iteration: 0,
            done: false,
        }
    }

    /// The amount of iterations run so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }
}

impl<L: LossFn> Iterator for Fit<'_, L> {
    type Item = Result<Progress>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while self.iteration < self.trainer.iterations() {
            self.iteration += 1;
            let iteration = self.iteration;

            let cost = match self.trainer.step(self.x, self.y) {
                Ok(cost) => cost,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if iteration == 1 || iteration % REPORT_EVERY == 0 {
                info!(iteration = iteration, cost = cost; "training");
                return Some(Ok(Progress { iteration, cost }));
            }
        }

        self.done = true;
        None
    }
}

impl<L: LossFn> FusedIterator for Fit<'_, L> {}
