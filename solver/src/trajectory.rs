use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// The states visited by a fixed-step integration, one column per step.
///
/// Column `j` is the state at time `j·h`, column 0 being the initial condition.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    states: Array2<f64>,
    step: f64,
}

impl Trajectory {
    pub(crate) fn new(states: Array2<f64>, step: f64) -> Self {
        Self { states, step }
    }

    /// The `(dim, len)` matrix of states.
    pub fn states(&self) -> ArrayView2<'_, f64> {
        self.states.view()
    }

    pub fn into_states(self) -> Array2<f64> {
        self.states
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// The dimension of every state.
    pub fn dim(&self) -> usize {
        self.states.nrows()
    }

    /// The amount of states, initial condition included.
    pub fn len(&self) -> usize {
        self.states.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self, j: usize) -> Option<ArrayView1<'_, f64>> {
        (j < self.len()).then(|| self.states.column(j))
    }

    pub fn last_state(&self) -> Option<ArrayView1<'_, f64>> {
        self.state(self.len().checked_sub(1)?)
    }

    /// The time of every state, `t_j = j·h`.
    pub fn times(&self) -> Array1<f64> {
        Array1::from_iter((0..self.len()).map(|j| j as f64 * self.step))
    }
}
