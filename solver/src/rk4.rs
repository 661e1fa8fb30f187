use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::{Result, SolverErr, Trajectory};

/// The classical fourth order Runge-Kutta method with a fixed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rk4 {
    step: f64,
}

impl Rk4 {
    /// Creates a new `Rk4`.
    ///
    /// # Arguments
    /// * `step` - The step size `h`, finite and positive.
    pub fn new(step: f64) -> Result<Self> {
        if !step.is_finite() || step <= 0. {
            return Err(SolverErr::InvalidInput(format!(
                "the step size must be positive, got {step}"
            )));
        }

        Ok(Self { step })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Integrates the autonomous system `dx/dt = f(x)` from `x0`.
    ///
    /// `f` receives the state as a single `(d, 1)` column and must return the derivative with that
    /// same shape. Non finite values are not checked for, they just flow into the trajectory.
    ///
    /// # Arguments
    /// * `f` - The derivative function.
    /// * `x0` - The initial condition.
    /// * `steps` - The amount of states to produce, `x0` included.
    ///
    /// # Returns
    /// The trajectory, or an error if `steps` is zero or `f` returned a wrongly shaped derivative.
    pub fn integrate<F>(&self, mut f: F, x0: ArrayView1<f64>, steps: usize) -> Result<Trajectory>
    where
        F: FnMut(ArrayView2<f64>) -> Array2<f64>,
    {
        self.try_integrate(|x| Ok::<_, SolverErr>(f(x)), x0, steps)
    }

    /// Like `integrate`, but with a derivative function that can fail.
    ///
    /// The first error returned by `f` stops the integration and is handed back as is.
    pub fn try_integrate<F, E>(
        &self,
        mut f: F,
        x0: ArrayView1<f64>,
        steps: usize,
    ) -> std::result::Result<Trajectory, E>
    where
        F: FnMut(ArrayView2<f64>) -> std::result::Result<Array2<f64>, E>,
        E: From<SolverErr>,
    {
        if steps == 0 {
            return Err(SolverErr::InvalidInput(
                "at least one step is needed to hold the initial condition".to_string(),
            )
            .into());
        }

        let h = self.step;
        let shape = (x0.len(), 1);
        let mut eval = |x: &Array2<f64>| -> std::result::Result<Array2<f64>, E> {
            let k = f(x.view())?;
            if k.dim() != shape {
                return Err(SolverErr::DimensionMismatch {
                    got: k.dim(),
                    expected: shape,
                }
                .into());
            }
            Ok(k)
        };

        let mut states = Array2::zeros((x0.len(), steps));
        states.column_mut(0).assign(&x0);
        let mut x = x0.to_owned().insert_axis(Axis(1));

        for j in 1..steps {
            let k1 = eval(&x)?;
            let k2 = eval(&offset(&x, h / 2., &k1))?;
            let k3 = eval(&offset(&x, h / 2., &k2))?;
            let k4 = eval(&offset(&x, h, &k3))?;

            x.scaled_add(h / 6., &k1);
            x.scaled_add(h / 3., &k2);
            x.scaled_add(h / 3., &k3);
            x.scaled_add(h / 6., &k4);
            states.column_mut(j).assign(&x.column(0));
        }

        debug!(dim = x0.len(), steps = steps, h = h; "integrated trajectory");
        Ok(Trajectory::new(states, h))
    }

    /// Integrates over `[0, t_max]`, that is `floor(t_max / h) + 1` states.
    pub fn integrate_until<F>(&self, f: F, x0: ArrayView1<f64>, t_max: f64) -> Result<Trajectory>
    where
        F: FnMut(ArrayView2<f64>) -> Array2<f64>,
    {
        if !t_max.is_finite() || t_max < 0. {
            return Err(SolverErr::InvalidInput(format!(
                "the time horizon must be non negative, got {t_max}"
            )));
        }

        let steps = (t_max / self.step).floor() as usize + 1;
        self.integrate(f, x0, steps)
    }
}

/// `x + a·k`
fn offset(x: &Array2<f64>, a: f64, k: &Array2<f64>) -> Array2<f64> {
    let mut y = x.clone();
    y.scaled_add(a, k);
    y
}
