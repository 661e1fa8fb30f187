use ndarray::{Array2, Zip};

use super::optimizer::check_grads;
use crate::{
    MlErr, Result,
    arch::{Gradients, Params},
    error::check_shape,
};

/// The first (`v`) and second (`s`) moment estimates of a single layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Moments {
    pub v_w: Array2<f64>,
    pub v_b: Array2<f64>,
    pub s_w: Array2<f64>,
    pub s_b: Array2<f64>,
}

impl Moments {
    fn zeros(weights: (usize, usize), biases: (usize, usize)) -> Self {
        Self {
            v_w: Array2::zeros(weights),
            v_b: Array2::zeros(biases),
            s_w: Array2::zeros(weights),
            s_b: Array2::zeros(biases),
        }
    }
}

/// Adam with bias correction.
#[derive(Clone, Debug, PartialEq)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    moments: Vec<Moments>,
}

impl Adam {
    pub const BETA1: f64 = 0.9;
    pub const BETA2: f64 = 0.999;
    pub const EPSILON: f64 = 1e-8;

    /// Creates a new `Adam` optimizer with the default hyperparameters.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `params` - The parameters this instance is going to optimize, the moments take their
    ///   shapes and start at zero.
    pub fn new(learning_rate: f64, params: &Params) -> Self {
        Self::with_hyperparams(
            learning_rate,
            Self::BETA1,
            Self::BETA2,
            Self::EPSILON,
            params,
        )
    }

    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    /// * `params` - The parameters this instance is going to optimize.
    pub fn with_hyperparams(
        learning_rate: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
        params: &Params,
    ) -> Self {
        let moments = params
            .layers()
            .iter()
            .map(|layer| Moments::zeros(layer.weights.dim(), layer.biases.dim()))
            .collect();

        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            moments,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn moments(&self) -> &[Moments] {
        &self.moments
    }

    /// Updates the moment estimates with `grads` and takes a bias-corrected step.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grads` - The gradient used for taking the step.
    /// * `t` - The 1-based iteration counter, cumulative over every call.
    pub fn update(&mut self, params: &mut Params, grads: &Gradients, t: usize) -> Result<()> {
        if t == 0 {
            return Err(MlErr::InvalidConfiguration(
                "adam iterations are counted from 1".to_string(),
            ));
        }

        check_grads(params, grads)?;
        self.check_moments(params)?;

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        let t = i32::try_from(t).unwrap_or(i32::MAX);
        let bc1 = 1. - b1.powi(t);
        let bc2 = 1. - b2.powi(t);

        let step = |p: &mut Array2<f64>, g: &Array2<f64>, v: &mut Array2<f64>, s: &mut Array2<f64>| {
            Zip::from(p)
                .and(g)
                .and(v)
                .and(s)
                .for_each(|p, &g, v, s| {
                    *v = b1 * *v + (1. - b1) * g;
                    *s = b2 * *s + (1. - b2) * g * g;
                    *p -= lr * (*v / bc1) / ((*s / bc2).sqrt() + eps);
                });
        };

        for ((p, g), m) in params
            .layers_mut()
            .iter_mut()
            .zip(grads.layers())
            .zip(self.moments.iter_mut())
        {
            step(&mut p.weights, &g.dw, &mut m.v_w, &mut m.s_w);
            step(&mut p.biases, &g.db, &mut m.v_b, &mut m.s_b);
        }

        Ok(())
    }

    fn check_moments(&self, params: &Params) -> Result<()> {
        if self.moments.len() != params.num_layers() {
            return Err(MlErr::SizeMismatch {
                a: "adam moments",
                b: "parameter layers",
                got: self.moments.len(),
                expected: params.num_layers(),
            });
        }

        for (i, (m, p)) in self.moments.iter().zip(params.layers()).enumerate() {
            let l = i + 1;
            check_shape(|| format!("v_W{l}"), m.v_w.dim(), p.weights.dim())?;
            check_shape(|| format!("v_b{l}"), m.v_b.dim(), p.biases.dim())?;
            check_shape(|| format!("s_W{l}"), m.s_w.dim(), p.weights.dim())?;
            check_shape(|| format!("s_b{l}"), m.s_b.dim(), p.biases.dim())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;
    use crate::arch::{LayerGrads, Topology};

    fn setup() -> (Params, Gradients) {
        let topology = Topology::new(vec![2, 1]).unwrap();
        let params = Params::zeros(&topology);
        let grads = Gradients::new(vec![LayerGrads {
            dw: array![[0.3, -2.]],
            db: array![[1e-3]],
        }]);

        (params, grads)
    }

    #[test]
    fn first_step_is_bias_corrected() {
        let (mut params, grads) = setup();
        let mut adam = Adam::new(0.01, &params);

        adam.update(&mut params, &grads, 1).unwrap();

        let m = &adam.moments()[0];
        let g = &grads.layers()[0];
        let v_hat = &m.v_w / (1. - Adam::BETA1);
        let s_hat = &m.s_w / (1. - Adam::BETA2);

        for ((v, s), g) in v_hat.iter().zip(&s_hat).zip(&g.dw) {
            assert_abs_diff_eq!(*v, *g, epsilon = 1e-12);
            assert_abs_diff_eq!(*s, g * g, epsilon = 1e-12);
        }

        // with v̂ = g and ŝ = g² the first step is lr·sign(g)
        let layer = params.layer(1).unwrap();
        assert_abs_diff_eq!(layer.weights[[0, 0]], -0.01, epsilon = 1e-8);
        assert_abs_diff_eq!(layer.weights[[0, 1]], 0.01, epsilon = 1e-8);
        assert_abs_diff_eq!(layer.biases[[0, 0]], -0.01, epsilon = 1e-6);
    }

    #[test]
    fn moments_accumulate_across_steps() {
        let (mut params, grads) = setup();
        let mut adam = Adam::new(0.01, &params);

        adam.update(&mut params, &grads, 1).unwrap();
        adam.update(&mut params, &grads, 2).unwrap();

        // v = (1 - β1)(1 + β1) g after two identical gradients
        let v = adam.moments()[0].v_w[[0, 1]];
        assert_abs_diff_eq!(v, 0.1 * 1.9 * -2., epsilon = 1e-12);
    }

    #[test]
    fn step_zero_is_rejected() {
        let (mut params, grads) = setup();
        let mut adam = Adam::new(0.01, &params);

        assert!(matches!(
            adam.update(&mut params, &grads, 0),
            Err(MlErr::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn moments_must_match_the_parameters() {
        let (params, grads) = setup();
        let mut adam = Adam::new(0.01, &params);

        let mut other = Params::zeros(&Topology::new(vec![2, 1, 1]).unwrap());
        let grads_other = Gradients::new(
            other
                .layers()
                .iter()
                .map(|p| LayerGrads {
                    dw: p.weights.clone(),
                    db: p.biases.clone(),
                })
                .collect(),
        );

        assert!(adam.update(&mut other, &grads_other, 1).is_err());
        assert!(adam.update(&mut params.clone(), &grads, 1).is_ok());
    }

    #[test]
    fn second_moments_are_checked_too() {
        let (mut params, grads) = setup();
        let mut adam = Adam::new(0.01, &params);
        adam.moments[0].s_b = Array2::zeros((2, 1));

        let err = adam.update(&mut params, &grads, 1).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { ref what, .. } if what == "s_b1"));
    }
}
