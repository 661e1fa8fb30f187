use log::debug;
use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{
    Gradients, Params, Predictor, Topology,
    activations::ActFn,
    layers::Dense,
    loss::{L2, LossFn},
};
use crate::{MlErr, Result, error::check_shape, metrics};

/// The values retained by a forward pass, needed to backpropagate through it.
///
/// For `L` layers it holds `Z[1..=L]` and `A[0..L]`, where `A[0]` is the input. The output of the
/// network is `Z[L]` itself since the output layer is linear.
#[derive(Clone, Debug)]
pub struct ForwardPass {
    z: Vec<Array2<f64>>,
    a: Vec<Array2<f64>>,
}

impl ForwardPass {
    pub fn num_layers(&self) -> usize {
        self.z.len()
    }

    /// The pre-activation of layer `l` (1-based).
    pub fn z(&self, l: usize) -> Option<&Array2<f64>> {
        self.z.get(l.checked_sub(1)?)
    }

    /// The activation of layer `l`, `A[0]` being the input.
    pub fn a(&self, l: usize) -> Option<&Array2<f64>> {
        self.a.get(l)
    }

    /// The prediction `Ŷ = Z[L]`.
    pub fn output(&self) -> ArrayView2<'_, f64> {
        self.z[self.z.len() - 1].view()
    }

    pub fn into_output(mut self) -> Array2<f64> {
        self.z.swap_remove(self.z.len() - 1)
    }
}

/// A feedforward network: every hidden layer goes through the same activation function and the
/// output layer is linear.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    topology: Topology,
    act_fn: ActFn,
    layers: Vec<Dense>,
    params: Params,
}

impl Network {
    /// Creates a new `Network` with freshly initialized parameters.
    ///
    /// # Arguments
    /// * `topology` - The layer widths.
    /// * `act_fn` - The activation function of the hidden layers.
    /// * `rng` - The random source for the weights.
    pub fn new<R: Rng + ?Sized>(topology: Topology, act_fn: ActFn, rng: &mut R) -> Result<Self> {
        let params = Params::initialize(&topology, rng)?;
        Self::from_params(topology, act_fn, params)
    }

    /// Creates a new `Network` out of existing parameters.
    ///
    /// # Returns
    /// An error if the parameters don't match the topology.
    pub fn from_params(topology: Topology, act_fn: ActFn, params: Params) -> Result<Self> {
        params.check(&topology)?;

        let nlayers = topology.num_layers();
        let layers = topology
            .layer_dims()
            .enumerate()
            .map(|(i, dim)| Dense::new(dim, (i + 1 < nlayers).then_some(act_fn)))
            .collect();

        debug!(widths:? = topology.widths(), act_fn = act_fn.name(); "built network");

        Ok(Self {
            topology,
            act_fn,
            layers,
            params,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn act_fn(&self) -> ActFn {
        self.act_fn
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    pub fn into_params(self) -> Params {
        self.params
    }

    /// Makes a forward pass retaining every pre-activation and activation.
    ///
    /// # Arguments
    /// * `x` - The input, one sample per column.
    ///
    /// # Returns
    /// The forward pass or an error if `x` doesn't have `n0` rows.
    pub fn forward(&self, x: ArrayView2<f64>) -> Result<ForwardPass> {
        self.check_input(x)?;

        let nlayers = self.layers.len();
        let mut z = Vec::with_capacity(nlayers);
        let mut a = Vec::with_capacity(nlayers);
        a.push(x.to_owned());

        for (i, (layer, params)) in self.layers.iter().zip(self.params.layers()).enumerate() {
            let zl = layer.linear(params, a[i].view());
            if i + 1 < nlayers {
                a.push(layer.activate(zl.clone()));
            }
            z.push(zl);
        }

        Ok(ForwardPass { z, a })
    }

    /// Computes the output of the network without retaining intermediate values.
    ///
    /// # Returns
    /// The prediction, of shape `(nL, m)`, or an error if `x` doesn't have `n0` rows.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        Ok(self.propagate(x))
    }

    /// The unchecked forward computation, `x` must have `n0` rows.
    pub(crate) fn propagate(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut layers = self.layers.iter().zip(self.params.layers());

        let Some((first, params)) = layers.next() else {
            return x.to_owned();
        };

        layers.fold(first.forward(params, x), |a, (layer, params)| {
            layer.forward(params, a.view())
        })
    }

    /// Computes the gradient of the regularized cost with respect to every parameter.
    ///
    /// # Arguments
    /// * `pass` - A forward pass of this network over the batch.
    /// * `y` - The targets, same shape as the output of `pass`.
    /// * `loss_fn` - The data loss.
    /// * `l2` - The weight penalty.
    ///
    /// # Returns
    /// The gradients, one entry per layer, or an error if the shapes don't line up.
    pub fn backward<L: LossFn>(
        &self,
        pass: &ForwardPass,
        y: ArrayView2<f64>,
        loss_fn: &L,
        l2: &L2,
    ) -> Result<Gradients> {
        if pass.num_layers() != self.layers.len() {
            return Err(MlErr::SizeMismatch {
                a: "forward pass",
                b: "network layers",
                got: pass.num_layers(),
                expected: self.layers.len(),
            });
        }

        let y_hat = pass.output();
        check_shape(|| "targets".to_string(), y.dim(), y_hat.dim())?;

        let m = y.ncols();
        for (i, (fan_in, fan_out)) in self.topology.layer_dims().enumerate() {
            let l = i + 1;
            check_shape(|| format!("A{i}"), pass.a[i].dim(), (fan_in, m))?;
            check_shape(|| format!("Z{l}"), pass.z[i].dim(), (fan_out, m))?;
        }

        let weight_decay = l2.weight_decay(y.ncols());
        let mut d = loss_fn.loss_prime(y_hat, y);
        let mut grads = Vec::with_capacity(self.layers.len());

        for (i, (layer, params)) in self
            .layers
            .iter()
            .zip(self.params.layers())
            .enumerate()
            .rev()
        {
            let (layer_grads, d_prev) =
                layer.backward(params, pass.a[i].view(), &pass.z[i], d, weight_decay);
            grads.push(layer_grads);
            d = d_prev;
        }

        grads.reverse();
        Ok(Gradients::new(grads))
    }

    /// The regularized cost of a prediction: the data loss plus the weight penalty.
    pub fn cost<L: LossFn>(
        &self,
        y_hat: ArrayView2<f64>,
        y: ArrayView2<f64>,
        loss_fn: &L,
        l2: &L2,
    ) -> f64 {
        loss_fn.loss(y_hat, y) + l2.penalty(&self.params, y.ncols())
    }

    /// The relative error of the network's prediction over a dataset.
    pub fn evaluate(&self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<f64> {
        let y_hat = self.predict(x)?;
        metrics::relative_error(y_hat.view(), y)
    }

    /// Borrows this network as the derivative function of an ODE.
    ///
    /// # Returns
    /// An error if the input and output dimensions differ.
    pub fn predictor(&self) -> Result<Predictor<'_>> {
        if !self.topology.is_autonomous() {
            return Err(MlErr::ShapeMismatch {
                what: "predictor output".to_string(),
                got: (self.topology.output_dim(), 1),
                expected: (self.topology.input_dim(), 1),
            });
        }

        Ok(Predictor::new(self))
    }

    fn check_input(&self, x: ArrayView2<f64>) -> Result<()> {
        check_shape(
            || "network input".to_string(),
            x.dim(),
            (self.topology.input_dim(), x.ncols()),
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::arch::{LayerParams, loss::Mse};

    fn network(widths: Vec<usize>, act_fn: ActFn) -> Network {
        let topology = Topology::new(widths).unwrap();
        Network::new(topology, act_fn, &mut StdRng::seed_from_u64(5)).unwrap()
    }

    /// `[1, 1, 1]` with `W1 = 2`, `b1 = 0`, `W2 = 3`, `b2 = 1`.
    fn tiny(act_fn: ActFn) -> Network {
        let topology = Topology::new(vec![1, 1, 1]).unwrap();
        let params = Params::from_layers(
            &topology,
            vec![
                LayerParams {
                    weights: array![[2.]],
                    biases: array![[0.]],
                },
                LayerParams {
                    weights: array![[3.]],
                    biases: array![[1.]],
                },
            ],
        )
        .unwrap();

        Network::from_params(topology, act_fn, params).unwrap()
    }

    #[test]
    fn output_layer_is_linear() {
        let net = tiny(ActFn::tanh());
        let y = net.predict(array![[0.5, 0.]].view()).unwrap();

        assert_abs_diff_eq!(y[[0, 0]], 3. * 1f64.tanh() + 1., epsilon = 1e-12);
        assert_abs_diff_eq!(y[[0, 1]], 1., epsilon = 1e-12);
    }

    #[test]
    fn forward_retains_every_intermediate_value() {
        let net = network(vec![3, 8, 5, 2], ActFn::sigmoid());
        let x = Array2::from_shape_fn((3, 4), |(i, j)| (i as f64 - j as f64) / 3.);

        let pass = net.forward(x.view()).unwrap();

        assert_eq!(pass.num_layers(), 3);
        assert_eq!(pass.a(0).unwrap(), &x);
        assert_eq!(pass.z(1).unwrap().dim(), (8, 4));
        assert_eq!(pass.a(2).unwrap().dim(), (5, 4));
        assert!(pass.a(3).is_none());
        assert_eq!(pass.output(), net.predict(x.view()).unwrap());
        assert_eq!(
            pass.a(1).unwrap(),
            pass.z(1).unwrap().mapv(|z| ActFn::sigmoid().f(z))
        );
    }

    #[test]
    fn zero_input_and_parameters_give_zero_pre_activations() {
        for act_fn in [ActFn::tanh(), ActFn::sigmoid(), ActFn::elu()] {
            let topology = Topology::new(vec![3, 4, 2]).unwrap();
            let params = Params::zeros(&topology);
            let net = Network::from_params(topology, act_fn, params).unwrap();

            let pass = net.forward(Array2::zeros((3, 2)).view()).unwrap();
            for l in 1..=2 {
                assert!(pass.z(l).unwrap().iter().all(|&z| z == 0.));
            }

            let hidden = act_fn.f(0.);
            assert!(pass.a(1).unwrap().iter().all(|&a| a == hidden));
        }

        // sigmoid is the one activation that doesn't map zero to zero
        assert_eq!(ActFn::sigmoid().f(0.), 0.5);
    }

    #[test]
    fn single_layer_network_is_affine() {
        let net = network(vec![2, 3], ActFn::elu());
        let x = array![[-4.], [-3.]];
        let layer = net.params().layer(1).unwrap();

        let expected = layer.weights.dot(&x) + &layer.biases;
        assert_eq!(net.predict(x.view()).unwrap(), expected);
    }

    #[test]
    fn input_rows_are_checked() {
        let net = network(vec![2, 4, 2], ActFn::tanh());

        let err = net.predict(Array2::zeros((3, 5)).view()).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { .. }));
        assert!(net.forward(Array2::zeros((1, 5)).view()).is_err());
    }

    #[test]
    fn empty_batch_gives_an_empty_prediction() {
        let net = network(vec![2, 4, 2], ActFn::tanh());
        assert_eq!(net.predict(Array2::zeros((2, 0)).view()).unwrap().dim(), (2, 0));
    }

    #[test]
    fn backward_of_a_tiny_network() {
        let net = tiny(ActFn::tanh());
        let x = array![[0.5]];
        let y = array![[0.]];

        let pass = net.forward(x.view()).unwrap();
        let grads = net.backward(&pass, y.view(), &Mse, &L2::new(0.)).unwrap();

        let a1 = 1f64.tanh();
        let y_hat = 3. * a1 + 1.;
        let dz1 = y_hat * 3. * (1. - a1 * a1);

        let g2 = grads.layer(2).unwrap();
        assert_abs_diff_eq!(g2.dw[[0, 0]], y_hat * a1, epsilon = 1e-12);
        assert_abs_diff_eq!(g2.db[[0, 0]], y_hat, epsilon = 1e-12);

        let g1 = grads.layer(1).unwrap();
        assert_abs_diff_eq!(g1.dw[[0, 0]], dz1 * 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(g1.db[[0, 0]], dz1, epsilon = 1e-12);
    }

    #[test]
    fn gradients_match_parameter_shapes() {
        let net = network(vec![3, 7, 4, 3], ActFn::elu());
        let x = Array2::from_elem((3, 6), 0.3);
        let y = Array2::from_elem((3, 6), -0.2);

        let pass = net.forward(x.view()).unwrap();
        let grads = net.backward(&pass, y.view(), &Mse, &L2::new(0.1)).unwrap();

        assert_eq!(grads.num_layers(), 3);
        for (g, p) in grads.layers().iter().zip(net.params().layers()) {
            assert_eq!(g.dw.dim(), p.weights.dim());
            assert_eq!(g.db.dim(), p.biases.dim());
        }
    }

    #[test]
    fn backward_rejects_mismatched_targets() {
        let net = network(vec![2, 4, 2], ActFn::tanh());
        let pass = net.forward(Array2::zeros((2, 3)).view()).unwrap();

        let err = net
            .backward(&pass, Array2::zeros((2, 4)).view(), &Mse, &L2::new(0.))
            .unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { .. }));
    }

    #[test]
    fn backward_rejects_a_pass_of_another_network() {
        let net = network(vec![2, 4, 2], ActFn::tanh());
        let other = network(vec![2, 6, 2], ActFn::tanh());
        let pass = other.forward(Array2::zeros((2, 3)).view()).unwrap();

        let err = net
            .backward(&pass, Array2::zeros((2, 3)).view(), &Mse, &L2::new(0.))
            .unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { .. }));
    }

    #[test]
    fn cost_adds_the_weight_penalty() {
        let net = tiny(ActFn::tanh());
        let y_hat = array![[1., 3.]];
        let y = array![[0., 0.]];

        // (1 + 9) / 4 + 2 * (4 + 9) / 4
        let cost = net.cost(y_hat.view(), y.view(), &Mse, &L2::new(2.));
        assert_abs_diff_eq!(cost, 2.5 + 6.5, epsilon = 1e-12);
    }

    #[test]
    fn evaluate_is_the_relative_error() {
        let net = tiny(ActFn::tanh());
        let x = array![[0., 0.]];

        // the network outputs 1 at x = 0
        assert_eq!(net.evaluate(x.view(), array![[1., 1.]].view()).unwrap(), 0.);
        assert_abs_diff_eq!(
            net.evaluate(x.view(), array![[2., 2.]].view()).unwrap(),
            0.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn predictor_needs_matching_dimensions() {
        assert!(network(vec![2, 5, 2], ActFn::tanh()).predictor().is_ok());
        assert!(matches!(
            network(vec![2, 5, 3], ActFn::tanh()).predictor(),
            Err(MlErr::ShapeMismatch { .. })
        ));
    }
}
