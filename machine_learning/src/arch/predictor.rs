use ndarray::{Array2, ArrayView2};

use super::Network;
use crate::{Result, error::check_shape};

/// A network whose input and output dimensions agree, seen as the right hand side `dx/dt = f(x)`
/// of an autonomous ODE.
#[derive(Clone, Copy, Debug)]
pub struct Predictor<'n> {
    network: &'n Network,
}

impl<'n> Predictor<'n> {
    pub(super) fn new(network: &'n Network) -> Self {
        Self { network }
    }

    /// The dimension of the state vector.
    pub fn dim(&self) -> usize {
        self.network.topology().input_dim()
    }

    pub fn network(&self) -> &'n Network {
        self.network
    }

    /// Evaluates the derivative at every state (column) of `states`.
    ///
    /// # Returns
    /// `MlErr::ShapeMismatch` if `states` doesn't have `dim()` rows.
    pub fn derivative(&self, states: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_shape(
            || "predictor states".to_string(),
            states.dim(),
            (self.dim(), states.ncols()),
        )?;

        Ok(self.network.propagate(states))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};
    use rand::{SeedableRng, rngs::StdRng};

    use crate::{
        MlErr,
        arch::{Network, Topology, activations::ActFn},
    };

    fn network() -> Network {
        let topology = Topology::new(vec![2, 4, 2]).unwrap();
        Network::new(topology, ActFn::tanh(), &mut StdRng::seed_from_u64(11)).unwrap()
    }

    #[test]
    fn derivative_is_the_network_prediction() {
        let net = network();
        let predictor = net.predictor().unwrap();
        let x = array![[0.3], [-0.8]];

        assert_eq!(predictor.dim(), 2);
        assert_eq!(predictor.derivative(x.view()).unwrap(), net.predict(x.view()).unwrap());
    }

    #[test]
    fn wrong_state_dimension_is_an_error() {
        let net = network();
        let predictor = net.predictor().unwrap();

        assert!(matches!(
            predictor.derivative(Array2::zeros((3, 1)).view()),
            Err(MlErr::ShapeMismatch { .. })
        ));
    }
}
