/// Exponential linear unit with unit scale.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Elu;

impl Elu {
    pub fn f(&self, z: f64) -> f64 {
        if z > 0. { z } else { z.exp() - 1. }
    }

    // The derivative at exactly zero is taken from the right.
    pub fn df(&self, z: f64) -> f64 {
        if z >= 0. { 1. } else { z.exp() }
    }
}
