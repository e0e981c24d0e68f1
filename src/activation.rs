//! Activation functions, each paired with its own derivative.

/// An elementwise activation function together with its derivative.
///
/// Both are taken at the raw (pre-activation) value of a node.
pub trait Activation {
    fn activate(&self, x: f64) -> f64;
    fn derivative(&self, x: f64) -> f64;
}

/// Logistic sigmoid, 1 / (1 + e^-x).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn activate(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    /// σ(x) * (1 - σ(x))
    fn derivative(&self, x: f64) -> f64 {
        let s = self.activate(x);
        s * (1.0 - s)
    }
}
