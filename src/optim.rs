//! Optimizers.
//!
//! The update rule reaches a layer's parameters through
//! [`Layer::visit_parameters`], so it applies uniformly to every weight and
//! bias array without knowing the layer's concrete type.

use crate::{Error, Layer, Result};

#[derive(Debug, Clone, Copy)]
/// Stochastic gradient descent with a fixed learning rate.
///
/// Stateless across steps: no momentum, no decay. The single tunable is the
/// learning rate set at construction.
pub struct Sgd {
    learning_rate: f32,
}

impl Sgd {
    /// Construct an SGD optimizer.
    ///
    /// Returns an error if `learning_rate` is not finite or not positive.
    pub fn new(learning_rate: f32) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidArgument(
                "learning rate must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self { learning_rate })
    }

    #[inline]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Apply one update: `param -= learning_rate * grad` for every parameter
    /// entry the layer owns.
    ///
    /// Expects the layer's gradients to already be scaled by the batch size.
    pub fn step(&self, layer: &mut dyn Layer) {
        let lr = self.learning_rate;
        layer.visit_parameters(&mut |params, grads| {
            for (p, &g) in params.iter_mut().zip(grads) {
                *p -= lr * g;
            }
        });
    }
}
