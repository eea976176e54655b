//! Activation functions.
//!
//! A dense layer computes a pre-activation value `z = W x + b` and then applies an
//! activation function element-wise: `y = activation(z)`.
//!
//! Layers cache the *post-activation* outputs `y`. During backprop we compute
//! `dL/dz` from `dL/dy` using `y` only, so no separate `z` buffer is needed and
//! the per-sample hot path stays allocation-free.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Element-wise activation function.
pub enum Activation {
    ReLU,
    Sigmoid,
    Tanh,
    Identity,
}

impl Activation {
    #[inline]
    pub fn compute(self, x: f32) -> f32 {
        match self {
            Activation::ReLU => x.max(0.0),
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Identity => x,
        }
    }

    /// Derivative of the activation with respect to its input, expressed in terms
    /// of the cached post-activation output `y`.
    #[inline]
    pub fn derivative(self, y: f32) -> f32 {
        match self {
            Activation::ReLU => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Sigmoid => y * (1.0 - y),
            Activation::Tanh => 1.0 - y * y,
            Activation::Identity => 1.0,
        }
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    // Clamp the exponent argument to avoid overflow in exp(); the function
    // saturates to 0/1 well before |x| = 500 anyway.
    if x > 500.0 {
        return 1.0;
    }
    if x < -500.0 {
        return 0.0;
    }
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_basic_values() {
        let y0 = Activation::Sigmoid.compute(0.0);
        assert!((y0 - 0.5).abs() < 1e-6);

        let y_pos = Activation::Sigmoid.compute(10.0);
        let y_neg = Activation::Sigmoid.compute(-10.0);
        assert!(y_pos > 0.999);
        assert!(y_neg < 0.001);
    }

    #[test]
    fn sigmoid_saturates_instead_of_overflowing() {
        assert_eq!(Activation::Sigmoid.compute(501.0), 1.0);
        assert_eq!(Activation::Sigmoid.compute(-501.0), 0.0);
        assert_eq!(Activation::Sigmoid.compute(1e10), 1.0);
        assert_eq!(Activation::Sigmoid.compute(-1e10), 0.0);
    }

    #[test]
    fn relu_shape_and_gradient() {
        assert_eq!(Activation::ReLU.compute(-2.0), 0.0);
        assert_eq!(Activation::ReLU.compute(3.0), 3.0);

        // Gradients expressed via cached outputs.
        assert_eq!(Activation::ReLU.derivative(0.0), 0.0);
        assert_eq!(Activation::ReLU.derivative(1.0), 1.0);
    }

    #[test]
    fn tanh_and_sigmoid_gradients_from_output() {
        let y_tanh = Activation::Tanh.compute(0.3);
        let g_tanh = Activation::Tanh.derivative(y_tanh);
        assert!((g_tanh - (1.0 - y_tanh * y_tanh)).abs() < 1e-6);

        let y_sig = Activation::Sigmoid.compute(0.0);
        let g_sig = Activation::Sigmoid.derivative(y_sig);
        assert!((g_sig - 0.25).abs() < 1e-6);
    }

    #[test]
    fn identity_passes_through() {
        assert_eq!(Activation::Identity.compute(-1.5), -1.5);
        assert_eq!(Activation::Identity.derivative(-1.5), 1.0);
    }
}
