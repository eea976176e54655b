//! Layers.
//!
//! [`Layer`] is the runtime-polymorphic interface the network composes; [`Dense`]
//! is the fully-connected implementation. A layer owns its parameters, the
//! gradients accumulated for them, and the per-forward caches needed by backprop.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Activation;

/// A network layer: forward/backward propagation plus gradient bookkeeping.
///
/// Gradient lifecycle within one batch:
/// - [`Layer::clear_gradients`] once, before any sample,
/// - [`Layer::backward`] per sample (gradients accumulate with `+=`),
/// - [`Layer::scale_gradients`] once with `1 / batch_size`,
/// - the optimizer consumes the scaled gradients via [`Layer::visit_parameters`].
pub trait Layer {
    /// Number of inputs this layer consumes.
    fn input_width(&self) -> usize;

    /// Number of outputs this layer produces.
    fn output_width(&self) -> usize;

    /// Forward pass for a single sample.
    ///
    /// Writes the post-activation outputs into `output` and caches whatever the
    /// subsequent `backward` call needs. Does not allocate.
    ///
    /// Shape contract:
    /// - `input.len() == self.input_width()`
    /// - `output.len() == self.output_width()`
    fn forward(&mut self, input: &[f32], output: &mut [f32]);

    /// Backward pass for a single sample.
    ///
    /// `grad_output` is the upstream gradient `dL/d(output)`. Parameter
    /// gradients accumulate into the layer's own buffers; `grad_input` is
    /// zeroed internally and then accumulated into, so callers need not clear
    /// it.
    ///
    /// Only valid immediately after a `forward` call on this layer with
    /// matching shapes: backprop reads the caches that call populated.
    ///
    /// Shape contract:
    /// - `grad_output.len() == self.output_width()`
    /// - `grad_input.len() == self.input_width()`
    fn backward(&mut self, grad_output: &[f32], grad_input: &mut [f32]);

    /// Zero the accumulated parameter gradients. Called once per batch, before
    /// any sample in that batch is processed.
    fn clear_gradients(&mut self);

    /// Multiply every accumulated gradient entry by `factor`. Called once per
    /// batch, after all samples, before the optimizer step.
    fn scale_gradients(&mut self, factor: f32);

    /// Visit every (parameters, gradients) pair owned by this layer.
    ///
    /// This is how optimizers reach the parameters without knowing the layer's
    /// concrete type.
    fn visit_parameters(&mut self, visit: &mut dyn FnMut(&mut [f32], &[f32]));
}

/// A fully-connected layer: affine transform followed by a fixed nonlinearity.
#[derive(Debug, Clone)]
pub struct Dense {
    input_width: usize,
    output_width: usize,
    activation: Activation,
    /// Row-major matrix with shape (output_width, input_width).
    weights: Vec<f32>,
    biases: Vec<f32>,
    grad_weights: Vec<f32>,
    grad_biases: Vec<f32>,
    last_input: Vec<f32>,
    last_output: Vec<f32>,
}

impl Dense {
    /// Construct a layer with Xavier/Glorot-initialized weights.
    ///
    /// Weights are sampled uniformly from `[-limit, limit]` with
    /// `limit = sqrt(6 / (input_width + output_width))`; biases start at zero.
    pub fn new(input_width: usize, output_width: usize, activation: Activation) -> Self {
        Self::with_rng(input_width, output_width, activation, &mut rand::thread_rng())
    }

    /// Construct with a deterministic seed.
    pub fn with_seed(
        input_width: usize,
        output_width: usize,
        activation: Activation,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_rng(input_width, output_width, activation, &mut rng)
    }

    /// Construct using the provided RNG.
    pub fn with_rng<R: Rng + ?Sized>(
        input_width: usize,
        output_width: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        assert!(input_width > 0, "input_width must be > 0");
        assert!(output_width > 0, "output_width must be > 0");

        let limit = (6.0 / (input_width + output_width) as f32).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        let weights = (0..input_width * output_width)
            .map(|_| dist.sample(rng))
            .collect();

        Self {
            input_width,
            output_width,
            activation,
            weights,
            biases: vec![0.0; output_width],
            grad_weights: vec![0.0; input_width * output_width],
            grad_biases: vec![0.0; output_width],
            last_input: vec![0.0; input_width],
            last_output: vec![0.0; output_width],
        }
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    #[inline]
    pub fn grad_weights(&self) -> &[f32] {
        &self.grad_weights
    }

    #[inline]
    pub fn grad_biases(&self) -> &[f32] {
        &self.grad_biases
    }
}

impl Layer for Dense {
    #[inline]
    fn input_width(&self) -> usize {
        self.input_width
    }

    #[inline]
    fn output_width(&self) -> usize {
        self.output_width
    }

    fn forward(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), self.input_width);
        debug_assert_eq!(output.len(), self.output_width);

        self.last_input.copy_from_slice(input);

        for o in 0..self.output_width {
            let mut sum = self.biases[o];
            let row = o * self.input_width;
            for i in 0..self.input_width {
                sum = self.weights[row + i].mul_add(input[i], sum);
            }
            output[o] = self.activation.compute(sum);
        }

        self.last_output.copy_from_slice(output);
    }

    fn backward(&mut self, grad_output: &[f32], grad_input: &mut [f32]) {
        debug_assert_eq!(grad_output.len(), self.output_width);
        debug_assert_eq!(grad_input.len(), self.input_width);

        // grad_input accumulates contributions from all output units.
        grad_input.fill(0.0);

        for o in 0..self.output_width {
            let delta = grad_output[o] * self.activation.derivative(self.last_output[o]);
            self.grad_biases[o] += delta;

            let row = o * self.input_width;
            for i in 0..self.input_width {
                self.grad_weights[row + i] = delta.mul_add(self.last_input[i], self.grad_weights[row + i]);
                grad_input[i] = self.weights[row + i].mul_add(delta, grad_input[i]);
            }
        }
    }

    fn clear_gradients(&mut self) {
        self.grad_weights.fill(0.0);
        self.grad_biases.fill(0.0);
    }

    fn scale_gradients(&mut self, factor: f32) {
        for g in &mut self.grad_weights {
            *g *= factor;
        }
        for g in &mut self.grad_biases {
            *g *= factor;
        }
    }

    fn visit_parameters(&mut self, visit: &mut dyn FnMut(&mut [f32], &[f32])) {
        visit(&mut self.weights, &self.grad_weights);
        visit(&mut self.biases, &self.grad_biases);
    }
}
