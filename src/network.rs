//! The network: an ordered composition of layers.
//!
//! A [`Network`] owns two scratch buffers sized to the widest layer boundary and
//! ping-pongs activations between them: the layer at index `k` reads from one
//! buffer and writes to the other, selected by the parity of `k`. A layer never
//! reads and writes the same buffer. The backward pass walks the layers in
//! reverse with the buffer roles mirrored, so each layer's `grad_input` lands
//! exactly where the next (earlier) layer expects its `grad_output`.
//!
//! The scratch buffers are shared mutable state: a `Network` must not be driven
//! from multiple threads without external synchronization. Every propagation
//! method takes `&mut self`, so the borrow checker enforces this.

use crate::{Error, Layer, Result};

pub struct Network {
    layers: Vec<Box<dyn Layer>>,
    input_width: usize,
    output_width: usize,
    // Ping-pong scratch, both sized to the widest buffer any layer touches.
    buf_a: Vec<f32>,
    buf_b: Vec<f32>,
    forward_recorded: bool,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("num_layers", &self.layers.len())
            .field("input_width", &self.input_width)
            .field("output_width", &self.output_width)
            .finish_non_exhaustive()
    }
}

impl Network {
    /// Build a network from an ordered layer sequence.
    ///
    /// The sequence is fixed for the network's lifetime. Adjacent layers must
    /// agree on widths: the output width of layer `k` is the input width of
    /// layer `k + 1`.
    pub fn from_layers(layers: Vec<Box<dyn Layer>>) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::InvalidArgument(
                "network must have at least one layer".to_owned(),
            ));
        }

        for (k, pair) in layers.windows(2).enumerate() {
            if pair[0].output_width() != pair[1].input_width() {
                return Err(Error::ShapeMismatch(format!(
                    "layer {k} produces {} outputs but layer {} expects {} inputs",
                    pair[0].output_width(),
                    k + 1,
                    pair[1].input_width()
                )));
            }
        }

        let input_width = layers[0].input_width();
        let output_width = layers[layers.len() - 1].output_width();

        let scratch_width = layers
            .iter()
            .map(|l| l.output_width())
            .max()
            .unwrap_or(0)
            .max(input_width);

        Ok(Self {
            layers,
            input_width,
            output_width,
            buf_a: vec![0.0; scratch_width],
            buf_b: vec![0.0; scratch_width],
            forward_recorded: false,
        })
    }

    #[inline]
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    #[inline]
    pub fn output_width(&self) -> usize {
        self.output_width
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&dyn Layer> {
        self.layers.get(idx).map(|l| l.as_ref())
    }

    #[inline]
    pub fn layer_mut(&mut self, idx: usize) -> Option<&mut dyn Layer> {
        self.layers.get_mut(idx).map(|l| &mut **l as &mut dyn Layer)
    }

    #[inline]
    pub(crate) fn layers_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Layer>> {
        self.layers.iter_mut()
    }

    /// Forward pass for a single sample, returning a fresh owned output.
    ///
    /// The result is copied out of the internal scratch, so the caller is
    /// decoupled from the network's buffer reuse.
    pub fn predict(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        Ok(self.forward(input)?.to_vec())
    }

    /// Forward pass returning a view into the scratch buffer that holds the
    /// final layer's output. Used by the training loop to avoid the copy-out.
    pub(crate) fn forward(&mut self, input: &[f32]) -> Result<&[f32]> {
        if input.len() != self.input_width {
            return Err(Error::ShapeMismatch(format!(
                "input has {} values, network expects {}",
                input.len(),
                self.input_width
            )));
        }

        self.buf_a[..input.len()].copy_from_slice(input);

        for k in 0..self.layers.len() {
            let in_w = self.layers[k].input_width();
            let out_w = self.layers[k].output_width();
            // Even layers read A and write B; odd layers the reverse.
            if k % 2 == 0 {
                self.layers[k].forward(&self.buf_a[..in_w], &mut self.buf_b[..out_w]);
            } else {
                self.layers[k].forward(&self.buf_b[..in_w], &mut self.buf_a[..out_w]);
            }
        }

        self.forward_recorded = true;

        let last = self.layers.len() - 1;
        let out = if last % 2 == 0 {
            &self.buf_b
        } else {
            &self.buf_a
        };
        Ok(&out[..self.output_width])
    }

    /// Backward pass: propagate `loss_gradient` from the output back to the
    /// input, accumulating parameter gradients in every layer.
    ///
    /// Requires a matching [`Network::predict`] (or `fit`-internal forward)
    /// call to have populated every layer's forward cache; calling it on a
    /// freshly constructed network fails with [`Error::LogicError`].
    pub fn backward(&mut self, loss_gradient: &[f32]) -> Result<()> {
        if loss_gradient.len() != self.output_width {
            return Err(Error::ShapeMismatch(format!(
                "loss gradient has {} values, network produces {}",
                loss_gradient.len(),
                self.output_width
            )));
        }
        if !self.forward_recorded {
            return Err(Error::LogicError(
                "backward called before any forward pass".to_owned(),
            ));
        }

        // Seed the gradient into the buffer the last layer wrote its output
        // to, then mirror the forward parity walking in reverse: layer k reads
        // its upstream gradient from its forward write-buffer and writes
        // grad_input into its forward read-buffer, which is exactly the
        // write-buffer of layer k - 1.
        let last = self.layers.len() - 1;
        if last % 2 == 0 {
            self.buf_b[..loss_gradient.len()].copy_from_slice(loss_gradient);
        } else {
            self.buf_a[..loss_gradient.len()].copy_from_slice(loss_gradient);
        }

        for k in (0..self.layers.len()).rev() {
            let in_w = self.layers[k].input_width();
            let out_w = self.layers[k].output_width();
            // grad_out and grad_in never alias: they live in different
            // buffers by the parity invariant.
            if k % 2 == 0 {
                self.layers[k].backward(&self.buf_b[..out_w], &mut self.buf_a[..in_w]);
            } else {
                self.layers[k].backward(&self.buf_a[..out_w], &mut self.buf_b[..in_w]);
            }
        }

        Ok(())
    }
}
