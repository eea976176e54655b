//! Model builder.
//!
//! [`NetworkBuilder`] is the recommended way to define a model: an incremental
//! accumulator of layer specifications (width + activation) that yields an
//! immutable [`Network`] once finalized. Widths chain automatically, so the
//! inter-layer shape contract holds by construction.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Activation, Dense, Error, Layer, Network, Result};

#[derive(Debug, Clone, Copy)]
struct LayerSpec {
    width: usize,
    activation: Activation,
}

#[derive(Debug, Clone)]
/// Builder for a [`Network`].
///
/// Example:
///
/// ```rust
/// use ffnet::{Activation, NetworkBuilder};
///
/// # fn main() -> ffnet::Result<()> {
/// let net = NetworkBuilder::new(2)?
///     .add_layer(8, Activation::ReLU)?
///     .add_layer(1, Activation::Sigmoid)?
///     .build_with_seed(0)?;
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder {
    input_width: usize,
    specs: Vec<LayerSpec>,
}

impl NetworkBuilder {
    /// Start building a network that accepts inputs of length `input_width`.
    pub fn new(input_width: usize) -> Result<Self> {
        if input_width == 0 {
            return Err(Error::InvalidArgument(
                "input width must be > 0".to_owned(),
            ));
        }
        Ok(Self {
            input_width,
            specs: Vec::new(),
        })
    }

    /// Add a fully-connected layer with `width` outputs.
    pub fn add_layer(mut self, width: usize, activation: Activation) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidArgument("layer width must be > 0".to_owned()));
        }
        self.specs.push(LayerSpec { width, activation });
        Ok(self)
    }

    /// Build with a process-local RNG.
    pub fn build(self) -> Result<Network> {
        self.build_with_rng(&mut rand::thread_rng())
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        if self.specs.is_empty() {
            return Err(Error::InvalidArgument(
                "network must have at least one layer".to_owned(),
            ));
        }

        let mut layers: Vec<Box<dyn Layer>> = Vec::with_capacity(self.specs.len());
        let mut input_width = self.input_width;
        for spec in self.specs {
            layers.push(Box::new(Dense::with_rng(
                input_width,
                spec.width,
                spec.activation,
                rng,
            )));
            input_width = spec.width;
        }

        Network::from_layers(layers)
    }
}
