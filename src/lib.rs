//! A small feed-forward neural network engine.
//!
//! `ffnet` implements layer composition, forward/backward propagation,
//! mini-batch gradient accumulation, and SGD parameter updates from scratch.
//! It is designed to be easy to read while keeping the training hot path
//! allocation-free.
//!
//! # Design goals
//!
//! - Predictable performance: the network ping-pongs activations between two
//!   reusable scratch buffers, the dataset gathers batches into reusable
//!   buffers, and layers accumulate gradients in place.
//! - Clear contracts: shapes are explicit and validated at the API boundary;
//!   misuse fails with a typed [`Error`], never silently.
//! - Reproducibility: every randomized step (weight init, shuffling) has a
//!   seeded variant.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f32`.
//! - [`Dataset`] stores samples contiguously in row-major layout.
//! - Layer weights are row-major with shape `(output_width, input_width)`.
//!
//! # Quick start
//!
//! ```rust
//! use ffnet::{Activation, FitConfig, NetworkBuilder, Sgd, Shuffle};
//!
//! # fn main() -> ffnet::Result<()> {
//! let mut train = ffnet::Dataset::new(2, 1)?;
//! train.add_sample(&[0.0, 0.0], &[0.0])?;
//! train.add_sample(&[0.0, 1.0], &[1.0])?;
//! train.add_sample(&[1.0, 0.0], &[1.0])?;
//! train.add_sample(&[1.0, 1.0], &[0.0])?;
//!
//! let mut net = NetworkBuilder::new(2)?
//!     .add_layer(4, Activation::Tanh)?
//!     .add_layer(1, Activation::Sigmoid)?
//!     .build_with_seed(0)?;
//!
//! let sgd = Sgd::new(0.5)?;
//! let report = net.fit(
//!     &mut train,
//!     &sgd,
//!     FitConfig {
//!         epochs: 200,
//!         batch_size: 4,
//!         shuffle: Shuffle::Seeded(0),
//!     },
//! )?;
//!
//! let prediction = net.predict(&[1.0, 0.0])?;
//! assert_eq!(prediction.len(), 1);
//! assert!(report.final_loss().unwrap() < report.epoch_losses[0]);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! The engine is single-threaded and synchronous. A [`Network`] and a
//! [`Dataset`] each own mutable scratch state, so every propagation and
//! batching method takes `&mut self`; share instances across threads only
//! behind external synchronization (or give each worker its own).

pub mod activation;
pub mod builder;
pub mod data;
pub mod error;
pub mod layer;
pub mod loss;
pub mod network;
pub mod optim;
pub mod train;

pub use activation::Activation;
pub use builder::NetworkBuilder;
pub use data::{Batch, Dataset};
pub use error::{Error, Result};
pub use layer::{Dense, Layer};
pub use network::Network;
pub use optim::Sgd;
pub use train::{FitConfig, FitReport, Shuffle};
