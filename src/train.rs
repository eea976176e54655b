//! The training loop.
//!
//! `fit` composes the whole engine: permuted batches from the [`Dataset`],
//! forward passes through the [`Network`], MSE loss and gradient, backward
//! accumulation, and one [`Sgd`] step per batch. It runs to completion over the
//! requested epoch count and blocks the caller for its full duration.
//!
//! The steady-state loop performs no per-step allocation: batch gathering,
//! forward/backward scratch, and the loss-gradient buffer are all reused.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{loss, Dataset, Error, Network, Result, Sgd};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Per-epoch reshuffling of the dataset's batching permutation.
pub enum Shuffle {
    /// Keep the current permutation.
    None,
    /// Reshuffle with a process-local RNG.
    #[default]
    Random,
    /// Reshuffle deterministically from a fixed seed.
    Seeded(u64),
}

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: Shuffle,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 32,
            shuffle: Shuffle::Random,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FitReport {
    /// Mean loss over all samples processed, one entry per epoch.
    pub epoch_losses: Vec<f32>,
}

impl FitReport {
    #[inline]
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

impl Network {
    /// Train on `dataset` with mini-batch gradient accumulation.
    ///
    /// Per epoch: optionally reshuffle, then for every batch clear all layer
    /// gradients, accumulate per-sample gradients via forward/backward, scale
    /// them by `1 / batch_len`, and apply one optimizer step per layer.
    ///
    /// The dataset is borrowed mutably for its permutation and batch scratch
    /// buffers; its logical sample content is not modified.
    pub fn fit(
        &mut self,
        dataset: &mut Dataset,
        optimizer: &Sgd,
        config: FitConfig,
    ) -> Result<FitReport> {
        if dataset.is_empty() {
            return Err(Error::InvalidArgument(
                "training dataset must not be empty".to_owned(),
            ));
        }
        if dataset.input_width() != self.input_width() {
            return Err(Error::ShapeMismatch(format!(
                "dataset input width {} does not match network input width {}",
                dataset.input_width(),
                self.input_width()
            )));
        }
        if dataset.output_width() != self.output_width() {
            return Err(Error::ShapeMismatch(format!(
                "dataset output width {} does not match network output width {}",
                dataset.output_width(),
                self.output_width()
            )));
        }

        let num_batches = dataset.num_batches(config.batch_size)?;
        // One seeded RNG reused across epochs keeps the whole run reproducible.
        let mut seeded_rng = match config.shuffle {
            Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
            Shuffle::None | Shuffle::Random => None,
        };

        let mut d_output = vec![0.0_f32; self.output_width()];
        let mut epoch_losses = Vec::with_capacity(config.epochs);

        for _ in 0..config.epochs {
            match config.shuffle {
                Shuffle::None => {}
                Shuffle::Random => dataset.shuffle(),
                Shuffle::Seeded(_) => {
                    let rng = seeded_rng.as_mut().expect("seeded rng was created above");
                    dataset.shuffle_with_rng(rng);
                }
            }

            let mut total_loss = 0.0_f32;
            let mut samples_seen = 0_usize;

            for batch_index in 0..num_batches {
                for layer in self.layers_mut() {
                    layer.clear_gradients();
                }

                let batch = dataset.get_batch(batch_index, config.batch_size)?;
                if batch.is_empty() {
                    continue;
                }

                for row in 0..batch.len() {
                    let input = batch.input(row);
                    let target = batch.target(row);

                    let pred = self.forward(input)?;
                    total_loss += loss::mse_with_gradient(pred, target, &mut d_output)?;
                    self.backward(&d_output)?;
                }
                samples_seen += batch.len();

                let scale = 1.0 / batch.len() as f32;
                for layer in self.layers_mut() {
                    layer.scale_gradients(scale);
                }
                for layer in self.layers_mut() {
                    optimizer.step(layer.as_mut());
                }
            }

            epoch_losses.push(total_loss / samples_seen as f32);
        }

        Ok(FitReport { epoch_losses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Activation, NetworkBuilder};

    fn xor_dataset() -> Dataset {
        let mut d = Dataset::new(2, 1).unwrap();
        d.add_sample(&[0.0, 0.0], &[0.0]).unwrap();
        d.add_sample(&[0.0, 1.0], &[1.0]).unwrap();
        d.add_sample(&[1.0, 0.0], &[1.0]).unwrap();
        d.add_sample(&[1.0, 1.0], &[0.0]).unwrap();
        d
    }

    #[test]
    fn fit_validates_dataset_against_network() {
        let mut net = NetworkBuilder::new(3)
            .unwrap()
            .add_layer(1, Activation::Sigmoid)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        let sgd = Sgd::new(0.1).unwrap();

        let mut wrong_width = xor_dataset();
        let err = net
            .fit(&mut wrong_width, &sgd, FitConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));

        let mut empty = Dataset::new(3, 1).unwrap();
        let err = net.fit(&mut empty, &sgd, FitConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn fit_rejects_zero_batch_size() {
        let mut net = NetworkBuilder::new(2)
            .unwrap()
            .add_layer(1, Activation::Sigmoid)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        let sgd = Sgd::new(0.1).unwrap();
        let mut data = xor_dataset();

        let err = net
            .fit(
                &mut data,
                &sgd,
                FitConfig {
                    epochs: 1,
                    batch_size: 0,
                    shuffle: Shuffle::None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn fit_handles_batch_size_larger_than_dataset() {
        let mut net = NetworkBuilder::new(2)
            .unwrap()
            .add_layer(4, Activation::Tanh)
            .unwrap()
            .add_layer(1, Activation::Sigmoid)
            .unwrap()
            .build_with_seed(1)
            .unwrap();
        let sgd = Sgd::new(0.5).unwrap();
        let mut data = xor_dataset();

        let report = net
            .fit(
                &mut data,
                &sgd,
                FitConfig {
                    epochs: 3,
                    batch_size: 100,
                    shuffle: Shuffle::None,
                },
            )
            .unwrap();
        assert_eq!(report.epoch_losses.len(), 3);
        assert!(report.final_loss().unwrap().is_finite());
    }

    #[test]
    fn training_on_xor_decreases_mean_epoch_loss() {
        let mut net = NetworkBuilder::new(2)
            .unwrap()
            .add_layer(4, Activation::ReLU)
            .unwrap()
            .add_layer(1, Activation::Sigmoid)
            .unwrap()
            .build_with_seed(42)
            .unwrap();
        let sgd = Sgd::new(0.5).unwrap();
        let mut data = xor_dataset();

        let report = net
            .fit(
                &mut data,
                &sgd,
                FitConfig {
                    epochs: 300,
                    batch_size: 2,
                    shuffle: Shuffle::Seeded(0),
                },
            )
            .unwrap();

        let first = report.epoch_losses[0];
        let last = report.final_loss().unwrap();
        assert!(
            last < first,
            "mean epoch loss did not decrease: first={first} last={last}"
        );
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut net = NetworkBuilder::new(2)
                .unwrap()
                .add_layer(4, Activation::Tanh)
                .unwrap()
                .add_layer(1, Activation::Sigmoid)
                .unwrap()
                .build_with_seed(7)
                .unwrap();
            let sgd = Sgd::new(0.3).unwrap();
            let mut data = xor_dataset();
            let report = net
                .fit(
                    &mut data,
                    &sgd,
                    FitConfig {
                        epochs: 20,
                        batch_size: 2,
                        shuffle: Shuffle::Seeded(13),
                    },
                )
                .unwrap();
            (report.epoch_losses, net.predict(&[1.0, 0.0]).unwrap())
        };

        let (losses_a, pred_a) = run();
        let (losses_b, pred_b) = run();
        assert_eq!(losses_a, losses_b);
        assert_eq!(pred_a, pred_b);
    }
}
