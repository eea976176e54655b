//! Contiguous dataset storage and batching.
//!
//! A [`Dataset`] stores samples flattened row-major and batches through an index
//! permutation: sample rows never move once added, only the permutation changes
//! on shuffle. Batches are gathered into two reusable scratch buffers, so the
//! steady-state training loop performs no per-batch allocation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Dataset {
    input_width: usize,
    output_width: usize,
    /// Flattened row-major input matrix: num_samples * input_width.
    inputs: Vec<f32>,
    /// Flattened row-major output matrix: num_samples * output_width.
    outputs: Vec<f32>,
    /// Permutation of `[0, num_samples)` used for batching.
    indices: Vec<usize>,
    num_samples: usize,

    // Batch gather buffers, grown lazily and reused.
    batch_inputs: Vec<f32>,
    batch_outputs: Vec<f32>,
}

/// A transient view over one gathered batch.
///
/// Both slices point into the dataset's scratch buffers and cover exactly
/// `len` rows. The borrow ties the view's lifetime to the dataset, so
/// requesting another batch statically invalidates it.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    inputs: &'a [f32],
    outputs: &'a [f32],
    len: usize,
    input_width: usize,
    output_width: usize,
}

impl Dataset {
    /// Create an empty dataset with the declared per-sample widths.
    pub fn new(input_width: usize, output_width: usize) -> Result<Self> {
        if input_width == 0 {
            return Err(Error::InvalidArgument("input width must be > 0".to_owned()));
        }
        if output_width == 0 {
            return Err(Error::InvalidArgument(
                "output width must be > 0".to_owned(),
            ));
        }
        Ok(Self {
            input_width,
            output_width,
            inputs: Vec::new(),
            outputs: Vec::new(),
            indices: Vec::new(),
            num_samples: 0,
            batch_inputs: Vec::new(),
            batch_outputs: Vec::new(),
        })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f32>], outputs: &[Vec<f32>]) -> Result<Self> {
        if inputs.len() != outputs.len() {
            return Err(Error::SizeMismatch(format!(
                "inputs/outputs row count mismatch: {} vs {}",
                inputs.len(),
                outputs.len()
            )));
        }
        if inputs.is_empty() {
            return Err(Error::InvalidArgument(
                "from_rows requires at least one sample".to_owned(),
            ));
        }

        let mut dataset = Self::new(inputs[0].len(), outputs[0].len())?;
        dataset.reserve(inputs.len());
        for (input, output) in inputs.iter().zip(outputs) {
            dataset.add_sample(input, output)?;
        }
        Ok(dataset)
    }

    /// Append a sample.
    ///
    /// Fails with [`Error::SizeMismatch`] if either row does not match the
    /// declared widths.
    pub fn add_sample(&mut self, input: &[f32], output: &[f32]) -> Result<()> {
        if input.len() != self.input_width {
            return Err(Error::SizeMismatch(format!(
                "input row has {} values, dataset expects {}",
                input.len(),
                self.input_width
            )));
        }
        if output.len() != self.output_width {
            return Err(Error::SizeMismatch(format!(
                "output row has {} values, dataset expects {}",
                output.len(),
                self.output_width
            )));
        }

        self.inputs.extend_from_slice(input);
        self.outputs.extend_from_slice(output);
        self.indices.push(self.num_samples);
        self.num_samples += 1;
        Ok(())
    }

    /// Reserve storage for `expected_samples` samples.
    pub fn reserve(&mut self, expected_samples: usize) {
        self.inputs.reserve(expected_samples * self.input_width);
        self.outputs.reserve(expected_samples * self.output_width);
        self.indices.reserve(expected_samples);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.num_samples
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    #[inline]
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    #[inline]
    pub fn output_width(&self) -> usize {
        self.output_width
    }

    /// Shuffle the batching permutation with a process-local RNG.
    pub fn shuffle(&mut self) {
        self.shuffle_with_rng(&mut rand::thread_rng());
    }

    /// Shuffle deterministically: the same seed and sample count always yield
    /// the same permutation.
    pub fn shuffle_with_seed(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.shuffle_with_rng(&mut rng);
    }

    /// Shuffle using the provided RNG (Fisher-Yates).
    pub fn shuffle_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.indices.shuffle(rng);
    }

    /// Number of batches needed to cover the dataset: `ceil(len / batch_size)`.
    pub fn num_batches(&self, batch_size: usize) -> Result<usize> {
        if batch_size == 0 {
            return Err(Error::InvalidArgument("batch size must be > 0".to_owned()));
        }
        Ok(self.num_samples.div_ceil(batch_size))
    }

    /// Gather one batch through the current permutation.
    ///
    /// Covers `min(batch_size, remaining)` rows. The returned [`Batch`] views
    /// the dataset's scratch buffers; requesting another batch reuses them.
    pub fn get_batch(&mut self, batch_index: usize, batch_size: usize) -> Result<Batch<'_>> {
        let num_batches = self.num_batches(batch_size)?;
        if batch_index >= num_batches {
            return Err(Error::IndexOutOfRange(format!(
                "batch index {batch_index} >= {num_batches} batches"
            )));
        }

        let start = batch_index * batch_size;
        let end = (start + batch_size).min(self.num_samples);
        let len = end - start;

        let required_inputs = len * self.input_width;
        let required_outputs = len * self.output_width;
        if self.batch_inputs.len() < required_inputs {
            self.batch_inputs.resize(required_inputs, 0.0);
        }
        if self.batch_outputs.len() < required_outputs {
            self.batch_outputs.resize(required_outputs, 0.0);
        }

        for (row, &sample) in self.indices[start..end].iter().enumerate() {
            let src = sample * self.input_width;
            let dst = row * self.input_width;
            self.batch_inputs[dst..dst + self.input_width]
                .copy_from_slice(&self.inputs[src..src + self.input_width]);

            let src = sample * self.output_width;
            let dst = row * self.output_width;
            self.batch_outputs[dst..dst + self.output_width]
                .copy_from_slice(&self.outputs[src..src + self.output_width]);
        }

        Ok(Batch {
            inputs: &self.batch_inputs[..required_inputs],
            outputs: &self.batch_outputs[..required_outputs],
            len,
            input_width: self.input_width,
            output_width: self.output_width,
        })
    }
}

impl<'a> Batch<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// All gathered input rows, flattened row-major.
    pub fn inputs(&self) -> &'a [f32] {
        self.inputs
    }

    #[inline]
    /// All gathered output rows, flattened row-major.
    pub fn outputs(&self) -> &'a [f32] {
        self.outputs
    }

    #[inline]
    /// The `row`-th input of this batch. Panics if `row >= len`.
    pub fn input(&self, row: usize) -> &'a [f32] {
        let start = row * self.input_width;
        &self.inputs[start..start + self.input_width]
    }

    #[inline]
    /// The `row`-th target of this batch. Panics if `row >= len`.
    pub fn target(&self, row: usize) -> &'a [f32] {
        let start = row * self.output_width;
        &self.outputs[start..start + self.output_width]
    }
}
