//! Mean squared error loss.
//!
//! These are small, allocation-free helpers intended to be used like:
//!
//! - run `network.predict(...)` / the fit-internal forward pass
//! - compute the loss gradient via [`mse_gradient`] (or the fused
//!   [`mse_with_gradient`])
//! - run `network.backward(...)`
//! - update parameters with an optimizer
//!
//! Both kernels are data-parallel over 8-wide lanes (AVX2 + FMA, selected at
//! runtime) with a scalar remainder loop for the tail. The vectorized sum only
//! reassociates the reduction, so it agrees with the naive sequential sum
//! within floating-point tolerance.

use crate::{Error, Result};

/// Mean squared error: `mean((pred_i - target_i)^2)`.
///
/// Fails with [`Error::SizeMismatch`] if the spans differ in length.
#[inline]
pub fn mse(pred: &[f32], target: &[f32]) -> Result<f32> {
    if pred.len() != target.len() {
        return Err(Error::SizeMismatch(format!(
            "pred has {} values, target has {}",
            pred.len(),
            target.len()
        )));
    }
    if pred.is_empty() {
        return Ok(0.0);
    }

    Ok(sum_squared_diff(pred, target) / pred.len() as f32)
}

/// MSE gradient w.r.t. `pred`: `out_i = (2/n) * (pred_i - target_i)`.
///
/// Fails with [`Error::SizeMismatch`] if `target` or `out` differ in length
/// from `pred`.
#[inline]
pub fn mse_gradient(pred: &[f32], target: &[f32], out: &mut [f32]) -> Result<()> {
    if pred.len() != target.len() {
        return Err(Error::SizeMismatch(format!(
            "pred has {} values, target has {}",
            pred.len(),
            target.len()
        )));
    }
    if out.len() != pred.len() {
        return Err(Error::SizeMismatch(format!(
            "gradient output has {} values, pred has {}",
            out.len(),
            pred.len()
        )));
    }
    if pred.is_empty() {
        return Ok(());
    }

    write_gradient(pred, target, out);
    Ok(())
}

/// Fused loss + gradient, sharing the shape checks and the difference pass.
///
/// Writes the gradient into `out` and returns the loss value.
#[inline]
pub fn mse_with_gradient(pred: &[f32], target: &[f32], out: &mut [f32]) -> Result<f32> {
    mse_gradient(pred, target, out)?;
    mse(pred, target)
}

#[inline]
fn sum_squared_diff(pred: &[f32], target: &[f32]) -> f32 {
    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
        let lanes = pred.len() - pred.len() % 8;
        // Safety: AVX2 and FMA were detected at runtime, and both slices hold
        // at least `lanes` elements.
        let mut sum = unsafe { avx2::sum_squared_diff(&pred[..lanes], &target[..lanes]) };
        for i in lanes..pred.len() {
            let diff = pred[i] - target[i];
            sum = diff.mul_add(diff, sum);
        }
        return sum;
    }

    sum_squared_diff_scalar(pred, target)
}

#[inline]
fn sum_squared_diff_scalar(pred: &[f32], target: &[f32]) -> f32 {
    let mut sum = 0.0_f32;
    for (&p, &t) in pred.iter().zip(target) {
        let diff = p - t;
        sum = diff.mul_add(diff, sum);
    }
    sum
}

#[inline]
fn write_gradient(pred: &[f32], target: &[f32], out: &mut [f32]) {
    let scale = 2.0 / pred.len() as f32;

    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        let lanes = pred.len() - pred.len() % 8;
        // Safety: AVX2 was detected at runtime, and every slice holds at
        // least `lanes` elements.
        unsafe { avx2::write_gradient(&pred[..lanes], &target[..lanes], &mut out[..lanes], scale) };
        for i in lanes..pred.len() {
            out[i] = scale * (pred[i] - target[i]);
        }
        return;
    }

    for i in 0..pred.len() {
        out[i] = scale * (pred[i] - target[i]);
    }
}

#[cfg(target_arch = "x86_64")]
mod avx2 {
    use std::arch::x86_64::*;

    /// Sum of squared differences over a lane-aligned prefix.
    ///
    /// Safety: the caller must have verified AVX2 + FMA support, and both
    /// slices must have the same length, a multiple of 8.
    #[target_feature(enable = "avx2,fma")]
    pub(super) unsafe fn sum_squared_diff(pred: &[f32], target: &[f32]) -> f32 {
        debug_assert_eq!(pred.len(), target.len());
        debug_assert_eq!(pred.len() % 8, 0);

        let mut acc = _mm256_setzero_ps();
        for chunk in 0..pred.len() / 8 {
            let a = _mm256_loadu_ps(pred.as_ptr().add(chunk * 8));
            let b = _mm256_loadu_ps(target.as_ptr().add(chunk * 8));
            let diff = _mm256_sub_ps(a, b);
            acc = _mm256_fmadd_ps(diff, diff, acc);
        }

        // Horizontal reduction: 256 -> 128 -> scalar.
        let low = _mm256_castps256_ps128(acc);
        let high = _mm256_extractf128_ps(acc, 1);
        let mut sum = _mm_add_ps(low, high);
        sum = _mm_hadd_ps(sum, sum);
        sum = _mm_hadd_ps(sum, sum);
        _mm_cvtss_f32(sum)
    }

    /// Writes `out_i = scale * (pred_i - target_i)` over a lane-aligned prefix.
    ///
    /// Safety: the caller must have verified AVX2 support, and all slices must
    /// have the same length, a multiple of 8.
    #[target_feature(enable = "avx2")]
    pub(super) unsafe fn write_gradient(pred: &[f32], target: &[f32], out: &mut [f32], scale: f32) {
        debug_assert_eq!(pred.len(), target.len());
        debug_assert_eq!(pred.len(), out.len());
        debug_assert_eq!(pred.len() % 8, 0);

        let vscale = _mm256_set1_ps(scale);
        for chunk in 0..pred.len() / 8 {
            let a = _mm256_loadu_ps(pred.as_ptr().add(chunk * 8));
            let b = _mm256_loadu_ps(target.as_ptr().add(chunk * 8));
            let grad = _mm256_mul_ps(_mm256_sub_ps(a, b), vscale);
            _mm256_storeu_ps(out.as_mut_ptr().add(chunk * 8), grad);
        }
    }
}
