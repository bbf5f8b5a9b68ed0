//! One-Pole Filters
//!
//! First-order RC low-pass and high-pass filters, discretized as exponential
//! smoothing. Both work on a whole buffer per call and keep no state between
//! calls: the first output sample is always the first input sample.

use crate::error::{require_positive, Result};
use std::f64::consts::PI;

/// RC time constant and sample period for a cutoff/sample-rate pair
#[inline]
fn rc_and_dt(cutoff_hz: f32, sample_rate: f32) -> (f64, f64) {
    let rc = 1.0 / (cutoff_hz as f64 * 2.0 * PI);
    let dt = 1.0 / sample_rate as f64;
    (rc, dt)
}

/// Smoothing coefficient for the low-pass form: `dt / (rc + dt)`
pub fn low_pass_alpha(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let (rc, dt) = rc_and_dt(cutoff_hz, sample_rate);
    (dt / (rc + dt)) as f32
}

/// Smoothing coefficient for the high-pass form: `rc / (rc + dt)`
pub fn high_pass_alpha(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let (rc, dt) = rc_and_dt(cutoff_hz, sample_rate);
    (rc / (rc + dt)) as f32
}

/// Apply a one-pole low-pass filter, returning a new buffer
///
/// `y[i] = y[i-1] + alpha * (x[i] - y[i-1])`, seeded with `y[0] = x[0]`.
///
/// Non-positive `cutoff_hz` or `sample_rate` are not checked and produce
/// non-finite output. Use [`try_low_pass_filter`] to reject them.
pub fn low_pass_filter(samples: &[f32], cutoff_hz: f32, sample_rate: f32) -> Vec<f32> {
    let alpha = low_pass_alpha(cutoff_hz, sample_rate);

    let mut result = samples.to_vec();
    for i in 1..result.len() {
        result[i] = result[i - 1] + alpha * (samples[i] - result[i - 1]);
    }
    result
}

/// Apply a one-pole high-pass filter, returning a new buffer
///
/// `y[i] = alpha * (y[i-1] + x[i] - x[i-1])`, seeded with `y[0] = x[0]`.
pub fn high_pass_filter(samples: &[f32], cutoff_hz: f32, sample_rate: f32) -> Vec<f32> {
    let alpha = high_pass_alpha(cutoff_hz, sample_rate);

    let mut result = samples.to_vec();
    for i in 1..result.len() {
        result[i] = alpha * (result[i - 1] + samples[i] - samples[i - 1]);
    }
    result
}

/// [`low_pass_filter`] with cutoff and sample rate checked first
pub fn try_low_pass_filter(samples: &[f32], cutoff_hz: f32, sample_rate: f32) -> Result<Vec<f32>> {
    require_positive("cutoff_hz", cutoff_hz as f64)?;
    require_positive("sample_rate", sample_rate as f64)?;
    Ok(low_pass_filter(samples, cutoff_hz, sample_rate))
}

/// [`high_pass_filter`] with cutoff and sample rate checked first
pub fn try_high_pass_filter(
    samples: &[f32],
    cutoff_hz: f32,
    sample_rate: f32,
) -> Result<Vec<f32>> {
    require_positive("cutoff_hz", cutoff_hz as f64)?;
    require_positive("sample_rate", sample_rate as f64)?;
    Ok(high_pass_filter(samples, cutoff_hz, sample_rate))
}
