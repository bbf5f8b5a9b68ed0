//! Nueva DSP - Audio Processing Primitives
//!
//! Small, independent building blocks for mono audio at a caller-supplied
//! sample rate:
//! - One-pole low-pass / high-pass filters over whole buffers
//! - Biquad (two-pole) low-pass / high-pass filter
//! - Feed-forward compressor with envelope follower
//! - Static waveshaping distortion (soft, hard, tube)
//! - Feedback delay, one-shot or persistent
//!
//! # Error policy
//!
//! The processing functions follow garbage-in/garbage-out: non-positive
//! rates or cutoffs propagate as NaN/Infinity rather than errors. Strict
//! entry points (`try_*`, `BiquadFilter::design`, `Compressor::try_new`,
//! the `validate` methods) reject bad parameters with
//! [`DspError::InvalidParameter`]. The delay is the one exception that
//! always checks, since an empty line cannot be indexed.

pub mod dsp;
pub mod error;

pub use error::{DspError, Result};
