//! DSP Primitives
//!
//! Single-sample and per-buffer processing building blocks. The components
//! are independent; callers chain them by feeding one output into the next.
//! Stateful components hold the state of exactly one channel.

mod biquad;
mod compressor;
mod delay;
mod distortion;
mod one_pole;
mod processor;

pub use biquad::{BiQuadFilter, BiquadCoeffs, BiquadDesign, BiquadFilter, FilterMode, DEFAULT_Q};
pub use compressor::{Compressor, CompressorParams, ReleaseMode};
pub use delay::{delay, DelayLine, DelayParams};
pub use distortion::{distortion, distortion_named, waveshape, DistortionParams, DistortionType};
pub use one_pole::{
    high_pass_alpha, high_pass_filter, low_pass_alpha, low_pass_filter, try_high_pass_filter,
    try_low_pass_filter,
};
pub use processor::Processor;
