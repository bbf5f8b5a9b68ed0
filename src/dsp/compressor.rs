//! Compressor
//!
//! Feed-forward, hard-knee dynamics compressor driven by a peak envelope
//! follower. Threshold is a linear amplitude, not dB.

use super::processor::Processor;
use crate::error::{require_positive, DspError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the envelope behaves while the input is below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseMode {
    /// Release target is the envelope itself, so the update is a no-op and
    /// the envelope holds its peak indefinitely
    #[default]
    Hold,
    /// Release target is silence: `envelope *= release_coeff`
    Decay,
}

/// Compressor parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorParams {
    /// Threshold as linear amplitude
    pub threshold: f32,
    /// Compression ratio (>= 1 for reduction; < 1 expands above threshold)
    pub ratio: f32,
    /// Attack time constant in seconds
    pub attack_time: f32,
    /// Release time constant in seconds
    pub release_time: f32,
    /// Sample rate in Hz
    pub sample_rate: f32,
    /// Envelope release behavior
    pub release_mode: ReleaseMode,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            ratio: 4.0,
            attack_time: 0.003,
            release_time: 0.1,
            sample_rate: 44100.0,
            release_mode: ReleaseMode::Hold,
        }
    }
}

impl CompressorParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return Err(DspError::invalid_parameter(
                "threshold",
                self.threshold as f64,
                "a finite linear amplitude >= 0",
            ));
        }
        if !(self.ratio.is_finite() && self.ratio >= 1.0) {
            return Err(DspError::invalid_parameter(
                "ratio",
                self.ratio as f64,
                "a finite ratio >= 1",
            ));
        }
        require_positive("attack_time", self.attack_time as f64)?;
        require_positive("release_time", self.release_time as f64)?;
        require_positive("sample_rate", self.sample_rate as f64)?;
        Ok(())
    }

    /// Serialize parameters to JSON
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize parameters from JSON, filling missing fields from defaults
    pub fn from_json(json: &Value) -> Result<Self> {
        Ok(serde_json::from_value(json.clone())?)
    }
}

/// One-pole envelope smoothing coefficient for a time constant
///
/// coeff = exp(-1 / time_in_samples); longer times give a value closer to 1.
#[inline]
fn time_constant_coeff(time_secs: f32, sample_rate: f32) -> f32 {
    (-1.0 / (time_secs * sample_rate)).exp()
}

/// Compressor dynamics processor for one channel
///
/// The envelope persists across every `process` call and is only cleared
/// by `reset`.
#[derive(Debug, Clone)]
pub struct Compressor {
    params: CompressorParams,
    /// Attack coefficient for envelope smoothing
    attack_coeff: f32,
    /// Release coefficient for envelope smoothing
    release_coeff: f32,
    /// Current envelope level (linear, >= 0)
    envelope: f32,
}

impl Compressor {
    /// Create a compressor without checking parameters
    pub fn new(params: CompressorParams) -> Self {
        let attack_coeff = time_constant_coeff(params.attack_time, params.sample_rate);
        let release_coeff = time_constant_coeff(params.release_time, params.sample_rate);
        tracing::debug!(
            threshold = params.threshold,
            ratio = params.ratio,
            attack_coeff,
            release_coeff,
            release_mode = ?params.release_mode,
            "compressor created"
        );
        Self {
            params,
            attack_coeff,
            release_coeff,
            envelope: 0.0,
        }
    }

    /// Create a compressor, rejecting invalid parameters
    pub fn try_new(params: CompressorParams) -> Result<Self> {
        params.validate()?;
        Ok(Self::new(params))
    }

    /// Get the parameters this compressor was built with
    pub fn params(&self) -> &CompressorParams {
        &self.params
    }

    pub fn attack_coeff(&self) -> f32 {
        self.attack_coeff
    }

    pub fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    /// Current envelope level for metering
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// Gain the computer applies at the current envelope
    pub fn current_gain(&self) -> f32 {
        self.gain_for(self.envelope)
    }

    /// Hard-knee gain computer
    #[inline]
    fn gain_for(&self, envelope: f32) -> f32 {
        let threshold = self.params.threshold;
        if envelope > threshold {
            let excess = envelope - threshold;
            let compressed_excess = excess / self.params.ratio;
            (threshold + compressed_excess) / envelope
        } else {
            1.0
        }
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level = input.abs();

        let (target, rate) = if level > self.envelope {
            (level, self.attack_coeff)
        } else {
            match self.params.release_mode {
                ReleaseMode::Hold => (self.envelope, self.release_coeff),
                ReleaseMode::Decay => (0.0, self.release_coeff),
            }
        };
        self.envelope = target + (self.envelope - target) * rate;

        input * self.gain_for(self.envelope)
    }

    /// Clear the envelope, keeping parameters
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(CompressorParams::default())
    }
}

impl Processor for Compressor {
    fn process_sample(&mut self, input: f32) -> f32 {
        self.process(input)
    }

    fn reset(&mut self) {
        Compressor::reset(self);
    }

    fn effect_type(&self) -> &'static str {
        "compressor"
    }
}
