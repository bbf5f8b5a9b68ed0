//! Delay
//!
//! Feedback echo built on a fixed-length circular buffer. The read and write
//! positions coincide: each slot is read, then overwritten with the current
//! input plus the decayed echo, so the echo period is exactly the line length.

use super::processor::Processor;
use crate::error::{require_positive, DspError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Delay parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayParams {
    /// Delay time in seconds
    pub delay_time: f64,
    /// Portion of each echo fed back into the line
    pub feedback: f32,
    /// Dry/wet crossfade (0 = dry only, 1 = echo only)
    pub mix: f32,
    /// Sample rate in Hz
    pub sample_rate: f64,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            delay_time: 0.25,
            feedback: 0.3,
            mix: 0.5,
            sample_rate: 44100.0,
        }
    }
}

impl DelayParams {
    /// Line length in samples: `floor(delay_time * sample_rate)`
    pub fn delay_samples(&self) -> usize {
        let samples = (self.delay_time * self.sample_rate).floor();
        if samples.is_finite() && samples > 0.0 {
            samples as usize
        } else {
            0
        }
    }

    /// Validate parameters for a stable, non-empty echo
    pub fn validate(&self) -> Result<()> {
        require_positive("delay_time", self.delay_time)?;
        require_positive("sample_rate", self.sample_rate)?;
        if self.delay_samples() == 0 {
            return Err(self.empty_line_error());
        }
        if !(0.0..1.0).contains(&self.feedback) {
            return Err(DspError::invalid_parameter(
                "feedback",
                self.feedback as f64,
                "0 <= feedback < 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.mix) {
            return Err(DspError::invalid_parameter(
                "mix",
                self.mix as f64,
                "0 <= mix <= 1",
            ));
        }
        Ok(())
    }

    fn empty_line_error(&self) -> DspError {
        DspError::invalid_parameter(
            "delay_time",
            self.delay_time,
            format!(">= 1 / sample_rate ({} s)", 1.0 / self.sample_rate),
        )
    }

    /// Apply a one-shot delay to a buffer in place
    pub fn apply(&self, buffer: &mut [f32]) -> Result<()> {
        let mut line = DelayLine::new(*self)?;
        line.process_buffer(buffer);
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

/// Persistent feedback delay line for one channel
///
/// Unlike [`delay`], the circular buffer lives as long as the line, so echo
/// tails carry over between successive buffers.
#[derive(Debug, Clone)]
pub struct DelayLine {
    params: DelayParams,
    /// Circular buffer, zero-initialized
    buffer: Vec<f32>,
    /// Current read/write position in the circular buffer
    write_index: usize,
}

impl DelayLine {
    /// Allocate a zeroed line of `floor(delay_time * sample_rate)` samples
    ///
    /// Only the line length is checked; feedback and mix are taken as given.
    /// Fails with `InvalidParameter` when the length rounds down to zero.
    pub fn new(params: DelayParams) -> Result<Self> {
        let size = params.delay_samples();
        if size == 0 {
            tracing::debug!(
                delay_time = params.delay_time,
                sample_rate = params.sample_rate,
                "delay line would be empty"
            );
            return Err(params.empty_line_error());
        }
        Ok(Self {
            params,
            buffer: vec![0.0; size],
            write_index: 0,
        })
    }

    /// Get the parameters this line was built with
    pub fn params(&self) -> &DelayParams {
        &self.params
    }

    /// Line length in samples
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Construction rejects zero-length lines, so this is always false
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_index];
        self.buffer[self.write_index] = input + delayed * self.params.feedback;
        let output = input * (1.0 - self.params.mix) + delayed * self.params.mix;
        self.write_index = (self.write_index + 1) % self.buffer.len();
        output
    }

    /// Silence the line and rewind the write position
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_index = 0;
    }
}

impl Processor for DelayLine {
    fn process_sample(&mut self, input: f32) -> f32 {
        self.process(input)
    }

    fn reset(&mut self) {
        DelayLine::reset(self);
    }

    fn effect_type(&self) -> &'static str {
        "delay"
    }
}

/// Apply a feedback echo to a buffer in place
///
/// A fresh line is allocated for every call, so no echo carries over to the
/// next call. Use [`DelayLine`] to keep the tail.
pub fn delay(
    buffer: &mut [f32],
    delay_time: f64,
    feedback: f32,
    mix: f32,
    sample_rate: f64,
) -> Result<()> {
    DelayParams {
        delay_time,
        feedback,
        mix,
        sample_rate,
    }
    .apply(buffer)
}
