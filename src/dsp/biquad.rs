//! Biquad Filter
//!
//! Two-pole low-pass/high-pass filter designed with the Audio EQ Cookbook
//! formulas (bilinear transform). Coefficient design is separate from
//! per-sample processing so a filter can be redesigned mid-stream.
//!
//! Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html

use super::processor::Processor;
use crate::error::{require_positive, DspError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::f64::consts::PI;

/// Default quality factor (close to Butterworth, 1/sqrt(2))
pub const DEFAULT_Q: f64 = 0.707;

/// Response shape of a biquad design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Remove above frequency
    #[default]
    LowPass,
    /// Remove below frequency
    HighPass,
}

/// Biquad filter coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
/// Normalized: all coefficients divided by a0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for BiquadCoeffs {
    /// Identity pass-through
    fn default() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

impl BiquadCoeffs {
    /// Calculate normalized coefficients for a low-pass or high-pass design
    ///
    /// No range checks: Q <= 0 or a frequency outside (0, sample_rate/2)
    /// yields degenerate or unstable coefficients.
    pub fn calculate(mode: FilterMode, frequency: f64, sample_rate: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * frequency / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * q);

        let (b0, b1, b2) = match mode {
            FilterMode::LowPass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            FilterMode::HighPass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        // Normalize by a0
        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Check if coefficients represent a bypass (unity gain, no filtering)
    pub fn is_bypass(&self) -> bool {
        (self.b0 - 1.0).abs() < 1e-10
            && self.b1.abs() < 1e-10
            && self.b2.abs() < 1e-10
            && self.a1.abs() < 1e-10
            && self.a2.abs() < 1e-10
    }
}

/// Validated biquad design request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiquadDesign {
    /// Low-pass or high-pass
    pub mode: FilterMode,
    /// Corner frequency in Hz, must lie in (0, sample_rate / 2)
    pub frequency: f64,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Quality factor, must be > 0
    pub q: f64,
}

impl Default for BiquadDesign {
    fn default() -> Self {
        Self {
            mode: FilterMode::LowPass,
            frequency: 1000.0,
            sample_rate: 44100.0,
            q: DEFAULT_Q,
        }
    }
}

impl BiquadDesign {
    pub fn lowpass(frequency: f64, sample_rate: f64) -> Self {
        Self {
            mode: FilterMode::LowPass,
            frequency,
            sample_rate,
            q: DEFAULT_Q,
        }
    }

    pub fn highpass(frequency: f64, sample_rate: f64) -> Self {
        Self {
            mode: FilterMode::HighPass,
            frequency,
            sample_rate,
            q: DEFAULT_Q,
        }
    }

    /// Replace the quality factor
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    /// Validate the design against the stable region of the cookbook formulas
    pub fn validate(&self) -> Result<()> {
        require_positive("sample_rate", self.sample_rate)?;
        require_positive("q", self.q)?;
        let nyquist = self.sample_rate / 2.0;
        if !(self.frequency > 0.0 && self.frequency < nyquist) {
            return Err(DspError::invalid_parameter(
                "frequency",
                self.frequency,
                format!("0 < frequency < {} Hz (Nyquist)", nyquist),
            ));
        }
        Ok(())
    }

    /// Serialize the design to JSON
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize a design from JSON, filling missing fields from defaults
    pub fn from_json(json: &Value) -> Result<Self> {
        Ok(serde_json::from_value(json.clone())?)
    }
}

/// Biquad filter state for one channel
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64, // x[n-1]
    x2: f64, // x[n-2]
    y1: f64, // y[n-1]
    y2: f64, // y[n-2]
}

impl BiquadState {
    /// Direct Form I difference equation
    #[inline]
    fn process(&mut self, input: f64, coeffs: &BiquadCoeffs) -> f64 {
        let output = coeffs.b0 * input + coeffs.b1 * self.x1 + coeffs.b2 * self.x2
            - coeffs.a1 * self.y1
            - coeffs.a2 * self.y2;

        // Shift delay line
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stateful two-pole filter for one channel
///
/// A fresh filter passes audio through unchanged until `lowpass`, `highpass`
/// or `design` is called. Redesigning keeps the four delay taps, so a
/// parameter change mid-stream produces a short transient rather than a
/// click from zeroed history.
///
/// # Example
/// ```
/// use nueva_dsp::dsp::BiquadFilter;
///
/// let mut filter = BiquadFilter::new();
/// filter.lowpass(1000.0, 44100.0, 0.707);
/// let y = filter.process(0.5);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BiquadFilter {
    coeffs: BiquadCoeffs,
    state: BiquadState,
}

/// Alternate spelling kept for callers using the older name
pub type BiQuadFilter = BiquadFilter;

impl BiquadFilter {
    /// Create a pass-through filter with cleared state
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure as a low-pass filter
    pub fn lowpass(&mut self, frequency: f64, sample_rate: f64, q: f64) {
        self.set_coefficients(BiquadCoeffs::calculate(
            FilterMode::LowPass,
            frequency,
            sample_rate,
            q,
        ));
    }

    /// Configure as a high-pass filter
    pub fn highpass(&mut self, frequency: f64, sample_rate: f64, q: f64) {
        self.set_coefficients(BiquadCoeffs::calculate(
            FilterMode::HighPass,
            frequency,
            sample_rate,
            q,
        ));
    }

    /// Configure from a design, rejecting unstable or meaningless parameters
    ///
    /// On error the previous coefficients are left in place.
    pub fn design(&mut self, design: &BiquadDesign) -> Result<()> {
        design.validate()?;
        tracing::debug!(
            mode = ?design.mode,
            frequency = design.frequency,
            sample_rate = design.sample_rate,
            q = design.q,
            "designing biquad"
        );
        self.set_coefficients(BiquadCoeffs::calculate(
            design.mode,
            design.frequency,
            design.sample_rate,
            design.q,
        ));
        Ok(())
    }

    /// Overwrite coefficients without touching the delay taps
    pub fn set_coefficients(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    /// Get the current normalized coefficients
    pub fn coefficients(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state.process(input as f64, &self.coeffs) as f32
    }

    /// Clear the delay taps, keeping the coefficients
    pub fn reset(&mut self) {
        self.state.reset();
    }
}

impl Processor for BiquadFilter {
    fn process_sample(&mut self, input: f32) -> f32 {
        self.process(input)
    }

    fn reset(&mut self) {
        BiquadFilter::reset(self);
    }

    fn effect_type(&self) -> &'static str {
        "biquad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    /// Helper to create a sine wave at the given frequency
    fn create_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate).sin() as f32)
            .collect()
    }

    /// RMS of the second half of a signal (skip the filter's settling time)
    fn settled_rms(samples: &[f32]) -> f32 {
        let tail = &samples[samples.len() / 2..];
        (tail.iter().map(|s| s * s).sum::<f32>() / tail.len() as f32).sqrt()
    }

    #[test]
    fn test_default_is_pass_through() {
        let mut filter = BiquadFilter::new();
        assert!(filter.coefficients().is_bypass());
        assert_eq!(filter.process(0.5), 0.5);
        assert_eq!(filter.process(-0.25), -0.25);
    }

    #[test]
    fn test_lowpass_coefficients() {
        let mut filter = BiquadFilter::new();
        filter.lowpass(1000.0, 44100.0, DEFAULT_Q);
        let c = *filter.coefficients();

        let w0 = 2.0 * PI * 1000.0 / 44100.0;
        let alpha = w0.sin() / (2.0 * DEFAULT_Q);
        let a0 = 1.0 + alpha;
        assert_relative_eq!(c.b0, (1.0 - w0.cos()) / 2.0 / a0, epsilon = 1e-12);
        assert_relative_eq!(c.b1, (1.0 - w0.cos()) / a0, epsilon = 1e-12);
        assert_relative_eq!(c.b2, c.b0, epsilon = 1e-12);
        assert_relative_eq!(c.a1, -2.0 * w0.cos() / a0, epsilon = 1e-12);
        assert_relative_eq!(c.a2, (1.0 - alpha) / a0, epsilon = 1e-12);

        // Unity gain at DC: (b0 + b1 + b2) / (1 + a1 + a2) == 1
        assert_relative_eq!(
            (c.b0 + c.b1 + c.b2) / (1.0 + c.a1 + c.a2),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_highpass_coefficients() {
        let c = BiquadCoeffs::calculate(FilterMode::HighPass, 500.0, 48000.0, DEFAULT_Q);
        let w0 = 2.0 * PI * 500.0 / 48000.0;
        let a0 = 1.0 + w0.sin() / (2.0 * DEFAULT_Q);
        assert_relative_eq!(c.b0, (1.0 + w0.cos()) / 2.0 / a0, epsilon = 1e-12);
        assert_relative_eq!(c.b1, -(1.0 + w0.cos()) / a0, epsilon = 1e-12);
        // Zero gain at DC
        assert_relative_eq!(c.b0 + c.b1 + c.b2, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_output_is_b0_times_input() {
        let mut filter = BiquadFilter::new();
        filter.lowpass(1000.0, 44100.0, DEFAULT_Q);
        let b0 = filter.coefficients().b0;
        assert_relative_eq!(filter.process(0.5), (0.5 * b0) as f32, epsilon = 1e-7);
    }

    #[test]
    fn test_lowpass_attenuates_high_frequencies() {
        let mut filter = BiquadFilter::new();
        filter.lowpass(500.0, 48000.0, DEFAULT_Q);

        let mut high = create_sine(8000.0, 48000.0, 4800);
        let rms_before = settled_rms(&high);
        filter.process_buffer(&mut high);
        let rms_after = settled_rms(&high);

        assert!(
            rms_after < rms_before * 0.1,
            "8 kHz should be heavily attenuated, got {} -> {}",
            rms_before,
            rms_after
        );
    }

    #[test]
    fn test_highpass_attenuates_low_frequencies() {
        let mut filter = BiquadFilter::new();
        filter.highpass(5000.0, 48000.0, DEFAULT_Q);

        let mut low = create_sine(100.0, 48000.0, 9600);
        let rms_before = settled_rms(&low);
        filter.process_buffer(&mut low);
        let rms_after = settled_rms(&low);

        assert!(rms_after < rms_before * 0.05);
    }

    #[test]
    fn test_determinism() {
        let input = create_sine(440.0, 44100.0, 512);

        let run = || {
            let mut filter = BiquadFilter::new();
            filter.highpass(200.0, 44100.0, 1.2);
            input.iter().map(|&x| filter.process(x)).collect::<Vec<f32>>()
        };

        let a = run();
        let b = run();
        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn test_redesign_keeps_state() {
        let mut a = BiquadFilter::new();
        a.lowpass(1000.0, 44100.0, DEFAULT_Q);
        a.process(1.0);
        a.process(0.5);

        let mut b = a.clone();
        b.highpass(1000.0, 44100.0, DEFAULT_Q);
        let mut fresh = BiquadFilter::new();
        fresh.highpass(1000.0, 44100.0, DEFAULT_Q);

        // History from the low-pass run still feeds the new design
        assert_ne!(b.process(0.0), fresh.process(0.0));
    }

    #[test]
    fn test_reset_clears_state_not_coefficients() {
        let mut filter = BiquadFilter::new();
        filter.lowpass(2000.0, 44100.0, DEFAULT_Q);
        let coeffs = *filter.coefficients();

        filter.process(1.0);
        filter.process(1.0);
        filter.reset();

        assert_eq!(*filter.coefficients(), coeffs);
        assert_eq!(filter.process(0.0), 0.0);
    }

    #[test]
    fn test_design_validation() {
        assert!(BiquadDesign::lowpass(1000.0, 44100.0).validate().is_ok());
        assert!(BiquadDesign::lowpass(0.0, 44100.0).validate().is_err());
        assert!(BiquadDesign::lowpass(22050.0, 44100.0).validate().is_err());
        assert!(BiquadDesign::highpass(1000.0, 0.0).validate().is_err());
        assert!(BiquadDesign::highpass(1000.0, 44100.0)
            .with_q(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_design_matches_permissive_methods() {
        let mut strict = BiquadFilter::new();
        strict
            .design(&BiquadDesign::highpass(300.0, 48000.0).with_q(2.0))
            .unwrap();

        let mut permissive = BiquadFilter::new();
        permissive.highpass(300.0, 48000.0, 2.0);

        assert_eq!(strict.coefficients(), permissive.coefficients());
    }

    #[test]
    fn test_failed_design_keeps_previous_coefficients() {
        let mut filter = BiquadFilter::new();
        filter.lowpass(1000.0, 44100.0, DEFAULT_Q);
        let before = *filter.coefficients();

        assert!(filter.design(&BiquadDesign::lowpass(-1.0, 44100.0)).is_err());
        assert_eq!(*filter.coefficients(), before);
    }

    #[test]
    fn test_design_from_partial_json() {
        let design = BiquadDesign::from_json(&json!({
            "mode": "high_pass",
            "frequency": 250.0
        }))
        .unwrap();

        assert_eq!(design.mode, FilterMode::HighPass);
        assert_eq!(design.frequency, 250.0);
        assert_eq!(design.sample_rate, 44100.0);
        assert_eq!(design.q, DEFAULT_Q);

        let json = design.to_json().unwrap();
        assert_eq!(json["mode"], "high_pass");
    }

    #[test]
    fn test_alias_name() {
        let mut filter = BiQuadFilter::new();
        filter.lowpass(1000.0, 44100.0, DEFAULT_Q);
        assert!(filter.process(0.5).is_finite());
        assert_eq!(filter.effect_type(), "biquad");
    }
}
