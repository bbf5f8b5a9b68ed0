//! Distortion
//!
//! Static (memoryless) waveshaping. Each sample is driven by `1 + amount`
//! and then pushed through one of three transfer curves.

use crate::error::{DspError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Distortion Type
// ============================================================================

/// Waveshaping transfer curves
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistortionType {
    /// `tanh(x)`
    #[default]
    Soft,
    /// `clamp(x, -1, 1)`
    Hard,
    /// Power-law curve `sign(x) * |x|^0.7`
    Tube,
}

impl DistortionType {
    /// Get display name for the distortion type
    pub fn display_name(&self) -> &'static str {
        match self {
            DistortionType::Soft => "Soft",
            DistortionType::Hard => "Hard",
            DistortionType::Tube => "Tube",
        }
    }

    /// Parse distortion type from its exact lowercase identifier
    ///
    /// Matching is case-sensitive: `"Soft"` is not `"soft"`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "soft" => Some(DistortionType::Soft),
            "hard" => Some(DistortionType::Hard),
            "tube" => Some(DistortionType::Tube),
            _ => None,
        }
    }

    /// Parse distortion type from string, failing on unknown names
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| DspError::UnknownDistortionType {
            name: s.to_string(),
        })
    }

    /// Like [`parse`](Self::parse), but ignores ASCII case
    pub fn parse_ignore_case(s: &str) -> Result<Self> {
        Self::parse(&s.to_ascii_lowercase()).map_err(|_| DspError::UnknownDistortionType {
            name: s.to_string(),
        })
    }

    /// Get string identifier
    pub fn to_str(&self) -> &'static str {
        match self {
            DistortionType::Soft => "soft",
            DistortionType::Hard => "hard",
            DistortionType::Tube => "tube",
        }
    }
}

// ============================================================================
// Waveshaping Functions
// ============================================================================

/// Exponent of the tube curve
const TUBE_EXPONENT: f32 = 0.7;

#[inline]
fn waveshape_soft(x: f32) -> f32 {
    x.tanh()
}

#[inline]
fn waveshape_hard(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}

/// Sign is reapplied identically on both branches, so the curve is odd
/// (symmetric) despite the name.
#[inline]
fn waveshape_tube(x: f32) -> f32 {
    if x < 0.0 {
        -(-x).powf(TUBE_EXPONENT)
    } else {
        x.powf(TUBE_EXPONENT)
    }
}

/// Shape a single sample
#[inline]
pub fn waveshape(sample: f32, amount: f32, kind: DistortionType) -> f32 {
    let x = sample * (1.0 + amount);
    match kind {
        DistortionType::Soft => waveshape_soft(x),
        DistortionType::Hard => waveshape_hard(x),
        DistortionType::Tube => waveshape_tube(x),
    }
}

/// Apply distortion to a buffer in place
pub fn distortion(buffer: &mut [f32], amount: f32, kind: DistortionType) {
    for sample in buffer.iter_mut() {
        *sample = waveshape(*sample, amount, kind);
    }
}

/// Apply distortion selected by name
///
/// Only the exact names `"soft"`, `"hard"` and `"tube"` are recognized.
/// Any other name, including a differently cased one, leaves every sample
/// untouched.
pub fn distortion_named(buffer: &mut [f32], amount: f32, kind: &str) {
    match DistortionType::from_str(kind) {
        Some(kind) => distortion(buffer, amount, kind),
        None => tracing::warn!(kind, "unknown distortion type, buffer left unchanged"),
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Distortion settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionParams {
    /// Drive added on top of unity gain before shaping
    pub amount: f32,
    /// Transfer curve
    #[serde(rename = "type")]
    pub kind: DistortionType,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            amount: 0.5,
            kind: DistortionType::Soft,
        }
    }
}

impl DistortionParams {
    /// Apply these settings to a buffer in place
    pub fn apply(&self, buffer: &mut [f32]) {
        distortion(buffer, self.amount, self.kind);
    }

    /// Serialize settings to JSON
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize settings from JSON, filling missing fields from defaults
    pub fn from_json(json: &Value) -> Result<Self> {
        Ok(serde_json::from_value(json.clone())?)
    }
}

// ============================================================================
// Tests
// ============================================================================
