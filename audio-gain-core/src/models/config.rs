use serde::{Deserialize, Serialize};

use super::encoding::ResolvedEncoding;

/// Per-path gain applied to captured buffers.
///
/// Defaults to 0.0 on every path, i.e. the capture is muted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainConfiguration {
    /// Gain for 16-bit integer PCM streams.
    pub int16_gain: f32,

    /// Gain for 32-bit float PCM streams.
    pub float32_gain: f32,

    /// Gain for unknown sub-formats reinterpreted as 16-bit PCM.
    pub fallback_gain: f32,
}

impl GainConfiguration {
    /// Same gain on every path.
    pub fn uniform(gain: f32) -> Self {
        Self {
            int16_gain: gain,
            float32_gain: gain,
            fallback_gain: gain,
        }
    }

    /// Gain to apply for `encoding`, or `None` when the buffer is left untouched.
    pub fn gain_for(&self, encoding: &ResolvedEncoding) -> Option<f32> {
        match encoding {
            ResolvedEncoding::Int16Pcm { .. } => Some(self.int16_gain),
            ResolvedEncoding::Float32Pcm { .. } => Some(self.float32_gain),
            ResolvedEncoding::Fallback(_) => Some(self.fallback_gain),
            ResolvedEncoding::Unsupported(_) | ResolvedEncoding::Passthrough => None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, gain) in [
            ("int16_gain", self.int16_gain),
            ("float32_gain", self.float32_gain),
            ("fallback_gain", self.fallback_gain),
        ] {
            if !gain.is_finite() {
                return Err(format!("{} must be finite, got {}", name, gain));
            }
        }
        Ok(())
    }
}

impl Default for GainConfiguration {
    fn default() -> Self {
        Self::uniform(0.0)
    }
}

/// Settings for a capture run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfiguration {
    pub gain: GainConfiguration,

    /// Requested shared-mode buffer duration in milliseconds (default: 1000).
    pub buffer_duration_ms: u32,

    /// How long to wait for a buffer-ready event before re-checking the
    /// running flag, in milliseconds (default: 2000).
    pub event_timeout_ms: u32,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        self.gain.validate()?;
        if self.buffer_duration_ms == 0 {
            return Err("buffer duration must be positive".into());
        }
        if self.event_timeout_ms == 0 {
            return Err("event timeout must be positive".into());
        }
        Ok(())
    }

    /// Buffer duration in 100-nanosecond units.
    pub fn buffer_duration_hns(&self) -> i64 {
        self.buffer_duration_ms as i64 * 10_000
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            gain: GainConfiguration::default(),
            buffer_duration_ms: 1000,
            event_timeout_ms: 2000,
        }
    }
}
