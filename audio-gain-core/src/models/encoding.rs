use serde::{Deserialize, Serialize};

use super::format::SubFormat;

/// Width of one 16-bit integer sample in bytes.
pub const INT16_SAMPLE_BYTES: usize = 2;

/// Width of one 32-bit float sample in bytes.
pub const FLOAT32_SAMPLE_BYTES: usize = 4;

/// Bounded 16-bit PCM layout used in place of an unrecognised sub-format.
///
/// Mirrors the `WAVEFORMATEX` a fallback stream would be described with
/// (`cbSize` is always 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FallbackFormat {
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    pub block_align: u16,
    pub avg_bytes_per_sec: u32,
}

/// The concrete layout a buffer is rewritten with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolvedEncoding {
    Int16Pcm { channels: u16 },
    Float32Pcm { channels: u16 },
    Fallback(FallbackFormat),
    /// Recognised compressed or protected payload, left untouched.
    Unsupported(SubFormat),
    /// Anything else, left untouched without a diagnostic.
    Passthrough,
}

impl ResolvedEncoding {
    /// Channel count used to compute the sample span, or 0 for no-op encodings.
    pub fn channels(&self) -> u16 {
        match self {
            Self::Int16Pcm { channels } | Self::Float32Pcm { channels } => *channels,
            Self::Fallback(fallback) => fallback.channels,
            Self::Unsupported(_) | Self::Passthrough => 0,
        }
    }

    /// Bytes per sample, or 0 for no-op encodings.
    pub fn sample_bytes(&self) -> usize {
        match self {
            Self::Int16Pcm { .. } | Self::Fallback(_) => INT16_SAMPLE_BYTES,
            Self::Float32Pcm { .. } => FLOAT32_SAMPLE_BYTES,
            Self::Unsupported(_) | Self::Passthrough => 0,
        }
    }

    /// Bytes per frame as seen by the transformer.
    pub fn block_align(&self) -> usize {
        self.channels() as usize * self.sample_bytes()
    }

    /// Whether buffers in this encoding are left untouched.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Unsupported(_) | Self::Passthrough)
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Int16Pcm { .. } => "int16 PCM",
            Self::Float32Pcm { .. } => "float32 PCM",
            Self::Fallback(_) => "int16 fallback",
            Self::Unsupported(_) => "unsupported",
            Self::Passthrough => "passthrough",
        }
    }
}
