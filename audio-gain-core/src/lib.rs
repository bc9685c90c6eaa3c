//! # audio-gain-core
//!
//! Platform-agnostic core for rewriting captured audio buffers in place.
//!
//! Works out which binary sample layout a negotiated wave format describes
//! (16-bit PCM, 32-bit float, or an extensible wrapper around a sub-format
//! GUID) and applies a configurable gain to every sample before the buffer
//! goes back to the capture pipeline. Unknown sub-formats fall back to a
//! bounded 16-bit layout; recognised compressed or protected payloads are
//! left untouched. Platform backends (Windows WASAPI) implement
//! `CaptureProvider` and drive a `BufferProcessor` from their capture loop.
//!
//! ## Architecture
//!
//! ```text
//! audio-gain-core (this crate)
//! ├── traits/       ← CaptureProvider, DiagnosticSink
//! ├── models/       ← SampleFormatDescriptor, ResolvedEncoding, GainConfiguration, GainError, ...
//! ├── processing/   ← wave format parsing, format resolver, buffer transformer
//! ├── session/      ← BufferProcessor (per-stream cache + counters)
//! └── storage/      ← JSON settings
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::AudioSource;
pub use models::config::{CaptureConfiguration, GainConfiguration};
pub use models::encoding::{FallbackFormat, ResolvedEncoding};
pub use models::error::GainError;
pub use models::format::{EncodingTag, SampleFormatDescriptor, SubFormat};
pub use models::stats::ProcessingStats;
pub use processing::buffer_transformer::transform;
pub use processing::format_resolver::{derive_fallback, identify_sub_format, resolve};
pub use processing::wave_format::parse_wave_format;
pub use session::processor::{process_buffer, BufferProcessor};
pub use traits::capture_provider::CaptureProvider;
pub use traits::diagnostics::{DiagnosticSink, LogDiagnostics};
