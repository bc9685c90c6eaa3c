//! # audio-gain-windows
//!
//! Windows WASAPI backend for audio-gain.
//!
//! Provides:
//! - `WasapiGainCapture`: event-driven capture on the default communications
//!   microphone, rewriting every non-silent buffer in place before release
//!
//! ## Platform Requirements
//! - Windows Vista+ (shared-mode event-driven capture)
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use audio_gain_core::{CaptureConfiguration, CaptureProvider, LogDiagnostics};
//! use audio_gain_windows::WasapiGainCapture;
//!
//! let mut capture = WasapiGainCapture::default_device();
//! capture.start(CaptureConfiguration::default(), Arc::new(LogDiagnostics))?;
//! // ...
//! let stats = capture.stop()?;
//! ```

#[cfg(target_os = "windows")]
pub mod wasapi_capture;

#[cfg(target_os = "windows")]
pub use wasapi_capture::WasapiGainCapture;
