use std::sync::Arc;

use crate::models::audio_models::AudioSource;
use crate::models::config::CaptureConfiguration;
use crate::models::error::GainError;
use crate::models::stats::ProcessingStats;
use crate::traits::diagnostics::DiagnosticSink;

/// Interface for platform-specific capture sources that rewrite buffers in
/// place before handing them back to the platform.
///
/// Implemented by:
/// - `WasapiGainCapture` (Windows)
pub trait CaptureProvider: Send {
    /// Whether a capture endpoint is currently available.
    fn is_available(&self) -> bool;

    /// Start capturing. Every non-silent buffer goes through a
    /// `BufferProcessor` built from the negotiated format and `config.gain`.
    ///
    /// Runs on a dedicated audio thread; `diagnostics` is called from it.
    fn start(
        &mut self,
        config: CaptureConfiguration,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<(), GainError>;

    /// Stop capturing, release the stream and return the processing counters.
    fn stop(&mut self) -> Result<ProcessingStats, GainError>;

    /// Information about the endpoint backing this provider.
    fn device_info(&self) -> AudioSource;
}
