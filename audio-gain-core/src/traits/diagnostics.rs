use crate::models::format::SubFormat;

/// Side-channel observations made while rewriting buffers.
///
/// Called from the capture thread once per buffer; implementations must not
/// block.
pub trait DiagnosticSink: Send + Sync {
    /// An extensible stream carried this sub-format.
    fn on_sub_format(&self, sub_format: &SubFormat);

    /// A buffer was reinterpreted through the 16-bit fallback layout.
    fn on_fallback_samples(&self, total_samples: usize);
}

/// Forwards diagnostics to the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn on_sub_format(&self, sub_format: &SubFormat) {
        log::debug!("sub-format: {}", sub_format);
    }

    fn on_fallback_samples(&self, total_samples: usize) {
        log::debug!("fallback total samples: {}", total_samples);
    }
}
