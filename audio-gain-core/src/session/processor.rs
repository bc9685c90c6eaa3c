use std::sync::Arc;

use crate::models::config::GainConfiguration;
use crate::models::encoding::ResolvedEncoding;
use crate::models::format::{SampleFormatDescriptor, SubFormat};
use crate::models::stats::ProcessingStats;
use crate::processing::buffer_transformer;
use crate::processing::format_resolver;
use crate::traits::diagnostics::{DiagnosticSink, LogDiagnostics};

/// Per-stream buffer rewriter handed to the capture loop.
///
/// Holds the negotiated descriptor together with its resolved encoding, so
/// resolution happens once per negotiation instead of once per buffer.
/// Owned by the capture thread; only the diagnostics sink is shared.
///
/// ```text
/// [capture loop] --(buffer, frames, silent)--> process()
///                                                │ silent? → count, return
///                                                ├→ on_sub_format (extensible)
///                                                └→ transform(encoding, gain)
/// ```
pub struct BufferProcessor {
    descriptor: SampleFormatDescriptor,
    encoding: ResolvedEncoding,
    sub_format: Option<SubFormat>,
    gains: GainConfiguration,
    diagnostics: Arc<dyn DiagnosticSink>,
    stats: ProcessingStats,
}

impl BufferProcessor {
    /// Processor reporting diagnostics through `log`.
    pub fn new(descriptor: SampleFormatDescriptor, gains: GainConfiguration) -> Self {
        Self::with_diagnostics(descriptor, gains, Arc::new(LogDiagnostics))
    }

    pub fn with_diagnostics(
        descriptor: SampleFormatDescriptor,
        gains: GainConfiguration,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let encoding = format_resolver::resolve(&descriptor);
        log_negotiation(&descriptor, &encoding);
        Self {
            descriptor,
            encoding,
            sub_format: format_resolver::identify_sub_format(&descriptor),
            gains,
            diagnostics,
            stats: ProcessingStats::new(),
        }
    }

    /// Replace the descriptor after the stream renegotiated its format.
    pub fn renegotiate(&mut self, descriptor: SampleFormatDescriptor) {
        self.encoding = format_resolver::resolve(&descriptor);
        self.sub_format = format_resolver::identify_sub_format(&descriptor);
        self.descriptor = descriptor;
        self.stats.renegotiations += 1;
        log_negotiation(&self.descriptor, &self.encoding);
    }

    pub fn set_gains(&mut self, gains: GainConfiguration) {
        self.gains = gains;
    }

    /// Rewrite one captured buffer in place.
    ///
    /// Silent buffers are counted and left alone.
    pub fn process(&mut self, buffer: &mut [u8], frame_count: u32, silent: bool) {
        self.stats.packets += 1;
        if silent {
            self.stats.silent_packets += 1;
            return;
        }

        if let Some(sub_format) = &self.sub_format {
            self.diagnostics.on_sub_format(sub_format);
        }

        self.stats.frames_processed += frame_count as u64;
        let Some(gain) = self.gains.gain_for(&self.encoding) else {
            return;
        };
        let rewritten = buffer_transformer::transform(
            buffer,
            frame_count,
            &self.encoding,
            gain,
            self.diagnostics.as_ref(),
        );
        self.stats.samples_rewritten += rewritten as u64;
    }

    pub fn descriptor(&self) -> &SampleFormatDescriptor {
        &self.descriptor
    }

    pub fn encoding(&self) -> &ResolvedEncoding {
        &self.encoding
    }

    pub fn gains(&self) -> &GainConfiguration {
        &self.gains
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Consume the processor, keeping only its counters.
    pub fn into_stats(self) -> ProcessingStats {
        self.stats
    }
}

/// Resolve and rewrite a single buffer without any cached state.
///
/// Equivalent to a fresh `BufferProcessor` per call; returns the number of
/// samples rewritten.
pub fn process_buffer(
    buffer: &mut [u8],
    frame_count: u32,
    descriptor: &SampleFormatDescriptor,
    gains: &GainConfiguration,
    diagnostics: &dyn DiagnosticSink,
) -> usize {
    if let Some(sub_format) = format_resolver::identify_sub_format(descriptor) {
        diagnostics.on_sub_format(&sub_format);
    }
    let encoding = format_resolver::resolve(descriptor);
    match gains.gain_for(&encoding) {
        Some(gain) => buffer_transformer::transform(buffer, frame_count, &encoding, gain, diagnostics),
        None => 0,
    }
}

fn log_negotiation(descriptor: &SampleFormatDescriptor, encoding: &ResolvedEncoding) {
    log::info!("negotiated format: {}", descriptor);
    match encoding {
        ResolvedEncoding::Fallback(fallback) => log::warn!(
            "unrecognised sub-format, rewriting as {} ch 16-bit PCM ({} bytes/s)",
            fallback.channels,
            fallback.avg_bytes_per_sec
        ),
        ResolvedEncoding::Unsupported(sub_format) => {
            log::info!("{} payload is left untouched", sub_format)
        }
        other => log::info!("rewriting buffers as {}", other.label()),
    }
}
