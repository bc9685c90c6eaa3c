//! In-place gain over raw capture buffers.
//!
//! Bytes are reinterpreted as samples in exactly two places, `rewrite_i16`
//! and `rewrite_f32`, both working on native-endian `chunks_exact_mut` views
//! of the borrowed buffer. Nothing here allocates, resizes the buffer, or
//! keeps a reference to it after returning.
use crate::models::encoding::{ResolvedEncoding, FLOAT32_SAMPLE_BYTES, INT16_SAMPLE_BYTES};
use crate::traits::diagnostics::DiagnosticSink;

/// Apply `gain` to the first `frame_count` frames of `buffer` according to
/// `encoding`.
///
/// - `Int16Pcm` / `Fallback`: `sample * gain`, saturated to the i16 range and
///   truncated toward zero. `Fallback` uses the fallback channel count and
///   reports the computed sample total to `diagnostics`.
/// - `Float32Pcm`: `sample * gain`, clamped to `[-1.0, 1.0]`.
/// - `Unsupported` / `Passthrough`: untouched.
///
/// Returns the number of samples rewritten. A buffer shorter than the
/// computed span is only rewritten as far as whole samples fit.
pub fn transform(
    buffer: &mut [u8],
    frame_count: u32,
    encoding: &ResolvedEncoding,
    gain: f32,
    diagnostics: &dyn DiagnosticSink,
) -> usize {
    if frame_count == 0 || encoding.is_noop() {
        return 0;
    }

    let total_samples = frame_count as usize * encoding.channels() as usize;
    if let ResolvedEncoding::Fallback(_) = encoding {
        diagnostics.on_fallback_samples(total_samples);
    }

    let available = buffer.len() / encoding.sample_bytes();
    if available < total_samples {
        log::warn!(
            "buffer holds {} samples but {} frames of {} need {}; rewriting what fits",
            available,
            frame_count,
            encoding.label(),
            total_samples
        );
    }
    let count = total_samples.min(available);

    match encoding {
        ResolvedEncoding::Int16Pcm { .. } | ResolvedEncoding::Fallback(_) => {
            rewrite_i16(buffer, count, |sample| scale_i16(sample, gain))
        }
        ResolvedEncoding::Float32Pcm { .. } => rewrite_f32(buffer, count, |sample| scale_f32(sample, gain)),
        ResolvedEncoding::Unsupported(_) | ResolvedEncoding::Passthrough => 0,
    }
}

/// Scale one 16-bit sample, saturating instead of wrapping.
pub fn scale_i16(sample: i16, gain: f32) -> i16 {
    let scaled = sample as f32 * gain;
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Scale one float sample and clamp it to the normalized range.
///
/// NaN maps to silence so the output is always within `[-1.0, 1.0]`.
pub fn scale_f32(sample: f32, gain: f32) -> f32 {
    let scaled = sample * gain;
    if scaled.is_nan() {
        0.0
    } else {
        scaled.clamp(-1.0, 1.0)
    }
}

fn rewrite_i16(bytes: &mut [u8], count: usize, f: impl Fn(i16) -> i16) -> usize {
    for chunk in bytes[..count * INT16_SAMPLE_BYTES].chunks_exact_mut(INT16_SAMPLE_BYTES) {
        let sample = i16::from_ne_bytes([chunk[0], chunk[1]]);
        chunk.copy_from_slice(&f(sample).to_ne_bytes());
    }
    count
}

fn rewrite_f32(bytes: &mut [u8], count: usize, f: impl Fn(f32) -> f32) -> usize {
    for chunk in bytes[..count * FLOAT32_SAMPLE_BYTES].chunks_exact_mut(FLOAT32_SAMPLE_BYTES) {
        let sample = f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        chunk.copy_from_slice(&f(sample).to_ne_bytes());
    }
    count
}
