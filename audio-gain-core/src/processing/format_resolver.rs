//! Maps a negotiated format descriptor to the layout buffers are rewritten with.
//!
//! Resolution is pure: the same descriptor always yields the same encoding,
//! so callers may resolve per buffer or cache the result per negotiation.

use crate::models::encoding::{FallbackFormat, ResolvedEncoding, INT16_SAMPLE_BYTES};
use crate::models::format::{EncodingTag, SampleFormatDescriptor, SubFormat};

/// Upper bound on fallback channels.
pub const FALLBACK_MAX_CHANNELS: u16 = 2;

/// Bit depth of the fallback layout.
pub const FALLBACK_BITS_PER_SAMPLE: u16 = 16;

/// Resolve the encoding for `descriptor`.
///
/// - 16-bit integer PCM and 32-bit float PCM map to their typed variants,
///   whether declared directly or through an extensible PCM / IEEE_FLOAT
///   sub-format.
/// - DRM, A-law, mu-law and ADPCM sub-formats are `Unsupported`.
/// - Unrecognised sub-formats fall back to bounded 16-bit PCM.
/// - Every other format is `Passthrough`.
pub fn resolve(descriptor: &SampleFormatDescriptor) -> ResolvedEncoding {
    match descriptor.encoding {
        EncodingTag::PcmInteger => resolve_pcm(descriptor),
        EncodingTag::PcmFloat => resolve_float(descriptor),
        EncodingTag::Extensible => match identify_sub_format(descriptor) {
            Some(SubFormat::Pcm) => resolve_pcm(descriptor),
            Some(SubFormat::IeeeFloat) => resolve_float(descriptor),
            Some(sub) if sub.is_unsupported() => ResolvedEncoding::Unsupported(sub),
            _ => ResolvedEncoding::Fallback(derive_fallback(descriptor)),
        },
        EncodingTag::Other(_) => ResolvedEncoding::Passthrough,
    }
}

/// Classify the sub-format of an extensible descriptor.
///
/// Returns `None` for non-extensible descriptors. An extensible descriptor
/// that carries no identifier is treated as unknown (nil GUID).
pub fn identify_sub_format(descriptor: &SampleFormatDescriptor) -> Option<SubFormat> {
    if descriptor.encoding != EncodingTag::Extensible {
        return None;
    }
    Some(
        descriptor
            .sub_format
            .map(SubFormat::from_guid)
            .unwrap_or(SubFormat::Unknown(uuid::Uuid::nil())),
    )
}

/// Bounded 16-bit layout used when the real sub-format is not recognised.
///
/// Lossy by construction: the payload is treated as 16-bit PCM whatever it
/// really is. A zero channel count is clamped to one.
pub fn derive_fallback(descriptor: &SampleFormatDescriptor) -> FallbackFormat {
    let channels = descriptor.channels.clamp(1, FALLBACK_MAX_CHANNELS);
    let block_align = channels * INT16_SAMPLE_BYTES as u16;
    FallbackFormat {
        channels,
        bits_per_sample: FALLBACK_BITS_PER_SAMPLE,
        sample_rate: descriptor.sample_rate,
        block_align,
        avg_bytes_per_sec: descriptor.sample_rate.saturating_mul(block_align as u32),
    }
}

fn resolve_pcm(descriptor: &SampleFormatDescriptor) -> ResolvedEncoding {
    if descriptor.bits_per_sample == 16 {
        ResolvedEncoding::Int16Pcm {
            channels: descriptor.channels.max(1),
        }
    } else {
        ResolvedEncoding::Passthrough
    }
}

fn resolve_float(descriptor: &SampleFormatDescriptor) -> ResolvedEncoding {
    if descriptor.bits_per_sample == 32 {
        ResolvedEncoding::Float32Pcm {
            channels: descriptor.channels.max(1),
        }
    } else {
        ResolvedEncoding::Passthrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::*;
    use uuid::Uuid;

    #[test]
    fn int16_pcm() {
        let desc = SampleFormatDescriptor::pcm_int16(2, 48000);
        assert_eq!(resolve(&desc), ResolvedEncoding::Int16Pcm { channels: 2 });
        assert_eq!(identify_sub_format(&desc), None);
    }

    #[test]
    fn other_pcm_widths_pass_through() {
        let mut desc = SampleFormatDescriptor::pcm_int16(2, 48000);
        desc.bits_per_sample = 24;
        desc.block_align = 6;
        assert_eq!(resolve(&desc), ResolvedEncoding::Passthrough);
    }

    #[test]
    fn float32_pcm() {
        let desc = SampleFormatDescriptor::float32(1, 44100);
        assert_eq!(resolve(&desc), ResolvedEncoding::Float32Pcm { channels: 1 });
    }

    #[test]
    fn float64_passes_through() {
        let mut desc = SampleFormatDescriptor::float32(2, 44100);
        desc.bits_per_sample = 64;
        desc.block_align = 16;
        assert_eq!(resolve(&desc), ResolvedEncoding::Passthrough);
    }

    #[test]
    fn extensible_pcm_and_float_resolve_like_plain_tags() {
        let pcm = SampleFormatDescriptor::extensible(SUBTYPE_PCM, 2, 16, 48000);
        assert_eq!(resolve(&pcm), ResolvedEncoding::Int16Pcm { channels: 2 });
        assert_eq!(identify_sub_format(&pcm), Some(SubFormat::Pcm));

        let float = SampleFormatDescriptor::extensible(SUBTYPE_IEEE_FLOAT, 6, 32, 48000);
        assert_eq!(resolve(&float), ResolvedEncoding::Float32Pcm { channels: 6 });
        assert_eq!(identify_sub_format(&float), Some(SubFormat::IeeeFloat));
    }

    #[test]
    fn recognised_compressed_sub_formats_are_unsupported() {
        for (guid, sub) in [
            (SUBTYPE_DRM, SubFormat::Drm),
            (SUBTYPE_ALAW, SubFormat::Alaw),
            (SUBTYPE_MULAW, SubFormat::Mulaw),
            (SUBTYPE_ADPCM, SubFormat::Adpcm),
        ] {
            let desc = SampleFormatDescriptor::extensible(guid, 2, 8, 8000);
            assert_eq!(resolve(&desc), ResolvedEncoding::Unsupported(sub));
        }
    }

    #[test]
    fn unknown_sub_format_falls_back() {
        let desc = SampleFormatDescriptor::extensible(Uuid::new_v4(), 6, 24, 48000);
        let ResolvedEncoding::Fallback(fallback) = resolve(&desc) else {
            panic!("expected fallback");
        };
        assert_eq!(fallback.channels, 2);
        assert_eq!(fallback.bits_per_sample, 16);
        assert_eq!(fallback.sample_rate, 48000);
        assert_eq!(fallback.block_align, 4);
        assert_eq!(fallback.avg_bytes_per_sec, 192000);
    }

    #[test]
    fn missing_sub_format_is_unknown() {
        let mut desc = SampleFormatDescriptor::extensible(SUBTYPE_PCM, 1, 16, 16000);
        desc.sub_format = None;
        assert_eq!(identify_sub_format(&desc), Some(SubFormat::Unknown(Uuid::nil())));
        assert!(matches!(resolve(&desc), ResolvedEncoding::Fallback(_)));
    }

    #[test]
    fn other_tags_pass_through() {
        let mut desc = SampleFormatDescriptor::pcm_int16(2, 44100);
        desc.encoding = EncodingTag::Other(0x0055);
        assert_eq!(resolve(&desc), ResolvedEncoding::Passthrough);
    }

    #[test]
    fn fallback_channels_are_min_of_n_and_two() {
        for n in 1..=16u16 {
            let desc = SampleFormatDescriptor::extensible(Uuid::new_v4(), n, 16, 48000);
            let fallback = derive_fallback(&desc);
            assert_eq!(fallback.channels, n.min(2));
            assert_eq!(fallback.block_align, fallback.channels * 2);
        }
    }

    #[test]
    fn zero_channels_never_resolve_to_zero() {
        let desc = SampleFormatDescriptor::extensible(Uuid::new_v4(), 0, 16, 48000);
        assert_eq!(derive_fallback(&desc).channels, 1);

        let pcm = SampleFormatDescriptor::pcm_int16(0, 48000);
        assert_eq!(resolve(&pcm).channels(), 1);
    }

    #[test]
    fn resolve_is_idempotent() {
        let descriptors = [
            SampleFormatDescriptor::pcm_int16(2, 48000),
            SampleFormatDescriptor::float32(1, 44100),
            SampleFormatDescriptor::extensible(SUBTYPE_ADPCM, 2, 4, 22050),
            SampleFormatDescriptor::extensible(Uuid::new_v4(), 8, 32, 96000),
        ];
        for desc in &descriptors {
            assert_eq!(resolve(desc), resolve(desc));
        }
    }
}
