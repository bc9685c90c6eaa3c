use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::GainError;

/// `wFormatTag` for integer PCM.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;

/// `wFormatTag` for IEEE floating-point PCM.
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;

/// `wFormatTag` for the extensible wrapper carrying a sub-format GUID.
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// KSDATAFORMAT_SUBTYPE_PCM
pub const SUBTYPE_PCM: Uuid = Uuid::from_u128(0x00000001_0000_0010_8000_00aa00389b71);
/// KSDATAFORMAT_SUBTYPE_ADPCM
pub const SUBTYPE_ADPCM: Uuid = Uuid::from_u128(0x00000002_0000_0010_8000_00aa00389b71);
/// KSDATAFORMAT_SUBTYPE_IEEE_FLOAT
pub const SUBTYPE_IEEE_FLOAT: Uuid = Uuid::from_u128(0x00000003_0000_0010_8000_00aa00389b71);
/// KSDATAFORMAT_SUBTYPE_ALAW
pub const SUBTYPE_ALAW: Uuid = Uuid::from_u128(0x00000006_0000_0010_8000_00aa00389b71);
/// KSDATAFORMAT_SUBTYPE_MULAW
pub const SUBTYPE_MULAW: Uuid = Uuid::from_u128(0x00000007_0000_0010_8000_00aa00389b71);
/// KSDATAFORMAT_SUBTYPE_DRM
pub const SUBTYPE_DRM: Uuid = Uuid::from_u128(0x00000009_0000_0010_8000_00aa00389b71);

const KNOWN_SUB_FORMATS: [(Uuid, SubFormat); 6] = [
    (SUBTYPE_PCM, SubFormat::Pcm),
    (SUBTYPE_IEEE_FLOAT, SubFormat::IeeeFloat),
    (SUBTYPE_DRM, SubFormat::Drm),
    (SUBTYPE_ALAW, SubFormat::Alaw),
    (SUBTYPE_MULAW, SubFormat::Mulaw),
    (SUBTYPE_ADPCM, SubFormat::Adpcm),
];

/// Encoding family declared by `wFormatTag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingTag {
    PcmInteger,
    PcmFloat,
    Extensible,
    /// Any other tag, kept verbatim for logging.
    Other(u16),
}

impl EncodingTag {
    pub fn from_format_tag(tag: u16) -> Self {
        match tag {
            WAVE_FORMAT_PCM => Self::PcmInteger,
            WAVE_FORMAT_IEEE_FLOAT => Self::PcmFloat,
            WAVE_FORMAT_EXTENSIBLE => Self::Extensible,
            other => Self::Other(other),
        }
    }

    pub fn format_tag(self) -> u16 {
        match self {
            Self::PcmInteger => WAVE_FORMAT_PCM,
            Self::PcmFloat => WAVE_FORMAT_IEEE_FLOAT,
            Self::Extensible => WAVE_FORMAT_EXTENSIBLE,
            Self::Other(tag) => tag,
        }
    }
}

/// Sub-format carried by an extensible descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubFormat {
    Pcm,
    IeeeFloat,
    Drm,
    Alaw,
    Mulaw,
    Adpcm,
    Unknown(Uuid),
}

impl SubFormat {
    pub fn from_guid(guid: Uuid) -> Self {
        KNOWN_SUB_FORMATS
            .iter()
            .find(|(known, _)| *known == guid)
            .map(|(_, sub_format)| *sub_format)
            .unwrap_or(Self::Unknown(guid))
    }

    pub fn guid(&self) -> Uuid {
        match self {
            Self::Unknown(guid) => *guid,
            known => KNOWN_SUB_FORMATS
                .iter()
                .find(|(_, sub_format)| sub_format == known)
                .map(|(guid, _)| *guid)
                .unwrap_or_else(Uuid::nil),
        }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pcm => "PCM",
            Self::IeeeFloat => "Float",
            Self::Drm => "DRM",
            Self::Alaw => "ALAW",
            Self::Mulaw => "MULAW",
            Self::Adpcm => "ADPCM",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Compressed or protected payloads that are recognised but never rewritten.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Drm | Self::Alaw | Self::Mulaw | Self::Adpcm)
    }
}

impl fmt::Display for SubFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(guid) => write!(f, "Unknown ({})", guid),
            known => f.write_str(known.name()),
        }
    }
}

/// Negotiated stream format, produced once per negotiation and immutable
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleFormatDescriptor {
    pub encoding: EncodingTag,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    pub block_align: u16,
    /// Present only for `EncodingTag::Extensible`.
    pub sub_format: Option<Uuid>,
}

impl SampleFormatDescriptor {
    /// Plain 16-bit integer PCM.
    pub fn pcm_int16(channels: u16, sample_rate: u32) -> Self {
        Self::packed(EncodingTag::PcmInteger, channels, 16, sample_rate, None)
    }

    /// Plain 32-bit IEEE float PCM.
    pub fn float32(channels: u16, sample_rate: u32) -> Self {
        Self::packed(EncodingTag::PcmFloat, channels, 32, sample_rate, None)
    }

    /// Extensible wrapper around `sub_format`.
    pub fn extensible(sub_format: Uuid, channels: u16, bits_per_sample: u16, sample_rate: u32) -> Self {
        Self::packed(
            EncodingTag::Extensible,
            channels,
            bits_per_sample,
            sample_rate,
            Some(sub_format),
        )
    }

    fn packed(
        encoding: EncodingTag,
        channels: u16,
        bits_per_sample: u16,
        sample_rate: u32,
        sub_format: Option<Uuid>,
    ) -> Self {
        Self {
            encoding,
            channels,
            bits_per_sample,
            sample_rate,
            block_align: channels.saturating_mul(bits_per_sample / 8),
            sub_format,
        }
    }

    /// Check the structural invariants of a negotiated format.
    ///
    /// Only called at stream setup; the buffer path tolerates malformed
    /// descriptors by clamping.
    pub fn validate(&self) -> Result<(), GainError> {
        if self.channels == 0 {
            return Err(GainError::InvalidFormat("channel count is zero".into()));
        }
        if self.sample_rate == 0 {
            return Err(GainError::InvalidFormat("sample rate is zero".into()));
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(GainError::InvalidFormat(format!(
                "bits per sample must be a non-zero multiple of 8, got {}",
                self.bits_per_sample
            )));
        }
        let expected = self.channels as u32 * (self.bits_per_sample as u32 / 8);
        if self.block_align as u32 != expected {
            return Err(GainError::InvalidFormat(format!(
                "block align {} does not match {} channels x {} bits",
                self.block_align, self.channels, self.bits_per_sample
            )));
        }
        match (self.encoding, self.sub_format) {
            (EncodingTag::Extensible, None) => Err(GainError::InvalidFormat(
                "extensible format without a sub-format".into(),
            )),
            (EncodingTag::Extensible, Some(_)) | (_, None) => Ok(()),
            (_, Some(_)) => Err(GainError::InvalidFormat(
                "sub-format present on a non-extensible format".into(),
            )),
        }
    }
}

impl fmt::Display for SampleFormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tag 0x{:04X}, {} Hz, {} ch, {}-bit, block align {}",
            self.encoding.format_tag(),
            self.sample_rate,
            self.channels,
            self.bits_per_sample,
            self.block_align
        )?;
        if let Some(guid) = self.sub_format {
            write!(f, ", sub-format {}", SubFormat::from_guid(guid))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tags_map_both_ways() {
        assert_eq!(EncodingTag::from_format_tag(1), EncodingTag::PcmInteger);
        assert_eq!(EncodingTag::from_format_tag(3), EncodingTag::PcmFloat);
        assert_eq!(EncodingTag::from_format_tag(0xFFFE), EncodingTag::Extensible);
        assert_eq!(EncodingTag::from_format_tag(0x0055), EncodingTag::Other(0x0055));
        assert_eq!(EncodingTag::Other(0x0055).format_tag(), 0x0055);
        assert_eq!(EncodingTag::Extensible.format_tag(), WAVE_FORMAT_EXTENSIBLE);
    }

    #[test]
    fn known_sub_formats_are_recognised() {
        assert_eq!(SubFormat::from_guid(SUBTYPE_PCM), SubFormat::Pcm);
        assert_eq!(SubFormat::from_guid(SUBTYPE_IEEE_FLOAT), SubFormat::IeeeFloat);
        assert_eq!(SubFormat::from_guid(SUBTYPE_DRM), SubFormat::Drm);
        assert_eq!(SubFormat::from_guid(SUBTYPE_ALAW), SubFormat::Alaw);
        assert_eq!(SubFormat::from_guid(SUBTYPE_MULAW), SubFormat::Mulaw);
        assert_eq!(SubFormat::from_guid(SUBTYPE_ADPCM), SubFormat::Adpcm);
    }

    #[test]
    fn unknown_sub_format_keeps_its_guid() {
        let guid = Uuid::new_v4();
        let sub = SubFormat::from_guid(guid);
        assert_eq!(sub, SubFormat::Unknown(guid));
        assert_eq!(sub.guid(), guid);
        assert_eq!(sub.name(), "Unknown");
        assert!(!sub.is_unsupported());
    }

    #[test]
    fn diagnostic_names() {
        let names: Vec<&str> = [
            SubFormat::Pcm,
            SubFormat::IeeeFloat,
            SubFormat::Drm,
            SubFormat::Alaw,
            SubFormat::Mulaw,
            SubFormat::Adpcm,
        ]
        .iter()
        .map(SubFormat::name)
        .collect();
        assert_eq!(names, ["PCM", "Float", "DRM", "ALAW", "MULAW", "ADPCM"]);
        assert_eq!(SubFormat::Adpcm.to_string(), "ADPCM");
    }

    #[test]
    fn constructors_compute_block_align() {
        assert_eq!(SampleFormatDescriptor::pcm_int16(2, 48000).block_align, 4);
        assert_eq!(SampleFormatDescriptor::float32(6, 48000).block_align, 24);
        let ext = SampleFormatDescriptor::extensible(SUBTYPE_PCM, 2, 24, 44100);
        assert_eq!(ext.block_align, 6);
        assert_eq!(ext.sub_format, Some(SUBTYPE_PCM));
    }

    #[test]
    fn well_formed_descriptors_validate() {
        assert!(SampleFormatDescriptor::pcm_int16(1, 8000).validate().is_ok());
        assert!(SampleFormatDescriptor::float32(2, 48000).validate().is_ok());
        assert!(SampleFormatDescriptor::extensible(SUBTYPE_IEEE_FLOAT, 8, 32, 96000)
            .validate()
            .is_ok());
    }

    #[test]
    fn malformed_descriptors_fail_with_invalid_format() {
        let zero_channels = SampleFormatDescriptor::pcm_int16(0, 48000);
        assert!(matches!(zero_channels.validate(), Err(GainError::InvalidFormat(_))));

        let zero_rate = SampleFormatDescriptor::pcm_int16(2, 0);
        assert!(matches!(zero_rate.validate(), Err(GainError::InvalidFormat(_))));

        let mut odd_bits = SampleFormatDescriptor::pcm_int16(2, 48000);
        odd_bits.bits_per_sample = 12;
        assert!(matches!(odd_bits.validate(), Err(GainError::InvalidFormat(_))));

        let mut bad_align = SampleFormatDescriptor::float32(2, 48000);
        bad_align.block_align = 4;
        assert!(matches!(bad_align.validate(), Err(GainError::InvalidFormat(_))));

        let mut missing_sub = SampleFormatDescriptor::extensible(SUBTYPE_PCM, 2, 16, 48000);
        missing_sub.sub_format = None;
        assert!(matches!(missing_sub.validate(), Err(GainError::InvalidFormat(_))));

        let mut stray_sub = SampleFormatDescriptor::pcm_int16(2, 48000);
        stray_sub.sub_format = Some(SUBTYPE_PCM);
        assert!(matches!(stray_sub.validate(), Err(GainError::InvalidFormat(_))));
    }

    #[test]
    fn display_names_the_sub_format() {
        let ext = SampleFormatDescriptor::extensible(SUBTYPE_IEEE_FLOAT, 2, 32, 48000);
        let text = ext.to_string();
        assert!(text.contains("0xFFFE"));
        assert!(text.contains("48000 Hz"));
        assert!(text.contains("Float"));
    }
}
