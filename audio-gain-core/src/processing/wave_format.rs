//! Binary `WAVEFORMATEX` / `WAVEFORMATEXTENSIBLE` parsing.
//!
//! Reads the negotiated format straight from the bytes the platform hands
//! back, so the extensible fields are taken from the format blob itself.
//!
//! Layout (little-endian):
//! ```text
//! [0-1]    wFormatTag
//! [2-3]    nChannels
//! [4-7]    nSamplesPerSec
//! [8-11]   nAvgBytesPerSec
//! [12-13]  nBlockAlign
//! [14-15]  wBitsPerSample
//! [16-17]  cbSize               (WAVEFORMATEX ends here, 18 bytes)
//! [18-19]  wValidBitsPerSample
//! [20-23]  dwChannelMask
//! [24-39]  SubFormat GUID       (WAVEFORMATEXTENSIBLE ends here, 40 bytes)
//! ```
use uuid::Uuid;

use crate::models::error::GainError;
use crate::models::format::{EncodingTag, SampleFormatDescriptor};

/// Size of `WAVEFORMATEX` in bytes.
pub const WAVEFORMATEX_SIZE: usize = 18;

/// Size of `WAVEFORMATEXTENSIBLE` in bytes.
pub const WAVEFORMATEXTENSIBLE_SIZE: usize = 40;

/// Minimum `cbSize` of an extensible format.
pub const EXTENSIBLE_EXTRA_SIZE: u16 = 22;

const SUB_FORMAT_OFFSET: usize = 24;

/// Total length a format blob declares for itself (`18 + cbSize`).
///
/// Returns `None` when fewer than 18 bytes are available.
pub fn declared_len(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < WAVEFORMATEX_SIZE {
        return None;
    }
    Some(WAVEFORMATEX_SIZE + read_u16(bytes, 16) as usize)
}

/// Parse a negotiated format blob into a descriptor.
///
/// Structural checks only: the result is not validated against the
/// descriptor invariants, see `SampleFormatDescriptor::validate`.
pub fn parse_wave_format(bytes: &[u8]) -> Result<SampleFormatDescriptor, GainError> {
    if bytes.len() < WAVEFORMATEX_SIZE {
        return Err(GainError::InvalidFormat(format!(
            "format blob is {} bytes, need at least {}",
            bytes.len(),
            WAVEFORMATEX_SIZE
        )));
    }

    let encoding = EncodingTag::from_format_tag(read_u16(bytes, 0));
    let cb_size = read_u16(bytes, 16);

    let sub_format = if encoding == EncodingTag::Extensible {
        if cb_size < EXTENSIBLE_EXTRA_SIZE {
            return Err(GainError::InvalidFormat(format!(
                "extensible format declares cbSize {}, need at least {}",
                cb_size, EXTENSIBLE_EXTRA_SIZE
            )));
        }
        if bytes.len() < WAVEFORMATEXTENSIBLE_SIZE {
            return Err(GainError::InvalidFormat(format!(
                "extensible format blob is {} bytes, need {}",
                bytes.len(),
                WAVEFORMATEXTENSIBLE_SIZE
            )));
        }
        let mut guid = [0u8; 16];
        guid.copy_from_slice(&bytes[SUB_FORMAT_OFFSET..SUB_FORMAT_OFFSET + 16]);
        // GUID fields Data1..Data3 are stored little-endian.
        Some(Uuid::from_bytes_le(guid))
    } else {
        None
    };

    Ok(SampleFormatDescriptor {
        encoding,
        channels: read_u16(bytes, 2),
        sample_rate: read_u32(bytes, 4),
        block_align: read_u16(bytes, 12),
        bits_per_sample: read_u16(bytes, 14),
        sub_format,
    })
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
