//! Pass-through codec honoring the [`Codec`] contract.
//!
//! Stores samples uncompressed after a 7-byte header. A budget smaller than
//! the raw size truncates the payload; decoding a truncated payload
//! zero-fills the samples that were cut off.
//!
//! ```text
//! 0     magic 0xA5
//! 1..3  width - 1  (u16 BE)
//! 3..5  height - 1 (u16 BE)
//! 5     flags: bit 0 planes (0 = 1, 1 = 3), bits 1-2 color mode,
//!              bits 3-4 scan order, bit 5 subsampling
//! 6     dwt levels
//! 7..   interleaved samples
//! ```

use super::{Codec, DecodeOutcome, DecodeReport, Encoded, Status};
use crate::budget::ConsumeBudget;
use crate::descriptor::{ColorMode, ImageDescriptor, MAX_DWT_LEVELS, ScanOrder};

const MAGIC: u8 = 0xA5;
const MAX_DIMENSION: u32 = 1 << 16;

/// Uncompressed stand-in for the wavelet codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoredCodec;

impl StoredCodec {
    pub fn new() -> Self {
        Self
    }

    fn write_header(descriptor: &ImageDescriptor, out: &mut [u8]) -> Result<(), Status> {
        let ImageDescriptor {
            width,
            height,
            planes,
            ..
        } = *descriptor;

        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Status::InvalidParameter);
        }
        if planes != 1 && planes != 3 {
            return Err(Status::InvalidParameter);
        }
        if descriptor.dwt_levels == 0 || descriptor.dwt_levels > MAX_DWT_LEVELS {
            return Err(Status::InvalidParameter);
        }

        let mut flags = u8::from(planes == 3);
        flags |= (descriptor.color_mode as u8) << 1;
        flags |= (descriptor.scan_order as u8) << 3;
        flags |= u8::from(descriptor.subsampling) << 5;

        out[0] = MAGIC;
        out[1..3].copy_from_slice(&((width - 1) as u16).to_be_bytes());
        out[3..5].copy_from_slice(&((height - 1) as u16).to_be_bytes());
        out[5] = flags;
        out[6] = descriptor.dwt_levels;
        Ok(())
    }

    fn read_header(stream: &[u8]) -> Result<ImageDescriptor, Status> {
        if stream.len() < Self::HEADER_SIZE || stream[0] != MAGIC {
            return Err(Status::DataCorrupted);
        }

        let width = u32::from(u16::from_be_bytes([stream[1], stream[2]])) + 1;
        let height = u32::from(u16::from_be_bytes([stream[3], stream[4]])) + 1;
        let flags = stream[5];
        if flags & 0xC0 != 0 {
            return Err(Status::DataCorrupted);
        }

        let planes = if flags & 1 == 1 { 3 } else { 1 };
        let color_mode = ColorMode::from_index((flags >> 1) & 0x3).ok_or(Status::DataCorrupted)?;
        let scan_order = ScanOrder::from_index((flags >> 3) & 0x3).ok_or(Status::DataCorrupted)?;
        let dwt_levels = stream[6];
        if dwt_levels == 0 || dwt_levels > MAX_DWT_LEVELS {
            return Err(Status::DataCorrupted);
        }

        Ok(ImageDescriptor {
            width,
            height,
            planes,
            color_mode,
            dwt_levels,
            scan_order,
            subsampling: flags & 0x20 != 0,
        })
    }
}

impl Codec for StoredCodec {
    const HEADER_SIZE: usize = 7;

    fn encode(
        &self,
        pixels: &[u8],
        dest: &mut [u8],
        descriptor: &ImageDescriptor,
    ) -> Result<Encoded, Status> {
        let raw = descriptor.pixel_len().ok_or(Status::InvalidParameter)?;
        if pixels.len() < raw {
            return Err(Status::InvalidParameter);
        }
        if dest.len() <= Self::HEADER_SIZE {
            return Err(Status::BufferTooSmall);
        }

        Self::write_header(descriptor, dest)?;

        let payload = raw.min(dest.len() - Self::HEADER_SIZE);
        dest[Self::HEADER_SIZE..Self::HEADER_SIZE + payload].copy_from_slice(&pixels[..payload]);

        Ok(Encoded {
            bytes_written: Self::HEADER_SIZE + payload,
        })
    }

    fn decode(
        &self,
        stream: &[u8],
        dest: Option<&mut [u8]>,
        budget: ConsumeBudget,
    ) -> Result<DecodeOutcome, Status> {
        let stream = &stream[..budget.bytes().min(stream.len())];
        let descriptor = Self::read_header(stream)?;
        let required = descriptor.pixel_len().ok_or(Status::OutOfMemory)?;
        let report = DecodeReport {
            descriptor,
            required,
        };

        let dest = match dest {
            Some(dest) if dest.len() >= required => dest,
            _ => return Ok(DecodeOutcome::TooSmall(report)),
        };

        let payload = &stream[Self::HEADER_SIZE..];
        let available = payload.len().min(required);
        dest[..available].copy_from_slice(&payload[..available]);
        dest[available..required].fill(0);

        Ok(DecodeOutcome::Filled(report))
    }
}
