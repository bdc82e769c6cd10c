//! The codec boundary.
//!
//! The driver talks to the codec only through [`Codec`]. The codec's own
//! algorithm and stream layout are opaque here; the driver distinguishes
//! exactly three results: success, [`DecodeOutcome::TooSmall`], and any
//! failure [`Status`].

mod stored;

pub use stored::StoredCodec;

use core::fmt;

use crate::budget::ConsumeBudget;
use crate::descriptor::ImageDescriptor;

/// Failure statuses reported by a codec.
///
/// The numeric values are what the codec reports and what the driver passes
/// through as its exit code. Their meaning is opaque to the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    Error = -1,
    OutOfMemory = -2,
    /// Destination too small. Expected during the decode probe, fatal elsewhere.
    BufferTooSmall = -3,
    InvalidParameter = -4,
    DataCorrupted = -5,
}

impl Status {
    /// Every status, in code order.
    pub const ALL: [Status; 5] = [
        Status::Error,
        Status::OutOfMemory,
        Status::BufferTooSmall,
        Status::InvalidParameter,
        Status::DataCorrupted,
    ];

    /// Numeric status code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Low 8 bits of the code, as seen by a shell.
    pub fn exit_code(self) -> u8 {
        self.code() as u8
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Error => write!(f, "codec error"),
            Status::OutOfMemory => write!(f, "codec out of memory"),
            Status::BufferTooSmall => write!(f, "destination buffer too small"),
            Status::InvalidParameter => write!(f, "invalid parameter"),
            Status::DataCorrupted => write!(f, "data corrupted"),
        }
    }
}

impl core::error::Error for Status {}

/// Successful encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// Bytes of the destination actually used, never more than its length.
    pub bytes_written: usize,
}

/// What the codec learned from a stream header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeReport {
    pub descriptor: ImageDescriptor,
    /// Exact destination size needed for the decoded pixels.
    pub required: usize,
}

/// Non-failure result of [`Codec::decode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Destination filled with `report.required` bytes of pixels.
    Filled(DecodeReport),
    /// Destination absent or undersized; nothing was written.
    TooSmall(DecodeReport),
}

/// Call contract of a scalable image codec.
pub trait Codec {
    /// Size of a valid stream header. A stream needs at least one payload
    /// byte beyond this to be viable.
    const HEADER_SIZE: usize;

    /// Compress `pixels` (interleaved, `descriptor.planes` samples per pixel)
    /// into `dest`. The length of `dest` is the hard cap on the stream size.
    fn encode(
        &self,
        pixels: &[u8],
        dest: &mut [u8],
        descriptor: &ImageDescriptor,
    ) -> Result<Encoded, Status>;

    /// Decompress at most `budget` bytes of `stream`.
    ///
    /// With `dest` absent or shorter than the decoded size, inspects only the
    /// header and returns [`DecodeOutcome::TooSmall`].
    fn decode(
        &self,
        stream: &[u8],
        dest: Option<&mut [u8]>,
        budget: ConsumeBudget,
    ) -> Result<DecodeOutcome, Status>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Status::Error.code(), -1);
        assert_eq!(Status::DataCorrupted.code(), -5);
        assert_eq!(Status::Error.exit_code(), 255);
        assert_eq!(Status::InvalidParameter.exit_code(), 252);
    }
}
