//! Driver error types and their process exit codes.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::Status;

/// Which buffer an allocation was for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferSite {
    /// Destination for the encoder's output stream.
    EncodedStream,
    /// Compressed input read from disk before decoding.
    InputStream,
    /// Destination for decoded pixels.
    DecodedPixels,
}

impl core::fmt::Display for BufferSite {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            BufferSite::EncodedStream => "encoded stream",
            BufferSite::InputStream => "input stream",
            BufferSite::DecodedPixels => "decoded pixels",
        })
    }
}

/// Direction of the run that produced an output-stage error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

/// Codec call that returned a failure status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecCall {
    Encode,
    Probe,
    Fill,
}

impl core::fmt::Display for CodecCall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            CodecCall::Encode => "compressing image",
            CodecCall::Probe => "parsing stream header",
            CodecCall::Fill => "decompressing image",
        })
    }
}

/// Failure while reading a source image for encoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("PNG decoding failed")]
    Png(#[from] png::DecodingError),
    #[error("malformed PNM: {0}")]
    Pnm(String),
    #[error("pixel data truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("unrecognized source format (expected PNG, PGM or PPM)")]
    Unrecognized,
}

/// Every terminal condition of an encode, decode or inspect run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    /// Source header failed validation; nothing was allocated.
    #[error("invalid image header: {0}")]
    InvalidSource(String),

    #[error("error loading input image {}", path.display())]
    LoadSource {
        path: PathBuf,
        #[source]
        source: SourceError,
    },

    #[error("error reading input {}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Opened, but reading the stream bytes failed part way.
    #[error("error reading stream data from {}", path.display())]
    ReadStream {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("input truncated: expected {expected} bytes, read {read}")]
    TruncatedInput { expected: usize, read: usize },

    /// Probed stream describes an image outside the configured limits.
    #[error("stream image {width}x{height} rejected: {reason}")]
    LimitExceeded {
        width: u32,
        height: u32,
        reason: &'static str,
    },

    /// Allocation refused by the allocator or by the configured limits.
    #[error("insufficient memory for {site} buffer ({bytes} bytes)")]
    OutOfMemory { site: BufferSite, bytes: usize },

    #[error("error {call}, code: {}", status.code())]
    Codec { call: CodecCall, status: Status },

    #[error("error creating output {}", path.display())]
    CreateOutput {
        direction: Direction,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error writing output PNG image {}", path.display())]
    WriteImage {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },

    #[error("error writing to output {}", path.display())]
    WriteOutput {
        direction: Direction,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DriverError {
    /// Process exit code for this failure.
    ///
    /// Codes are unique within a subcommand. Codec failures pass the codec's
    /// status through, truncated to 8 bits the way a POSIX shell sees it.
    pub fn exit_code(&self) -> u8 {
        match self {
            DriverError::InvalidSource(_) => 1,
            DriverError::LoadSource { .. } => 2,
            DriverError::ReadInput { .. } => 1,
            DriverError::ReadStream { .. } | DriverError::TruncatedInput { .. } => 3,
            DriverError::LimitExceeded { .. } => 8,
            DriverError::OutOfMemory { site, .. } => match site {
                BufferSite::EncodedStream => 7,
                BufferSite::InputStream => 2,
                BufferSite::DecodedPixels => 4,
            },
            DriverError::Codec { status, .. } => status.exit_code(),
            DriverError::WriteImage { .. } => 5,
            DriverError::CreateOutput { direction, .. } => match direction {
                Direction::Encode => 8,
                Direction::Decode => 6,
            },
            DriverError::WriteOutput { direction, .. } => match direction {
                Direction::Encode => 9,
                Direction::Decode => 7,
            },
        }
    }

    /// The codec status, if the codec itself failed.
    pub fn codec_status(&self) -> Option<Status> {
        match self {
            DriverError::Codec { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err() -> io::Error {
        io::Error::other("boom")
    }

    #[test]
    fn encode_codes_are_distinct() {
        let codes = [
            DriverError::InvalidSource("x".into()).exit_code(),
            DriverError::LoadSource {
                path: "a".into(),
                source: SourceError::Unrecognized,
            }
            .exit_code(),
            DriverError::OutOfMemory {
                site: BufferSite::EncodedStream,
                bytes: 1,
            }
            .exit_code(),
            DriverError::CreateOutput {
                direction: Direction::Encode,
                path: "a".into(),
                source: io_err(),
            }
            .exit_code(),
            DriverError::WriteOutput {
                direction: Direction::Encode,
                path: "a".into(),
                source: io_err(),
            }
            .exit_code(),
            Status::Error.exit_code(),
            Status::BufferTooSmall.exit_code(),
        ];
        assert_eq!(codes, [1, 2, 7, 8, 9, 255, 253]);
    }

    #[test]
    fn decode_codes_are_distinct() {
        let mut codes = vec![
            DriverError::ReadInput {
                path: "a".into(),
                source: io_err(),
            }
            .exit_code(),
            DriverError::OutOfMemory {
                site: BufferSite::InputStream,
                bytes: 1,
            }
            .exit_code(),
            DriverError::TruncatedInput {
                expected: 2,
                read: 1,
            }
            .exit_code(),
            DriverError::OutOfMemory {
                site: BufferSite::DecodedPixels,
                bytes: 1,
            }
            .exit_code(),
            DriverError::LimitExceeded {
                width: 9,
                height: 9,
                reason: "width exceeds limit",
            }
            .exit_code(),
            DriverError::CreateOutput {
                direction: Direction::Decode,
                path: "a".into(),
                source: io_err(),
            }
            .exit_code(),
            DriverError::WriteOutput {
                direction: Direction::Decode,
                path: "a".into(),
                source: io_err(),
            }
            .exit_code(),
        ];
        codes.extend(Status::ALL.iter().map(|s| s.exit_code()));
        // Short reads and failed reads are one class.
        let read_failure = DriverError::ReadStream {
            path: "a".into(),
            source: io_err(),
        };
        assert_eq!(read_failure.exit_code(), 3);
        let len = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), len);
        assert!(!codes.contains(&0));
    }

    #[test]
    fn codec_message_carries_code() {
        let err = DriverError::Codec {
            call: CodecCall::Fill,
            status: Status::DataCorrupted,
        };
        assert_eq!(err.to_string(), "error decompressing image, code: -5");
        assert_eq!(err.codec_status(), Some(Status::DataCorrupted));
    }
}
