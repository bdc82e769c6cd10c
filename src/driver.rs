//! Encode, decode and inspect runs.
//!
//! The driver owns every buffer. Each one is allocated right before the call
//! that fills it and dropped right after its last reader, on every path.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use log::{debug, info};
use serde::Serialize;

use crate::budget::{self, ConsumeBudget};
use crate::codec::{Codec, Status};
use crate::error::{BufferSite, CodecCall};
use crate::output::{self, Container};
use crate::probe::{self, Probing};
use crate::{DriverError, EncodeSettings, ImageDescriptor, Limits, source};

/// Result of a successful encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeSummary {
    pub descriptor: ImageDescriptor,
    /// Cap the encoder ran under.
    pub budget: usize,
    /// Size of the source image file.
    pub input_size: u64,
    /// Bytes written to the output stream.
    pub output_size: usize,
}

/// Result of a successful decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeSummary {
    pub descriptor: ImageDescriptor,
    /// Stream bytes the codec was allowed to consume.
    pub consumed: usize,
    /// Size of the stream file on disk.
    pub input_size: u64,
    /// Decoded pixel bytes.
    pub output_size: usize,
    pub container: Container,
}

/// What a probe-only pass learned about a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub descriptor: ImageDescriptor,
    /// Decoded size in bytes.
    pub required: usize,
    /// Stream bytes the probe was allowed to consume.
    pub consumed: usize,
    pub file_size: u64,
}

/// Runs the budget protocol against a codec.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sqzdrive::{Driver, EncodeSettings, Limits, StoredCodec};
///
/// let driver = Driver::new(StoredCodec).with_limits(Limits::none().with_max_memory(1 << 30));
/// driver.encode(Path::new("in.png"), Path::new("out.sqz"), None, &EncodeSettings::default())?;
/// driver.decode(Path::new("out.sqz"), Path::new("back.png"), None)?;
/// # Ok::<(), sqzdrive::DriverError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Driver<C> {
    codec: C,
    limits: Limits,
}

impl<C: Codec> Driver<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            limits: Limits::none(),
        }
    }

    /// Set resource limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Compress the image at `input` into a stream at `output`.
    ///
    /// `budget` caps the stream size; a missing or unusably small value is
    /// replaced by the near-lossless default.
    pub fn encode(
        &self,
        input: &Path,
        output: &Path,
        budget: Option<u64>,
        settings: &EncodeSettings,
    ) -> Result<EncodeSummary, DriverError> {
        let info =
            source::inspect(input).map_err(|e| DriverError::InvalidSource(e.to_string()))?;
        self.limits
            .check_dimensions(info.width, info.height)
            .map_err(|reason| DriverError::InvalidSource(reason.to_string()))?;
        let descriptor =
            ImageDescriptor::for_source(info.width, info.height, info.channels, settings)?;
        debug!("encode source: {descriptor} ({:?})", info.format);

        let (_, pixels) = source::load(input).map_err(|source| DriverError::LoadSource {
            path: input.to_path_buf(),
            source,
        })?;

        let budget = budget::compression_budget(&descriptor, budget, C::HEADER_SIZE)?;
        let mut stream = self
            .limits
            .allocate(BufferSite::EncodedStream, budget.bytes())?;

        let result = self.codec.encode(&pixels, &mut stream, &descriptor);
        drop(pixels);

        let fail = |status| DriverError::Codec {
            call: CodecCall::Encode,
            status,
        };
        let encoded = result.map_err(fail)?;
        if encoded.bytes_written > stream.len() {
            return Err(fail(Status::Error));
        }
        stream.truncate(encoded.bytes_written);

        output::write_stream(output, &stream)?;

        let summary = EncodeSummary {
            descriptor,
            budget: budget.bytes(),
            input_size: info.file_size,
            output_size: stream.len(),
        };
        info!(
            "encoded {} -> {} ({} of {} budget bytes)",
            input.display(),
            output.display(),
            summary.output_size,
            summary.budget
        );
        Ok(summary)
    }

    /// Decompress the stream at `input` into an image at `output`.
    ///
    /// `budget` caps how many stream bytes are read and consumed; a missing,
    /// unusably small or oversized value means the whole file.
    pub fn decode(
        &self,
        input: &Path,
        output: &Path,
        budget: Option<u64>,
    ) -> Result<DecodeSummary, DriverError> {
        let (stream, budget, input_size) = self.read_stream(input, budget)?;

        let result = probe::decode_stream(&self.codec, &stream, budget, &self.limits);
        drop(stream);
        let decoded = result?;

        let container = output::write_decoded(output, &decoded)?;

        let summary = DecodeSummary {
            descriptor: decoded.descriptor,
            consumed: budget.bytes(),
            input_size,
            output_size: decoded.pixels.len(),
            container,
        };
        info!(
            "decoded {} -> {} ({}, {:?})",
            input.display(),
            output.display(),
            summary.descriptor,
            container
        );
        Ok(summary)
    }

    /// Run only the probe phase on the stream at `input`.
    pub fn inspect(&self, input: &Path, budget: Option<u64>) -> Result<Inspection, DriverError> {
        let (stream, budget, file_size) = self.read_stream(input, budget)?;
        let filling = Probing::new(&self.codec, &stream, budget, &self.limits).probe()?;
        let report = *filling.report();

        Ok(Inspection {
            descriptor: report.descriptor,
            required: report.required,
            consumed: budget.bytes(),
            file_size,
        })
    }

    /// Read the first `budget` bytes of the stream at `path`.
    fn read_stream(
        &self,
        path: &Path,
        requested: Option<u64>,
    ) -> Result<(Vec<u8>, ConsumeBudget, u64), DriverError> {
        let read_err = |source| DriverError::ReadInput {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(read_err)?;
        let len = file.metadata().map_err(read_err)?.len();
        let budget = budget::consume_budget(requested, len, C::HEADER_SIZE);

        let mut stream = self
            .limits
            .allocate(BufferSite::InputStream, budget.bytes())?;

        let filled = read_prefix(&mut file, &mut stream).map_err(|source| {
            DriverError::ReadStream {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if filled != stream.len() {
            return Err(DriverError::TruncatedInput {
                expected: stream.len(),
                read: filled,
            });
        }

        Ok((stream, budget, len))
    }
}

/// Fill `buf` from `reader` until it is full or the reader is exhausted.
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
