//! Two-phase decode: probe the header, then fill an exactly-sized buffer.
//!
//! The decoded size is unknown until the codec has seen the stream header,
//! so decoding goes through two states:
//!
//! - [`Probing`]: call the codec with no destination. The only acceptable
//!   result is [`DecodeOutcome::TooSmall`], which carries the descriptor and
//!   the required size.
//! - [`Filling`]: allocate exactly that many bytes and call the codec again
//!   with the same stream and budget. Anything but success is terminal.
//!
//! Each state consumes itself to produce the next, so the phases cannot be
//! skipped, repeated or reordered.

use log::debug;

use crate::budget::ConsumeBudget;
use crate::codec::{Codec, DecodeOutcome, DecodeReport, Status};
use crate::error::{BufferSite, CodecCall};
use crate::{DriverError, ImageDescriptor, Limits};

/// Decoded pixels and the descriptor they were decoded with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub descriptor: ImageDescriptor,
    /// Interleaved samples, exactly `descriptor.pixel_len()` bytes.
    pub pixels: Vec<u8>,
}

/// First phase: nothing is known about the stream yet.
pub struct Probing<'a, C: Codec> {
    codec: &'a C,
    stream: &'a [u8],
    budget: ConsumeBudget,
    limits: &'a Limits,
}

impl<'a, C: Codec> Probing<'a, C> {
    pub fn new(codec: &'a C, stream: &'a [u8], budget: ConsumeBudget, limits: &'a Limits) -> Self {
        Self {
            codec,
            stream,
            budget,
            limits,
        }
    }

    /// Ask the codec for the descriptor and the decoded size.
    pub fn probe(self) -> Result<Filling<'a, C>, DriverError> {
        let fail = |status| DriverError::Codec {
            call: CodecCall::Probe,
            status,
        };

        let report = match self.codec.decode(self.stream, None, self.budget) {
            Ok(DecodeOutcome::TooSmall(report)) => report,
            // A codec that fills nothing and calls it success is broken.
            Ok(DecodeOutcome::Filled(_)) => return Err(fail(Status::Error)),
            Err(status) => return Err(fail(status)),
        };

        let (width, height) = (report.descriptor.width, report.descriptor.height);
        if let Err(reason) = self.limits.check_dimensions(width, height) {
            debug!("probe rejected {}: {reason}", report.descriptor);
            return Err(DriverError::LimitExceeded {
                width,
                height,
                reason,
            });
        }

        debug!(
            "probe: {} needs {} bytes (budget {})",
            report.descriptor,
            report.required,
            self.budget.bytes()
        );

        Ok(Filling {
            codec: self.codec,
            stream: self.stream,
            budget: self.budget,
            limits: self.limits,
            report,
        })
    }
}

/// Second phase: the required size is known.
pub struct Filling<'a, C: Codec> {
    codec: &'a C,
    stream: &'a [u8],
    budget: ConsumeBudget,
    limits: &'a Limits,
    report: DecodeReport,
}

impl<C: Codec> Filling<'_, C> {
    /// What the probe learned.
    pub fn report(&self) -> &DecodeReport {
        &self.report
    }

    /// Allocate exactly the probed size and decode into it.
    pub fn fill(self) -> Result<Decoded, DriverError> {
        let fail = |status| DriverError::Codec {
            call: CodecCall::Fill,
            status,
        };

        let mut pixels = self
            .limits
            .allocate(BufferSite::DecodedPixels, self.report.required)?;

        match self.codec.decode(self.stream, Some(pixels.as_mut_slice()), self.budget) {
            Ok(DecodeOutcome::Filled(report)) if report == self.report => {
                debug!("fill: decoded {} bytes", pixels.len());
                Ok(Decoded {
                    descriptor: report.descriptor,
                    pixels,
                })
            }
            Ok(DecodeOutcome::Filled(_)) => Err(fail(Status::DataCorrupted)),
            Ok(DecodeOutcome::TooSmall(_)) => Err(fail(Status::BufferTooSmall)),
            Err(status) => Err(fail(status)),
        }
    }
}

/// Run both phases.
pub fn decode_stream<C: Codec>(
    codec: &C,
    stream: &[u8],
    budget: ConsumeBudget,
    limits: &Limits,
) -> Result<Decoded, DriverError> {
    Probing::new(codec, stream, budget, limits).probe()?.fill()
}
