//! Budget derivation.
//!
//! The two directions use a byte budget for different things, so they get
//! different types: [`CompressionBudget`] caps the stream the encoder may
//! produce, [`ConsumeBudget`] caps how much of a stream the decoder may read.

use log::{debug, warn};

use crate::DriverError;
use crate::descriptor::ImageDescriptor;

/// Upper bound on the size of an encoded stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompressionBudget(usize);

impl CompressionBudget {
    pub fn bytes(self) -> usize {
        self.0
    }
}

/// Upper bound on the number of stream bytes a decode may consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConsumeBudget(usize);

impl ConsumeBudget {
    /// Budget covering the whole of `stream`.
    pub fn whole(stream: &[u8]) -> Self {
        Self(stream.len())
    }

    pub fn bytes(self) -> usize {
        self.0
    }
}

/// Smallest stream that can carry anything: a header plus one payload byte.
pub fn min_viable(header_size: usize) -> usize {
    header_size + 1
}

/// Resolve a caller value, treating anything below the viable minimum as unset.
fn requested_value(requested: Option<u64>, header_size: usize) -> Option<u64> {
    let value = requested?;
    if value < min_viable(header_size) as u64 {
        if value > 0 {
            warn!(
                "budget {value} is below the minimum viable stream ({} bytes), ignoring",
                min_viable(header_size)
            );
        }
        return None;
    }
    Some(value)
}

/// Budget for an encode.
///
/// Without a usable caller value the budget is the raw image size plus a
/// quarter, which leaves room for transforms that expand slightly.
pub fn compression_budget(
    descriptor: &ImageDescriptor,
    requested: Option<u64>,
    header_size: usize,
) -> Result<CompressionBudget, DriverError> {
    if let Some(value) = requested_value(requested, header_size) {
        let bytes = usize::try_from(value).map_err(|_| {
            DriverError::InvalidSource(format!("budget {value} exceeds addressable memory"))
        })?;
        debug!("encode budget: {bytes} bytes (caller)");
        return Ok(CompressionBudget(bytes));
    }

    let raw = descriptor.pixel_len().ok_or_else(|| {
        DriverError::InvalidSource(format!("image too large: {descriptor}"))
    })?;
    let bytes = raw
        .checked_add(raw / 4)
        .ok_or_else(|| DriverError::InvalidSource(format!("image too large: {descriptor}")))?;
    debug!("encode budget: {bytes} bytes (derived from {raw} raw bytes)");
    Ok(CompressionBudget(bytes))
}

/// Budget for a decode of a stream that is `stream_len` bytes on disk.
///
/// A missing, unusable, or oversized caller value means "consume everything".
pub fn consume_budget(requested: Option<u64>, stream_len: u64, header_size: usize) -> ConsumeBudget {
    let bytes = match requested_value(requested, header_size) {
        Some(value) if value <= stream_len => value,
        _ => stream_len,
    };
    debug!("decode budget: {bytes} of {stream_len} bytes");
    // Callers read `bytes` into memory, so it always fits once allocated.
    ConsumeBudget(usize::try_from(bytes).unwrap_or(usize::MAX))
}
