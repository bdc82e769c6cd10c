//! # sqzdrive
//!
//! Driver protocol for the SQZ scalable image codec: how much memory to
//! allocate before each codec call, how to learn a decoded size the codec
//! only knows after reading the stream header, and where decoded pixels go.
//!
//! The codec sits behind the [`Codec`] trait. [`StoredCodec`] is an
//! uncompressed implementation of that contract.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use sqzdrive::{ColorMode, Driver, EncodeSettings, StoredCodec};
//!
//! let driver = Driver::new(StoredCodec);
//! let settings = EncodeSettings::new().with_color_mode(ColorMode::Oklab);
//!
//! // Budget derived from the image size
//! let encoded = driver.encode(Path::new("photo.ppm"), Path::new("photo.sqz"), None, &settings)?;
//! println!("{} bytes", encoded.output_size);
//!
//! // Consume only the first 4 KiB of the stream
//! driver.decode(Path::new("photo.sqz"), Path::new("preview.png"), Some(4096))?;
//! # Ok::<(), sqzdrive::DriverError>(())
//! ```

#![forbid(unsafe_code)]

pub mod budget;
pub mod codec;
mod descriptor;
mod driver;
mod error;
mod format;
mod limits;
pub mod output;
pub mod probe;
pub mod source;

pub use budget::{CompressionBudget, ConsumeBudget};
pub use codec::{Codec, DecodeOutcome, DecodeReport, Encoded, Status, StoredCodec};
pub use descriptor::{ColorMode, EncodeSettings, ImageDescriptor, MAX_DWT_LEVELS, ScanOrder};
pub use driver::{DecodeSummary, Driver, EncodeSummary, Inspection};
pub use error::{BufferSite, CodecCall, Direction, DriverError, SourceError};
pub use format::ImageFormat;
pub use limits::Limits;
pub use output::Container;
pub use probe::Decoded;
