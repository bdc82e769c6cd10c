//! Resource limits.

use crate::DriverError;
use crate::error::BufferSite;

/// Caps applied by the driver before it allocates or calls the codec.
///
/// All limits are optional; `None` means unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u32>,
    /// Maximum image height in pixels.
    pub max_height: Option<u32>,
    /// Maximum size of any single codec buffer the driver allocates, in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// No restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum allocation size in bytes.
    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Set maximum width and height in pixels.
    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    /// Check dimensions against the limits.
    ///
    /// Returns `Err` with a description if any limit is exceeded.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), &'static str> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err("width exceeds limit");
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err("height exceeds limit");
            }
        }

        Ok(())
    }

    /// Allocate a zeroed buffer of exactly `bytes`, within the memory limit.
    ///
    /// Refusal by the limit and refusal by the allocator are the same
    /// failure: the buffer for `site` could not be had.
    pub fn allocate(&self, site: BufferSite, bytes: usize) -> Result<Vec<u8>, DriverError> {
        let oom = || DriverError::OutOfMemory { site, bytes };

        if let Some(max_memory) = self.max_memory_bytes {
            if bytes as u64 > max_memory {
                return Err(oom());
            }
        }

        // The reservation only tests availability. `vec!` then takes zeroed
        // pages from the allocator, which the codec is first to touch.
        let mut reservation = Vec::<u8>::new();
        reservation.try_reserve_exact(bytes).map_err(|_| oom())?;
        drop(reservation);
        Ok(vec![0u8; bytes])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_none() {
        let limits = Limits::none();
        assert!(limits.check_dimensions(u32::MAX, u32::MAX).is_ok());
        assert_eq!(limits.allocate(BufferSite::InputStream, 16).unwrap().len(), 16);
    }

    #[test]
    fn limits_dimensions() {
        let limits = Limits::none().with_max_dimensions(1000, 500);
        assert!(limits.check_dimensions(1000, 500).is_ok());
        assert!(limits.check_dimensions(1001, 10).is_err());
        assert!(limits.check_dimensions(10, 501).is_err());
    }

    #[test]
    fn limits_memory() {
        let limits = Limits::none().with_max_memory(1_000);
        assert_eq!(limits.allocate(BufferSite::DecodedPixels, 1_000).unwrap().len(), 1_000);

        let err = limits.allocate(BufferSite::DecodedPixels, 1_001).unwrap_err();
        assert!(matches!(
            err,
            DriverError::OutOfMemory {
                site: BufferSite::DecodedPixels,
                bytes: 1_001
            }
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn allocation_is_exact_and_zeroed() {
        let buffer = Limits::none()
            .allocate(BufferSite::DecodedPixels, 64 << 20)
            .unwrap();
        assert_eq!(buffer.len(), 64 << 20);
        assert_eq!(buffer.capacity(), 64 << 20);
        assert!(buffer.iter().step_by(4096).all(|&b| b == 0));
    }

    #[test]
    fn allocator_refusal_is_reported() {
        let err = Limits::none()
            .allocate(BufferSite::EncodedStream, usize::MAX)
            .unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }
}
