//! Image shape and codec configuration.

use core::fmt;

use serde::Serialize;

use crate::DriverError;

/// Deepest wavelet decomposition the codec accepts.
pub const MAX_DWT_LEVELS: u8 = 5;

/// Internal color transform applied by the codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ColorMode {
    Grayscale = 0,
    /// Reversible YCoCg (default for multi-plane sources).
    #[default]
    YCoCgR = 1,
    Oklab = 2,
    Logl1 = 3,
}

impl ColorMode {
    /// Decode from the codec's numeric representation.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ColorMode::Grayscale),
            1 => Some(ColorMode::YCoCgR),
            2 => Some(ColorMode::Oklab),
            3 => Some(ColorMode::Logl1),
            _ => None,
        }
    }
}

/// Order in which wavelet coefficients are serialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ScanOrder {
    Raster = 0,
    #[default]
    Snake = 1,
    Morton = 2,
    Hilbert = 3,
}

impl ScanOrder {
    /// Decode from the codec's numeric representation.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ScanOrder::Raster),
            1 => Some(ScanOrder::Snake),
            2 => Some(ScanOrder::Morton),
            3 => Some(ScanOrder::Hilbert),
            _ => None,
        }
    }
}

/// Caller-chosen codec parameters for an encode.
///
/// # Example
///
/// ```
/// use sqzdrive::{ColorMode, EncodeSettings, ScanOrder};
///
/// let settings = EncodeSettings::new()
///     .with_levels(3)
///     .with_color_mode(ColorMode::Oklab)
///     .with_scan_order(ScanOrder::Hilbert)
///     .with_subsampling(true);
/// assert_eq!(settings.levels, 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeSettings {
    /// Number of wavelet decompositions, `1..=MAX_DWT_LEVELS`.
    pub levels: u8,
    pub color_mode: ColorMode,
    pub scan_order: ScanOrder,
    /// Extra chroma subsampling.
    pub subsampling: bool,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            levels: MAX_DWT_LEVELS,
            color_mode: ColorMode::default(),
            scan_order: ScanOrder::default(),
            subsampling: false,
        }
    }
}

impl EncodeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decomposition level count.
    pub fn with_levels(mut self, levels: u8) -> Self {
        self.levels = levels;
        self
    }

    /// Set the internal color mode.
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Set the coefficient scan order.
    pub fn with_scan_order(mut self, order: ScanOrder) -> Self {
        self.scan_order = order;
        self
    }

    /// Enable or disable chroma subsampling.
    pub fn with_subsampling(mut self, subsampling: bool) -> Self {
        self.subsampling = subsampling;
        self
    }
}

/// Shape and configuration of an image as seen by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
    /// 1 (grayscale) or 3 (multi-channel).
    pub planes: u8,
    pub color_mode: ColorMode,
    pub dwt_levels: u8,
    pub scan_order: ScanOrder,
    pub subsampling: bool,
}

impl ImageDescriptor {
    /// Build the descriptor for a source image about to be encoded.
    ///
    /// Rejects empty dimensions and channel counts other than 1 or 3. A
    /// single-plane source always gets [`ColorMode::Grayscale`], whatever the
    /// settings ask for.
    pub fn for_source(
        width: u32,
        height: u32,
        channels: u8,
        settings: &EncodeSettings,
    ) -> Result<Self, DriverError> {
        if width == 0 || height == 0 {
            return Err(DriverError::InvalidSource(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }
        if channels != 1 && channels != 3 {
            return Err(DriverError::InvalidSource(format!(
                "expected 1 or 3 channels, got {channels}"
            )));
        }

        let color_mode = if channels == 1 {
            ColorMode::Grayscale
        } else {
            settings.color_mode
        };

        Ok(Self {
            width,
            height,
            planes: channels,
            color_mode,
            dwt_levels: settings.levels,
            scan_order: settings.scan_order,
            subsampling: settings.subsampling,
        })
    }

    /// Whether this is a single-plane image.
    pub fn is_grayscale(&self) -> bool {
        self.planes == 1
    }

    /// Decoded size in bytes (`width × height × planes`), `None` on overflow.
    pub fn pixel_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.planes as usize)
    }
}

impl fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{} {:?} levels={} order={:?}",
            self.width, self.height, self.planes, self.color_mode, self.dwt_levels, self.scan_order
        )?;
        if self.subsampling {
            f.write_str(" subsampled")?;
        }
        Ok(())
    }
}
