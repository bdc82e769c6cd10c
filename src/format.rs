//! Image file format detection.

/// Image file formats the driver reads sources from or writes output to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    /// Binary portable graymap (P5).
    Pgm,
    /// Binary portable pixmap (P6).
    Ppm,
}

impl ImageFormat {
    /// Detect format from magic bytes. Returns None if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(ImageFormat::Png);
        }

        // PNM: "P5" / "P6" followed by whitespace
        if data.len() >= 3 && data[0] == b'P' && data[2].is_ascii_whitespace() {
            match data[1] {
                b'5' => return Some(ImageFormat::Pgm),
                b'6' => return Some(ImageFormat::Ppm),
                _ => {}
            }
        }

        None
    }

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "pgm" => Some(ImageFormat::Pgm),
            "ppm" | "pnm" => Some(ImageFormat::Ppm),
            _ => None,
        }
    }

    /// PNM magic for a binary raster with `planes` samples per pixel.
    pub fn pnm_magic(planes: u8) -> &'static str {
        if planes == 1 { "P5" } else { "P6" }
    }
}
