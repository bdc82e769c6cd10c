//! Output containers for decoded pixels and encoded streams.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::Direction;
use crate::format::ImageFormat;
use crate::probe::Decoded;
use crate::{DriverError, ImageDescriptor};

/// Container chosen for decoded pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// PNG file, grayscale or RGB.
    Png,
    /// Binary PGM/PPM: three-line text header, then raw samples.
    Pnm,
}

impl Container {
    /// PNG when the extension says so, PNM for anything else.
    pub fn for_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str());
        match ext.and_then(ImageFormat::from_extension) {
            Some(ImageFormat::Png) => Container::Png,
            _ => Container::Pnm,
        }
    }
}

/// `P5`/`P6`, dimensions and max value, one per line.
pub fn pnm_header(descriptor: &ImageDescriptor) -> String {
    format!(
        "{}\n{} {}\n255\n",
        ImageFormat::pnm_magic(descriptor.planes),
        descriptor.width,
        descriptor.height
    )
}

/// Write decoded pixels to `path` in the container its name selects.
pub fn write_decoded(path: &Path, decoded: &Decoded) -> Result<Container, DriverError> {
    let container = Container::for_path(path);
    debug!("writing {container:?} to {}", path.display());
    match container {
        Container::Png => write_png(path, &decoded.descriptor, &decoded.pixels)?,
        Container::Pnm => write_pnm(path, &decoded.descriptor, &decoded.pixels)?,
    }
    Ok(container)
}

fn write_png(path: &Path, descriptor: &ImageDescriptor, pixels: &[u8]) -> Result<(), DriverError> {
    let wrap = |source: png::EncodingError| DriverError::WriteImage {
        path: path.to_path_buf(),
        source,
    };

    let color = if descriptor.is_grayscale() {
        png::ColorType::Grayscale
    } else {
        png::ColorType::Rgb
    };

    let file = File::create(path).map_err(|e| wrap(e.into()))?;
    let mut out = BufWriter::new(file);

    let mut encoder = png::Encoder::new(&mut out, descriptor.width, descriptor.height);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().map_err(wrap)?;
    writer.write_image_data(pixels).map_err(wrap)?;
    writer.finish().map_err(wrap)?;

    out.flush().map_err(|e| wrap(e.into()))
}

fn write_pnm(path: &Path, descriptor: &ImageDescriptor, pixels: &[u8]) -> Result<(), DriverError> {
    let file = File::create(path).map_err(|source| DriverError::CreateOutput {
        direction: Direction::Decode,
        path: path.to_path_buf(),
        source,
    })?;

    let mut out = BufWriter::new(file);
    out.write_all(pnm_header(descriptor).as_bytes())
        .and_then(|()| out.write_all(pixels))
        .and_then(|()| out.flush())
        .map_err(|source| DriverError::WriteOutput {
            direction: Direction::Decode,
            path: path.to_path_buf(),
            source,
        })
}

/// Write exactly `stream` to `path`.
pub fn write_stream(path: &Path, stream: &[u8]) -> Result<(), DriverError> {
    let mut file = File::create(path).map_err(|source| DriverError::CreateOutput {
        direction: Direction::Encode,
        path: path.to_path_buf(),
        source,
    })?;

    file.write_all(stream)
        .and_then(|()| file.flush())
        .map_err(|source| DriverError::WriteOutput {
            direction: Direction::Encode,
            path: path.to_path_buf(),
            source,
        })
}
