//! Source image loading for the encoder.
//!
//! Reads PNG, PGM (P5) and PPM (P6) files as 8-bit samples. [`inspect`]
//! parses only the header so the driver can validate shape before
//! allocating; [`load`] returns the interleaved samples. 16-bit inputs keep
//! their high byte.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::SourceError;
use crate::format::ImageFormat;

/// Header fields of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Samples per pixel after 8-bit expansion (1 gray, 2 gray+alpha, 3 RGB, 4 RGBA).
    pub channels: u8,
    /// Size of the file on disk.
    pub file_size: u64,
}

impl SourceInfo {
    /// Size of the decoded pixel data in bytes.
    pub fn pixel_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.channels as usize)
    }
}

struct Opened {
    reader: BufReader<File>,
    format: ImageFormat,
    file_size: u64,
}

fn open(path: &Path) -> Result<Opened, SourceError> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let format = ImageFormat::detect(reader.fill_buf()?).ok_or(SourceError::Unrecognized)?;
    Ok(Opened {
        reader,
        format,
        file_size,
    })
}

fn png_decoder(reader: BufReader<File>) -> png::Decoder<BufReader<File>> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    decoder
}

/// Read just the header of the image at `path`.
pub fn inspect(path: &Path) -> Result<SourceInfo, SourceError> {
    let Opened {
        mut reader,
        format,
        file_size,
    } = open(path)?;
    match format {
        ImageFormat::Png => {
            let png = png_decoder(reader).read_info()?;
            let (color_type, _) = png.output_color_type();
            let info = png.info();
            Ok(SourceInfo {
                format,
                width: info.width,
                height: info.height,
                channels: color_type.samples() as u8,
                file_size,
            })
        }
        ImageFormat::Pgm | ImageFormat::Ppm => {
            let header = read_pnm_header(&mut reader, format)?;
            Ok(header.info(format, file_size))
        }
    }
}

/// Load the interleaved 8-bit samples of the image at `path`.
pub fn load(path: &Path) -> Result<(SourceInfo, Vec<u8>), SourceError> {
    let Opened {
        mut reader,
        format,
        file_size,
    } = open(path)?;
    match format {
        ImageFormat::Png => {
            let mut png = png_decoder(reader).read_info()?;
            let (color_type, _) = png.output_color_type();
            let info = SourceInfo {
                format,
                width: png.info().width,
                height: png.info().height,
                channels: color_type.samples() as u8,
                file_size,
            };
            let expected = info.pixel_len().ok_or_else(|| too_large(&info))?;

            let buffer_size = png.output_buffer_size().ok_or_else(|| too_large(&info))?;
            let mut pixels = Vec::new();
            pixels
                .try_reserve_exact(buffer_size)
                .map_err(|_| too_large(&info))?;
            pixels.resize(buffer_size, 0);
            let frame = png.next_frame(&mut pixels)?;
            pixels.truncate(frame.buffer_size());

            if pixels.len() < expected {
                return Err(SourceError::Truncated {
                    expected,
                    actual: pixels.len(),
                });
            }
            pixels.truncate(expected);
            Ok((info, pixels))
        }
        ImageFormat::Pgm | ImageFormat::Ppm => {
            let header = read_pnm_header(&mut reader, format)?;
            let info = header.info(format, file_size);
            let expected = info
                .pixel_len()
                .and_then(|n| n.checked_mul(header.sample_bytes))
                .ok_or_else(|| too_large(&info))?;

            // Grows with the data actually present, not with the header's claim.
            let mut raster = Vec::new();
            reader.take(expected as u64).read_to_end(&mut raster)?;
            if raster.len() != expected {
                return Err(SourceError::Truncated {
                    expected,
                    actual: raster.len(),
                });
            }

            let pixels = match header.sample_bytes {
                1 => raster,
                // Big-endian samples.
                _ => raster.chunks_exact(2).map(|sample| sample[0]).collect(),
            };
            Ok((info, pixels))
        }
    }
}

fn too_large(info: &SourceInfo) -> SourceError {
    SourceError::Pnm(format!(
        "{}x{}x{} exceeds addressable memory",
        info.width, info.height, info.channels
    ))
}

/// Fields of a binary PNM header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PnmHeader {
    width: u32,
    height: u32,
    channels: u8,
    /// 1 for max values up to 255, 2 above.
    sample_bytes: usize,
}

impl PnmHeader {
    fn info(&self, format: ImageFormat, file_size: u64) -> SourceInfo {
        SourceInfo {
            format,
            width: self.width,
            height: self.height,
            channels: self.channels,
            file_size,
        }
    }
}

fn read_pnm_header<R: BufRead>(reader: &mut R, format: ImageFormat) -> Result<PnmHeader, SourceError> {
    let mut token = String::new();

    read_token(reader, &mut token)?;
    let channels = match (token.as_str(), format) {
        ("P5", ImageFormat::Pgm) => 1,
        ("P6", ImageFormat::Ppm) => 3,
        _ => return Err(SourceError::Pnm(format!("unexpected magic '{token}'"))),
    };

    let width = read_number(reader, &mut token, "width")?;
    let height = read_number(reader, &mut token, "height")?;
    let max_val = read_number(reader, &mut token, "max value")?;
    let sample_bytes = match max_val {
        1..=255 => 1,
        256..=65535 => 2,
        _ => return Err(SourceError::Pnm(format!("invalid max value {max_val}"))),
    };

    Ok(PnmHeader {
        width,
        height,
        channels,
        sample_bytes,
    })
}

fn read_number<R: BufRead>(reader: &mut R, token: &mut String, what: &str) -> Result<u32, SourceError> {
    read_token(reader, token)?;
    token
        .parse()
        .map_err(|_| SourceError::Pnm(format!("invalid {what} '{token}'")))
}

/// Read the next whitespace-delimited token, skipping `#` comments.
///
/// Consumes the single whitespace byte that ends the token, so after the
/// max value the reader sits on the first raster byte.
fn read_token<R: BufRead>(reader: &mut R, token: &mut String) -> std::io::Result<()> {
    token.clear();
    let mut in_comment = false;

    loop {
        let mut byte = [0u8; 1];
        if reader.read(&mut byte)? == 0 {
            break;
        }

        let ch = byte[0] as char;

        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            continue;
        }

        if ch == '#' {
            in_comment = true;
            continue;
        }

        if ch.is_ascii_whitespace() {
            if !token.is_empty() {
                break;
            }
            continue;
        }

        token.push(ch);
    }

    Ok(())
}
