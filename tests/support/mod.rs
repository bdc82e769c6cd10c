//! Helpers for writing source images and reading results back.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Deterministic sample pattern.
#[allow(dead_code)]
pub fn gradient(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

/// Write an 8-bit PNG with 1 (gray), 2 (gray+alpha), 3 (RGB) or 4 (RGBA) channels.
#[allow(dead_code)]
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, channels: u8) -> (PathBuf, Vec<u8>) {
    let path = dir.join(name);
    let pixels = gradient(width as usize * height as usize * channels as usize);
    let color = match channels {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        _ => png::ColorType::Rgba,
    };

    let file = BufWriter::new(File::create(&path).unwrap());
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&pixels).unwrap();
    writer.finish().unwrap();

    (path, pixels)
}

/// Write a binary PGM (1 channel) or PPM (3 channels).
#[allow(dead_code)]
pub fn write_pnm(dir: &Path, name: &str, width: u32, height: u32, channels: u8) -> (PathBuf, Vec<u8>) {
    let path = dir.join(name);
    let pixels = gradient(width as usize * height as usize * channels as usize);
    let magic = if channels == 1 { "P5" } else { "P6" };
    let mut bytes = format!("{magic}\n{width} {height}\n255\n").into_bytes();
    bytes.extend_from_slice(&pixels);
    std::fs::write(&path, bytes).unwrap();
    (path, pixels)
}

/// Decoded PNG: width, height, samples per pixel, pixels.
#[allow(dead_code)]
pub fn read_png(path: &Path) -> (u32, u32, usize, Vec<u8>) {
    let decoder = png::Decoder::new(BufReader::new(File::open(path).unwrap()));
    let mut reader = decoder.read_info().unwrap();
    let (width, height) = (reader.info().width, reader.info().height);
    let samples = reader.output_color_type().0.samples();
    let mut pixels = vec![0u8; reader.output_buffer_size().unwrap()];
    let frame = reader.next_frame(&mut pixels).unwrap();
    pixels.truncate(frame.buffer_size());
    (width, height, samples, pixels)
}
