mod support;

use sqzdrive::{
    Codec, ColorMode, Container, Direction, Driver, DriverError, EncodeSettings, ScanOrder,
    StoredCodec,
};

use support::{read_png, write_png, write_pnm};

fn split_pnm(bytes: &[u8]) -> (String, &[u8]) {
    let mut newlines = 0;
    let end = bytes
        .iter()
        .position(|&b| {
            newlines += usize::from(b == b'\n');
            newlines == 3
        })
        .expect("three header lines")
        + 1;
    (String::from_utf8(bytes[..end].to_vec()).unwrap(), &bytes[end..])
}

#[test]
fn rgb_png_to_png() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, pixels) = write_png(dir.path(), "in.png", 17, 9, 3);
    let stream = dir.path().join("in.sqz");
    let output = dir.path().join("out.png");

    let driver = Driver::new(StoredCodec);
    let settings = EncodeSettings::new()
        .with_color_mode(ColorMode::Oklab)
        .with_scan_order(ScanOrder::Hilbert);
    driver.encode(&input, &stream, None, &settings)?;
    let summary = driver.decode(&stream, &output, None)?;

    assert_eq!(summary.container, Container::Png);
    assert_eq!(summary.descriptor.color_mode, ColorMode::Oklab);
    let (width, height, samples, decoded) = read_png(&output);
    assert_eq!((width, height, samples), (17, 9, 3));
    assert_eq!(decoded, pixels);
    Ok(())
}

#[test]
fn gray_png_to_pgm() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, pixels) = write_png(dir.path(), "gray.png", 12, 5, 1);
    let stream = dir.path().join("gray.sqz");
    let output = dir.path().join("gray.pgm");

    let driver = Driver::new(StoredCodec);
    let settings = EncodeSettings::new().with_color_mode(ColorMode::Logl1);
    let encoded = driver.encode(&input, &stream, None, &settings)?;
    assert_eq!(encoded.descriptor.color_mode, ColorMode::Grayscale);

    let summary = driver.decode(&stream, &output, None)?;
    assert_eq!(summary.container, Container::Pnm);

    let bytes = std::fs::read(&output)?;
    let (header, body) = split_pnm(&bytes);
    assert_eq!(header, "P5\n12 5\n255\n");
    assert_eq!(body, pixels.as_slice());
    Ok(())
}

#[test]
fn ppm_to_ppm() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, pixels) = write_pnm(dir.path(), "in.ppm", 8, 8, 3);
    let stream = dir.path().join("in.sqz");
    let output = dir.path().join("out.raw");

    let driver = Driver::new(StoredCodec);
    driver.encode(&input, &stream, None, &EncodeSettings::default())?;
    driver.decode(&stream, &output, None)?;

    let bytes = std::fs::read(&output)?;
    let (header, body) = split_pnm(&bytes);
    assert_eq!(header, "P6\n8 8\n255\n");
    assert_eq!(body, pixels.as_slice());
    Ok(())
}

#[test]
fn gray_png_to_png_has_one_channel() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, pixels) = write_pnm(dir.path(), "in.pgm", 9, 4, 1);
    let stream = dir.path().join("in.sqz");
    let output = dir.path().join("OUT.PNG");

    let driver = Driver::new(StoredCodec);
    driver.encode(&input, &stream, None, &EncodeSettings::default())?;
    driver.decode(&stream, &output, None)?;

    let (width, height, samples, decoded) = read_png(&output);
    assert_eq!((width, height, samples), (9, 4, 1));
    assert_eq!(decoded, pixels);
    Ok(())
}

#[test]
fn alpha_source_is_invalid_header() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let stream = dir.path().join("out.sqz");
    let driver = Driver::new(StoredCodec);

    for channels in [2, 4] {
        let (input, _) = write_png(dir.path(), "alpha.png", 4, 4, channels);
        let err = driver
            .encode(&input, &stream, None, &EncodeSettings::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 1, "{channels} channels");
        assert!(!stream.exists());
    }
    Ok(())
}

#[test]
fn explicit_budget_caps_stream() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, _) = write_png(dir.path(), "in.png", 20, 20, 3);
    let stream = dir.path().join("small.sqz");

    let summary = Driver::new(StoredCodec).encode(
        &input,
        &stream,
        Some(300),
        &EncodeSettings::default(),
    )?;
    assert_eq!(summary.budget, 300);
    assert_eq!(std::fs::metadata(&stream)?.len(), 300);
    Ok(())
}

#[test]
fn partial_consumption_decodes_prefix() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, pixels) = write_pnm(dir.path(), "in.pgm", 10, 10, 1);
    let stream = dir.path().join("in.sqz");
    let output = dir.path().join("prefix.pgm");

    let driver = Driver::new(StoredCodec);
    driver.encode(&input, &stream, None, &EncodeSettings::default())?;

    let budget = StoredCodec::HEADER_SIZE as u64 + 10;
    let summary = driver.decode(&stream, &output, Some(budget))?;
    assert_eq!(summary.consumed as u64, budget);
    assert_eq!(summary.output_size, 100);

    let bytes = std::fs::read(&output)?;
    let (_, body) = split_pnm(&bytes);
    assert_eq!(&body[..10], &pixels[..10]);
    assert!(body[10..].iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn oversized_pnm_claim_is_a_load_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("claims.pgm");
    std::fs::write(&input, b"P5\n4294967295 4294967295\n255\n\x01\x02")?;
    let output = dir.path().join("out.sqz");

    let err = Driver::new(StoredCodec)
        .encode(&input, &output, None, &EncodeSettings::default())
        .unwrap_err();
    assert!(matches!(err, DriverError::LoadSource { .. }), "{err:?}");
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn short_write_of_decoded_pnm_is_reported() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, _) = write_pnm(dir.path(), "in.ppm", 40, 40, 3);
    let stream = dir.path().join("in.sqz");

    let driver = Driver::new(StoredCodec);
    driver.encode(&input, &stream, None, &EncodeSettings::default())?;
    let err = driver
        .decode(&stream, std::path::Path::new("/dev/full"), None)
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::WriteOutput {
            direction: Direction::Decode,
            ..
        }
    ));
    assert_eq!(err.exit_code(), 7);
    Ok(())
}
