//! The `c` and `d` subcommands.

use sqzdrive::{Driver, DriverError, StoredCodec};

use crate::{CompressArgs, DecompressArgs};

/// Run the `c` subcommand.
pub fn compress(args: &CompressArgs) -> Result<(), DriverError> {
    let driver = Driver::new(StoredCodec).with_limits(args.limits.to_limits());
    let summary = driver.encode(&args.input, &args.output, args.budget, &args.settings())?;

    eprintln!(
        "{} -> {} ({}, {}, budget {})",
        format_size(summary.input_size),
        format_size(summary.output_size as u64),
        args.output.display(),
        summary.descriptor,
        format_size(summary.budget as u64),
    );
    Ok(())
}

/// Run the `d` subcommand.
pub fn decompress(args: &DecompressArgs) -> Result<(), DriverError> {
    let driver = Driver::new(StoredCodec).with_limits(args.limits.to_limits());
    let summary = driver.decode(&args.input, &args.output, args.budget)?;

    let consumed = if summary.consumed as u64 == summary.input_size {
        String::new()
    } else {
        format!(", consumed {}", format_size(summary.consumed as u64))
    };
    eprintln!(
        "{} -> {} ({}, {:?}{consumed})",
        format_size(summary.input_size),
        format_size(summary.output_size as u64),
        args.output.display(),
        summary.container,
    );
    Ok(())
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
