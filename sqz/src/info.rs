//! Stream inspection: run the decode probe and print what it reports.

use std::io;

use sqzdrive::{Direction, Driver, DriverError, Inspection, StoredCodec};

use crate::InfoArgs;
use crate::process::format_size;

/// Run the `i` subcommand.
pub fn run(args: &InfoArgs) -> Result<(), DriverError> {
    let driver = Driver::new(StoredCodec).with_limits(args.limits.to_limits());
    let inspection = driver.inspect(&args.input, args.budget)?;

    if args.json {
        let json = serde_json::to_string_pretty(&inspection).map_err(|e| {
            DriverError::WriteOutput {
                direction: Direction::Decode,
                path: "<stdout>".into(),
                source: io::Error::from(e),
            }
        })?;
        println!("{json}");
    } else {
        print_info(&inspection);
    }
    Ok(())
}

fn print_info(info: &Inspection) {
    let desc = &info.descriptor;
    println!("  Dimensions:   {}x{}", desc.width, desc.height);
    println!("  Planes:       {}", desc.planes);
    println!("  Color mode:   {:?}", desc.color_mode);
    println!("  DWT levels:   {}", desc.dwt_levels);
    println!("  Scan order:   {:?}", desc.scan_order);
    if desc.planes > 1 {
        println!(
            "  Subsampling:  {}",
            if desc.subsampling { "yes" } else { "no" }
        );
    }
    println!("  Decoded size: {}", format_size(info.required as u64));
    println!("  File size:    {}", format_size(info.file_size));
    if info.consumed as u64 != info.file_size {
        println!("  Consumed:     {}", format_size(info.consumed as u64));
    }
}
