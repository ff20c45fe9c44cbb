//! This example shows you how to convert the data of a generic region
//! segment into a PNG file.

#![allow(missing_docs)]

use std::process::ExitCode;

use mica_jbig2::{Bitmap, DecodeSettings, decode_generic_region_segment};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <region.bin> <output.png>", args[0]);

        return ExitCode::FAILURE;
    }

    let input_path = &args[1];
    let output_path = &args[2];

    let data = match std::fs::read(input_path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to read input file: {err}");

            return ExitCode::FAILURE;
        }
    };

    let region = match decode_generic_region_segment(&data, false, None, &DecodeSettings::default())
    {
        Ok(region) => region,
        Err(err) => {
            eprintln!("Failed to decode region: {err}");

            return ExitCode::FAILURE;
        }
    };

    println!(
        "Decoded: {}x{} region at ({}, {})",
        region.info.width, region.info.height, region.info.x, region.info.y
    );

    // Place the region on a page that is just large enough to hold it.
    let page_width = region.info.x.saturating_add(region.info.width);
    let page_height = region.info.y.saturating_add(region.info.height);

    let mut page = match Bitmap::new(page_width, page_height) {
        Ok(page) => page,
        Err(err) => {
            eprintln!("Failed to allocate page: {err}");

            return ExitCode::FAILURE;
        }
    };

    region.compose_into(&mut page);

    if let Err(err) = page.to_gray_image().save(output_path) {
        eprintln!("Failed to save PNG: {err}");

        return ExitCode::FAILURE;
    }

    eprintln!("Saved: {output_path}");

    ExitCode::SUCCESS
}
