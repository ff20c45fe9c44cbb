#![no_main]

use libfuzzer_sys::fuzz_target;

// Header layout (4 bytes):
// [0]     reference width
// [1]     reference height
// [2]     reference x
// [3]     reference y
// [4..]   generic refinement region segment data

const HEADER_SIZE: usize = 4;

fuzz_target!(|data: &[u8]| {
    if data.len() < HEADER_SIZE {
        return;
    }

    let settings = mica_jbig2::DecodeSettings {
        max_pixels: 1 << 20,
        strict: false,
    };

    let Ok(mut reference) =
        mica_jbig2::Bitmap::new(u32::from(data[0]), u32::from(data[1]))
    else {
        return;
    };

    // Some structure for the typical prediction to pick up.
    for y in 0..reference.height() / 2 {
        for x in 0..reference.width() / 2 {
            reference.set_pixel(x, y, 1);
        }
    }

    let _ = mica_jbig2::decode_refinement_region_segment(
        &data[HEADER_SIZE..],
        &reference,
        u32::from(data[2]),
        u32::from(data[3]),
        None,
        &settings,
    );
});
