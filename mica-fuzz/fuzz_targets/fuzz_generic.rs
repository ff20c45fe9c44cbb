#![no_main]

use libfuzzer_sys::fuzz_target;

// The input is the data of a generic region segment. The first byte selects
// whether it had an unknown data length.
fuzz_target!(|data: &[u8]| {
    let Some((&first, data)) = data.split_first() else {
        return;
    };

    let settings = mica_jbig2::DecodeSettings {
        max_pixels: 1 << 20,
        strict: first & 2 != 0,
    };

    if let Ok(region) =
        mica_jbig2::decode_generic_region_segment(data, first & 1 != 0, Some(0), &settings)
    {
        let mut page = mica_jbig2::Bitmap::new(256, 256).unwrap();
        region.compose_into(&mut page);
    }
});
