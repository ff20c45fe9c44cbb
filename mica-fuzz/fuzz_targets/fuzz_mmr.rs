#![no_main]

use libfuzzer_sys::fuzz_target;

/// A decoder that simply discards all output.
struct Decoder;

impl mica_ccitt::Decoder for Decoder {
    fn push_run(&mut self, _black: bool, _count: u32) {}
    fn next_line(&mut self) {}
}

// Header layout (5 bytes):
// [0..2]  columns (u16 LE)
// [2..4]  rows (u16 LE)
// [4]     end_of_block (bool)
// [5..]   T.6 encoded data

const HEADER_SIZE: usize = 5;

fuzz_target!(|data: &[u8]| {
    if data.len() < HEADER_SIZE {
        return;
    }

    let columns = u32::from(u16::from_le_bytes([data[0], data[1]]));
    let rows = u32::from(u16::from_le_bytes([data[2], data[3]]));
    let end_of_block = data[4] != 0;

    let settings = mica_ccitt::DecodeSettings {
        columns,
        rows,
        end_of_block,
    };

    let _ = mica_ccitt::decode(&data[HEADER_SIZE..], &mut Decoder, &settings);

    let mut reader = mica_jbig2::BitReader::new(&data[HEADER_SIZE..]);
    let _ = mica_jbig2::decode_mmr(
        columns,
        rows,
        &mut reader,
        &mica_jbig2::DecodeSettings::default(),
    );
});
