//! Benchmarks for the region decoders.

#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mica_jbig2::{
    ArithmeticDecoder, BitReader, Bitmap, CombinationOperator, DecodeSettings, GenericTemplate,
    RefinementTemplate, compose, decode_generic_region, decode_mmr, decode_refinement_region,
};

/// Width 100, four rows with make-up codes, terminated by EOFB.
const MMR_DATA: [u8; 11] = [39, 3, 193, 121, 223, 6, 143, 24, 0, 128, 8];

fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x9E37_79B9_u32;

    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

fn generic(c: &mut Criterion) {
    let data = noise(64 * 1024);
    let settings = DecodeSettings::default();

    for template in [
        GenericTemplate::Template0,
        GenericTemplate::Template1,
        GenericTemplate::Template2,
        GenericTemplate::Template3,
    ] {
        c.bench_function(&format!("generic {template:?} 512x512"), |b| {
            b.iter(|| {
                let mut decoder = ArithmeticDecoder::new(black_box(&data));

                decode_generic_region(
                    512,
                    512,
                    template,
                    template.nominal_adaptive_pixels(),
                    true,
                    &mut decoder,
                    &settings,
                )
                .unwrap()
            });
        });
    }
}

fn refinement(c: &mut Criterion) {
    let data = noise(64 * 1024);
    let settings = DecodeSettings::default();
    let mut decoder = ArithmeticDecoder::new(&data);
    let reference = decode_generic_region(
        512,
        512,
        GenericTemplate::Template0,
        GenericTemplate::Template0.nominal_adaptive_pixels(),
        false,
        &mut decoder,
        &settings,
    )
    .unwrap();

    for template in [RefinementTemplate::Template0, RefinementTemplate::Template1] {
        c.bench_function(&format!("refinement {template:?} 512x512"), |b| {
            b.iter(|| {
                let mut decoder = ArithmeticDecoder::new(black_box(&data));

                decode_refinement_region(
                    512,
                    512,
                    template,
                    &reference,
                    0,
                    0,
                    template.nominal_adaptive_pixels(),
                    true,
                    &mut decoder,
                    &settings,
                )
                .unwrap()
            });
        });
    }
}

fn mmr(c: &mut Criterion) {
    let settings = DecodeSettings::default();

    c.bench_function("mmr 100x4", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(black_box(&MMR_DATA));
            decode_mmr(100, 4, &mut reader, &settings).unwrap()
        });
    });
}

fn composition(c: &mut Criterion) {
    let mut region = Bitmap::new(700, 300).unwrap();
    region.fill(true);

    for (name, x) in [("aligned", 64), ("unaligned", 67)] {
        c.bench_function(&format!("compose {name}"), |b| {
            let mut page = Bitmap::new(2480, 1000).unwrap();

            b.iter(|| {
                compose(
                    &mut page,
                    black_box(&region),
                    x,
                    100,
                    CombinationOperator::Xor,
                );
            });
        });
    }
}

criterion_group!(benches, generic, refinement, mmr, composition);
criterion_main!(benches);
