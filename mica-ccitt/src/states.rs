//! Code tables of T.4/T.6 compiled into binary decoding trees.
//!
//! Every table is turned into a small array of nodes at compile time. Decoding
//! walks the tree one bit at a time, starting at node 0, until a leaf is
//! reached.

use crate::bit_reader::BitReader;
use crate::{DecodeError, Result};

/// A two-dimensional coding mode (T.4, 4.2.1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Pass,
    Horizontal,
    /// Offset of `a1` relative to `b1`.
    Vertical(i8),
}

/// Marks a link as pointing to a decoded value instead of another node.
const LEAF: u16 = 0x8000;
/// An unused link. Node 0 is the root and never a link target.
const NONE: u16 = 0;

/// "EOFB: 000000000001 000000000001" (T.6, 2.4)
pub(crate) const EOFB: u32 = 0x001001;

#[derive(Clone, Copy)]
pub(crate) struct Node {
    zero: u16,
    one: u16,
}

const RUN_NODES: usize = 128;
const MODE_NODES: usize = 16;

const fn insert<const N: usize>(
    nodes: &mut [Node; N],
    mut used: usize,
    code: &str,
    value: u16,
) -> usize {
    let bits = code.as_bytes();
    let mut node = 0;
    let mut i = 0;

    while i < bits.len() {
        let one = bits[i] == b'1';
        let link = if one { nodes[node].one } else { nodes[node].zero };

        if i == bits.len() - 1 {
            let leaf = LEAF | value;

            if one {
                nodes[node].one = leaf;
            } else {
                nodes[node].zero = leaf;
            }
        } else if link == NONE {
            assert!(used < N, "code tree has too few nodes");

            if one {
                nodes[node].one = used as u16;
            } else {
                nodes[node].zero = used as u16;
            }

            node = used;
            used += 1;
        } else {
            node = link as usize;
        }

        i += 1;
    }

    used
}

const fn insert_all<const N: usize>(
    nodes: &mut [Node; N],
    mut used: usize,
    codes: &[(&str, u16)],
) -> usize {
    let mut i = 0;

    while i < codes.len() {
        used = insert(nodes, used, codes[i].0, codes[i].1);
        i += 1;
    }

    used
}

const fn build_runs(terminating: &[(&str, u16)], makeup: &[(&str, u16)]) -> [Node; RUN_NODES] {
    let mut nodes = [Node {
        zero: NONE,
        one: NONE,
    }; RUN_NODES];

    let mut used = insert_all(&mut nodes, 1, terminating);
    used = insert_all(&mut nodes, used, makeup);
    used = insert_all(&mut nodes, used, COMMON_MAKEUP);
    assert!(used <= RUN_NODES);

    nodes
}

#[inline(always)]
fn walk(nodes: &[Node], reader: &mut BitReader<'_>) -> Result<u16> {
    let mut node = 0_usize;

    loop {
        let link = if reader.read_bit()? == 0 {
            nodes[node].zero
        } else {
            nodes[node].one
        };

        if link == NONE {
            return Err(DecodeError::InvalidCode);
        } else if link & LEAF != 0 {
            return Ok(link & !LEAF);
        }

        node = link as usize;
    }
}

/// Decode a complete run: any number of make-up codes followed by exactly
/// one terminating code (T.4, 4.1.1).
pub(crate) fn decode_run(reader: &mut BitReader<'_>, white: bool) -> Result<u32> {
    let nodes: &[Node] = if white { &WHITE_RUNS } else { &BLACK_RUNS };
    let mut total = 0_u32;

    loop {
        let len = walk(nodes, reader)?;
        total = total
            .checked_add(u32::from(len))
            .ok_or(DecodeError::Overflow)?;

        if len < 64 {
            return Ok(total);
        }
    }
}

pub(crate) fn decode_mode(reader: &mut BitReader<'_>) -> Result<Mode> {
    Ok(match walk(&MODES, reader)? {
        0 => Mode::Pass,
        1 => Mode::Horizontal,
        v @ 2..=8 => Mode::Vertical(v as i8 - 5),
        _ => return Err(DecodeError::InvalidCode),
    })
}

/// Table 2/T.4, white terminating codes.
const WHITE_TERMINATING: &[(&str, u16)] = &[
    ("00110101", 0), ("000111", 1), ("0111", 2), ("1000", 3),
    ("1011", 4), ("1100", 5), ("1110", 6), ("1111", 7),
    ("10011", 8), ("10100", 9), ("00111", 10), ("01000", 11),
    ("001000", 12), ("000011", 13), ("110100", 14), ("110101", 15),
    ("101010", 16), ("101011", 17), ("0100111", 18), ("0001100", 19),
    ("0001000", 20), ("0010111", 21), ("0000011", 22), ("0000100", 23),
    ("0101000", 24), ("0101011", 25), ("0010011", 26), ("0100100", 27),
    ("0011000", 28), ("00000010", 29), ("00000011", 30), ("00011010", 31),
    ("00011011", 32), ("00010010", 33), ("00010011", 34), ("00010100", 35),
    ("00010101", 36), ("00010110", 37), ("00010111", 38), ("00101000", 39),
    ("00101001", 40), ("00101010", 41), ("00101011", 42), ("00101100", 43),
    ("00101101", 44), ("00000100", 45), ("00000101", 46), ("00001010", 47),
    ("00001011", 48), ("01010010", 49), ("01010011", 50), ("01010100", 51),
    ("01010101", 52), ("00100100", 53), ("00100101", 54), ("01011000", 55),
    ("01011001", 56), ("01011010", 57), ("01011011", 58), ("01001010", 59),
    ("01001011", 60), ("00110010", 61), ("00110011", 62), ("00110100", 63),
];

/// Table 3a/T.4, white make-up codes.
const WHITE_MAKEUP: &[(&str, u16)] = &[
    ("11011", 64), ("10010", 128), ("010111", 192), ("0110111", 256),
    ("00110110", 320), ("00110111", 384), ("01100100", 448), ("01100101", 512),
    ("01101000", 576), ("01100111", 640), ("011001100", 704), ("011001101", 768),
    ("011010010", 832), ("011010011", 896), ("011010100", 960), ("011010101", 1024),
    ("011010110", 1088), ("011010111", 1152), ("011011000", 1216), ("011011001", 1280),
    ("011011010", 1344), ("011011011", 1408), ("010011000", 1472), ("010011001", 1536),
    ("010011010", 1600), ("011000", 1664), ("010011011", 1728),
];

/// Table 2/T.4, black terminating codes.
const BLACK_TERMINATING: &[(&str, u16)] = &[
    ("0000110111", 0), ("010", 1), ("11", 2), ("10", 3),
    ("011", 4), ("0011", 5), ("0010", 6), ("00011", 7),
    ("000101", 8), ("000100", 9), ("0000100", 10), ("0000101", 11),
    ("0000111", 12), ("00000100", 13), ("00000111", 14), ("000011000", 15),
    ("0000010111", 16), ("0000011000", 17), ("0000001000", 18), ("00001100111", 19),
    ("00001101000", 20), ("00001101100", 21), ("00000110111", 22), ("00000101000", 23),
    ("00000010111", 24), ("00000011000", 25), ("000011001010", 26), ("000011001011", 27),
    ("000011001100", 28), ("000011001101", 29), ("000001101000", 30), ("000001101001", 31),
    ("000001101010", 32), ("000001101011", 33), ("000011010010", 34), ("000011010011", 35),
    ("000011010100", 36), ("000011010101", 37), ("000011010110", 38), ("000011010111", 39),
    ("000001101100", 40), ("000001101101", 41), ("000011011010", 42), ("000011011011", 43),
    ("000001010100", 44), ("000001010101", 45), ("000001010110", 46), ("000001010111", 47),
    ("000001100100", 48), ("000001100101", 49), ("000001010010", 50), ("000001010011", 51),
    ("000000100100", 52), ("000000110111", 53), ("000000111000", 54), ("000000100111", 55),
    ("000000101000", 56), ("000001011000", 57), ("000001011001", 58), ("000000101011", 59),
    ("000000101100", 60), ("000001011010", 61), ("000001100110", 62), ("000001100111", 63),
];

/// Table 3a/T.4, black make-up codes.
const BLACK_MAKEUP: &[(&str, u16)] = &[
    ("0000001111", 64), ("000011001000", 128), ("000011001001", 192),
    ("000001011011", 256), ("000000110011", 320), ("000000110100", 384),
    ("000000110101", 448), ("0000001101100", 512), ("0000001101101", 576),
    ("0000001001010", 640), ("0000001001011", 704), ("0000001001100", 768),
    ("0000001001101", 832), ("0000001110010", 896), ("0000001110011", 960),
    ("0000001110100", 1024), ("0000001110101", 1088), ("0000001110110", 1152),
    ("0000001110111", 1216), ("0000001010010", 1280), ("0000001010011", 1344),
    ("0000001010100", 1408), ("0000001010101", 1472), ("0000001011010", 1536),
    ("0000001011011", 1600), ("0000001100100", 1664), ("0000001100101", 1728),
];

/// Table 3b/T.4, make-up codes shared by both colours.
const COMMON_MAKEUP: &[(&str, u16)] = &[
    ("00000001000", 1792), ("00000001100", 1856), ("00000001101", 1920),
    ("000000010010", 1984), ("000000010011", 2048), ("000000010100", 2112),
    ("000000010101", 2176), ("000000010110", 2240), ("000000010111", 2304),
    ("000000011100", 2368), ("000000011101", 2432), ("000000011110", 2496),
    ("000000011111", 2560),
];

/// Table 4/T.4, two-dimensional mode codes. Vertical modes are stored as
/// `5 + offset`.
const MODE_CODES: &[(&str, u16)] = &[
    ("0001", 0),
    ("001", 1),
    ("0000010", 2),
    ("000010", 3),
    ("010", 4),
    ("1", 5),
    ("011", 6),
    ("000011", 7),
    ("0000011", 8),
];

static WHITE_RUNS: [Node; RUN_NODES] = build_runs(WHITE_TERMINATING, WHITE_MAKEUP);
static BLACK_RUNS: [Node; RUN_NODES] = build_runs(BLACK_TERMINATING, BLACK_MAKEUP);
static MODES: [Node; MODE_NODES] = {
    let mut nodes = [Node {
        zero: NONE,
        one: NONE,
    }; MODE_NODES];
    let used = insert_all(&mut nodes, 1, MODE_CODES);
    assert!(used <= MODE_NODES);
    nodes
};
