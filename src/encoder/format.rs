//! Format and version information words.
//!
//! Format information carries the error correction level and mask index
//! (regular) or the symbol number and mask index (Micro), protected by a
//! BCH(15,5) code. Versions 7 and up additionally carry an 18-bit
//! BCH(18,6) version word.

use crate::models::{ECLevel, ModuleMatrix, Version};

const FORMAT_GENERATOR: u32 = 0x537;
const FORMAT_MASK: u32 = 0x5412;
const MICRO_FORMAT_MASK: u32 = 0x4445;
const VERSION_GENERATOR: u32 = 0x1F25;

/// BCH(15,5) remainder of the 5 data bits
fn bch_format_remainder(data: u32) -> u32 {
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_GENERATOR);
    }
    rem
}

/// 15-bit format word for a regular symbol: level bits, mask index, BCH
/// remainder, XOR masked
pub fn format_bits(level: ECLevel, mask: u8) -> u16 {
    debug_assert!(mask < 8);
    let data = u32::from(level.format_bits()) << 3 | u32::from(mask);
    ((data << 10 | bch_format_remainder(data)) ^ FORMAT_MASK) as u16
}

/// Symbol numbers identifying (version, level) pairs in Micro format info
fn micro_symbol_number(version: u8, level: ECLevel) -> u32 {
    match (version, level) {
        (1, _) => 0,
        (2, ECLevel::L) => 1,
        (2, ECLevel::M) => 2,
        (3, ECLevel::L) => 3,
        (3, ECLevel::M) => 4,
        (4, ECLevel::L) => 5,
        (4, ECLevel::M) => 6,
        (4, ECLevel::Q) => 7,
        // combinations rejected before a frame is ever built
        _ => unreachable!("invalid Micro version/level"),
    }
}

/// 15-bit format word for a Micro symbol
pub fn micro_format_bits(version: u8, level: ECLevel, mask: u8) -> u16 {
    debug_assert!(mask < 4);
    let data = micro_symbol_number(version, level) << 2 | u32::from(mask);
    ((data << 10 | bch_format_remainder(data)) ^ MICRO_FORMAT_MASK) as u16
}

/// 18-bit version word for regular versions 7-40
pub fn version_bits(version: u8) -> u32 {
    debug_assert!((7..=40).contains(&version));
    let ver = u32::from(version);
    let mut rem = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * VERSION_GENERATOR);
    }
    ver << 12 | rem
}

/// Write the format word into the reserved cells of a masked module plane
pub fn write_format(
    modules: &mut ModuleMatrix,
    version: Version,
    level: ECLevel,
    mask: u8,
) {
    match version {
        Version::Normal(_) => {
            let bits = u32::from(format_bits(level, mask));
            let bit = |i: usize| (bits >> i) & 1 == 1;
            let w = modules.width();

            // around the top-left finder
            for i in 0..6 {
                modules.set(8, i, bit(i));
            }
            modules.set(8, 7, bit(6));
            modules.set(8, 8, bit(7));
            modules.set(7, 8, bit(8));
            for i in 9..15 {
                modules.set(14 - i, 8, bit(i));
            }
            // second copy along the opposite edges
            for i in 0..8 {
                modules.set(w - 1 - i, 8, bit(i));
            }
            for i in 8..15 {
                modules.set(8, w - 15 + i, bit(i));
            }
            modules.set(8, w - 8, true);
        }
        Version::Micro(v) => {
            let bits = u32::from(micro_format_bits(v, level, mask));
            let bit = |i: usize| (bits >> i) & 1 == 1;

            for i in 0..8 {
                modules.set(8, i + 1, bit(i));
            }
            for i in 8..15 {
                modules.set(15 - i, 8, bit(i));
            }
        }
    }
}
