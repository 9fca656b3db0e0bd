//! Capacity and structure tables from the QR Code specification (Model 2
//! and Micro). The normative source of truth for every size decision the
//! pipeline makes: codeword capacities, error-correction block shapes,
//! mode/length indicator widths and terminator lengths.

use crate::models::{ECLevel, Mode, Version};

// Tables from the QR Code specification (Model 2) via Nayuki QR Code generator.
// Index: [ec_level][version]
const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

const NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/// Length indicator widths for regular QR, by version bucket 1-9 / 10-26 / 27-40.
/// Rows: Numeric, Alphanumeric, Byte, Kanji.
const LENGTH_BITS: [[usize; 3]; 4] = [[10, 12, 14], [9, 11, 13], [8, 16, 16], [8, 10, 12]];

/// Length indicator widths for Micro QR, by version M1-M4 (0 = mode unavailable).
const MICRO_LENGTH_BITS: [[usize; 4]; 4] = [
    [3, 4, 5, 6], // Numeric
    [0, 3, 4, 5], // Alphanumeric
    [0, 0, 4, 5], // Byte
    [0, 0, 3, 4], // Kanji
];

/// Total data+ECC capacity of each Micro version, in bits.
const MICRO_TOTAL_BITS: [usize; 4] = [36, 80, 132, 192];

/// ECC codewords per Micro version and level (0 = invalid combination).
/// Columns: L, M, Q, H.
const MICRO_ECC_CODEWORDS: [[usize; 4]; 4] = [
    [2, 0, 0, 0],  // M1
    [5, 6, 0, 0],  // M2
    [6, 8, 0, 0],  // M3
    [8, 10, 14, 0], // M4
];

fn mode_row(mode: Mode) -> usize {
    match mode {
        Mode::Numeric => 0,
        Mode::Alphanumeric => 1,
        Mode::Byte => 2,
        Mode::Kanji => 3,
        // Structured Append headers carry no length indicator
        Mode::StructuredAppend => 0,
    }
}

/// Number of modules available for data and ECC in a regular symbol
pub fn raw_data_modules(version: u8) -> usize {
    let ver = usize::from(version);
    let mut result = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let numalign = ver / 7 + 2;
        result -= (25 * numalign - 10) * numalign - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    result
}

/// Total codewords (data + ECC) of a regular symbol
pub fn total_codewords(version: u8) -> usize {
    raw_data_modules(version) / 8
}

/// Data codewords of a regular symbol at the given level
pub fn data_codewords(version: u8, level: ECLevel) -> usize {
    let ecc = ECC_CODEWORDS_PER_BLOCK[level.index()][version as usize] as usize;
    let blocks = NUM_ERROR_CORRECTION_BLOCKS[level.index()][version as usize] as usize;
    total_codewords(version) - ecc * blocks
}

/// Error-correction block shape of a regular symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlocks {
    /// Number of RS blocks
    pub num_blocks: usize,
    /// ECC codewords appended to every block
    pub ecc_per_block: usize,
    /// Total codewords (data + ECC) across all blocks
    pub total: usize,
}

impl EcBlocks {
    /// Blocks carrying one data codeword less than the rest (they come first)
    pub fn short_blocks(&self) -> usize {
        self.num_blocks - self.total % self.num_blocks
    }

    /// Data codewords in a short block
    pub fn short_data_len(&self) -> usize {
        self.total / self.num_blocks - self.ecc_per_block
    }

    /// Data codewords in block `i`
    pub fn data_len(&self, i: usize) -> usize {
        self.short_data_len() + usize::from(i >= self.short_blocks())
    }
}

/// Look up the RS block shape for a regular version/level
pub fn ec_blocks(version: u8, level: ECLevel) -> EcBlocks {
    debug_assert!((1..=40).contains(&version));
    EcBlocks {
        num_blocks: NUM_ERROR_CORRECTION_BLOCKS[level.index()][version as usize] as usize,
        ecc_per_block: ECC_CODEWORDS_PER_BLOCK[level.index()][version as usize] as usize,
        total: total_codewords(version),
    }
}

/// ECC codewords of a Micro symbol, `None` for invalid version/level pairs.
///
/// M1 has no selectable level (only L is accepted), M2/M3 allow L and M,
/// M4 allows L, M and Q. H is never valid for Micro symbols.
pub fn micro_ecc_codewords(version: u8, level: ECLevel) -> Option<usize> {
    debug_assert!((1..=4).contains(&version));
    match MICRO_ECC_CODEWORDS[version as usize - 1][level.index()] {
        0 => None,
        n => Some(n),
    }
}

/// Data capacity of a Micro symbol in bits (not byte aligned for M1/M3)
pub fn micro_data_bits(version: u8, level: ECLevel) -> Option<usize> {
    let ecc = micro_ecc_codewords(version, level)?;
    Some(MICRO_TOTAL_BITS[version as usize - 1] - ecc * 8)
}

/// Data codewords of a Micro symbol; the last one is 4 bits wide in M1/M3
pub fn micro_data_codewords(version: u8, level: ECLevel) -> Option<usize> {
    Some((micro_data_bits(version, level)? + 4) / 8)
}

/// Data capacity in bits for any version/level pair, `None` if invalid
pub fn data_capacity_bits(version: Version, level: ECLevel) -> Option<usize> {
    match version {
        Version::Normal(v) => Some(data_codewords(v, level) * 8),
        Version::Micro(v) => micro_data_bits(v, level),
    }
}

/// Width of the mode indicator field
pub fn mode_indicator_bits(version: Version) -> usize {
    match version {
        Version::Normal(_) => 4,
        Version::Micro(v) => v as usize - 1,
    }
}

/// Width of the length indicator field for a mode at a version
pub fn length_indicator_bits(mode: Mode, version: Version) -> usize {
    match version {
        Version::Normal(v) => {
            let bucket = if v <= 9 {
                0
            } else if v <= 26 {
                1
            } else {
                2
            };
            LENGTH_BITS[mode_row(mode)][bucket]
        }
        Version::Micro(v) => MICRO_LENGTH_BITS[mode_row(mode)][v as usize - 1],
    }
}

/// Length of the zero terminator appended after the last segment
pub fn terminator_bits(version: Version) -> usize {
    match version {
        Version::Normal(_) => 4,
        Version::Micro(v) => 2 * v as usize + 1,
    }
}

/// Check whether a mode can appear in a symbol of this version
pub fn mode_available(mode: Mode, version: Version) -> bool {
    match (mode, version) {
        (Mode::StructuredAppend, Version::Normal(_)) => true,
        (Mode::StructuredAppend, Version::Micro(_)) => false,
        (_, Version::Normal(_)) => true,
        (m, v @ Version::Micro(_)) => length_indicator_bits(m, v) > 0,
    }
}

/// Largest payload (in bytes) a single segment of this mode can carry.
///
/// The character count field bounds the segment size; Kanji counts
/// characters, so the byte limit is twice the field maximum.
pub fn maximum_bytes(mode: Mode, version: Version) -> usize {
    let bits = length_indicator_bits(mode, version);
    if bits == 0 {
        return 0;
    }
    let words = (1usize << bits) - 1;
    if mode == Mode::Kanji { words * 2 } else { words }
}

/// Smallest regular version whose data capacity holds `words` codewords
pub fn minimum_version(words: usize, level: ECLevel) -> Option<u8> {
    (1..=40).find(|&v| data_codewords(v, level) >= words)
}
