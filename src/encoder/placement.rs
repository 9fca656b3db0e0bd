//! Zig-zag codeword placement.
//!
//! Bits are deposited along the standard scan path: starting at the bottom
//! right corner, walking two-column pairs upward then downward, skipping the
//! vertical timing column of regular symbols and every reserved cell. Micro
//! symbols keep their timing patterns on row/column 0, outside the path.

use crate::encoder::frame::Frame;
use crate::models::Version;

/// Expanded placement bits: one entry per module to deposit.
///
/// Regular symbols place all 8 bits of every codeword MSB first. In Micro
/// M1/M3 the final data codeword is 4 bits wide, so only its high nibble is
/// placed.
pub fn codeword_bits(codewords: &[u8], version: Version, data_len: usize) -> Vec<bool> {
    let half_index = match version {
        Version::Micro(v) if v == 1 || v == 3 => Some(data_len - 1),
        _ => None,
    };
    let mut bits = Vec::with_capacity(codewords.len() * 8);
    for (i, &cw) in codewords.iter().enumerate() {
        let count = if Some(i) == half_index { 4 } else { 8 };
        for bit in 0..count {
            bits.push((cw >> (7 - bit)) & 1 == 1);
        }
    }
    bits
}

/// Walks the scan path and deposits codeword bits into data modules
pub struct ZigzagFiller;

impl ZigzagFiller {
    /// Place `bits` into the frame's non-reserved modules in path order.
    ///
    /// Path positions beyond the bit stream stay light; these are the
    /// remainder bits of versions whose module count is not a codeword
    /// multiple. A path that does not visit exactly the frame's data
    /// module count is an internal consistency error.
    pub fn place(frame: &mut Frame, bits: &[bool]) {
        let width = frame.width() as i32;
        let skip_col = if frame.version().is_micro() { -1 } else { 6 };

        let mut index = 0;
        let mut visited = 0;
        let mut upward = true;
        let mut col = width - 1;

        while col > 0 {
            if col == skip_col {
                col -= 1;
                continue;
            }
            for vert in 0..width {
                let row = if upward { width - 1 - vert } else { vert };
                for c in [col, col - 1] {
                    let (x, y) = (c as usize, row as usize);
                    if frame.is_reserved(x, y) {
                        continue;
                    }
                    visited += 1;
                    if index < bits.len() {
                        frame.set_data(x, y, bits[index]);
                        index += 1;
                    }
                }
            }
            upward = !upward;
            col -= 2;
        }

        assert_eq!(
            visited,
            frame.data_module_count(),
            "placement path length mismatch"
        );
        assert_eq!(index, bits.len(), "codeword bits exceed path capacity");
        debug_assert!(visited - index < 8, "more than a codeword of remainder");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::tables;
    use crate::models::ECLevel;

    #[test]
    fn test_codeword_bit_expansion() {
        let bits = codeword_bits(&[0b1010_0001], Version::Normal(1), 1);
        assert_eq!(
            bits,
            vec![true, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn test_micro_half_codeword() {
        // M1: 3 data codewords, the last contributing only its high nibble
        let bits = codeword_bits(&[0xFF, 0xFF, 0xF0, 0xAA, 0xAA], Version::Micro(1), 3);
        assert_eq!(bits.len(), 2 * 8 + 4 + 2 * 8);
        assert!(bits[16..20].iter().all(|&b| b));
    }

    #[test]
    fn test_place_visits_every_data_module() {
        let mut frame = Frame::template(Version::Normal(1));
        let bits = vec![true; 26 * 8];
        ZigzagFiller::place(&mut frame, &bits);
        // every non-reserved module is now dark
        let w = frame.width();
        for y in 0..w {
            for x in 0..w {
                if !frame.is_reserved(x, y) {
                    assert!(frame.modules().get(x, y), "module ({x},{y}) not placed");
                }
            }
        }
    }

    #[test]
    fn test_first_bits_land_bottom_right() {
        let mut frame = Frame::template(Version::Normal(1));
        let mut bits = vec![false; 26 * 8];
        bits[0] = true;
        bits[1] = true;
        bits[2] = true;
        ZigzagFiller::place(&mut frame, &bits);
        // upward scan of the rightmost column pair: (20,20), (19,20), (20,19)
        assert!(frame.modules().get(20, 20));
        assert!(frame.modules().get(19, 20));
        assert!(frame.modules().get(20, 19));
        assert!(!frame.modules().get(19, 19));
    }

    #[test]
    fn test_remainder_bits_stay_light() {
        // version 2 has 359 data modules for 44 codewords: 7 remainder bits
        let mut frame = Frame::template(Version::Normal(2));
        let codewords = vec![0xFFu8; tables::total_codewords(2)];
        let bits = codeword_bits(&codewords, Version::Normal(2), 26);
        assert_eq!(frame.data_module_count() - bits.len(), 7);
        ZigzagFiller::place(&mut frame, &bits);
    }

    #[test]
    fn test_micro_path_has_no_skip_column() {
        let mut frame = Frame::template(Version::Micro(2));
        let cap = tables::micro_data_bits(2, ECLevel::L).unwrap() + 5 * 8;
        let bits = vec![true; cap];
        ZigzagFiller::place(&mut frame, &bits);
        assert!(frame.modules().get(12, 12));
        assert!(frame.modules().get(1, 12));
    }
}
