//! Mask application, penalty scoring and selection.
//!
//! Every candidate mask is applied to a copy of the placed frame, the
//! format information for that mask is written, and the copy is scored.
//! Regular symbols minimize the four-rule penalty of the specification;
//! Micro symbols maximize an edge-darkness score instead. Evaluation order
//! is fixed, and only a strictly better score replaces the incumbent, so
//! ties always resolve to the lowest mask index.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::encoder::config;
use crate::encoder::format;
use crate::encoder::frame::Frame;
use crate::models::{ECLevel, ModuleMatrix};

/// Candidate masks for regular symbols
pub const NUM_MASKS: u8 = 8;
/// Candidate masks for Micro symbols
pub const NUM_MICRO_MASKS: u8 = 4;

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// Micro masks are the regular patterns 1, 4, 6 and 7
const MICRO_MASK_MAP: [u8; 4] = [1, 4, 6, 7];

/// Whether the regular mask `pattern` inverts the module at (x, y)
pub fn mask_bit(pattern: u8, x: usize, y: usize) -> bool {
    match pattern {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => (x * y) % 2 + (x * y) % 3 == 0,
        6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
        7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
        _ => unreachable!("mask index out of range"),
    }
}

/// Whether the Micro mask `pattern` (0-3) inverts the module at (x, y)
pub fn micro_mask_bit(pattern: u8, x: usize, y: usize) -> bool {
    mask_bit(MICRO_MASK_MAP[pattern as usize], x, y)
}

/// Masked copy of the frame's color plane; function patterns are untouched
pub fn apply(frame: &Frame, pattern: u8) -> ModuleMatrix {
    let micro = frame.version().is_micro();
    let mut modules = frame.modules().clone();
    let w = frame.width();
    for y in 0..w {
        for x in 0..w {
            if frame.is_reserved(x, y) {
                continue;
            }
            let invert = if micro {
                micro_mask_bit(pattern, x, y)
            } else {
                mask_bit(pattern, x, y)
            };
            if invert {
                modules.toggle(x, y);
            }
        }
    }
    modules
}

/// Total penalty of a masked symbol under rules N1-N4
pub fn penalty(modules: &ModuleMatrix) -> u32 {
    let w = modules.width();
    let mut score = 0;

    // N1 (runs of 5 or more) and N3 (finder-like 1:1:3:1:1 sequences),
    // both over every row and every column
    let mut runs = Vec::with_capacity(w);
    for line in 0..w {
        for horizontal in [true, false] {
            runs.clear();
            for i in 0..w {
                let dark = if horizontal {
                    modules.get(i, line)
                } else {
                    modules.get(line, i)
                };
                match runs.last_mut() {
                    Some((color, len)) if *color == dark => *len += 1,
                    _ => runs.push((dark, 1usize)),
                }
            }
            score += line_penalty(&runs);
        }
    }

    // N2: 2x2 blocks of uniform color
    for y in 0..w - 1 {
        for x in 0..w - 1 {
            let color = modules.get(x, y);
            if color == modules.get(x + 1, y)
                && color == modules.get(x, y + 1)
                && color == modules.get(x + 1, y + 1)
            {
                score += PENALTY_N2;
            }
        }
    }

    // N4: deviation of the dark-module ratio from 50%
    let total = (w * w) as i64;
    let ratio = modules.count_dark() as i64 * 100 / total;
    score += (ratio - 50).unsigned_abs() as u32 / 5 * PENALTY_N4;

    score
}

fn line_penalty(runs: &[(bool, usize)]) -> u32 {
    let mut score = 0;
    for (i, &(dark, len)) in runs.iter().enumerate() {
        if len >= 5 {
            score += PENALTY_N1 + (len as u32 - 5);
        }
        // a dark run of 3 units flanked by 1-unit runs, with a light run of
        // at least 4 units (or the symbol edge) on one side
        if dark && len % 3 == 0 && i >= 2 && i + 2 < runs.len() {
            let unit = len / 3;
            if runs[i - 2].1 == unit
                && runs[i - 1].1 == unit
                && runs[i + 1].1 == unit
                && runs[i + 2].1 == unit
            {
                let border_left = i == 2 || runs[i - 3].1 >= 4 * unit;
                let border_right = i + 3 >= runs.len() || runs[i + 3].1 >= 4 * unit;
                if border_left || border_right {
                    score += PENALTY_N3;
                }
            }
        }
    }
    score
}

/// Edge-darkness score for Micro symbols; higher is better
pub fn micro_score(modules: &ModuleMatrix) -> u32 {
    let w = modules.width();
    let mut bottom = 0u32;
    let mut right = 0u32;
    for i in 1..w {
        bottom += u32::from(modules.get(i, w - 1));
        right += u32::from(modules.get(w - 1, i));
    }
    bottom.min(right) * 16 + bottom.max(right)
}

/// Scores candidate masks and picks the winner
pub struct MaskEvaluator;

impl MaskEvaluator {
    /// Apply every candidate mask, write its format information and score
    /// it; return the winning mask index and the finished module plane.
    pub fn select(frame: &Frame, level: ECLevel) -> (u8, ModuleMatrix) {
        let version = frame.version();
        let micro = version.is_micro();
        let count = if micro { NUM_MICRO_MASKS } else { NUM_MASKS };

        let candidate = |pattern: u8| {
            let mut modules = apply(frame, pattern);
            format::write_format(&mut modules, version, level, pattern);
            let score = if micro {
                micro_score(&modules)
            } else {
                penalty(&modules)
            };
            trace!(pattern, score, micro, "scored mask candidate");
            (pattern, score, modules)
        };

        let min_width = config::parallel_mask_min_width();
        let scored: Vec<(u8, u32, ModuleMatrix)> = if min_width > 0 && frame.width() >= min_width {
            (0..count).into_par_iter().map(candidate).collect()
        } else {
            (0..count).map(candidate).collect()
        };

        let mut winner: Option<(u8, u32, ModuleMatrix)> = None;
        for entry in scored {
            let better = match &winner {
                None => true,
                // strictly better only, so the lowest index wins ties
                Some((_, best, _)) => {
                    if micro {
                        entry.1 > *best
                    } else {
                        entry.1 < *best
                    }
                }
            };
            if better {
                winner = Some(entry);
            }
        }
        // count >= 1, so a winner always exists
        let (pattern, score, modules) = winner.expect("no mask candidates");
        debug!(pattern, score, "selected mask");
        (pattern, modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Version;

    #[test]
    fn test_mask_formulas() {
        assert!(mask_bit(0, 0, 0));
        assert!(!mask_bit(0, 1, 0));
        assert!(mask_bit(1, 5, 0));
        assert!(!mask_bit(1, 5, 1));
        assert!(mask_bit(2, 3, 7));
        assert!(mask_bit(3, 1, 2));
        assert!(mask_bit(7, 0, 0));
    }

    #[test]
    fn test_micro_masks_map_to_regular() {
        for x in 0..13 {
            for y in 0..13 {
                assert_eq!(micro_mask_bit(0, x, y), mask_bit(1, x, y));
                assert_eq!(micro_mask_bit(3, x, y), mask_bit(7, x, y));
            }
        }
    }

    #[test]
    fn test_apply_skips_reserved() {
        let frame = Frame::template(Version::Normal(1));
        let masked = apply(&frame, 0);
        let w = frame.width();
        for y in 0..w {
            for x in 0..w {
                if frame.is_reserved(x, y) {
                    assert_eq!(masked.get(x, y), frame.modules().get(x, y));
                }
            }
        }
    }

    #[test]
    fn test_penalty_checkerboard_is_minimal() {
        let w = 21;
        let mut modules = ModuleMatrix::new(w);
        for y in 0..w {
            for x in 0..w {
                modules.set(x, y, (x + y) % 2 == 0);
            }
        }
        assert_eq!(penalty(&modules), 0);
    }

    #[test]
    fn test_penalty_uniform() {
        let w = 21;
        let modules = ModuleMatrix::new(w);
        // every row and column: one run of 21 -> 3 + 16; every 2x2 block
        // uniform; all-light ratio deviates fully from 50%
        let n1 = (3 + 16) * 2 * w as u32;
        let n2 = 3 * (w as u32 - 1) * (w as u32 - 1);
        let n4 = 10 * 10;
        assert_eq!(penalty(&modules), n1 + n2 + n4);
    }

    #[test]
    fn test_finder_like_pattern_penalized() {
        let runs = vec![
            (false, 4),
            (true, 1),
            (false, 1),
            (true, 3),
            (false, 1),
            (true, 1),
            (false, 10),
        ];
        assert_eq!(line_penalty(&runs), PENALTY_N3 + PENALTY_N1 + 5);
    }

    #[test]
    fn test_finder_like_needs_border() {
        // only 3 light modules on either side: no penalty
        let runs = vec![
            (false, 3),
            (true, 1),
            (false, 1),
            (true, 3),
            (false, 1),
            (true, 1),
            (false, 3),
        ];
        assert_eq!(line_penalty(&runs), 0);
    }

    #[test]
    fn test_micro_score() {
        let mut modules = ModuleMatrix::new(11);
        for i in 1..11 {
            modules.set(i, 10, true); // 10 dark on the bottom edge
        }
        modules.set(10, 5, true); // 1 dark on the right edge (plus corner)
        // corner (10,10) counts for both edges
        assert_eq!(micro_score(&modules), 2 * 16 + 10);
    }

    #[test]
    fn test_selection_deterministic() {
        let mut frame = Frame::template(Version::Normal(1));
        let bits: Vec<bool> = (0..208).map(|i| i % 3 == 0).collect();
        crate::encoder::placement::ZigzagFiller::place(&mut frame, &bits);
        let (mask_a, modules_a) = MaskEvaluator::select(&frame, ECLevel::L);
        let (mask_b, modules_b) = MaskEvaluator::select(&frame, ECLevel::L);
        assert_eq!(mask_a, mask_b);
        assert_eq!(modules_a, modules_b);
    }
}
