//! Function pattern frame templates.
//!
//! A frame holds two parallel planes: module colors and a reservation mask
//! marking cells owned by function patterns or format/version information.
//! The template for a version is identical for every encode, so frames are
//! built once per version and memoized behind `OnceLock` slots.

use std::sync::OnceLock;

use crate::encoder::{config, format};
use crate::models::{ModuleMatrix, Version};

/// Module grid under construction: colors plus a reservation plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    version: Version,
    modules: ModuleMatrix,
    reserved: ModuleMatrix,
}

static NORMAL_TEMPLATES: [OnceLock<Frame>; 41] = [const { OnceLock::new() }; 41];
static MICRO_TEMPLATES: [OnceLock<Frame>; 5] = [const { OnceLock::new() }; 5];

impl Frame {
    /// Get the function-pattern skeleton for a version, from the cache when
    /// enabled
    pub fn template(version: Version) -> Frame {
        if !config::frame_cache_enabled() {
            return Self::build(version);
        }
        let slot = match version {
            Version::Normal(v) => &NORMAL_TEMPLATES[v as usize],
            Version::Micro(v) => &MICRO_TEMPLATES[v as usize],
        };
        slot.get_or_init(|| Self::build(version)).clone()
    }

    fn build(version: Version) -> Frame {
        let width = version.width();
        let mut frame = Frame {
            version,
            modules: ModuleMatrix::new(width),
            reserved: ModuleMatrix::new(width),
        };
        match version {
            Version::Normal(v) => frame.build_normal(v),
            Version::Micro(_) => frame.build_micro(),
        }
        frame
    }

    fn build_normal(&mut self, version: u8) {
        let w = self.width();

        self.draw_finder(0, 0);
        self.draw_finder(w - 7, 0);
        self.draw_finder(0, w - 7);

        // Timing patterns between the separators, dark at even coordinates
        for i in 8..w - 8 {
            self.set_function(i, 6, i % 2 == 0);
            self.set_function(6, i, i % 2 == 0);
        }

        let positions = alignment_pattern_positions(version);
        let last = positions.len().saturating_sub(1);
        for (i, &cx) in positions.iter().enumerate() {
            for (j, &cy) in positions.iter().enumerate() {
                // the three finder corners have no alignment pattern
                if (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0) {
                    continue;
                }
                self.draw_alignment(cx, cy);
            }
        }

        // Format information cells are reserved now and written after
        // masking; the dark module above the bottom-left finder is fixed
        for i in 0..9 {
            if i != 6 {
                self.set_function(8, i, false);
                self.set_function(i, 8, false);
            }
        }
        for i in 0..8 {
            self.set_function(w - 1 - i, 8, false);
            self.set_function(8, w - 1 - i, false);
        }
        self.set_function(8, w - 8, true);

        if version >= 7 {
            let bits = format::version_bits(version);
            for i in 0..18 {
                let bit = (bits >> i) & 1 == 1;
                let a = w - 11 + i % 3;
                let b = i / 3;
                self.set_function(a, b, bit);
                self.set_function(b, a, bit);
            }
        }
    }

    fn build_micro(&mut self) {
        let w = self.width();

        self.draw_finder(0, 0);

        // Timing patterns along the top row and left column
        for i in 8..w {
            self.set_function(i, 0, i % 2 == 0);
            self.set_function(0, i, i % 2 == 0);
        }

        // Format information around the finder
        for y in 1..9 {
            self.set_function(8, y, false);
        }
        for x in 1..8 {
            self.set_function(x, 8, false);
        }
    }

    /// Draw a 7x7 finder pattern with its top-left corner at (x0, y0),
    /// reserving the separator border around it as well
    fn draw_finder(&mut self, x0: usize, y0: usize) {
        let w = self.width();
        // separator: one-module light border, clipped to the symbol
        let sx = x0.saturating_sub(1);
        let sy = y0.saturating_sub(1);
        for y in sy..(y0 + 8).min(w) {
            for x in sx..(x0 + 8).min(w) {
                self.set_function(x, y, false);
            }
        }
        for dy in 0..7usize {
            for dx in 0..7usize {
                let dist = dx.abs_diff(3).max(dy.abs_diff(3));
                self.set_function(x0 + dx, y0 + dy, dist != 2);
            }
        }
    }

    /// Draw a 5x5 alignment pattern centered at (cx, cy)
    fn draw_alignment(&mut self, cx: usize, cy: usize) {
        for dy in 0..5usize {
            for dx in 0..5usize {
                let dist = dx.abs_diff(2).max(dy.abs_diff(2));
                self.set_function(cx - 2 + dx, cy - 2 + dy, dist != 1);
            }
        }
    }

    fn set_function(&mut self, x: usize, y: usize, dark: bool) {
        self.modules.set(x, y, dark);
        self.reserved.set(x, y, true);
    }

    /// Symbol width in modules
    pub fn width(&self) -> usize {
        self.modules.width()
    }

    /// The version this frame was built for
    pub fn version(&self) -> Version {
        self.version
    }

    /// Check if (x, y) belongs to a function pattern or reserved area
    pub fn is_reserved(&self, x: usize, y: usize) -> bool {
        self.reserved.get(x, y)
    }

    /// Deposit a data bit; must not land on a reserved cell
    pub fn set_data(&mut self, x: usize, y: usize, dark: bool) {
        debug_assert!(!self.is_reserved(x, y));
        self.modules.set(x, y, dark);
    }

    /// The color plane
    pub fn modules(&self) -> &ModuleMatrix {
        &self.modules
    }

    /// The reservation plane
    pub fn reserved(&self) -> &ModuleMatrix {
        &self.reserved
    }

    /// Number of cells available to data and ECC bits
    pub fn data_module_count(&self) -> usize {
        let w = self.width();
        w * w - self.reserved.count_dark()
    }
}

/// Alignment pattern center coordinates for a regular version
pub fn alignment_pattern_positions(version: u8) -> Vec<usize> {
    if version == 1 {
        return Vec::new();
    }
    let num_align = (version / 7 + 2) as usize;
    let size = 17 + 4 * version as usize;
    let step = if version == 32 {
        26
    } else {
        let numerator = version as usize * 4 + num_align * 2 + 1;
        let denom = num_align * 2 - 2;
        numerator / denom * 2
    };

    let mut positions = vec![6; num_align];
    let mut pos = size - 7;
    for slot in positions[1..].iter_mut().rev() {
        *slot = pos;
        pos = pos.saturating_sub(step);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::tables;

    #[test]
    fn test_alignment_positions() {
        assert!(alignment_pattern_positions(1).is_empty());
        assert_eq!(alignment_pattern_positions(2), vec![6, 18]);
        assert_eq!(alignment_pattern_positions(7), vec![6, 22, 38]);
        assert_eq!(alignment_pattern_positions(32), vec![6, 34, 60, 86, 112, 138]);
        assert_eq!(alignment_pattern_positions(40), vec![6, 30, 58, 86, 114, 142, 170]);
    }

    #[test]
    fn test_data_module_counts_match_tables() {
        for v in 1..=40u8 {
            let frame = Frame::build(Version::Normal(v));
            assert_eq!(
                frame.data_module_count(),
                tables::raw_data_modules(v),
                "version {v}"
            );
        }
    }

    #[test]
    fn test_micro_data_module_counts() {
        let expected = [36, 80, 132, 192];
        for v in 1..=4u8 {
            let frame = Frame::build(Version::Micro(v));
            assert_eq!(frame.data_module_count(), expected[v as usize - 1]);
        }
    }

    #[test]
    fn test_finder_and_timing_colors() {
        let frame = Frame::build(Version::Normal(1));
        // finder center and border are dark, ring is light
        assert!(frame.modules().get(3, 3));
        assert!(frame.modules().get(0, 0));
        assert!(!frame.modules().get(1, 1));
        // separator is light
        assert!(!frame.modules().get(7, 7));
        // timing alternates starting dark at the even coordinate
        assert!(frame.modules().get(8, 6));
        assert!(!frame.modules().get(9, 6));
        assert!(frame.modules().get(6, 10));
        // dark module above the bottom-left finder
        assert!(frame.modules().get(8, 13));
        assert!(frame.is_reserved(8, 13));
    }

    #[test]
    fn test_micro_frame_layout() {
        let frame = Frame::build(Version::Micro(1));
        assert_eq!(frame.width(), 11);
        assert!(frame.modules().get(0, 0));
        // timing along row 0 and column 0
        assert!(frame.modules().get(8, 0));
        assert!(!frame.modules().get(9, 0));
        assert!(frame.modules().get(10, 0));
        assert!(frame.modules().get(0, 8));
        // format cells reserved but light until masking
        assert!(frame.is_reserved(8, 1));
        assert!(frame.is_reserved(7, 8));
        assert!(!frame.modules().get(8, 1));
    }

    #[test]
    fn test_template_cache_consistency() {
        let a = Frame::template(Version::Normal(3));
        let b = Frame::template(Version::Normal(3));
        assert_eq!(a, b);
        assert_eq!(a, Frame::build(Version::Normal(3)));
    }
}
