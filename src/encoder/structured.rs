//! Structured Append: distributing one input across up to 16 linked
//! symbols that share a parity byte.
//!
//! Splitting is a sequential greedy pass: segments are packed against a
//! per-symbol bit budget (data capacity minus the 20-bit header), and a
//! segment that would overflow is cut at the largest prefix that still
//! fits, using the inverse of the per-mode length formulas.

use std::collections::VecDeque;

use tracing::debug;

use crate::encoder::EncodeError;
use crate::encoder::input::QrInput;
use crate::encoder::segment::Segment;
use crate::encoder::tables;
use crate::models::{Mode, QrSymbol, Version, VersionSpec};

/// Bits consumed by a Structured Append header segment
const HEADER_BITS: usize = 20;
/// Hard cap on the number of linked symbols
const MAX_SYMBOLS: usize = 16;

/// Ordered set of accumulators produced by a Structured Append split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredSet {
    inputs: Vec<QrInput>,
    parity: u8,
}

impl StructuredSet {
    /// The member accumulators, each starting with its header segment
    pub fn inputs(&self) -> &[QrInput] {
        &self.inputs
    }

    /// Number of symbols in the set
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// True when the set holds no symbols
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Parity byte shared by every member: XOR of all original payload bytes
    pub fn parity(&self) -> u8 {
        self.parity
    }

    /// Encode every member into its symbol, in sequence order
    pub fn encode(&self) -> Result<Vec<QrSymbol>, EncodeError> {
        self.inputs.iter().map(QrInput::encode).collect()
    }
}

impl QrInput {
    /// Split this input into a Structured Append set.
    ///
    /// Requires an explicit regular version: the per-symbol budget is fixed
    /// by it, and every resulting symbol is encoded at exactly that version.
    pub fn split_structured(self) -> Result<StructuredSet, EncodeError> {
        let version = match self.spec() {
            VersionSpec::Normal(v) => Version::Normal(v),
            VersionSpec::Auto => return Err(EncodeError::InvalidVersion(0)),
            VersionSpec::MicroAuto | VersionSpec::Micro(_) => {
                return Err(EncodeError::InvalidVersion(self.spec().floor().number()));
            }
        };
        let level = self.level();
        let capacity = tables::data_capacity_bits(version, level)
            .ok_or(EncodeError::InvalidLevel { level })?;
        if capacity <= HEADER_BITS {
            return Err(EncodeError::CapacityExceeded {
                needed_bits: HEADER_BITS,
                capacity_bits: capacity,
            });
        }
        let budget = capacity - HEADER_BITS;
        let parity = self.parity();

        let mut members: Vec<Vec<Segment>> = vec![Vec::new()];
        let mut used = 0;
        let mut queue: VecDeque<Segment> = self.into_segments().into();
        while let Some(seg) = queue.pop_front() {
            let bits = segment_bits(&seg, version);
            if used + bits <= budget {
                used += bits;
                members.last_mut().expect("at least one member").push(seg);
                continue;
            }

            let fit = prefix_that_fits(seg.mode(), version, budget - used);
            if fit == 0 || fit >= seg.data().len() {
                // not even a one-character prefix pays for its header here;
                // retry the whole segment in a fresh symbol
                if members.last().is_none_or(Vec::is_empty) {
                    return Err(EncodeError::CapacityExceeded {
                        needed_bits: bits,
                        capacity_bits: budget,
                    });
                }
                queue.push_front(seg);
            } else {
                let (head, tail) = seg.split_at(fit);
                members.last_mut().expect("at least one member").push(head);
                queue.push_front(tail);
            }
            members.push(Vec::new());
            used = 0;
            if members.len() > MAX_SYMBOLS {
                return Err(EncodeError::StructuredRangeExceeded(members.len()));
            }
        }

        let total = members.len();
        let mut inputs = Vec::with_capacity(total);
        for (i, segments) in members.into_iter().enumerate() {
            let mut input = QrInput::new(VersionSpec::Normal(version.number()), level)?;
            let header =
                Segment::new(Mode::StructuredAppend, &[(i + 1) as u8, total as u8, parity])?;
            input.push_segment(header);
            for seg in segments {
                input.push_segment(seg);
            }
            inputs.push(input);
        }
        debug!(symbols = total, parity, "split input for structured append");
        Ok(StructuredSet { inputs, parity })
    }
}

/// Encoded size of a segment at `version`, including its header
fn segment_bits(seg: &Segment, version: Version) -> usize {
    tables::mode_indicator_bits(version)
        + tables::length_indicator_bits(seg.mode(), version)
        + seg.payload_bits()
}

/// Largest payload prefix (in bytes) whose header and payload fit in `bits`.
/// Inverse of the per-mode estimation formulas, clamped to the mode maximum.
fn prefix_that_fits(mode: Mode, version: Version, bits: usize) -> usize {
    let header =
        tables::mode_indicator_bits(version) + tables::length_indicator_bits(mode, version);
    if bits <= header {
        return 0;
    }
    let payload = bits - header;
    let size = match mode {
        Mode::Numeric => {
            let chunks = payload / 10;
            match payload % 10 {
                r if r >= 7 => chunks * 3 + 2,
                r if r >= 4 => chunks * 3 + 1,
                _ => chunks * 3,
            }
        }
        Mode::Alphanumeric => payload / 11 * 2 + usize::from(payload % 11 >= 6),
        Mode::Byte => payload / 8,
        Mode::Kanji => payload / 13 * 2,
        Mode::StructuredAppend => 0,
    };
    size.min(tables::maximum_bytes(mode, version))
}
