//! Input accumulator: an ordered list of typed segments plus the symbol
//! parameters, turned into a padded data bit stream.
//!
//! The symbol version is resolved by fixed-point iteration because length
//! indicator widths depend on the version, which creates a circular
//! dependency between the encoded size and the version choice.

use tracing::debug;

use crate::encoder::EncodeError;
use crate::encoder::bitstream::BitStream;
use crate::encoder::segment::Segment;
use crate::encoder::tables;
use crate::models::{ECLevel, Mode, Version, VersionSpec};

/// Accumulates typed data segments for one symbol (or one Structured
/// Append member) and assembles the final data bit stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrInput {
    spec: VersionSpec,
    level: ECLevel,
    segments: Vec<Segment>,
}

impl QrInput {
    /// Create an empty accumulator.
    ///
    /// Rejects out-of-range versions and levels invalid for the requested
    /// family (H is never valid for Micro symbols).
    pub fn new(spec: VersionSpec, level: ECLevel) -> Result<Self, EncodeError> {
        match spec {
            VersionSpec::Normal(v) if !(1..=40).contains(&v) => {
                return Err(EncodeError::InvalidVersion(v));
            }
            VersionSpec::Micro(v) if !(1..=4).contains(&v) => {
                return Err(EncodeError::InvalidVersion(v));
            }
            _ => {}
        }
        if spec.is_micro() && level == ECLevel::H {
            return Err(EncodeError::InvalidLevel { level });
        }
        Ok(Self {
            spec,
            level,
            segments: Vec::new(),
        })
    }

    /// Append a data segment, validating the payload against the mode
    pub fn push(&mut self, mode: Mode, data: &[u8]) -> Result<(), EncodeError> {
        self.segments.push(Segment::new(mode, data)?);
        Ok(())
    }

    /// Append an already validated segment
    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// The requested symbol family and size
    pub fn spec(&self) -> VersionSpec {
        self.spec
    }

    /// The configured error correction level
    pub fn level(&self) -> ECLevel {
        self.level
    }

    /// The accumulated segments, in input order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Consume the accumulator, yielding its segments
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// XOR of every payload byte, excluding Structured Append headers
    pub fn parity(&self) -> u8 {
        self.segments
            .iter()
            .filter(|s| s.mode() != Mode::StructuredAppend)
            .flat_map(|s| s.data())
            .fold(0, |acc, &b| acc ^ b)
    }

    /// Estimated bit-stream size at `version`, headers included.
    ///
    /// `None` when a segment's mode does not exist at this version.
    /// Oversized segments are costed as several header-bearing chunks.
    pub fn estimate_bits(&self, version: Version) -> Option<usize> {
        let mut bits = 0;
        for seg in &self.segments {
            if !tables::mode_available(seg.mode(), version) {
                return None;
            }
            if seg.mode() == Mode::StructuredAppend {
                bits += 4 + seg.payload_bits();
                continue;
            }
            let header = tables::mode_indicator_bits(version)
                + tables::length_indicator_bits(seg.mode(), version);
            let max = tables::maximum_bytes(seg.mode(), version);
            let chunks = seg.data().len().div_ceil(max);
            bits += chunks * header + seg.payload_bits();
        }
        Some(bits)
    }

    /// Resolve the smallest version (at or above the requested floor) whose
    /// data capacity holds the estimated bit stream at the configured level.
    pub fn resolve_version(&self) -> Result<Version, EncodeError> {
        if self.spec.is_micro() {
            return self.resolve_micro_version();
        }
        let floor = self.spec.floor().number();
        let mut version = floor;
        loop {
            // estimate depends on the version through indicator widths, so
            // iterate until the choice is self-consistent
            let bits = self
                .estimate_bits(Version::Normal(version))
                .unwrap_or(usize::MAX);
            let words = bits.div_ceil(8);
            let Some(min) = tables::minimum_version(words, self.level) else {
                return Err(EncodeError::CapacityExceeded {
                    needed_bits: bits,
                    capacity_bits: tables::data_codewords(40, self.level) * 8,
                });
            };
            let next = min.max(floor);
            if next <= version {
                debug!(version, bits, words, "resolved symbol version");
                return Ok(Version::Normal(version));
            }
            version = next;
        }
    }

    fn resolve_micro_version(&self) -> Result<Version, EncodeError> {
        let floor = self.spec.floor().number();
        let mut best_capacity = 0;
        let mut needed = 0;
        for v in floor..=4 {
            let Some(capacity) = tables::micro_data_bits(v, self.level) else {
                continue;
            };
            best_capacity = best_capacity.max(capacity);
            let Some(bits) = self.estimate_bits(Version::Micro(v)) else {
                continue;
            };
            needed = bits;
            if bits <= capacity {
                debug!(version = v, bits, capacity, "resolved Micro symbol version");
                return Ok(Version::Micro(v));
            }
        }
        Err(EncodeError::CapacityExceeded {
            needed_bits: needed,
            capacity_bits: best_capacity,
        })
    }

    /// Emit mode/length headers and payloads for every segment, without
    /// terminator or padding
    pub fn raw_bit_stream(&self, version: Version) -> Result<BitStream, EncodeError> {
        let mut bs = BitStream::new();
        for seg in &self.segments {
            self.emit_segment(seg, version, &mut bs)?;
        }
        Ok(bs)
    }

    fn emit_segment(
        &self,
        seg: &Segment,
        version: Version,
        bs: &mut BitStream,
    ) -> Result<(), EncodeError> {
        if !tables::mode_available(seg.mode(), version) {
            return Err(EncodeError::InvalidVersion(version.number()));
        }
        if seg.mode() == Mode::StructuredAppend {
            bs.append_bits(4, seg.mode().indicator());
            seg.encode_payload(bs);
            return Ok(());
        }
        // segments larger than the length field allows are emitted as
        // several consecutive chunks, each with its own header
        let max = tables::maximum_bytes(seg.mode(), version);
        for chunk in seg.data().chunks(max) {
            let sub = Segment::new(seg.mode(), chunk)?;
            match version {
                Version::Normal(_) => bs.append_bits(4, sub.mode().indicator()),
                Version::Micro(v) => {
                    let width = v as usize - 1;
                    if width > 0 {
                        // mode existence was checked above
                        let value = sub.mode().micro_indicator().unwrap_or(0);
                        bs.append_bits(width, value);
                    }
                }
            }
            let length_bits = tables::length_indicator_bits(sub.mode(), version);
            bs.append_bits(length_bits, sub.char_count() as u32);
            sub.encode_payload(bs);
        }
        Ok(())
    }

    /// Build the complete data bit stream: segments, terminator, zero
    /// alignment, then alternating 0xEC/0x11 pad bytes up to capacity
    pub fn build_bit_stream(&self, version: Version) -> Result<BitStream, EncodeError> {
        let capacity = tables::data_capacity_bits(version, self.level)
            .ok_or(EncodeError::InvalidLevel { level: self.level })?;
        let mut bs = self.raw_bit_stream(version)?;
        if bs.len() > capacity {
            return Err(EncodeError::CapacityExceeded {
                needed_bits: bs.len(),
                capacity_bits: capacity,
            });
        }

        let terminator = tables::terminator_bits(version);
        if capacity - bs.len() <= terminator {
            bs.append_bits(capacity - bs.len(), 0);
            return Ok(bs);
        }
        bs.append_bits(terminator, 0);

        let align = (8 - bs.len() % 8) % 8;
        bs.append_bits(align.min(capacity - bs.len()), 0);
        for &pad in [0xEC, 0x11].iter().cycle() {
            if bs.len() + 8 > capacity {
                break;
            }
            bs.append_bits(8, pad);
        }
        // M1/M3 end in a 4-bit codeword, zero when it is padding
        if bs.len() < capacity {
            bs.append_bits(capacity - bs.len(), 0);
        }
        debug_assert_eq!(bs.len(), capacity);
        Ok(bs)
    }

    /// Encode the accumulated input into a symbol
    pub fn encode(&self) -> Result<crate::models::QrSymbol, EncodeError> {
        crate::encoder::qr_encoder::QrEncoder::encode(self)
    }
}
