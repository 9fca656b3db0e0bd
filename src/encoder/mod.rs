//! QR code encoding modules
//!
//! This module contains the full data-to-symbol pipeline:
//! - Bit stream assembly (mode/length headers, payload packing, padding)
//! - Input segmentation (numeric/alphanumeric/byte/kanji runs)
//! - Reed-Solomon error correction and block interleaving
//! - Module placement (function patterns, zig-zag data path)
//! - Mask selection (penalty scoring) and format information

use crate::models::Mode;
use thiserror::Error;

/// Append-only bit buffer
pub mod bitstream;
pub mod config;
/// Format and version information words (BCH coded)
pub mod format;
/// Function pattern frame templates (finder/timing/alignment/reserved areas)
pub mod frame;
/// Input accumulator: segments to padded codeword stream
pub mod input;
/// Mask application, penalty scoring and selection
pub mod mask;
/// Zig-zag codeword placement
pub mod placement;
/// Main encoder that orchestrates the pipeline
pub mod qr_encoder;
/// Reed-Solomon error correction coding
pub mod reed_solomon;
/// Typed data segments and payload serialization
pub mod segment;
/// Greedy mode classification of raw input
pub mod segmenter;
/// Structured Append splitting across multiple symbols
pub mod structured;
/// QR specification tables (capacities, EC blocks, indicator widths)
pub mod tables;

/// Errors surfaced by the encoding pipeline.
///
/// All variants are recoverable conditions reported to the caller; internal
/// consistency violations (e.g. a placement path of the wrong length) are
/// treated as programming errors and assert instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Segment data does not match the declared mode's character set.
    #[error("data contains characters invalid in {mode:?} mode")]
    InvalidCharacter {
        /// The mode the data was declared as.
        mode: Mode,
    },

    /// No version of the requested family can hold the data at this level.
    #[error("data needs {needed_bits} bits, largest symbol holds {capacity_bits}")]
    CapacityExceeded {
        /// Bits required by the encoded input.
        needed_bits: usize,
        /// Bits available in the largest candidate symbol.
        capacity_bits: usize,
    },

    /// Version outside 1-40 (regular) or 1-4 (Micro), or an operation that
    /// requires an explicit version was given an automatic one.
    #[error("invalid symbol version {0}")]
    InvalidVersion(u8),

    /// Level not usable with the requested symbol family.
    #[error("error correction level {level:?} is not valid for this symbol")]
    InvalidLevel {
        /// The rejected level.
        level: crate::models::ECLevel,
    },

    /// Structured Append splitting needed more than 16 symbols.
    #[error("structured append needs {0} symbols, at most 16 allowed")]
    StructuredRangeExceeded(usize),
}
