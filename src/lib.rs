//! RustQRGen - fast QR code generation library
//!
//! A pure Rust QR and Micro QR encoding library implementing the ISO/IEC
//! 18004 data-to-symbol pipeline: input segmentation, bit-stream assembly,
//! Reed-Solomon error correction, zig-zag module placement and
//! penalty-scored mask selection.
//!
//! The crate produces module grids only; rasterizing or rendering a
//! [`QrSymbol`] is left to the caller.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// QR code encoding modules (segmentation, bit streams, error correction, masking)
pub mod encoder;
/// Core data structures (QrSymbol, ModuleMatrix, Version, ECLevel)
pub mod models;

pub use encoder::EncodeError;
pub use encoder::input::QrInput;
pub use encoder::segmenter::EncodeHint;
pub use encoder::structured::StructuredSet;
pub use models::{ECLevel, Mode, ModuleMatrix, QrSymbol, Version, VersionSpec};

use encoder::segmenter::Segmenter;

/// Encode a text string into a symbol.
///
/// The string is segmented into mixed-mode chunks automatically. `spec`
/// selects the symbol family and the minimum size, `hint` controls whether
/// Shift JIS pairs are recognized as Kanji, and `case_sensitive` = false
/// folds lower case letters into the alphanumeric character set.
pub fn encode_string(
    text: &str,
    spec: VersionSpec,
    level: ECLevel,
    hint: EncodeHint,
    case_sensitive: bool,
) -> Result<QrSymbol, EncodeError> {
    let mut input = QrInput::new(spec, level)?;
    for segment in Segmenter::split(text.as_bytes(), spec.floor(), hint, case_sensitive)? {
        input.push_segment(segment);
    }
    input.encode()
}

/// Encode arbitrary bytes into a symbol as a single byte-mode segment
pub fn encode_bytes(
    data: &[u8],
    spec: VersionSpec,
    level: ECLevel,
) -> Result<QrSymbol, EncodeError> {
    let mut input = QrInput::new(spec, level)?;
    input.push(Mode::Byte, data)?;
    input.encode()
}

/// Encode a text string as a Structured Append sequence of linked symbols.
///
/// `spec` must name an explicit regular version; each resulting symbol is
/// encoded at exactly that version.
pub fn encode_structured(
    text: &str,
    spec: VersionSpec,
    level: ECLevel,
    hint: EncodeHint,
    case_sensitive: bool,
) -> Result<Vec<QrSymbol>, EncodeError> {
    let mut input = QrInput::new(spec, level)?;
    for segment in Segmenter::split(text.as_bytes(), spec.floor(), hint, case_sensitive)? {
        input.push_segment(segment);
    }
    input.split_structured()?.encode()
}

/// Encoder with configuration options
///
/// # Example
/// ```
/// use rust_qrgen::{ECLevel, Encoder};
///
/// let symbol = Encoder::new().level(ECLevel::M).encode("HELLO WORLD").unwrap();
/// assert_eq!(symbol.width(), 21);
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    spec: VersionSpec,
    level: ECLevel,
    hint: EncodeHint,
    case_sensitive: bool,
}

impl Encoder {
    /// Create an encoder with default settings: automatic regular version,
    /// level L, byte hint, case sensitive
    pub fn new() -> Self {
        Self {
            spec: VersionSpec::Auto,
            level: ECLevel::L,
            hint: EncodeHint::Byte,
            case_sensitive: true,
        }
    }

    /// Set the symbol family and minimum version
    pub fn version(mut self, spec: VersionSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Set the error correction level
    pub fn level(mut self, level: ECLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the segmentation hint for non-alphanumeric bytes
    pub fn hint(mut self, hint: EncodeHint) -> Self {
        self.hint = hint;
        self
    }

    /// Fold lower case letters into the alphanumeric set when `false`
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Encode a text string with this encoder's settings
    pub fn encode(&self, text: &str) -> Result<QrSymbol, EncodeError> {
        encode_string(text, self.spec, self.level, self.hint, self.case_sensitive)
    }

    /// Encode raw bytes with this encoder's settings
    pub fn encode_bytes(&self, data: &[u8]) -> Result<QrSymbol, EncodeError> {
        encode_bytes(data, self.spec, self.level)
    }

    /// Encode a Structured Append sequence with this encoder's settings
    pub fn encode_structured(&self, text: &str) -> Result<Vec<QrSymbol>, EncodeError> {
        encode_structured(text, self.spec, self.level, self.hint, self.case_sensitive)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_string_auto() {
        let symbol = encode_string(
            "HELLO WORLD",
            VersionSpec::Auto,
            ECLevel::M,
            EncodeHint::Byte,
            true,
        )
        .unwrap();
        assert_eq!(symbol.version, Version::Normal(1));
        assert_eq!(symbol.level, ECLevel::M);
    }

    #[test]
    fn test_encode_bytes() {
        let symbol = encode_bytes(&[0x00, 0xFF, 0x42], VersionSpec::Auto, ECLevel::Q).unwrap();
        assert_eq!(symbol.version, Version::Normal(1));
    }

    #[test]
    fn test_case_folding_changes_segmentation() {
        // folded, "hello" fits the alphanumeric set instead of byte mode
        let folded = Encoder::new().case_sensitive(false).encode("hello").unwrap();
        let raw = Encoder::new().encode("hello").unwrap();
        assert_eq!(folded.version, Version::Normal(1));
        assert_eq!(raw.version, Version::Normal(1));
        assert_ne!(folded.modules, raw.modules);
    }

    #[test]
    fn test_encoder_micro() {
        let symbol = Encoder::new()
            .version(VersionSpec::MicroAuto)
            .encode("12345")
            .unwrap();
        assert_eq!(symbol.version, Version::Micro(1));
    }

    #[test]
    fn test_encode_structured_count() {
        let symbols = Encoder::new()
            .version(VersionSpec::Normal(1))
            .level(ECLevel::M)
            .encode_structured("an example of four Structured Append symbols,")
            .unwrap();
        assert_eq!(symbols.len(), 4);
    }

    #[test]
    fn test_capacity_error_surfaces() {
        let text = "A".repeat(4297);
        let result = encode_string(&text, VersionSpec::Auto, ECLevel::L, EncodeHint::Byte, true);
        assert!(matches!(result, Err(EncodeError::CapacityExceeded { .. })));
    }
}
