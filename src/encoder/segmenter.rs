//! Greedy classification of raw input bytes into typed segments.
//!
//! The splitter scans left to right, extending a run of the current mode and
//! switching only when the marginal bit cost of staying exceeds the header
//! overhead of a mode switch. This is a local one-lookahead heuristic, not a
//! globally optimal segmentation; ties favor staying in the current mode.

use crate::encoder::EncodeError;
use crate::encoder::segment::{Segment, alphanumeric_index, is_kanji_pair, payload_bits};
use crate::encoder::tables;
use crate::models::{Mode, Version};

/// Caller hint for how non-alphanumeric bytes should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeHint {
    /// Treat unclassified bytes as opaque 8-bit data
    #[default]
    Byte,
    /// Recognize valid Shift JIS pairs as Kanji characters
    Kanji,
}

/// Splits input into mode-typed segments
pub struct Segmenter;

impl Segmenter {
    /// Classify `data` into an ordered segment list.
    ///
    /// `version` only influences the switch-cost heuristic through the
    /// length indicator widths; the result is valid at any version. When
    /// `case_sensitive` is false, lower case letters are folded to upper
    /// case for classification and alphanumeric payloads; byte segments
    /// keep the original bytes.
    pub fn split(
        data: &[u8],
        version: Version,
        hint: EncodeHint,
        case_sensitive: bool,
    ) -> Result<Vec<Segment>, EncodeError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let folded;
        let class: &[u8] = if case_sensitive {
            data
        } else {
            folded = fold_upper(data, hint);
            &folded
        };

        let mut segments = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let (mode, run) = match identify(class, pos, hint) {
                Mode::Numeric => eat_numeric(class, pos, version, hint),
                Mode::Alphanumeric => eat_alphanumeric(class, pos, version, hint),
                Mode::Kanji => eat_kanji(class, pos, hint),
                _ => eat_bytes(class, pos, version, hint),
            };
            debug_assert!(run > 0);
            let payload = match mode {
                // digits are unaffected by folding, letters must come from
                // the folded copy to stay inside the 45-character table
                Mode::Numeric | Mode::Alphanumeric => &class[pos..pos + run],
                _ => &data[pos..pos + run],
            };
            segments.push(Segment::new(mode, payload)?);
            pos += run;
        }
        Ok(segments)
    }
}

/// Upper-fold ASCII letters, leaving Kanji pairs untouched
fn fold_upper(data: &[u8], hint: EncodeHint) -> Vec<u8> {
    let mut out = data.to_vec();
    let mut i = 0;
    while i < out.len() {
        if hint == EncodeHint::Kanji && i + 1 < out.len() && is_kanji_pair(out[i], out[i + 1]) {
            i += 2;
        } else {
            out[i] = out[i].to_ascii_uppercase();
            i += 1;
        }
    }
    out
}

/// Natural mode of the character at `pos`: numeric > alphanumeric > kanji > byte
fn identify(class: &[u8], pos: usize, hint: EncodeHint) -> Mode {
    let b = class[pos];
    if b.is_ascii_digit() {
        return Mode::Numeric;
    }
    if alphanumeric_index(b).is_some() {
        return Mode::Alphanumeric;
    }
    if hint == EncodeHint::Kanji && pos + 1 < class.len() && is_kanji_pair(b, class[pos + 1]) {
        return Mode::Kanji;
    }
    Mode::Byte
}

fn is_digit_at(class: &[u8], pos: usize) -> bool {
    pos < class.len() && class[pos].is_ascii_digit()
}

fn is_alnum_at(class: &[u8], pos: usize) -> bool {
    pos < class.len() && alphanumeric_index(class[pos]).is_some()
}

/// Header cost of opening a segment: mode indicator + length indicator
fn header_bits(mode: Mode, version: Version) -> isize {
    (tables::mode_indicator_bits(version) + tables::length_indicator_bits(mode, version)) as isize
}

fn digit_run_end(class: &[u8], mut pos: usize) -> usize {
    while is_digit_at(class, pos) {
        pos += 1;
    }
    pos
}

fn eat_numeric(class: &[u8], pos: usize, version: Version, hint: EncodeHint) -> (Mode, usize) {
    let p = digit_run_end(class, pos);
    let run = p - pos;
    if p < class.len() {
        let stay = payload_bits(Mode::Numeric, run) as isize + header_bits(Mode::Numeric, version);
        match identify(class, p, hint) {
            Mode::Byte => {
                // absorbing the digits into the following byte run saves the
                // numeric header when the run is short enough
                let dif = stay + 8 - 8 * (run as isize + 1);
                if dif > 0 {
                    return eat_bytes(class, pos, version, hint);
                }
            }
            Mode::Alphanumeric => {
                let dif = stay + payload_bits(Mode::Alphanumeric, 1) as isize
                    - payload_bits(Mode::Alphanumeric, run + 1) as isize;
                if dif > 0 {
                    return eat_alphanumeric(class, pos, version, hint);
                }
            }
            _ => {}
        }
    }
    (Mode::Numeric, run)
}

fn eat_alphanumeric(class: &[u8], pos: usize, version: Version, hint: EncodeHint) -> (Mode, usize) {
    let la = header_bits(Mode::Alphanumeric, version);
    let ln = header_bits(Mode::Numeric, version);
    let an = |n: usize| payload_bits(Mode::Alphanumeric, n) as isize;

    let mut p = pos;
    while is_alnum_at(class, p) {
        if is_digit_at(class, p) {
            // embedded digit run: worth breaking out only if the numeric
            // header pays for itself
            let q = digit_run_end(class, p);
            let resume = if is_alnum_at(class, q) { la } else { 0 };
            let dif = an(p - pos) + payload_bits(Mode::Numeric, q - p) as isize + ln + resume
                - an(q - pos);
            if dif < 0 {
                break;
            }
            p = q;
        } else {
            p += 1;
        }
    }
    let run = p - pos;
    if p < class.len() && identify(class, p, hint) == Mode::Byte {
        let dif = an(run) + la + 8 - 8 * (run as isize + 1);
        if dif > 0 {
            return eat_bytes(class, pos, version, hint);
        }
    }
    (Mode::Alphanumeric, run)
}

fn eat_kanji(class: &[u8], pos: usize, hint: EncodeHint) -> (Mode, usize) {
    let mut p = pos;
    while p < class.len() && identify(class, p, hint) == Mode::Kanji {
        p += 2;
    }
    (Mode::Kanji, p - pos)
}

fn eat_bytes(class: &[u8], pos: usize, version: Version, hint: EncodeHint) -> (Mode, usize) {
    let l8 = header_bits(Mode::Byte, version);
    let la = header_bits(Mode::Alphanumeric, version);
    let ln = header_bits(Mode::Numeric, version);

    let mut p = pos + 1;
    while p < class.len() {
        match identify(class, p, hint) {
            Mode::Kanji => break,
            Mode::Numeric => {
                let q = digit_run_end(class, p);
                let resume = if q < class.len() && identify(class, q, hint) == Mode::Byte {
                    l8
                } else {
                    0
                };
                let dif = 8 * (p - pos) as isize
                    + payload_bits(Mode::Numeric, q - p) as isize
                    + ln
                    + resume
                    - 8 * (q - pos) as isize;
                if dif < 0 {
                    break;
                }
                p = q;
            }
            Mode::Alphanumeric => {
                let mut q = p;
                while is_alnum_at(class, q) {
                    q += 1;
                }
                let resume = if q < class.len() && identify(class, q, hint) == Mode::Byte {
                    l8
                } else {
                    0
                };
                let dif = 8 * (p - pos) as isize
                    + payload_bits(Mode::Alphanumeric, q - p) as isize
                    + la
                    + resume
                    - 8 * (q - pos) as isize;
                if dif < 0 {
                    break;
                }
                p = q;
            }
            _ => p += 1,
        }
    }
    (Mode::Byte, p - pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: Version = Version::Normal(1);

    fn modes(segments: &[Segment]) -> Vec<Mode> {
        segments.iter().map(|s| s.mode()).collect()
    }

    #[test]
    fn test_pure_numeric() {
        let segs = Segmenter::split(b"0123456789", V1, EncodeHint::Byte, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Numeric]);
        assert_eq!(segs[0].data(), b"0123456789");
    }

    #[test]
    fn test_pure_alphanumeric() {
        let segs = Segmenter::split(b"HELLO WORLD", V1, EncodeHint::Byte, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Alphanumeric]);
    }

    #[test]
    fn test_short_digit_run_stays_alphanumeric() {
        // Breaking out a 3-digit run would cost more than the 14-bit header saves
        let segs = Segmenter::split(b"ABC123", V1, EncodeHint::Byte, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Alphanumeric]);
    }

    #[test]
    fn test_long_digit_run_splits_out_of_bytes() {
        let segs =
            Segmenter::split(b"abcdef123456789012tail", V1, EncodeHint::Byte, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Byte, Mode::Numeric, Mode::Byte]);
        assert_eq!(segs[0].data(), b"abcdef");
        assert_eq!(segs[1].data(), b"123456789012");
        assert_eq!(segs[2].data(), b"tail");
    }

    #[test]
    fn test_short_digit_run_stays_in_bytes() {
        let segs = Segmenter::split(b"ab12cd", V1, EncodeHint::Byte, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Byte]);
        assert_eq!(segs[0].data(), b"ab12cd");
    }

    #[test]
    fn test_case_folding() {
        let segs = Segmenter::split(b"hello", V1, EncodeHint::Byte, false).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Alphanumeric]);
        assert_eq!(segs[0].data(), b"HELLO");

        let segs = Segmenter::split(b"hello", V1, EncodeHint::Byte, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Byte]);
        assert_eq!(segs[0].data(), b"hello");
    }

    #[test]
    fn test_kanji_hint() {
        let data = [0x93, 0x5F, 0x93, 0x5F];
        let segs = Segmenter::split(&data, V1, EncodeHint::Kanji, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Kanji]);
        assert_eq!(segs[0].char_count(), 2);

        // Without the hint the same bytes are opaque data
        let segs = Segmenter::split(&data, V1, EncodeHint::Byte, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Byte]);
    }

    #[test]
    fn test_malformed_kanji_falls_back_to_bytes() {
        // Trailing odd byte cannot form a pair
        let data = [0x93, 0x5F, 0x93];
        let segs = Segmenter::split(&data, V1, EncodeHint::Kanji, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Kanji, Mode::Byte]);
        assert_eq!(segs[1].data(), &[0x93]);

        // Invalid pair is never classified as Kanji
        let data = [0x20, 0x20];
        let segs = Segmenter::split(&data, V1, EncodeHint::Kanji, true).unwrap();
        assert_eq!(modes(&segs), vec![Mode::Alphanumeric]);
    }

    #[test]
    fn test_fold_preserves_kanji_pairs() {
        // 0x8196 has a lower-case-range second byte that must not be folded
        let data = [0x81, 0x61, b'a'];
        let folded = fold_upper(&data, EncodeHint::Kanji);
        assert_eq!(folded, [0x81, 0x61, b'A']);
    }
}
