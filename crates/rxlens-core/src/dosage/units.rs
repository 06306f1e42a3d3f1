//! Unit vocabulary and the low-level text scanners shared by the parser.
//!
//! All scanners work on byte offsets but only ever stop on ASCII bytes, so
//! every returned offset is a valid `str` slice boundary.

/// Units recognized after a dosage amount, most specific first.
///
/// Order decides overlaps: "mg/ml" is tried before "mg", "%w/w" before "%".
pub const DOSAGE_UNITS: &[&str] = &[
    "mg/ml", "g/l", "mg", "mcg", "g", "gm", "kg", "ml", "l", "iu", "billion", "%w/w", "%w/v", "%",
];

/// Mass units allowed as the numerator of a "X per Y" expression.
pub const MASS_UNITS: &[&str] = &["mg", "mcg", "g", "gm", "kg"];

/// Volume units allowed as the denominator of a "X per Y" expression.
pub const VOLUME_UNITS: &[&str] = &["ml", "l"];

/// Return the first unit of `vocabulary` that starts `text`, ignoring ASCII case.
///
/// A unit ending in a letter must not run into another letter, so "gm"
/// is never read as "g" followed by a stray "m" and "lakh" is not a litre.
pub fn match_unit(text: &str, vocabulary: &[&'static str]) -> Option<&'static str> {
    vocabulary
        .iter()
        .copied()
        .find(|unit| starts_with_ignore_case(text, unit) && ends_token(text, unit))
}

/// Whether `text` begins with `prefix`, ignoring ASCII case.
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn ends_token(text: &str, unit: &str) -> bool {
    let unit_ends_alphabetic = unit
        .as_bytes()
        .last()
        .map_or(false, |b| b.is_ascii_alphabetic());
    if !unit_ends_alphabetic {
        return true;
    }
    text.as_bytes()
        .get(unit.len())
        .map_or(true, |b| !b.is_ascii_alphabetic())
}

/// Scan `\d+(\.\d+)?` starting at `start`. Returns the end offset.
pub fn scan_decimal(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == start {
        return None;
    }
    if pos + 1 < bytes.len() && bytes[pos] == b'.' && bytes[pos + 1].is_ascii_digit() {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    Some(pos)
}

/// Scan a decimal optionally followed by `/decimal` (e.g., "125/5").
pub fn scan_amount(text: &str, start: usize) -> Option<usize> {
    let end = scan_decimal(text, start)?;
    if text.as_bytes().get(end) == Some(&b'/') {
        if let Some(ratio_end) = scan_decimal(text, end + 1) {
            return Some(ratio_end);
        }
    }
    Some(end)
}

/// Skip any whitespace starting at `start`.
pub fn skip_whitespace(text: &str, start: usize) -> usize {
    let skipped: usize = text[start..]
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    start + skipped
}

/// Skip a run of non-whitespace starting at `start`.
pub fn skip_token(text: &str, start: usize) -> usize {
    let skipped: usize = text[start..]
        .chars()
        .take_while(|c| !c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    start + skipped
}
