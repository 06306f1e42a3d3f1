//! Free-text dosage parser.
//!
//! Pipeline:
//! 1. Drop parenthetical annotations
//! 2. Canonicalize percent units (`% w / w` → `%w/w`) and hide them behind sentinels
//! 3. Rewrite "X per Y" / "X/Y" concentrations as `a/b unit_a/unit_b`
//! 4. Restore the percent units
//! 5. Scan for `amount unit` endpoints against the ordered vocabulary
//! 6. Derive one ingredient name per endpoint from the text preceding it

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::units::{
    match_unit, scan_amount, scan_decimal, skip_token, skip_whitespace, starts_with_ignore_case,
    DOSAGE_UNITS, MASS_UNITS, VOLUME_UNITS,
};
use crate::models::Category;

const PERCENT_W_W: &str = "%w/w";
const PERCENT_W_V: &str = "%w/v";
const PERCENT_W_W_SENTINEL: &str = "__PERCENT_W_W__";
const PERCENT_W_V_SENTINEL: &str = "__PERCENT_W_V__";

/// Words that never belong to an ingredient name.
const NOISE_WORDS: &[&str] = &[
    "and",
    "for",
    "with",
    "suspension",
    "resistant",
    "oral",
    "orally",
    "disintegrating",
    "paediatric",
    "pediatric",
];

/// One ingredient parsed out of a dosage string. Amount and unit are raw
/// text; see [`super::UnitNormalizer`] for the numeric form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedDosage {
    pub ingredient: String,
    /// Amount as written, possibly a ratio ("125/5")
    pub amount: String,
    /// Lowercased unit from the dosage vocabulary
    pub unit: String,
}

/// A position in the text where an `amount unit` pair ends an ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DosageEndpoint {
    pub start: usize,
    pub end: usize,
    pub amount: String,
    pub unit: &'static str,
}

/// Parser for composition strings such as "Paracetamol 500mg + Caffeine 30mg".
pub struct DosageParser {
    noise_words: HashSet<String>,
}

impl Default for DosageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DosageParser {
    /// Create a parser with the default noise words and dosage-form words.
    pub fn new() -> Self {
        let noise_words = NOISE_WORDS
            .iter()
            .copied()
            .chain(Category::keywords())
            .map(String::from)
            .collect();
        Self { noise_words }
    }

    /// Add a word to strip from ingredient names.
    pub fn add_noise_word(&mut self, word: &str) {
        self.noise_words.insert(word.to_lowercase());
    }

    /// Parse a dosage string into one entry per ingredient.
    ///
    /// Text without any recognizable unit yields an empty list.
    pub fn parse(&self, raw: &str) -> Vec<ParsedDosage> {
        let text = self.preprocess(raw);
        let mut parsed = Vec::new();
        let mut segment_start = 0;

        for endpoint in find_dosage_endpoints(&text) {
            let segment = &text[segment_start..endpoint.end];
            segment_start = endpoint.end;

            let ingredient = self.clean_ingredient_name(segment);
            if ingredient.is_empty() {
                continue;
            }
            parsed.push(ParsedDosage {
                ingredient,
                amount: endpoint.amount,
                unit: endpoint.unit.to_string(),
            });
        }

        parsed
    }

    /// Run steps 1-4 of the pipeline.
    pub fn preprocess(&self, raw: &str) -> String {
        let text = strip_parentheticals(raw);
        let text = canonicalize_percent_units(&text);
        let text = protect_percent_units(&text);
        let text = canonicalize_per_expressions(&text);
        restore_percent_units(&text)
    }

    /// Reduce the text preceding an endpoint to a bare ingredient name.
    ///
    /// A leading `/unit` word is what remains of a concentration the
    /// previous endpoint stopped short of ("500mcg/ml" ends at "mcg").
    pub fn clean_ingredient_name(&self, segment: &str) -> String {
        let stripped = strip_dosage_fragments(segment);
        let words: Vec<&str> = stripped
            .split_whitespace()
            .skip_while(|word| word.starts_with('/'))
            .filter(|word| !self.noise_words.contains(&word.to_lowercase()))
            .collect();
        words
            .join(" ")
            .trim_matches(|c| matches!(c, ' ' | ',' | '+' | '-'))
            .to_string()
    }
}

/// Remove every `( ... )` group. An unclosed `(` is kept as-is.
pub fn strip_parentheticals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Collapse spacing and case variants of `%w/w` and `%w/v`.
pub fn canonicalize_percent_units(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('%') {
        let percent = pos + offset;
        match match_percent_suffix(text, percent + 1) {
            Some((end, canonical)) => {
                out.push_str(&text[copied_to..percent]);
                out.push_str(canonical);
                copied_to = end;
                pos = end;
            }
            None => pos = percent + 1,
        }
    }
    out.push_str(&text[copied_to..]);
    out
}

/// Match `\s*w\s*/\s*[wv]` after a percent sign.
fn match_percent_suffix(text: &str, start: usize) -> Option<(usize, &'static str)> {
    let bytes = text.as_bytes();
    let mut pos = skip_whitespace(text, start);
    if !bytes.get(pos)?.eq_ignore_ascii_case(&b'w') {
        return None;
    }
    pos = skip_whitespace(text, pos + 1);
    if *bytes.get(pos)? != b'/' {
        return None;
    }
    pos = skip_whitespace(text, pos + 1);
    match bytes.get(pos)?.to_ascii_lowercase() {
        b'w' => Some((pos + 1, PERCENT_W_W)),
        b'v' => Some((pos + 1, PERCENT_W_V)),
        _ => None,
    }
}

fn protect_percent_units(text: &str) -> String {
    text.replace(PERCENT_W_W, PERCENT_W_W_SENTINEL)
        .replace(PERCENT_W_V, PERCENT_W_V_SENTINEL)
}

fn restore_percent_units(text: &str) -> String {
    text.replace(PERCENT_W_W_SENTINEL, PERCENT_W_W)
        .replace(PERCENT_W_V_SENTINEL, PERCENT_W_V)
}

/// Rewrite concentrations into `a/b unit_a/unit_b` form.
///
/// "125 mg per 5 ml" → "125/5 mg/ml", "500mg/ml" → "500/1 mg/ml".
pub fn canonicalize_per_expressions(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos].is_ascii_digit() {
            if let Some((end, rewritten)) = match_per_expression(text, pos) {
                out.push_str(&text[copied_to..pos]);
                out.push_str(&rewritten);
                copied_to = end;
                pos = end;
                continue;
            }
        }
        pos += 1;
    }
    out.push_str(&text[copied_to..]);
    out
}

fn match_per_expression(text: &str, start: usize) -> Option<(usize, String)> {
    let amount_end = scan_decimal(text, start)?;
    let mut pos = skip_whitespace(text, amount_end);
    let mass_unit = match_unit(&text[pos..], MASS_UNITS)?;
    let mass_text = &text[pos..pos + mass_unit.len()];
    pos = skip_whitespace(text, pos + mass_unit.len());

    if starts_with_ignore_case(&text[pos..], "per") {
        pos += 3;
    } else if text.as_bytes().get(pos) == Some(&b'/') {
        pos += 1;
    } else {
        return None;
    }
    pos = skip_whitespace(text, pos);

    let (denominator, after_denominator) = match scan_decimal(text, pos) {
        Some(end) => (&text[pos..end], skip_whitespace(text, end)),
        None => ("1", pos),
    };
    let volume_unit = match_unit(&text[after_denominator..], VOLUME_UNITS)?;
    let volume_end = after_denominator + volume_unit.len();
    let volume_text = &text[after_denominator..volume_end];

    let rewritten = format!(
        "{}/{} {}/{}",
        &text[start..amount_end],
        denominator,
        mass_text,
        volume_text
    );
    Some((volume_end, rewritten))
}

/// Find every `amount unit` pair, left to right, without overlap.
pub fn find_dosage_endpoints(text: &str) -> Vec<DosageEndpoint> {
    let bytes = text.as_bytes();
    let mut endpoints = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos].is_ascii_digit() {
            if let Some(endpoint) = match_endpoint(text, pos) {
                pos = endpoint.end;
                endpoints.push(endpoint);
                continue;
            }
        }
        pos += 1;
    }
    endpoints
}

fn match_endpoint(text: &str, start: usize) -> Option<DosageEndpoint> {
    let amount_end = scan_amount(text, start)?;
    let unit_start = skip_whitespace(text, amount_end);
    let unit = match_unit(&text[unit_start..], DOSAGE_UNITS)?;
    Some(DosageEndpoint {
        start,
        end: unit_start + unit.len(),
        amount: text[start..amount_end].to_string(),
        unit,
    })
}

/// Drop `amount [unit]` fragments that start a word. Digits glued to a
/// word ("B12", "D3") are part of the name and survive.
fn strip_dosage_fragments(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = String::with_capacity(segment.len());
    let mut copied_to = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos].is_ascii_digit() && !follows_alphanumeric(segment, pos) {
            if let Some(amount_end) = scan_amount(segment, pos) {
                out.push_str(&segment[copied_to..pos]);
                let fragment_end = skip_token(segment, skip_whitespace(segment, amount_end));
                copied_to = fragment_end;
                pos = fragment_end;
                continue;
            }
        }
        pos += 1;
    }
    out.push_str(&segment[copied_to..]);
    out
}

fn follows_alphanumeric(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .next_back()
        .map_or(false, char::is_alphanumeric)
}
