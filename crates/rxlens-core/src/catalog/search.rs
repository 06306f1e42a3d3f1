//! Fuzzy medicine name search.
//!
//! Names and queries are tokenized (lowercase, alphanumeric runs).
//!
//! Two scores come out of a comparison:
//! - token-set ratio: shared tokens vs. the leftovers of each side, compared
//!   by Indel (insert/delete) similarity; 1.0 when one token set contains
//!   the other. This is the score thresholds apply to.
//! - ranking score: the better of the token-set ratio and a per-token
//!   Jaro-Winkler/Levenshtein blend, so typos like "paracetmol" still rank
//!   high in [`NameIndex::search`]. A shared prefix alone pushes the blend
//!   to about 0.6, so it never decides whether a name was found.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::MedicineId;

use super::Catalog;

/// A medicine name that matched a query.
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    pub medicine_id: MedicineId,
    /// Similarity in [0, 1]; the ranking score from [`NameIndex::search`],
    /// the token-set ratio from [`NameIndex::best_match`]
    pub score: f64,
}

struct NameEntry {
    medicine_id: MedicineId,
    tokens: Vec<String>,
}

/// Pre-tokenized medicine names, in catalog load order.
pub struct NameIndex {
    entries: Vec<NameEntry>,
}

impl NameIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let entries = catalog
            .medicines()
            .iter()
            .map(|m| NameEntry {
                medicine_id: m.medicine_id,
                tokens: tokenize(&m.name),
            })
            .collect();
        Self { entries }
    }

    /// Best `limit` names for `query`, highest score first. Ties keep
    /// catalog order; zero scores are left out.
    pub fn search(&self, query: &str, limit: usize) -> Vec<NameMatch> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut matches: Vec<NameMatch> = self
            .entries
            .iter()
            .map(|entry| NameMatch {
                medicine_id: entry.medicine_id,
                score: ranking_score(&query_tokens, &entry.tokens),
            })
            .filter(|m| m.score > 0.0)
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);
        matches
    }

    /// Name with the highest token-set ratio, whatever its score. Ties keep
    /// catalog order.
    pub fn closest(&self, query: &str) -> Option<NameMatch> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return None;
        }

        let mut best: Option<NameMatch> = None;
        for entry in &self.entries {
            let score = token_set_ratio(&query_tokens, &entry.tokens);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(NameMatch {
                    medicine_id: entry.medicine_id,
                    score,
                });
            }
        }
        best
    }

    /// Closest name, if its token-set ratio reaches `threshold`.
    pub fn best_match(&self, query: &str, threshold: f64) -> Option<NameMatch> {
        self.closest(query).filter(|m| m.score >= threshold)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One-off name search without keeping an index around.
pub fn search_by_name(catalog: &Catalog, query: &str, limit: usize) -> Vec<NameMatch> {
    NameIndex::build(catalog).search(query, limit)
}

/// Token-set ratio of two free-text names in [0, 1].
pub fn token_similarity(a: &str, b: &str) -> f64 {
    token_set_ratio(&tokenize(a), &tokenize(b))
}

fn ranking_score(query: &[String], name: &[String]) -> f64 {
    if query.is_empty() || name.is_empty() {
        return 0.0;
    }
    token_set_ratio(query, name)
        .max(per_token_score(query, name))
        .clamp(0.0, 1.0)
}

/// Sorted, deduplicated lowercase alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    tokens.sort_unstable();
    tokens.dedup();
    tokens
}

fn token_set_ratio(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common: Vec<&str> = a
        .iter()
        .filter(|t| b.contains(t))
        .map(String::as_str)
        .collect();
    let only_a: Vec<&str> = a
        .iter()
        .filter(|t| !b.contains(t))
        .map(String::as_str)
        .collect();
    let only_b: Vec<&str> = b
        .iter()
        .filter(|t| !a.contains(t))
        .map(String::as_str)
        .collect();

    if !common.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 1.0;
    }

    let common = common.join(" ");
    let combined_a = join_nonempty(&common, &only_a.join(" "));
    let combined_b = join_nonempty(&common, &only_b.join(" "));

    let mut score = indel_ratio(&combined_a, &combined_b);
    if !common.is_empty() {
        score = score
            .max(indel_ratio(&common, &combined_a))
            .max(indel_ratio(&common, &combined_b));
    }
    score
}

/// `1 - indel_distance / (len_a + len_b)`, i.e. `2 * lcs / (len_a + len_b)`.
fn indel_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * longest_common_subsequence(&a, &b) as f64 / total as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

fn per_token_score(query: &[String], name: &[String]) -> f64 {
    let total: f64 = query
        .iter()
        .map(|q| {
            name.iter()
                .map(|t| fuzzy_match(q, t))
                .fold(0.0, f64::max)
        })
        .sum();
    total / query.len() as f64
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

/// Compute fuzzy string similarity using combined metrics.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, Levenshtein overall edit distance
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);

    jw * 0.6 + lev * 0.4
}
