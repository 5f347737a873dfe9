//! Similarity scoring between two person names.
//!
//! Both names are expanded into their variation sets. A shared variation is
//! a certain match (1.0). Otherwise every pair of variations is compared with
//! three string measures (token-sort ratio, partial ratio, edit ratio) and
//! the best single signal wins.

use std::collections::BTreeSet;
use std::fmt;

use rapidfuzz::distance::{indel, levenshtein};

use crate::normalize::{NormalizedName, normalize};
use crate::variation::expand;

/// String measure that produced a fuzzy score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Indel ratio after sorting tokens alphabetically.
    TokenSort,
    /// Best indel ratio of the shorter string against any equal-length
    /// window of the longer one.
    Partial,
    /// Normalized Levenshtein similarity.
    Edit,
}

impl Measure {
    pub fn label(self) -> &'static str {
        match self {
            Self::TokenSort => "token-sort ratio",
            Self::Partial => "partial ratio",
            Self::Edit => "edit ratio",
        }
    }
}

/// Why a pair of names received its score.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreBasis {
    /// One side normalized to nothing.
    Empty,
    /// Normalized full forms are equal.
    Identical,
    /// Both names share an alternate rendering.
    Variation { shared: String },
    /// Best fuzzy signal across all variation pairs.
    Fuzzy {
        measure: Measure,
        left: String,
        right: String,
    },
}

/// Score for a single name pair, with the signal that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct NameScore {
    /// Similarity in `[0, 1]`.
    pub score: f64,
    pub basis: ScoreBasis,
}

impl NameScore {
    fn zero() -> Self {
        Self {
            score: 0.0,
            basis: ScoreBasis::Empty,
        }
    }

    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        let percent = self.score * 100.0;
        match &self.basis {
            ScoreBasis::Empty => "empty name: 0%".to_string(),
            ScoreBasis::Identical => format!("identical after normalization: {percent:.0}%"),
            ScoreBasis::Variation { shared } => {
                format!("shared variation '{shared}': {percent:.0}%")
            }
            ScoreBasis::Fuzzy {
                measure,
                left,
                right,
            } => format!(
                "{} '{left}' vs '{right}': {percent:.0}%",
                measure.label()
            ),
        }
    }
}

impl fmt::Display for NameScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.explain())
    }
}

/// A name normalized and expanded once, for repeated scoring.
#[derive(Debug, Clone)]
pub struct PreparedName {
    pub raw: String,
    pub normalized: NormalizedName,
    pub variations: BTreeSet<String>,
}

impl PreparedName {
    pub fn new(raw: &str) -> Self {
        let normalized = normalize(raw);
        let variations = expand(&normalized);
        Self {
            raw: raw.to_string(),
            normalized,
            variations,
        }
    }
}

/// Similarity between two raw names, in `[0, 1]`.
pub fn score(a: &str, b: &str) -> f64 {
    score_detailed(a, b).score
}

/// Similarity between two raw names with its explanation.
pub fn score_detailed(a: &str, b: &str) -> NameScore {
    score_prepared(&PreparedName::new(a), &PreparedName::new(b))
}

/// Similarity between two prepared names.
pub fn score_prepared(a: &PreparedName, b: &PreparedName) -> NameScore {
    if a.normalized.is_empty() || b.normalized.is_empty() {
        return NameScore::zero();
    }
    if a.normalized.full == b.normalized.full {
        return NameScore {
            score: 1.0,
            basis: ScoreBasis::Identical,
        };
    }
    if let Some(shared) = a.variations.intersection(&b.variations).next() {
        return NameScore {
            score: 1.0,
            basis: ScoreBasis::Variation {
                shared: shared.clone(),
            },
        };
    }

    let mut best = NameScore::zero();
    for left in &a.variations {
        for right in &b.variations {
            let (measure, value) = best_measure(left, right);
            if value > best.score {
                best = NameScore {
                    score: value.clamp(0.0, 1.0),
                    basis: ScoreBasis::Fuzzy {
                        measure,
                        left: left.clone(),
                        right: right.clone(),
                    },
                };
            }
        }
    }
    best
}

fn best_measure(left: &str, right: &str) -> (Measure, f64) {
    let mut best = (Measure::TokenSort, token_sort_ratio(left, right));
    for (measure, value) in [
        (Measure::Partial, partial_ratio(left, right)),
        (Measure::Edit, edit_ratio(left, right)),
    ] {
        if value > best.1 {
            best = (measure, value);
        }
    }
    best
}

/// Indel ratio of both strings after sorting their tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let left = sorted_tokens(a);
    let right = sorted_tokens(b);
    indel::normalized_similarity(left.chars(), right.chars())
}

/// Best indel ratio of the shorter string against every window of the
/// longer string with the same length. An empty side scores 0.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }
    let width = short.len();
    let mut best = 0.0_f64;
    for start in 0..=(long.len() - width) {
        let window = &long[start..start + width];
        let value =
            indel::normalized_similarity(short.iter().copied(), window.iter().copied());
        if value > best {
            best = value;
            if best >= 1.0 {
                break;
            }
        }
    }
    best
}

/// Normalized Levenshtein similarity.
pub fn edit_ratio(a: &str, b: &str) -> f64 {
    levenshtein::normalized_similarity(a.chars(), b.chars())
}

fn sorted_tokens(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diacritics_do_not_matter() {
        let result = score_detailed("João Félix", "Joao Felix");
        assert_eq!(result.score, 1.0);
        assert_eq!(result.basis, ScoreBasis::Identical);
    }

    #[test]
    fn reversed_order_scores_one() {
        assert_eq!(score("Kevin De Bruyne", "De Bruyne Kevin"), 1.0);
        assert_eq!(score("Salah Mohamed", "Mohamed Salah"), 1.0);
    }

    #[test]
    fn suffixes_are_ignored() {
        assert!(score("Vinícius Júnior", "Vinicius Jr.") >= 0.85);
    }

    #[test]
    fn abbreviated_first_name_shares_variation() {
        let result = score_detailed("Mohamed Salah", "Mo Salah");
        assert_eq!(result.score, 1.0);
        assert_eq!(
            result.basis,
            ScoreBasis::Variation {
                shared: "m salah".to_string()
            }
        );
    }

    #[test]
    fn empty_names_score_zero() {
        assert_eq!(score("", ""), 0.0);
        assert_eq!(score("", "Rodri"), 0.0);
        assert_eq!(score("Rodri", "--"), 0.0);
    }

    #[test]
    fn unrelated_names_score_low() {
        assert!(score("Erling Haaland", "Bukayo Saka") < 0.7);
    }

    #[test]
    fn fuzzy_score_explains_measure() {
        let result = score_detailed("Aleksandar Mitrovic", "Aleksandar Mitrovich");
        assert!(result.score > 0.9);
        assert!(matches!(result.basis, ScoreBasis::Fuzzy { .. }));
        assert!(result.explain().contains("ratio"));
    }

    #[test]
    fn partial_ratio_finds_substring() {
        assert_eq!(partial_ratio("salah", "mo salah"), 1.0);
        assert_eq!(partial_ratio("mo salah", "salah"), 1.0);
        assert_eq!(partial_ratio("", "salah"), 0.0);
    }

    #[test]
    fn token_sort_ignores_order() {
        assert_eq!(token_sort_ratio("de bruyne kevin", "kevin de bruyne"), 1.0);
    }

    #[test]
    fn edit_ratio_counts_substitutions() {
        assert!((edit_ratio("abcd", "abce") - 0.75).abs() < 1e-9);
    }
}
