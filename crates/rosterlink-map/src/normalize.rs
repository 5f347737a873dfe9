//! Person name normalization.
//!
//! Turns a free-text player name into a comparable form: accents stripped,
//! lowercased, punctuation folded, generational suffixes dropped, and split
//! into tokens. Normalization never fails; malformed input degrades to the
//! empty name.

use std::collections::BTreeMap;

use rosterlink_model::CellValue;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Generational suffixes removed when they stand alone as a token.
const GENERATIONAL_SUFFIXES: &[&str] = &["jr", "sr", "junior", "senior", "i", "ii", "iii", "iv"];

/// A name in canonical comparable form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedName {
    /// Tokens joined by single spaces.
    pub full: String,
    /// Tokens in left-to-right order.
    pub tokens: Vec<String>,
    /// Last token, or empty.
    pub last_token: String,
    /// First letter of every token except the last; empty below two tokens.
    pub initials_of_rest: String,
}

impl NormalizedName {
    fn from_tokens(tokens: Vec<String>) -> Self {
        let last_token = tokens.last().cloned().unwrap_or_default();
        let initials_of_rest = if tokens.len() < 2 {
            String::new()
        } else {
            tokens[..tokens.len() - 1]
                .iter()
                .filter_map(|token| token.chars().next())
                .collect()
        };
        Self {
            full: tokens.join(" "),
            tokens,
            last_token,
            initials_of_rest,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First token, or empty.
    pub fn first_token(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    /// First character of the first token.
    pub fn first_initial(&self) -> Option<char> {
        self.first_token().chars().next()
    }
}

/// Normalize a raw name.
///
/// Steps, in order:
/// 1. Compatibility-decompose and drop combining marks (`é` -> `e`)
/// 2. Lowercase and fold Latin letters without a decomposition (`ø` -> `o`)
/// 3. Delete apostrophes, turn hyphens and other punctuation into spaces
/// 4. Drop standalone generational suffixes (`jr`, `iii`, ...)
/// 5. Collapse whitespace and split into tokens
pub fn normalize(raw: &str) -> NormalizedName {
    let mut cleaned = String::with_capacity(raw.len());
    let decomposed = raw
        .nfkd()
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch));
    for ch in decomposed {
        if let Some(folded) = fold_latin(ch) {
            cleaned.push_str(folded);
        } else if is_apostrophe(ch) {
            continue;
        } else if ch.is_alphanumeric() {
            cleaned.push(ch);
        } else {
            cleaned.push(' ');
        }
    }

    let tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
    NormalizedName::from_tokens(strip_suffixes(tokens))
}

/// Normalize an untyped cell; anything but text is the empty name.
pub fn normalize_cell(value: &CellValue) -> NormalizedName {
    value.as_text().map(normalize).unwrap_or_default()
}

/// Groups of distinct raw names that normalize to the same form.
///
/// Two different people sharing a normalized name cannot be told apart by
/// the matcher; callers surface these groups for manual disambiguation.
pub fn normalized_collisions<S: AsRef<str>>(names: &[S]) -> Vec<Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in names {
        let raw = name.as_ref();
        let normalized = normalize(raw);
        if normalized.is_empty() {
            continue;
        }
        let group = groups.entry(normalized.full).or_default();
        if !group.iter().any(|existing| existing == raw) {
            group.push(raw.to_string());
        }
    }
    groups.into_values().filter(|group| group.len() > 1).collect()
}

fn strip_suffixes(tokens: Vec<String>) -> Vec<String> {
    let kept: Vec<String> = tokens
        .iter()
        .filter(|token| !GENERATIONAL_SUFFIXES.contains(&token.as_str()))
        .cloned()
        .collect();
    // A name made only of suffix-like tokens ("Junior") keeps them.
    if kept.is_empty() { tokens } else { kept }
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}' | '\u{2018}' | '`' | '\u{00b4}' | '\u{02bc}')
}

fn fold_latin(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'ø' => "o",
        'ł' => "l",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'đ' | 'ð' => "d",
        'þ' => "th",
        'ı' => "i",
        _ => return None,
    };
    Some(folded)
}
