//! Alternate renderings of a normalized name.

use std::collections::BTreeSet;

use crate::normalize::NormalizedName;

/// Derive the plausible renderings of a name.
///
/// - always the full form
/// - with two or more tokens: `first last`, `last first`, `f last`,
///   `last f`, and `last`
/// - with three or more tokens: `<initials of the rest> last`
///
/// The set never exceeds seven members, whatever the name length.
pub fn expand(name: &NormalizedName) -> BTreeSet<String> {
    let mut variations = BTreeSet::new();
    if name.is_empty() {
        return variations;
    }
    variations.insert(name.full.clone());

    if name.tokens.len() >= 2 {
        let first = name.first_token();
        let last = name.last_token.as_str();
        let initial: String = name.first_initial().into_iter().collect();

        variations.insert(format!("{first} {last}"));
        variations.insert(format!("{last} {first}"));
        variations.insert(format!("{initial} {last}"));
        variations.insert(format!("{last} {initial}"));
        variations.insert(last.to_string());
    }

    if name.tokens.len() >= 3 {
        variations.insert(format!("{} {}", name.initials_of_rest, name.last_token));
    }

    variations
}

/// Convenience for raw input: normalize, then expand.
pub fn expand_raw(raw: &str) -> BTreeSet<String> {
    expand(&crate::normalize::normalize(raw))
}
