//! Structural pre-filter applied before fuzzy scoring.

use crate::normalize::{NormalizedName, normalize};

/// Which cascade step produced a filtered pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    /// Name has fewer than two tokens; nothing was filtered.
    TooShort,
    /// Same first initial and same trailing last name.
    InitialAndLastName,
    /// Same first initial only.
    InitialOnly,
    /// No structural match; nothing was filtered.
    Unfiltered,
}

/// Narrow `candidates` to those structurally plausible for `name`.
///
/// Cascade, first non-empty result wins:
/// 1. fewer than two tokens in `name`: every candidate
/// 2. same first initial, and the normalized candidate ends with `name`'s
///    last token
/// 3. same first initial
/// 4. every candidate
///
/// Input order is preserved, and the result is never empty unless
/// `candidates` is.
pub fn filter_candidates<'a, S: AsRef<str>>(name: &str, candidates: &'a [S]) -> Vec<&'a str> {
    let normalized: Vec<NormalizedName> = candidates
        .iter()
        .map(|candidate| normalize(candidate.as_ref()))
        .collect();
    let refs: Vec<&NormalizedName> = normalized.iter().collect();
    let (_, kept) = filter_indices(&normalize(name), &refs);
    kept.into_iter().map(|idx| candidates[idx].as_ref()).collect()
}

/// Cascade over pre-normalized candidates; returns the stage reached and
/// the indices kept, in input order.
pub fn filter_indices(
    name: &NormalizedName,
    candidates: &[&NormalizedName],
) -> (FilterStage, Vec<usize>) {
    let everything = || (0..candidates.len()).collect::<Vec<_>>();
    if name.tokens.len() < 2 {
        return (FilterStage::TooShort, everything());
    }
    let Some(initial) = name.first_initial() else {
        return (FilterStage::TooShort, everything());
    };

    let same_initial: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.first_initial() == Some(initial))
        .map(|(idx, _)| idx)
        .collect();

    let with_last_name: Vec<usize> = same_initial
        .iter()
        .copied()
        .filter(|idx| candidates[*idx].full.ends_with(name.last_token.as_str()))
        .collect();
    if !with_last_name.is_empty() {
        return (FilterStage::InitialAndLastName, with_last_name);
    }
    if !same_initial.is_empty() {
        return (FilterStage::InitialOnly, same_initial);
    }
    (FilterStage::Unfiltered, everything())
}
