//! Report types shared by the match, review and merge commands.

use rosterlink_map::{Classification, ReconcileSession, SessionError};
use serde::Serialize;

/// Outcome of matching one secondary dataset against the primary.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub label: String,
    pub target_label: String,
    /// Distinct player names in the secondary dataset.
    pub sources: usize,
    /// Names confirmed by the automatic pass.
    pub auto: usize,
    /// Names confirmed in total.
    pub confirmed: usize,
    pub rejected: usize,
    /// Pending names with a suggestion.
    pub suggested: usize,
    /// Pending names with nothing worth suggesting.
    pub unmatched: usize,
    pub unresolved: Vec<UnresolvedName>,
}

/// A pending name with its current best suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedName {
    pub name: String,
    pub classification: Classification,
    pub suggestion: Option<String>,
    /// Best score, as a whole percentage.
    pub score_percent: u32,
}

impl MatchReport {
    /// Builds a report from the session's current state.
    pub fn from_session(session: &ReconcileSession, auto: usize) -> Result<Self, SessionError> {
        let mut unresolved = Vec::new();
        for name in session.pending() {
            let resolution = session.suggest(name)?;
            unresolved.push(UnresolvedName {
                name: name.to_string(),
                classification: resolution.classification,
                suggestion: resolution.best_match,
                score_percent: to_percent(resolution.best_score),
            });
        }
        let summary = session.summary();
        let unmatched = unresolved
            .iter()
            .filter(|u| u.classification == Classification::Unmatched)
            .count();
        Ok(Self {
            label: session.source_label().to_string(),
            target_label: session.target_label().to_string(),
            sources: session.sources().len(),
            auto,
            confirmed: summary.confirmed,
            rejected: summary.rejected,
            suggested: unresolved.len() - unmatched,
            unmatched,
            unresolved,
        })
    }

    pub fn pending(&self) -> usize {
        self.unresolved.len()
    }
}

pub fn to_percent(score: f64) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}
