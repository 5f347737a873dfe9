//! Decision state for reconciling one source list against one target list.
//!
//! Tracks which source names are confirmed to which target, which are
//! rejected, and the history needed to undo each decision. A reverse
//! index from target to owning source is kept in lock step with the
//! confirmed map so that no target is ever held twice.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rosterlink_model::ConfirmedMapping;
use tracing::{debug, trace};

use crate::error::TransitionError;

/// Current decision for a source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    /// No decision yet.
    Pending,
    /// Linked to the given target name.
    Confirmed(String),
    /// Marked as having no counterpart.
    Rejected,
}

impl SourceStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Kind of a recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Confirm,
    Reject,
}

/// A recorded decision together with the status it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub source: String,
    /// Status of `source` before this action.
    pub prior: SourceStatus,
}

/// Summary of decision counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of confirmed source names.
    pub confirmed: usize,
    /// Number of rejected source names.
    pub rejected: usize,
    /// Number of actions that can be undone.
    pub history: usize,
}

/// Mutable decision state for one reconciliation.
///
/// Every failed operation leaves the state untouched.
#[derive(Debug, Clone, Default)]
pub struct MatchSessionState {
    confirmed: BTreeMap<String, String>,
    owners: BTreeMap<String, String>,
    rejected: BTreeSet<String>,
    history: Vec<Action>,
    history_limit: Option<usize>,
}

impl MatchSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` undoable actions; older ones are dropped.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self.trim_history();
        self
    }

    /// Link `source` to `target`.
    ///
    /// Replaces any previous target of `source` and clears a rejection.
    /// Confirming the pair already in place changes nothing.
    pub fn confirm(&mut self, source: &str, target: &str) -> Result<(), TransitionError> {
        if let Some(owner) = self.owners.get(target) {
            if owner == source {
                return Ok(());
            }
            return Err(TransitionError::TargetAlreadyConsumed {
                target: target.to_string(),
                owner: owner.clone(),
            });
        }

        let prior = self.status(source);
        self.clear_source(source);
        self.confirmed.insert(source.to_string(), target.to_string());
        self.owners.insert(target.to_string(), source.to_string());
        self.record(ActionKind::Confirm, source, prior);
        trace!(source, target, "confirmed");
        Ok(())
    }

    /// Mark `source` as having no counterpart, releasing its target.
    ///
    /// Rejecting an already rejected source changes nothing.
    pub fn reject(&mut self, source: &str) {
        if self.rejected.contains(source) {
            return;
        }
        let prior = self.status(source);
        self.clear_source(source);
        self.rejected.insert(source.to_string());
        self.record(ActionKind::Reject, source, prior);
        trace!(source, "rejected");
    }

    /// Revert the most recent decision, restoring the prior status of its
    /// source exactly.
    pub fn undo(&mut self) -> Result<Action, TransitionError> {
        let action = self.history.pop().ok_or(TransitionError::EmptyHistory)?;
        self.clear_source(&action.source);
        match &action.prior {
            SourceStatus::Pending => {}
            SourceStatus::Confirmed(target) => {
                self.confirmed.insert(action.source.clone(), target.clone());
                self.owners.insert(target.clone(), action.source.clone());
            }
            SourceStatus::Rejected => {
                self.rejected.insert(action.source.clone());
            }
        }
        debug!(kind = ?action.kind, remaining = self.history.len(), "undid action");
        trace!(source = %action.source, prior = ?action.prior, "restored status");
        Ok(action)
    }

    /// Clear all decisions and history.
    pub fn reset(&mut self) {
        self.confirmed.clear();
        self.owners.clear();
        self.rejected.clear();
        self.history.clear();
        debug!("session reset");
    }

    /// Current decision for `source`.
    pub fn status(&self, source: &str) -> SourceStatus {
        if let Some(target) = self.confirmed.get(source) {
            SourceStatus::Confirmed(target.clone())
        } else if self.rejected.contains(source) {
            SourceStatus::Rejected
        } else {
            SourceStatus::Pending
        }
    }

    /// Target confirmed for `source`, if any.
    pub fn target_of(&self, source: &str) -> Option<&str> {
        self.confirmed.get(source).map(String::as_str)
    }

    /// Source currently holding `target`, if any.
    pub fn owner_of(&self, target: &str) -> Option<&str> {
        self.owners.get(target).map(String::as_str)
    }

    pub fn is_consumed(&self, target: &str) -> bool {
        self.owners.contains_key(target)
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Recorded actions, oldest first.
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    /// Sources from `all` with no decision, in input order.
    pub fn pending_sources<'a, S: AsRef<str>>(&self, all: &'a [S]) -> Vec<&'a str> {
        all.iter()
            .map(|name| name.as_ref())
            .filter(|source| {
                !self.confirmed.contains_key(*source) && !self.rejected.contains(*source)
            })
            .collect()
    }

    /// Targets from `all` not held by any source, in input order.
    pub fn available_targets<'a, S: AsRef<str>>(&self, all: &'a [S]) -> Vec<&'a str> {
        all.iter()
            .map(|name| name.as_ref())
            .filter(|target| !self.owners.contains_key(*target))
            .collect()
    }

    /// Get summary counts.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            confirmed: self.confirmed.len(),
            rejected: self.rejected.len(),
            history: self.history.len(),
        }
    }

    /// Read-only copy of the decisions, for export.
    pub fn snapshot(&self, source_label: &str, target_label: &str) -> ConfirmedMapping {
        let mut mapping = ConfirmedMapping::new(source_label, target_label);
        mapping.matches = self.confirmed.clone();
        mapping.rejected = self.rejected.iter().cloned().collect();
        mapping
    }

    /// Checks the one-to-one and disjointness invariants.
    pub fn is_consistent(&self) -> bool {
        let targets: HashSet<&String> = self.confirmed.values().collect();
        targets.len() == self.confirmed.len()
            && self.owners.len() == self.confirmed.len()
            && self
                .owners
                .iter()
                .all(|(target, source)| self.confirmed.get(source) == Some(target))
            && self
                .rejected
                .iter()
                .all(|source| !self.confirmed.contains_key(source))
    }

    fn clear_source(&mut self, source: &str) {
        if let Some(target) = self.confirmed.remove(source) {
            self.owners.remove(&target);
        }
        self.rejected.remove(source);
    }

    fn record(&mut self, kind: ActionKind, source: &str, prior: SourceStatus) {
        self.history.push(Action {
            kind,
            source: source.to_string(),
            prior,
        });
        self.trim_history();
        debug!(
            kind = ?kind,
            confirmed = self.confirmed.len(),
            rejected = self.rejected.len(),
            "recorded action"
        );
    }

    fn trim_history(&mut self) {
        if let Some(limit) = self.history_limit
            && self.history.len() > limit
        {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_then_undo_returns_to_pending() {
        let mut state = MatchSessionState::new();
        state.confirm("Mo Salah", "Mohamed Salah").unwrap();
        assert_eq!(
            state.status("Mo Salah"),
            SourceStatus::Confirmed("Mohamed Salah".to_string())
        );
        assert_eq!(state.owner_of("Mohamed Salah"), Some("Mo Salah"));

        state.undo().unwrap();
        assert_eq!(state.status("Mo Salah"), SourceStatus::Pending);
        assert!(!state.is_consumed("Mohamed Salah"));
        assert!(!state.can_undo());
    }

    #[test]
    fn consumed_target_is_refused() {
        let mut state = MatchSessionState::new();
        state.confirm("A. Source", "Target").unwrap();
        let err = state.confirm("B. Source", "Target").unwrap_err();
        assert_eq!(
            err,
            TransitionError::TargetAlreadyConsumed {
                target: "Target".to_string(),
                owner: "A. Source".to_string(),
            }
        );
        assert_eq!(state.status("B. Source"), SourceStatus::Pending);
        assert_eq!(state.summary().history, 1);
    }

    #[test]
    fn reconfirming_same_pair_is_not_recorded() {
        let mut state = MatchSessionState::new();
        state.confirm("Rodri", "Rodrigo Hernandez").unwrap();
        state.confirm("Rodri", "Rodrigo Hernandez").unwrap();
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn reconfirming_releases_previous_target() {
        let mut state = MatchSessionState::new();
        state.confirm("Gabriel", "Gabriel Jesus").unwrap();
        state.confirm("Gabriel", "Gabriel Martinelli").unwrap();
        assert!(!state.is_consumed("Gabriel Jesus"));

        state.undo().unwrap();
        assert_eq!(state.target_of("Gabriel"), Some("Gabriel Jesus"));
        assert!(!state.is_consumed("Gabriel Martinelli"));
        assert!(state.is_consistent());
    }

    #[test]
    fn reject_releases_target_and_undo_restores_it() {
        let mut state = MatchSessionState::new();
        state.confirm("Mo Salah", "Mohamed Salah").unwrap();
        state.reject("Mo Salah");
        assert_eq!(state.status("Mo Salah"), SourceStatus::Rejected);
        assert!(!state.is_consumed("Mohamed Salah"));

        state.undo().unwrap();
        assert_eq!(state.owner_of("Mohamed Salah"), Some("Mo Salah"));
    }

    #[test]
    fn double_reject_is_not_recorded() {
        let mut state = MatchSessionState::new();
        state.reject("Trialist");
        state.reject("Trialist");
        assert_eq!(state.history().len(), 1);
        state.undo().unwrap();
        assert_eq!(state.status("Trialist"), SourceStatus::Pending);
    }

    #[test]
    fn undo_on_empty_history_fails() {
        let mut state = MatchSessionState::new();
        assert_eq!(state.undo().unwrap_err(), TransitionError::EmptyHistory);
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = MatchSessionState::new();
        state.confirm("a", "x").unwrap();
        state.reject("b");
        state.reset();
        assert_eq!(state.summary(), SessionSummary::default());
        assert_eq!(state.pending_sources(&["a", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn pending_and_available_keep_input_order() {
        let mut state = MatchSessionState::new();
        state.confirm("b", "y").unwrap();
        state.reject("c");
        assert_eq!(state.pending_sources(&["a", "b", "c", "d"]), vec!["a", "d"]);
        assert_eq!(state.available_targets(&["x", "y", "z"]), vec!["x", "z"]);
    }

    #[test]
    fn history_limit_drops_oldest() {
        let mut state = MatchSessionState::new().with_history_limit(2);
        state.confirm("a", "x").unwrap();
        state.confirm("b", "y").unwrap();
        state.confirm("c", "z").unwrap();
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[0].source, "b");
    }

    #[test]
    fn snapshot_copies_decisions() {
        let mut state = MatchSessionState::new();
        state.confirm("Mo Salah", "Mohamed Salah").unwrap();
        state.reject("Trialist");
        let mapping = state.snapshot("physical", "wyscout");
        assert_eq!(mapping.source_label, "physical");
        assert_eq!(mapping.target_for("Mo Salah"), Some("Mohamed Salah"));
        assert_eq!(mapping.rejected, vec!["Trialist".to_string()]);
    }
}
