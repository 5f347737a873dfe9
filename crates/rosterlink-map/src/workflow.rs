//! Command-driven reconciliation of one source list against one target list.

use std::collections::HashSet;

use rosterlink_model::{ConfirmedMapping, MatchCandidate};
use tracing::{debug, info, trace};

use crate::engine::{MatchResolver, Resolution};
use crate::error::{Result, SessionError};
use crate::score::PreparedName;
use crate::state::{Action, MatchSessionState, SessionSummary, SourceStatus};

/// A user decision applied to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Link a source to an explicitly chosen target.
    Confirm { source: String, target: String },
    /// Link a source to its current best suggestion.
    AcceptSuggestion { source: String },
    /// Mark a source as having no counterpart.
    Reject { source: String },
    /// Revert the last decision.
    Undo,
    /// Drop every decision.
    Reset,
}

/// Effect of an applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed { source: String, target: String },
    Rejected { source: String },
    Undone(Action),
    Reset,
}

/// Reconciliation of one secondary dataset's names against the primary's.
///
/// Owns both name lists, the resolver and the decision state. Every
/// mutation goes through [`ReconcileSession::apply`], and suggestions are
/// always computed against the targets that are still free.
#[derive(Debug, Clone)]
pub struct ReconcileSession {
    source_label: String,
    target_label: String,
    sources: Vec<String>,
    source_set: HashSet<String>,
    targets: Vec<PreparedName>,
    target_set: HashSet<String>,
    resolver: MatchResolver,
    state: MatchSessionState,
}

impl ReconcileSession {
    pub fn new(
        source_label: impl Into<String>,
        sources: Vec<String>,
        target_label: impl Into<String>,
        targets: Vec<String>,
        resolver: MatchResolver,
    ) -> Self {
        let source_set = sources.iter().cloned().collect();
        let target_set = targets.iter().cloned().collect();
        let targets = targets.iter().map(|name| PreparedName::new(name)).collect();
        Self {
            source_label: source_label.into(),
            target_label: target_label.into(),
            sources,
            source_set,
            targets,
            target_set,
            resolver,
            state: MatchSessionState::new(),
        }
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn target_label(&self) -> &str {
        &self.target_label
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn state(&self) -> &MatchSessionState {
        &self.state
    }

    pub fn resolver(&self) -> &MatchResolver {
        &self.resolver
    }

    /// Apply one command to completion.
    pub fn apply(&mut self, command: Command) -> Result<Outcome> {
        debug!(command = command_name(&command), "applying command");
        match command {
            Command::Confirm { source, target } => {
                self.ensure_source(&source)?;
                if !self.target_set.contains(&target) {
                    return Err(SessionError::UnknownTarget(target));
                }
                self.state.confirm(&source, &target)?;
                Ok(Outcome::Confirmed { source, target })
            }
            Command::AcceptSuggestion { source } => {
                let resolution = self.suggest(&source)?;
                let target = resolution
                    .best_match
                    .ok_or_else(|| SessionError::NoSuggestion(source.clone()))?;
                self.state.confirm(&source, &target)?;
                Ok(Outcome::Confirmed { source, target })
            }
            Command::Reject { source } => {
                self.ensure_source(&source)?;
                self.state.reject(&source);
                Ok(Outcome::Rejected { source })
            }
            Command::Undo => Ok(Outcome::Undone(self.state.undo()?)),
            Command::Reset => {
                self.state.reset();
                Ok(Outcome::Reset)
            }
        }
    }

    /// Resolve `source` against the targets not yet consumed.
    pub fn suggest(&self, source: &str) -> Result<Resolution> {
        self.ensure_source(source)?;
        let pool: Vec<&PreparedName> = self
            .targets
            .iter()
            .filter(|target| !self.state.is_consumed(&target.raw))
            .collect();
        Ok(self
            .resolver
            .resolve_prepared(&PreparedName::new(source), &pool))
    }

    /// Confirm every pending source whose resolution is automatic.
    ///
    /// Sources are visited in input order against the shrinking pool, and
    /// each confirmation is an ordinary undoable action.
    pub fn auto_match(&mut self) -> Result<Vec<MatchCandidate>> {
        let pending: Vec<String> = self
            .state
            .pending_sources(&self.sources)
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut applied = Vec::new();
        for source in pending {
            let resolution = self.suggest(&source)?;
            if !resolution.is_auto() {
                continue;
            }
            if let Some(candidate) = resolution.candidate() {
                self.state
                    .confirm(&candidate.source_name, &candidate.target_name)?;
                trace!(
                    source = %candidate.source_name,
                    target = %candidate.target_name,
                    score = candidate.score,
                    "auto matched"
                );
                applied.push(candidate);
            }
        }

        info!(
            source = %self.source_label,
            target = %self.target_label,
            auto = applied.len(),
            pending = self.pending().len(),
            "auto match complete"
        );
        Ok(applied)
    }

    /// Sources still awaiting a decision, in input order.
    pub fn pending(&self) -> Vec<&str> {
        self.state.pending_sources(&self.sources)
    }

    /// First source awaiting a decision.
    pub fn next_pending(&self) -> Option<&str> {
        self.pending().into_iter().next()
    }

    /// Targets not yet linked to any source, in input order.
    pub fn available_targets(&self) -> Vec<&str> {
        self.targets
            .iter()
            .map(|target| target.raw.as_str())
            .filter(|target| !self.state.is_consumed(target))
            .collect()
    }

    pub fn status(&self, source: &str) -> SourceStatus {
        self.state.status(source)
    }

    pub fn summary(&self) -> SessionSummary {
        self.state.summary()
    }

    /// Export-ready copy of the decisions.
    pub fn snapshot(&self) -> ConfirmedMapping {
        self.state.snapshot(&self.source_label, &self.target_label)
    }

    fn ensure_source(&self, source: &str) -> Result<()> {
        if self.source_set.contains(source) {
            Ok(())
        } else {
            Err(SessionError::UnknownSource(source.to_string()))
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Confirm { .. } => "confirm",
        Command::AcceptSuggestion { .. } => "accept-suggestion",
        Command::Reject { .. } => "reject",
        Command::Undo => "undo",
        Command::Reset => "reset",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MatchThresholds;
    use crate::error::TransitionError;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn session(sources: &[&str], targets: &[&str]) -> ReconcileSession {
        ReconcileSession::new(
            "physical",
            names(sources),
            "wyscout",
            names(targets),
            MatchResolver::new(MatchThresholds::relaxed()),
        )
    }

    #[test]
    fn auto_match_confirms_confident_pairs() {
        let mut session = session(
            &["Mo Salah", "Zzyzx Qwerty"],
            &["Mohamed Salah", "Virgil van Dijk"],
        );
        let applied = session.auto_match().unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(
            session.status("Mo Salah"),
            SourceStatus::Confirmed("Mohamed Salah".to_string())
        );
        assert_eq!(session.next_pending(), Some("Zzyzx Qwerty"));
        assert_eq!(session.available_targets(), vec!["Virgil van Dijk"]);
    }

    #[test]
    fn auto_match_respects_one_to_one() {
        let mut session = session(&["Joao Felix", "João Félix"], &["JOAO FELIX"]);
        session.auto_match().unwrap();
        assert_eq!(session.summary().confirmed, 1);
        assert_eq!(session.pending(), vec!["João Félix"]);
        let resolution = session.suggest("João Félix").unwrap();
        assert!(resolution.best_match.is_none());
    }

    #[test]
    fn accept_suggestion_uses_best_match() {
        let mut session = session(&["Mo Salah"], &["Sadio Mane", "Mohamed Salah"]);
        let outcome = session
            .apply(Command::AcceptSuggestion {
                source: "Mo Salah".to_string(),
            })
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Confirmed {
                source: "Mo Salah".to_string(),
                target: "Mohamed Salah".to_string(),
            }
        );
    }

    #[test]
    fn accept_without_suggestion_fails() {
        let mut session = session(&["Mo Salah"], &[]);
        let err = session
            .apply(Command::AcceptSuggestion {
                source: "Mo Salah".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, SessionError::NoSuggestion("Mo Salah".to_string()));
    }

    #[test]
    fn unknown_names_are_refused() {
        let mut session = session(&["Mo Salah"], &["Mohamed Salah"]);
        assert!(matches!(
            session.apply(Command::Reject {
                source: "Nobody".to_string()
            }),
            Err(SessionError::UnknownSource(_))
        ));
        assert!(matches!(
            session.apply(Command::Confirm {
                source: "Mo Salah".to_string(),
                target: "Nobody".to_string(),
            }),
            Err(SessionError::UnknownTarget(_))
        ));
    }

    #[test]
    fn consumed_target_surfaces_transition_error() {
        let mut session = session(&["a b", "c d"], &["x y"]);
        session
            .apply(Command::Confirm {
                source: "a b".to_string(),
                target: "x y".to_string(),
            })
            .unwrap();
        let err = session
            .apply(Command::Confirm {
                source: "c d".to_string(),
                target: "x y".to_string(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Transition(TransitionError::TargetAlreadyConsumed { .. })
        ));
    }

    #[test]
    fn undo_and_reset_commands() {
        let mut session = session(&["Mo Salah"], &["Mohamed Salah"]);
        session.auto_match().unwrap();
        let outcome = session.apply(Command::Undo).unwrap();
        assert!(matches!(outcome, Outcome::Undone(_)));
        assert_eq!(session.next_pending(), Some("Mo Salah"));

        session
            .apply(Command::Reject {
                source: "Mo Salah".to_string(),
            })
            .unwrap();
        assert_eq!(session.apply(Command::Reset).unwrap(), Outcome::Reset);
        assert_eq!(session.summary(), SessionSummary::default());
    }

    #[test]
    fn snapshot_carries_labels() {
        let mut session = session(&["Mo Salah"], &["Mohamed Salah"]);
        session.auto_match().unwrap();
        let mapping = session.snapshot();
        assert_eq!(mapping.source_label, "physical");
        assert_eq!(mapping.target_label, "wyscout");
        assert_eq!(mapping.target_for("Mo Salah"), Some("Mohamed Salah"));
    }
}
