//! Error types for the matching engine.

use thiserror::Error;

/// A session mutation that would break the one-to-one invariants.
///
/// The session state is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The target is held by another, still-confirmed source.
    #[error("target '{target}' is already matched to '{owner}'")]
    TargetAlreadyConsumed { target: String, owner: String },

    /// Undo was requested with nothing to undo.
    #[error("nothing to undo")]
    EmptyHistory,
}

/// Invalid matching configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("threshold {name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("low threshold {low} must not exceed high threshold {high}")]
    ThresholdOrder { low: f64, high: f64 },
}

/// Errors surfaced by a reconciliation session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The name is not part of the session's source list.
    #[error("unknown source name: {0}")]
    UnknownSource(String),

    /// The name is not part of the session's target list.
    #[error("unknown target name: {0}")]
    UnknownTarget(String),

    /// Accepting a suggestion for a source that has none.
    #[error("no suggestion available for '{0}'")]
    NoSuggestion(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
