//! Player name resolution and one-to-one record linkage.
//!
//! The pipeline for a single name pair is normalize, expand into
//! variations, score. For a name against a pool it is filter, score each
//! candidate, classify the best one. [`ReconcileSession`] layers the
//! reviewable, undoable decision state on top.

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod score;
pub mod state;
pub mod variation;
pub mod workflow;

pub use engine::{
    Classification, MAX_ALTERNATIVES, MatchResolver, MatchThresholds, Resolution,
    ResolutionBatch,
};
pub use error::{ConfigError, Result, SessionError, TransitionError};
pub use filter::{FilterStage, filter_candidates};
pub use normalize::{NormalizedName, normalize, normalize_cell, normalized_collisions};
pub use score::{Measure, NameScore, PreparedName, ScoreBasis, score, score_detailed};
pub use state::{Action, ActionKind, MatchSessionState, SessionSummary, SourceStatus};
pub use variation::expand;
pub use workflow::{Command, Outcome, ReconcileSession};
