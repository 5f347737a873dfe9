//! Match resolution: filter, score, pick the best candidate, classify.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rosterlink_model::MatchCandidate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::filter::{FilterStage, filter_indices};
use crate::normalize::NormalizedName;
use crate::score::{NameScore, PreparedName, ScoreBasis, score_prepared};

/// Most runner-up candidates reported with a resolution.
pub const MAX_ALTERNATIVES: usize = 3;

/// Outcome category of a resolution.
///
/// - `Auto`: confident enough to apply without asking
/// - `Suggested`: offered as the default choice, needs confirmation
/// - `Unmatched`: nothing worth showing; manual resolution required
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Classification {
    Unmatched,
    Suggested,
    Auto,
}

/// Score boundaries between classifications.
///
/// - at or above `high`: [`Classification::Auto`]
/// - `low` to `high`: [`Classification::Suggested`]
/// - below `low`: [`Classification::Unmatched`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    /// Minimum score applied automatically (default: 0.80).
    pub high: f64,
    /// Minimum score worth showing as a hint (default: 0.50).
    pub low: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            high: 0.80,
            low: 0.50,
        }
    }
}

impl MatchThresholds {
    /// Creates validated thresholds.
    pub fn new(high: f64, low: f64) -> Result<Self, ConfigError> {
        let thresholds = Self { high, low };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Creates thresholds that only auto-apply near-certain matches.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            high: 0.85,
            low: 0.60,
        }
    }

    /// Creates thresholds for sources with heavily abbreviated names.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            high: 0.65,
            low: 0.40,
        }
    }

    /// Checks both bounds are in `[0, 1]` and `low <= high`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("high", self.high), ("low", self.low)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if self.low > self.high {
            return Err(ConfigError::ThresholdOrder {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Categorizes a score.
    #[must_use]
    pub fn categorize(&self, score: f64) -> Classification {
        if score >= self.high {
            Classification::Auto
        } else if score >= self.low {
            Classification::Suggested
        } else {
            Classification::Unmatched
        }
    }
}

/// Result of resolving one source name against a target pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub source: String,
    /// Best target; `None` when unmatched.
    pub best_match: Option<String>,
    /// Highest score seen, even when unmatched.
    pub best_score: f64,
    pub classification: Classification,
    /// Runner-up targets at or above the low threshold, best first.
    pub alternatives: Vec<(String, f64)>,
    /// Why the best candidate scored what it did.
    pub basis: Option<ScoreBasis>,
    /// Filter stage that produced the scored pool.
    pub stage: FilterStage,
}

impl Resolution {
    fn unmatched(source: &str, stage: FilterStage) -> Self {
        Self {
            source: source.to_string(),
            best_match: None,
            best_score: 0.0,
            classification: Classification::Unmatched,
            alternatives: Vec::new(),
            basis: None,
            stage,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.classification == Classification::Auto
    }

    /// The best pairing as a candidate record, when there is one.
    pub fn candidate(&self) -> Option<MatchCandidate> {
        self.best_match.as_ref().map(|target| MatchCandidate {
            source_name: self.source.clone(),
            target_name: target.clone(),
            score: self.best_score,
        })
    }

    /// Best match followed by the alternatives, for pick lists.
    pub fn options(&self) -> Vec<(&str, f64)> {
        let mut options = Vec::with_capacity(self.alternatives.len() + 1);
        if let Some(best) = &self.best_match {
            options.push((best.as_str(), self.best_score));
        }
        options.extend(
            self.alternatives
                .iter()
                .map(|(name, score)| (name.as_str(), *score)),
        );
        options
    }
}

/// Resolutions for a batch of source names.
#[derive(Debug, Clone, Default)]
pub struct ResolutionBatch {
    pub resolutions: Vec<Resolution>,
}

impl ResolutionBatch {
    /// Returns the count of resolutions per classification.
    #[must_use]
    pub fn count_by_class(&self) -> BTreeMap<Classification, usize> {
        let mut counts = BTreeMap::new();
        for resolution in &self.resolutions {
            *counts.entry(resolution.classification).or_insert(0) += 1;
        }
        counts
    }

    /// Resolutions that still need a human decision.
    pub fn unresolved(&self) -> impl Iterator<Item = &Resolution> {
        self.resolutions.iter().filter(|r| !r.is_auto())
    }

    /// Returns the mean best score, if any.
    #[must_use]
    pub fn mean_score(&self) -> Option<f64> {
        if self.resolutions.is_empty() {
            return None;
        }
        let sum: f64 = self.resolutions.iter().map(|r| r.best_score).sum();
        Some(sum / self.resolutions.len() as f64)
    }
}

/// Resolves source names against target pools.
///
/// For each source: narrow the pool with the structural filter, score every
/// remaining candidate, keep the highest (first one wins ties), and
/// classify against the configured thresholds.
///
/// # Example
///
/// ```
/// use rosterlink_map::{Classification, MatchResolver, MatchThresholds};
///
/// let resolver = MatchResolver::new(MatchThresholds::relaxed());
/// let resolution = resolver.resolve("Mohamed Salah", &["Mo Salah", "Sadio Mane"]);
/// assert_eq!(resolution.classification, Classification::Auto);
/// assert_eq!(resolution.best_match.as_deref(), Some("Mo Salah"));
/// ```
#[derive(Debug, Clone)]
pub struct MatchResolver {
    thresholds: MatchThresholds,
}

impl Default for MatchResolver {
    fn default() -> Self {
        Self::new(MatchThresholds::default())
    }
}

impl MatchResolver {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Resolves one raw source name against raw target names.
    pub fn resolve<S: AsRef<str>>(&self, source: &str, pool: &[S]) -> Resolution {
        let prepared: Vec<PreparedName> = pool
            .iter()
            .map(|name| PreparedName::new(name.as_ref()))
            .collect();
        let refs: Vec<&PreparedName> = prepared.iter().collect();
        self.resolve_prepared(&PreparedName::new(source), &refs)
    }

    /// Resolves a prepared source against prepared targets.
    pub fn resolve_prepared(&self, source: &PreparedName, pool: &[&PreparedName]) -> Resolution {
        let normalized: Vec<&NormalizedName> = pool.iter().map(|p| &p.normalized).collect();
        let (stage, kept) = filter_indices(&source.normalized, &normalized);
        if kept.is_empty() {
            debug!(stage = ?stage, "empty target pool");
            return Resolution::unmatched(&source.raw, stage);
        }

        let mut scored: Vec<(usize, NameScore)> = kept
            .into_iter()
            .map(|idx| (idx, score_prepared(source, pool[idx])))
            .collect();

        let mut best_pos = 0;
        for (pos, (_, score)) in scored.iter().enumerate() {
            if score.score > scored[best_pos].1.score {
                best_pos = pos;
            }
        }
        let (best_idx, best) = scored.remove(best_pos);
        let classification = self.thresholds.categorize(best.score);

        // Stable sort keeps pool order among equal scores.
        scored.sort_by(|a, b| b.1.score.partial_cmp(&a.1.score).unwrap_or(Ordering::Equal));
        let alternatives: Vec<(String, f64)> = if classification == Classification::Unmatched {
            Vec::new()
        } else {
            scored
                .into_iter()
                .filter(|(_, score)| score.score >= self.thresholds.low)
                .take(MAX_ALTERNATIVES)
                .map(|(idx, score)| (pool[idx].raw.clone(), score.score))
                .collect()
        };

        trace!(
            source = %source.raw,
            target = %pool[best_idx].raw,
            score = best.score,
            "best candidate"
        );
        debug!(
            classification = ?classification,
            score = best.score,
            stage = ?stage,
            alternatives = alternatives.len(),
            "resolved name"
        );

        let best_match = match classification {
            Classification::Unmatched => None,
            Classification::Auto | Classification::Suggested => Some(pool[best_idx].raw.clone()),
        };
        Resolution {
            source: source.raw.clone(),
            best_match,
            best_score: best.score,
            classification,
            alternatives,
            basis: Some(best.basis),
            stage,
        }
    }

    /// Resolves every source independently against the full pool.
    ///
    /// No one-to-one constraint is applied; use a session for that.
    pub fn resolve_all<S: AsRef<str>, T: AsRef<str>>(
        &self,
        sources: &[S],
        pool: &[T],
    ) -> ResolutionBatch {
        let prepared: Vec<PreparedName> = pool
            .iter()
            .map(|name| PreparedName::new(name.as_ref()))
            .collect();
        let refs: Vec<&PreparedName> = prepared.iter().collect();
        let resolutions: Vec<Resolution> = sources
            .iter()
            .map(|source| self.resolve_prepared(&PreparedName::new(source.as_ref()), &refs))
            .collect();
        let batch = ResolutionBatch { resolutions };
        debug!(
            sources = sources.len(),
            targets = pool.len(),
            counts = ?batch.count_by_class(),
            "resolved batch"
        );
        batch
    }
}
