//! Inventory mutator: bounded, atomic deltas on a lesson's `spaces` counter.
//!
//! The mutator holds no state of its own. Each call submits a conditional
//! update to the catalog store, which is the sole arbiter of `spaces >= 0`.
//! There is no call-site pre-check against the floor: a delta that would drive
//! spaces negative is refused by the store and reported as
//! [`InventoryError::InsufficientSpaces`], never clamped.
//!
//! Two strategies are supported:
//!
//! - [`UpdateStrategy::Atomic`]: a write with `ExpectedVersion::Any`; the
//!   store does read-check-write natively. A store may still answer
//!   `VersionMismatch` when the row changed while it classified a refusal; the
//!   write is then reissued, bounded by `max_attempts`.
//! - [`UpdateStrategy::Optimistic`]: read the current version, write
//!   conditioned on it, retry on version conflict up to `max_attempts`, then
//!   give up with [`InventoryError::Conflict`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::instrument;

use lessonbook_catalog::{Lesson, SpacesRejection};
use lessonbook_core::{ExpectedVersion, LessonId, Versioned};

use crate::store::{with_timeout, CatalogStore, SpacesUpdate, StoreError, UpdateOutcome};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("lesson not found")]
    NotFound,

    #[error("invalid delta: {0}")]
    InvalidDelta(String),

    #[error("insufficient spaces: {available} available, {requested} requested")]
    InsufficientSpaces { available: i64, requested: i64 },

    /// The optimistic retry budget ran out. A server-side failure, not a
    /// client mistake.
    #[error("update conflict: gave up after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStrategy {
    #[default]
    Atomic,
    Optimistic,
}

/// Tuning knobs for [`InventoryMutator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutatorSettings {
    pub strategy: UpdateStrategy,
    /// Total attempts (first try included) before giving up with `Conflict`.
    pub max_attempts: u32,
    /// Budget for each individual store operation.
    pub store_timeout: Duration,
}

impl Default for MutatorSettings {
    fn default() -> Self {
        Self {
            strategy: UpdateStrategy::Atomic,
            max_attempts: 5,
            store_timeout: Duration::from_secs(5),
        }
    }
}

pub struct InventoryMutator {
    store: Arc<dyn CatalogStore>,
    settings: MutatorSettings,
}

impl InventoryMutator {
    pub fn new(store: Arc<dyn CatalogStore>, settings: MutatorSettings) -> Self {
        Self {
            store,
            settings: MutatorSettings {
                max_attempts: settings.max_attempts.max(1),
                ..settings
            },
        }
    }

    /// Apply `delta` to the lesson's spaces and return the post-update lesson.
    #[instrument(skip(self, id), fields(lesson_id = %id, strategy = ?self.settings.strategy))]
    pub async fn adjust_spaces(&self, id: LessonId, delta: i64) -> Result<Lesson, InventoryError> {
        let lesson = match self.settings.strategy {
            UpdateStrategy::Atomic => self.adjust_atomic(id, delta).await?,
            UpdateStrategy::Optimistic => self.adjust_optimistic(id, delta).await?,
        };
        tracing::info!(spaces = lesson.spaces, "spaces adjusted");
        Ok(lesson)
    }

    async fn adjust_atomic(&self, id: LessonId, delta: i64) -> Result<Lesson, InventoryError> {
        let attempts = self.settings.max_attempts;
        let update = SpacesUpdate {
            delta,
            expected: ExpectedVersion::Any,
        };

        for attempt in 1..=attempts {
            match self.submit(id, update).await? {
                // The row changed between the store's guarded write and its
                // refusal check; the unconditional write can simply be reissued.
                UpdateOutcome::VersionMismatch { actual } => {
                    tracing::debug!(attempt, actual, "row moved during refusal check, reissuing");
                }
                outcome => return resolve(outcome, attempt),
            }
        }

        tracing::warn!(attempts, "atomic update kept racing, giving up");
        Err(InventoryError::Conflict { attempts })
    }

    async fn adjust_optimistic(&self, id: LessonId, delta: i64) -> Result<Lesson, InventoryError> {
        let limit = self.settings.store_timeout;
        let attempts = self.settings.max_attempts;

        for attempt in 1..=attempts {
            let current = with_timeout("get", limit, self.store.get(id))
                .await?
                .ok_or(InventoryError::NotFound)?;

            let update = SpacesUpdate {
                delta,
                expected: ExpectedVersion::Exact(current.version()),
            };
            match self.submit(id, update).await? {
                UpdateOutcome::VersionMismatch { actual } => {
                    tracing::debug!(attempt, seen = current.version(), actual, "version moved, retrying");
                }
                outcome => return resolve(outcome, attempt),
            }
        }

        tracing::warn!(attempts, "optimistic retry budget exhausted");
        Err(InventoryError::Conflict { attempts })
    }

    async fn submit(&self, id: LessonId, update: SpacesUpdate) -> Result<UpdateOutcome, StoreError> {
        with_timeout(
            "conditional_update",
            self.settings.store_timeout,
            self.store.conditional_update(id, update),
        )
        .await
    }
}

fn resolve(outcome: UpdateOutcome, attempts: u32) -> Result<Lesson, InventoryError> {
    match outcome {
        UpdateOutcome::Applied(lesson) => Ok(lesson),
        UpdateOutcome::NotFound => Err(InventoryError::NotFound),
        UpdateOutcome::Rejected(SpacesRejection::Insufficient {
            available,
            requested,
        }) => Err(InventoryError::InsufficientSpaces {
            available,
            requested,
        }),
        UpdateOutcome::Rejected(SpacesRejection::Overflow) => Err(InventoryError::InvalidDelta(
            "delta overflows the spaces counter".to_string(),
        )),
        UpdateOutcome::VersionMismatch { .. } => Err(InventoryError::Conflict { attempts }),
    }
}

/// Parse a client-supplied delta into a finite integer.
///
/// Accepts JSON integers, integral floats (`2.0`) and numeric strings
/// (`"-1"`, `" 3 "`). Everything else is an [`InventoryError::InvalidDelta`].
pub fn parse_delta(raw: &JsonValue) -> Result<i64, InventoryError> {
    let invalid = |why: &str| InventoryError::InvalidDelta(format!("{why}: {raw}"));

    match raw {
        JsonValue::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            match n.as_f64() {
                Some(v) => integral(v).ok_or_else(|| invalid("delta must be a whole number in range")),
                None => Err(invalid("delta out of range")),
            }
        }
        JsonValue::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<i64>() {
                return Ok(v);
            }
            s.parse::<f64>()
                .ok()
                .and_then(integral)
                .ok_or_else(|| invalid("delta must be an integer"))
        }
        JsonValue::Null => Err(InventoryError::InvalidDelta("spacesDelta is required".to_string())),
        _ => Err(invalid("delta must be a number")),
    }
}

fn integral(v: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}
