//! Caller-owned recalculation side effects around the pure engine.
//!
//! Every recalculation appends its own history entry when the score
//! changes — concurrent requests may race on which score value is
//! persisted last (last write wins on the mutable column), but history
//! writes are never merged or dropped.

use chrono::Utc;
use ecoscore_config::ScoreDeltas;
use ecoscore_home_models::{ImprovementCategory, ScoreHistoryEntry, ScoreReason};
use ecoscore_store::HomeStore;
use log::{debug, info};
use serde::Serialize;
use uuid::Uuid;

use crate::{ScoreError, engine::compute_score};

/// What prompted a recalculation. Serialized into the history entry's
/// detail payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreTrigger {
    /// Explicit request from a user or operator.
    Manual,
    /// Periodic background recalculation.
    Scheduled,
    /// An improvement was just logged.
    ImprovementLogged {
        /// The category that was logged.
        category: ImprovementCategory,
    },
}

/// Outcome of a recalculation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecalcOutcome {
    /// The recomputed score matched the stored one; nothing was written.
    Unchanged {
        /// The (unchanged) score.
        score: u8,
    },
    /// The score changed; a history entry was appended and the new score
    /// persisted.
    Updated {
        /// Score before recalculation.
        old_score: u8,
        /// Score after recalculation.
        new_score: u8,
    },
}

/// Recomputes a home's score and persists the result if it changed.
///
/// When the recomputed score differs from the stored one, appends a
/// [`ScoreHistoryEntry`] with reason `Recalculation` and detail
/// `{old_score, trigger}`, then persists the new score and timestamp.
/// An unchanged score is an idempotent no-op: no history entry, no
/// write.
///
/// # Errors
///
/// Returns [`ScoreError::HomeNotFound`] for an unknown home,
/// [`ScoreError::Validation`] from the engine, and store failures as-is.
pub async fn recalculate(
    store: &dyn HomeStore,
    deltas: &ScoreDeltas,
    home_id: Uuid,
    trigger: ScoreTrigger,
) -> Result<RecalcOutcome, ScoreError> {
    let home = store
        .get_home(home_id)
        .await?
        .ok_or(ScoreError::HomeNotFound { home_id })?;

    let improvements = store.improvements_for(home_id).await?;
    let new_score = compute_score(&home, &improvements, deltas)?;

    if new_score == home.current_score {
        debug!("Score for home {home_id} unchanged at {new_score}");
        return Ok(RecalcOutcome::Unchanged { score: new_score });
    }

    let old_score = home.current_score;
    let now = Utc::now();

    store
        .append_history(ScoreHistoryEntry {
            id: Uuid::new_v4(),
            home_id,
            score: new_score,
            reason: ScoreReason::Recalculation,
            detail: Some(serde_json::json!({
                "old_score": old_score,
                "trigger": trigger,
            })),
            recorded_at: now,
        })
        .await?;
    store.update_score(home_id, new_score, now).await?;

    info!("Score for home {home_id} recalculated: {old_score} -> {new_score}");

    Ok(RecalcOutcome::Updated {
        old_score,
        new_score,
    })
}

/// Computes and records a home's first score at claim time.
///
/// Always appends an `InitialClaim` history entry and persists the
/// score, since a claimed home has no prior audit trail.
///
/// # Errors
///
/// Returns [`ScoreError::HomeNotFound`] for an unknown home,
/// [`ScoreError::Validation`] from the engine, and store failures as-is.
pub async fn record_initial_score(
    store: &dyn HomeStore,
    deltas: &ScoreDeltas,
    home_id: Uuid,
) -> Result<u8, ScoreError> {
    let home = store
        .get_home(home_id)
        .await?
        .ok_or(ScoreError::HomeNotFound { home_id })?;

    let improvements = store.improvements_for(home_id).await?;
    let score = compute_score(&home, &improvements, deltas)?;
    let now = Utc::now();

    store
        .append_history(ScoreHistoryEntry {
            id: Uuid::new_v4(),
            home_id,
            score,
            reason: ScoreReason::InitialClaim,
            detail: None,
            recorded_at: now,
        })
        .await?;
    store.update_score(home_id, score, now).await?;

    info!("Initial score {score} recorded for home {home_id}");

    Ok(score)
}
