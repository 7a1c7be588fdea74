#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Deterministic home energy scoring.
//!
//! [`engine`] holds the pure score computation: baseline efficiency plus
//! one config-calibrated delta per distinct improvement category, clamped
//! to 0-100. [`recalc`] holds the caller-owned side-effect contract
//! around it: when a recomputed score differs from the stored one, append
//! a history entry and persist the new score; otherwise do nothing.

pub mod engine;
pub mod recalc;

use ecoscore_store::StoreError;
use thiserror::Error;

pub use engine::compute_score;
pub use recalc::{RecalcOutcome, ScoreTrigger, recalculate, record_initial_score};

/// Errors from score computation and recalculation.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Malformed or out-of-range input.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// The referenced home does not exist.
    #[error("Home {home_id} not found")]
    HomeNotFound {
        /// The missing home's id.
        home_id: uuid::Uuid,
    },

    /// The persistent store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
