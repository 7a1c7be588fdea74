#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Persistent store contract for the `EcoScore` core.
//!
//! The store is a collaborator whose lifecycle the core does not own: the
//! core reads [`HomeRecord`]s, lists [`Improvement`]s, updates the score
//! column, and appends to the score history log. The [`HomeStore`] trait
//! captures exactly that contract — read-after-write consistent, history
//! strictly append-only (the trait exposes no update or delete for it).
//!
//! [`MemoryStore`] is the in-process implementation used by tests, the
//! demo CLI, and as the default server store.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use ecoscore_home_models::{HomeRecord, Improvement, ScoreHistoryEntry};
use thiserror::Error;
use uuid::Uuid;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced home does not exist.
    #[error("Home {home_id} not found")]
    HomeNotFound {
        /// The missing home's id.
        home_id: Uuid,
    },

    /// A write violated a record invariant.
    #[error("Invariant violation: {message}")]
    Invariant {
        /// Description of the violated invariant.
        message: String,
    },
}

/// Durable, read-after-write consistent storage for homes, improvements,
/// and the append-only score history log.
#[async_trait::async_trait]
pub trait HomeStore: Send + Sync {
    /// Fetches a home by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store operation fails.
    async fn get_home(&self, home_id: Uuid) -> Result<Option<HomeRecord>, StoreError>;

    /// Inserts a new home record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store operation fails.
    async fn insert_home(&self, home: HomeRecord) -> Result<(), StoreError>;

    /// Persists a new score and updated timestamp for a home.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::HomeNotFound`] if the home does not exist.
    async fn update_score(
        &self,
        home_id: Uuid,
        score: u8,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Lists a home's improvements in logging order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store operation fails.
    async fn improvements_for(&self, home_id: Uuid) -> Result<Vec<Improvement>, StoreError>;

    /// Records an improvement. Improvements are immutable once written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invariant`] when `before_score` does not
    /// match the home's current score, and [`StoreError::HomeNotFound`]
    /// for an unknown home.
    async fn insert_improvement(&self, improvement: Improvement) -> Result<(), StoreError>;

    /// Appends a score history entry. The log is append-only; entries are
    /// never merged, deduplicated, or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store operation fails.
    async fn append_history(&self, entry: ScoreHistoryEntry) -> Result<(), StoreError>;

    /// Lists a home's score history in append order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store operation fails.
    async fn history_for(&self, home_id: Uuid) -> Result<Vec<ScoreHistoryEntry>, StoreError>;
}

#[derive(Default)]
struct Inner {
    homes: HashMap<Uuid, HomeRecord>,
    improvements: HashMap<Uuid, Vec<Improvement>>,
    history: HashMap<Uuid, Vec<ScoreHistoryEntry>>,
}

/// In-memory [`HomeStore`] implementation.
///
/// Per-home history timestamps are kept strictly increasing: an entry
/// whose timestamp would not advance the log is bumped 1 ms past the
/// previous entry.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

#[async_trait::async_trait]
impl HomeStore for MemoryStore {
    async fn get_home(&self, home_id: Uuid) -> Result<Option<HomeRecord>, StoreError> {
        Ok(self.lock().homes.get(&home_id).cloned())
    }

    async fn insert_home(&self, home: HomeRecord) -> Result<(), StoreError> {
        self.lock().homes.insert(home.id, home);
        Ok(())
    }

    async fn update_score(
        &self,
        home_id: Uuid,
        score: u8,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let home = inner
            .homes
            .get_mut(&home_id)
            .ok_or(StoreError::HomeNotFound { home_id })?;
        home.current_score = score;
        home.score_updated_at = updated_at;
        Ok(())
    }

    async fn improvements_for(&self, home_id: Uuid) -> Result<Vec<Improvement>, StoreError> {
        Ok(self
            .lock()
            .improvements
            .get(&home_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_improvement(&self, improvement: Improvement) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let home = inner
            .homes
            .get(&improvement.home_id)
            .ok_or(StoreError::HomeNotFound {
                home_id: improvement.home_id,
            })?;

        if improvement.before_score != home.current_score {
            return Err(StoreError::Invariant {
                message: format!(
                    "Improvement before_score {} does not match current score {}",
                    improvement.before_score, home.current_score
                ),
            });
        }

        inner
            .improvements
            .entry(improvement.home_id)
            .or_default()
            .push(improvement);
        Ok(())
    }

    async fn append_history(&self, mut entry: ScoreHistoryEntry) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let log = inner.history.entry(entry.home_id).or_default();

        if let Some(last) = log.last() {
            if entry.recorded_at <= last.recorded_at {
                entry.recorded_at = last.recorded_at + Duration::milliseconds(1);
            }
        }

        log.push(entry);
        Ok(())
    }

    async fn history_for(&self, home_id: Uuid) -> Result<Vec<ScoreHistoryEntry>, StoreError> {
        Ok(self
            .lock()
            .history
            .get(&home_id)
            .cloned()
            .unwrap_or_default())
    }
}
