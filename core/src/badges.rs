use std::collections::HashSet;

use anyhow::Result;

use crate::models::{BadgeCriterion, ProgressStats};

/// Outcome of writing an unlock record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Inserted,
    /// Another process instance got there first; the badge is unlocked
    /// but this pass should not celebrate it.
    AlreadyExists,
}

/// The external badge catalogue and unlock-record store.
///
/// The CLI implements this against an HTTP service; tests use an
/// in-memory mock. Called synchronously; network-backed implementations
/// bridge to async internally.
pub trait BadgeBackend {
    fn fetch_catalogue(&self) -> Result<Vec<BadgeCriterion>>;
    fn fetch_unlocked(&self, user_id: &str) -> Result<HashSet<String>>;
    fn insert_unlock(&self, user_id: &str, badge_id: &str) -> Result<UnlockOutcome>;
}

/// Re-scans the badge catalogue against live stats whenever they change.
///
/// Owns nothing but a session-local "already processed" set; the
/// authoritative de-dup is the existence of the unlock record in the
/// backend. Polling the full catalogue per pass is fine at tens of
/// entries.
pub struct BadgeUnlockWatcher {
    user_id: String,
    processed: HashSet<String>,
}

impl BadgeUnlockWatcher {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            processed: HashSet::new(),
        }
    }

    /// Run one evaluation pass. Returns the badges newly unlocked by this
    /// pass, invoking `on_unlock` for each as its record is written.
    ///
    /// A catalogue or unlocked-set fetch failure aborts the whole pass
    /// (the caller retries naturally on the next stat change). A failed
    /// unlock write skips that badge without the callback and without
    /// marking it processed, so the next pass retries it.
    pub fn evaluate(
        &mut self,
        backend: &dyn BadgeBackend,
        stats: &ProgressStats,
        mut on_unlock: impl FnMut(&BadgeCriterion),
    ) -> Result<Vec<BadgeCriterion>> {
        let catalogue = backend.fetch_catalogue()?;
        let unlocked = backend.fetch_unlocked(&self.user_id)?;

        let mut newly_unlocked = Vec::new();
        for criterion in catalogue {
            if unlocked.contains(&criterion.id) || self.processed.contains(&criterion.id) {
                continue;
            }
            if stats.value_for(criterion.category) < criterion.threshold {
                continue;
            }
            match backend.insert_unlock(&self.user_id, &criterion.id) {
                Ok(UnlockOutcome::Inserted) => {
                    self.processed.insert(criterion.id.clone());
                    on_unlock(&criterion);
                    newly_unlocked.push(criterion);
                }
                Ok(UnlockOutcome::AlreadyExists) => {
                    self.processed.insert(criterion.id.clone());
                }
                Err(_) => {
                    // Non-fatal: retried on the next pass.
                }
            }
        }
        Ok(newly_unlocked)
    }
}
