//! The dispatch pipeline: timestamp stamping, the pure reducer, and the
//! write-through to persistent storage.

mod action;
mod reducer;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, warn};

pub use action::{Action, CommitmentUpdate};
pub use reducer::reduce;

use crate::models::State;
use crate::storage::StorageService;

/// Source of dispatch timestamps. Injected so tests and embedders control
/// time instead of reading an ambient clock.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Owns the current state and feeds every action through stamp, reduce and
/// persist. Persistence failures are logged and swallowed so the in-memory
/// session keeps working.
pub struct Store {
    state: State,
    storage: StorageService,
    clock: Arc<dyn Clock>,
}

impl Store {
    pub fn new(initial: State, storage: StorageService, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: initial,
            storage,
            clock,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Run one action through the pipeline and return the new state.
    ///
    /// The dispatch timestamp is stamped onto the tree the reducer sees, so
    /// a full-tree replacement keeps the timestamp of its snapshot instead.
    pub fn dispatch(&mut self, action: &Action) -> &State {
        let mut stamped = self.state.clone();
        stamped.timestamp = self.clock.now_millis();
        debug!(action = ?action, "dispatching");
        let next = reduce(&stamped, action);

        if matches!(action, Action::ResetStore) {
            if let Err(error) = self.storage.clear() {
                warn!(error = %error, "failed to clear the persisted store");
            }
        } else if let Err(error) = self.storage.persist(&next) {
            warn!(error = %error, "failed to persist the store; continuing in memory");
        }

        self.state = next;
        &self.state
    }

    /// Adopt the persisted snapshot when it is strictly newer than the
    /// in-memory state, as happens after another session wrote it. Returns
    /// whether a replacement happened.
    pub fn refresh_from_storage(&mut self) -> Result<bool> {
        let Some(snapshot) = self.storage.load()? else {
            return Ok(false);
        };
        if snapshot.timestamp > self.state.timestamp {
            debug!(
                ours = self.state.timestamp,
                theirs = snapshot.timestamp,
                "adopting newer persisted store"
            );
            self.dispatch(&Action::SetStore { data: snapshot });
            return Ok(true);
        }
        Ok(false)
    }
}
