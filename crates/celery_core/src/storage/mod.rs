//! Persistence shim for the store: a JSON snapshot repository behind a
//! trait, plus the schema-version envelope around it.

mod json_repo;
mod schema;

use std::sync::Arc;

use anyhow::Result;

pub use json_repo::{JsonStateRepository, PERSISTED_STORE_KEY};
pub use schema::{migrate, PersistedState, CURRENT_SCHEMA_VERSION};

use crate::models::State;

/// What the store needs from its backing storage. File-based in the app;
/// tests substitute in-memory fakes.
pub trait StateRepository: Send + Sync {
    /// The migrated snapshot, or `None` when nothing (usable) is stored.
    fn load(&self) -> Result<Option<State>>;
    fn persist(&self, state: &State) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Thin handle the store and runtime share for snapshot access.
#[derive(Clone)]
pub struct StorageService {
    repository: Arc<dyn StateRepository>,
}

impl StorageService {
    pub fn new(repository: Arc<dyn StateRepository>) -> Self {
        Self { repository }
    }

    pub fn load(&self) -> Result<Option<State>> {
        self.repository.load()
    }

    pub fn persist(&self, state: &State) -> Result<()> {
        self.repository.persist(state)
    }

    pub fn clear(&self) -> Result<()> {
        self.repository.clear()
    }
}
