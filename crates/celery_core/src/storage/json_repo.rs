use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::models::State;
use crate::storage::schema::{migrate, PersistedState};
use crate::storage::StateRepository;

/// Storage key the browser build used for its snapshot; kept as the file
/// stem so exported localStorage dumps drop straight in.
pub const PERSISTED_STORE_KEY: &str = "persistedStore";

/// Snapshot repository backed by a single JSON file in the data directory.
pub struct JsonStateRepository {
    snapshot_path: PathBuf,
}

impl JsonStateRepository {
    pub fn new(base_dir: &Path) -> Result<Self> {
        fs::create_dir_all(base_dir)
            .with_context(|| format!("failed to create data dir {}", base_dir.display()))?;
        Ok(Self {
            snapshot_path: base_dir.join(format!("{PERSISTED_STORE_KEY}.json")),
        })
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

impl StateRepository for JsonStateRepository {
    fn load(&self) -> Result<Option<State>> {
        if !self.snapshot_path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.snapshot_path)
            .with_context(|| format!("failed to read {}", self.snapshot_path.display()))?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<PersistedState>(&raw) {
            Ok(persisted) => Ok(Some(migrate(persisted))),
            Err(error) => {
                // a corrupt snapshot costs the saved data, not the session
                warn!(
                    path = %self.snapshot_path.display(),
                    error = %error,
                    "persisted store is unreadable; starting over"
                );
                Ok(None)
            }
        }
    }

    fn persist(&self, state: &State) -> Result<()> {
        let payload = serde_json::to_string_pretty(&PersistedState::current(state.clone()))
            .context("failed to encode state")?;
        // write to a sibling temp file first so a crash mid-write cannot
        // truncate the previous snapshot
        let tmp = self.snapshot_path.with_extension("json.tmp");
        fs::write(&tmp, payload)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.snapshot_path)
            .with_context(|| format!("failed to replace {}", self.snapshot_path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.snapshot_path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error).with_context(|| {
                format!("failed to remove {}", self.snapshot_path.display())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::State;

    fn repository() -> (tempfile::TempDir, JsonStateRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let repository = JsonStateRepository::new(dir.path()).expect("repository");
        (dir, repository)
    }

    #[test]
    fn loading_without_a_snapshot_returns_none() {
        let (_dir, repository) = repository();
        assert!(repository.load().expect("load").is_none());
    }

    #[test]
    fn snapshots_survive_a_write_and_reload() {
        let (_dir, repository) = repository();
        let mut state = State::default_template();
        state.timestamp = 123;
        state.min = 30_000.0;
        repository.persist(&state).expect("persist");

        let loaded = repository.load().expect("load").expect("snapshot");
        assert_eq!(loaded, state);
    }

    #[test]
    fn writes_replace_the_previous_snapshot() {
        let (_dir, repository) = repository();
        let mut state = State::default_template();
        state.timestamp = 1;
        repository.persist(&state).expect("persist");
        state.timestamp = 2;
        state.desired = 70_000.0;
        repository.persist(&state).expect("persist");

        let loaded = repository.load().expect("load").expect("snapshot");
        assert_eq!(loaded.timestamp, 2);
        assert_eq!(loaded.desired, 70_000.0);
        // no temp file left behind
        assert!(!repository.snapshot_path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_snapshots_load_as_none() {
        let (_dir, repository) = repository();
        fs::write(repository.snapshot_path(), "{ not json").expect("write");
        assert!(repository.load().expect("load").is_none());

        fs::write(repository.snapshot_path(), "   ").expect("write");
        assert!(repository.load().expect("load").is_none());
    }

    #[test]
    fn clear_removes_the_snapshot_and_is_idempotent() {
        let (_dir, repository) = repository();
        repository.persist(&State::default_template()).expect("persist");
        assert!(repository.snapshot_path().exists());

        repository.clear().expect("clear");
        assert!(!repository.snapshot_path().exists());
        repository.clear().expect("clear again");
    }

    #[test]
    fn unversioned_browser_dumps_load_directly() {
        let (_dir, repository) = repository();
        let raw = r#"{
            "timestamp": 77,
            "min": 15000,
            "desired": 50000,
            "celeries": {},
            "currencies": { "base": "EUR" },
            "ratingTypes": {}
        }"#;
        fs::write(repository.snapshot_path(), raw).expect("write");

        let loaded = repository.load().expect("load").expect("snapshot");
        assert_eq!(loaded.timestamp, 77);
        assert_eq!(loaded.currencies.base, "EUR");
        assert_eq!(loaded.defaults.part_time.days_in_week, 2.0);
    }
}
