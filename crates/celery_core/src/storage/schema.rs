use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::State;

/// Bumped whenever the persisted shape changes; [`migrate`] carries older
/// snapshots forward.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// On-disk envelope around the state tree. Snapshots written by the old
/// browser build carry no version field and read back as version 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(flatten)]
    pub state: State,
}

impl PersistedState {
    pub fn current(state: State) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            state,
        }
    }
}

/// Bring a snapshot of any known vintage up to the current shape. Runs
/// once at load; dispatch never sees an unmigrated tree.
pub fn migrate(persisted: PersistedState) -> State {
    match persisted.schema_version {
        0 => {
            // unversioned browser snapshot: absent fields already took
            // their defaults during the merge, nothing else moved
            debug!("migrating unversioned snapshot to v1");
            persisted.state
        }
        CURRENT_SCHEMA_VERSION => persisted.state,
        newer => {
            warn!(
                schema_version = newer,
                "snapshot written by a newer build; loading what we understand"
            );
            persisted.state
        }
    }
}
