/// Emitted after a newer persisted snapshot replaces the in-memory state,
/// so the shell can tell the user their data was restored.
pub const EVENT_STORE_RESTORED: &str = "store://restored";

/// Emitted after every applied action with the new state's timestamp.
pub const EVENT_STORE_CHANGED: &str = "store://changed";
