//! The embedding surface: a thread-safe runtime that owns the store, talks
//! JSON with the shell, and pushes events back through a registered
//! callback.

use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::events::{EVENT_STORE_CHANGED, EVENT_STORE_RESTORED};
use crate::models::State;
use crate::selectors::{salary_summary, SalarySummary};
use crate::storage::{JsonStateRepository, StorageService};
use crate::store::{Action, Clock, Store, SystemClock};

pub type SharedCallback = Arc<dyn Fn(&str, &Value) + Send + Sync>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Directory the snapshot file lives in; resolved from the platform
    /// data dir when absent.
    #[serde(default)]
    pub data_dir: Option<String>,
}

/// Rejections at the JSON dispatch boundary. Every one implies the state
/// was left untouched.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("no celery with id {0:?}")]
    UnknownCelery(String),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAction(_) => "invalid_action",
            Self::UnknownCelery(_) => "unknown_celery",
        }
    }
}

/// Everything the shell needs to draw its first frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootstrap {
    pub state: State,
    /// Set when the store has never been configured; triggers the setup
    /// wizard.
    pub first_run: bool,
}

pub struct Runtime {
    store: Mutex<Store>,
    callback: Mutex<Option<SharedCallback>>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let data_dir = resolve_data_dir(&config);
        let repository = JsonStateRepository::new(&data_dir)
            .with_context(|| format!("failed to open state storage in {}", data_dir.display()))?;
        Ok(Self::with_storage(
            StorageService::new(Arc::new(repository)),
            Arc::new(SystemClock),
        ))
    }

    /// FFI entry point: the config arrives as a JSON string from the host
    /// shell. An empty string means all defaults.
    pub fn from_config_json(config_json: &str) -> Result<Self> {
        let config = if config_json.trim().is_empty() {
            RuntimeConfig::default()
        } else {
            serde_json::from_str(config_json).context("invalid runtime config")?
        };
        Self::new(config)
    }

    /// Build on explicit storage and clock. This is the seam tests and
    /// embedders use to control disk and time.
    pub fn with_storage(storage: StorageService, clock: Arc<dyn Clock>) -> Self {
        let initial = match storage.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => State::default_template(),
            Err(error) => {
                warn!(error = %error, "failed to read the persisted store; starting from defaults");
                State::default_template()
            }
        };
        Self {
            store: Mutex::new(Store::new(initial, storage, clock)),
            callback: Mutex::new(None),
        }
    }

    pub fn set_event_callback(&self, callback: SharedCallback) {
        *self.callback.lock().expect("callback mutex poisoned") = Some(callback);
    }

    pub fn clear_event_callback(&self) {
        *self.callback.lock().expect("callback mutex poisoned") = None;
    }

    pub fn state(&self) -> State {
        self.store.lock().expect("store mutex poisoned").state().clone()
    }

    pub fn state_json(&self) -> String {
        encode(&self.state()).to_string()
    }

    pub fn bootstrap(&self) -> Bootstrap {
        let state = self.state();
        let first_run = state.first_run();
        Bootstrap { state, first_run }
    }

    pub fn bootstrap_json(&self) -> String {
        encode(&self.bootstrap()).to_string()
    }

    pub fn summary(&self) -> SalarySummary {
        salary_summary(&self.state())
    }

    pub fn summary_json(&self) -> String {
        encode(&self.summary()).to_string()
    }

    /// Apply one action and return the new state.
    pub fn dispatch(&self, action: &Action) -> State {
        let state = {
            let mut store = self.store.lock().expect("store mutex poisoned");
            store.dispatch(action).clone()
        };
        self.emit_event(EVENT_STORE_CHANGED, &json!({ "timestamp": state.timestamp }));
        state
    }

    /// Wire-level dispatch: parse, validate, apply, and answer with an
    /// `{ ok, data | error }` envelope carrying the full new state.
    pub fn dispatch_json(&self, action_json: &str) -> String {
        let action: Action = match serde_json::from_str(action_json) {
            Ok(action) => action,
            Err(error) => {
                warn!(error = %error, "rejecting unparseable action");
                return error_envelope(&DispatchError::InvalidAction(error.to_string()));
            }
        };
        if let Some(id) = action.celery_id() {
            let known = {
                let store = self.store.lock().expect("store mutex poisoned");
                store.state().celeries.contains_key(id)
            };
            if !known {
                warn!(id = %id, "rejecting update for unknown celery");
                return error_envelope(&DispatchError::UnknownCelery(id.to_string()));
            }
        }
        let state = self.dispatch(&action);
        json!({ "ok": true, "data": encode(&state) }).to_string()
    }

    /// Re-read the persisted snapshot, as the shell does on window focus,
    /// and adopt it when it is strictly newer than the in-memory state.
    /// A restore emits `store://restored` with the adopted timestamp.
    pub fn refresh_from_storage(&self) -> Result<bool> {
        let (restored, timestamp) = {
            let mut store = self.store.lock().expect("store mutex poisoned");
            let restored = store.refresh_from_storage()?;
            (restored, store.state().timestamp)
        };
        if restored {
            self.emit_event(EVENT_STORE_RESTORED, &json!({ "timestamp": timestamp }));
        }
        Ok(restored)
    }

    fn emit_event(&self, event: &str, payload: &Value) {
        let callback = self.callback.lock().expect("callback mutex poisoned").clone();
        if let Some(callback) = callback {
            callback(event, payload);
        }
    }
}

fn resolve_data_dir(config: &RuntimeConfig) -> PathBuf {
    if let Some(dir) = &config.data_dir {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .map(|dir| dir.join("celery"))
        .unwrap_or_else(|| {
            env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".celery")
        })
}

fn encode<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|error| {
        warn!(error = %error, "failed to encode value for the shell");
        Value::Null
    })
}

fn error_envelope(error: &DispatchError) -> String {
    json!({
        "ok": false,
        "error": { "code": error.code(), "message": error.to_string() }
    })
    .to_string()
}
