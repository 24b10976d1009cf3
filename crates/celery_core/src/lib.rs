//! Core engine for Celery, a salary comparison notebook.
//!
//! Everything the UI shell is not: the state tree, the pay-rate
//! normalizer, the reducer and its persistence shim, and the JSON dispatch
//! runtime an embedding shell talks to. The crate installs no tracing
//! subscriber and owns no windows; hosts bring their own.

pub mod events;
pub mod models;
pub mod money;
pub mod runtime;
pub mod salary;
pub mod selectors;
pub mod storage;
pub mod store;

pub use models::{
    Celery, Commitment, CommitmentTemplate, Currencies, Defaults, PayInput, PayUnit, State,
};
pub use runtime::{Bootstrap, DispatchError, Runtime, RuntimeConfig, SharedCallback};
pub use selectors::{annual_salary, salary_summary, SalarySummary};
pub use store::{reduce, Action, Clock, CommitmentUpdate, Store, SystemClock};
