pub mod config;
pub mod database;
pub mod form;
pub mod manager;
pub mod model;
pub mod notice;
pub mod offset;
pub mod phase;
pub mod picklist;
pub mod reconcile;
pub mod remote;
pub mod schedule;
pub mod services;

pub use config::AppConfig;
pub use database::Database;
pub use form::{EditableTask, ListEdit, ListHeader, RowKey, TaskEdit, TaskField};
pub use manager::{ListManager, ManagerError, SaveOutcome, SaveStage};
pub use model::*;
pub use notice::{Notice, Severity};
pub use offset::{Direction, Offset};
pub use phase::{PhaseHandle, SavePhase};
pub use remote::{ListRemote, RemoteError, RemoteResult};
pub use services::LocalRemote;
