//! Contract of the remote procedures backing the list manager.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Member, RecordList, SaveListRequest, TaskRecord};
use crate::picklist::{PicklistField, PicklistOption};

/// Failure reported by the remote layer. The message is shown to users verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for RemoteError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

#[async_trait]
pub trait ListRemote: Send + Sync {
    async fn get_record_lists(&self, record_id: &str) -> RemoteResult<Vec<RecordList>>;

    /// Active members of the parent record, in display order.
    async fn get_active_record_members(&self, record_id: &str) -> RemoteResult<Vec<Member>>;

    async fn init_default_task(&self, record_id: &str, list_id: &str) -> RemoteResult<TaskRecord>;

    /// Tasks of a list with signed offsets.
    async fn get_list_tasks(&self, record_id: &str, list_id: &str) -> RemoteResult<Vec<TaskRecord>>;

    /// Recompute due dates of the list's tasks from its target date.
    async fn recalculate(&self, list: &RecordList) -> RemoteResult<()>;

    /// Persist the header, upserts and deletions; returns the list id.
    async fn save_list(&self, request: SaveListRequest) -> RemoteResult<String>;

    async fn picklist_values(&self, field: PicklistField) -> RemoteResult<Vec<PicklistOption>> {
        Ok(field.builtin_values())
    }
}
