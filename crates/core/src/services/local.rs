use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::config::AppConfig;
use crate::database::{Database, SeedSummary};
use crate::model::{Member, RecordList, SaveListRequest, TaskRecord};
use crate::remote::{ListRemote, RemoteError, RemoteResult};

/// [`ListRemote`] backed by the SQLite file under the configured data dir.
#[derive(Debug, Clone)]
pub struct LocalRemote {
    config: AppConfig,
}

impl LocalRemote {
    pub fn new(config: AppConfig) -> Result<Self> {
        Database::initialize(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn seed_sample(&self, record_id: &str) -> Result<SeedSummary> {
        let record_id = record_id.to_string();
        self.with_database(move |db| db.seed_sample(&record_id)).await
    }

    /// Run `f` against a fresh connection on the blocking pool.
    async fn with_database<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || {
            let mut db = Database::initialize(&config)?;
            f(&mut db)
        })
        .await
        .map_err(|err| anyhow!("blocking task failed: {}", err))?
    }
}

#[async_trait]
impl ListRemote for LocalRemote {
    async fn get_record_lists(&self, record_id: &str) -> RemoteResult<Vec<RecordList>> {
        let record_id = record_id.to_string();
        Ok(self
            .with_database(move |db| db.fetch_record_lists(&record_id))
            .await?)
    }

    async fn get_active_record_members(&self, record_id: &str) -> RemoteResult<Vec<Member>> {
        let record_id = record_id.to_string();
        Ok(self
            .with_database(move |db| db.fetch_members(&record_id))
            .await?)
    }

    async fn init_default_task(&self, record_id: &str, list_id: &str) -> RemoteResult<TaskRecord> {
        let record_id = record_id.to_string();
        let list_id = list_id.to_string();
        Ok(self
            .with_database(move |db| {
                ensure_owned(db, &record_id, &list_id)?;
                db.default_task(&record_id, &list_id)
            })
            .await?)
    }

    async fn get_list_tasks(&self, record_id: &str, list_id: &str) -> RemoteResult<Vec<TaskRecord>> {
        let record_id = record_id.to_string();
        let list_id = list_id.to_string();
        Ok(self
            .with_database(move |db| {
                ensure_owned(db, &record_id, &list_id)?;
                db.fetch_tasks(&list_id)
            })
            .await?)
    }

    async fn recalculate(&self, list: &RecordList) -> RemoteResult<()> {
        let list_id = list
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RemoteError::new("Cannot recalculate a list that has not been saved"))?;
        let moved = self
            .with_database(move |db| db.recalculate(&list_id))
            .await?;
        debug!(moved, "recalculated due dates");
        Ok(())
    }

    async fn save_list(&self, request: SaveListRequest) -> RemoteResult<String> {
        Ok(self.with_database(move |db| db.save_list(&request)).await?)
    }
}

fn ensure_owned(db: &Database, record_id: &str, list_id: &str) -> Result<()> {
    let Some(list) = db.fetch_record_list(list_id)? else {
        bail!("List {} does not exist", list_id);
    };
    if list.parent_id.as_deref() != Some(record_id) {
        bail!("List {} does not belong to record {}", list_id, record_id);
    }
    Ok(())
}
