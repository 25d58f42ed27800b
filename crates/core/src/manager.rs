//! Orchestrates loading, editing and saving one record's task lists.

use std::sync::Arc;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::form::{EditableTask, ListEdit, ListHeader, RowKey, TaskEdit};
use crate::model::{Member, RecordList, SaveListRequest, TaskPayload, TaskRecord};
use crate::notice::{Notice, Severity};
use crate::phase::{LoadingHandle, PhaseHandle, SaveGuard, SavePhase};
use crate::picklist::{PicklistField, Picklists};
use crate::reconcile::{self, ReconcileError, Removal, SaveAssessment, Violation};
use crate::remote::{ListRemote, RemoteResult};

const TITLE_NO_CHANGES: &str = "No Changes Were Made";
const TITLE_INVALID: &str = "Error Validating Inputs";
const MESSAGE_INVALID: &str = "Please ensure you have filled out all required inputs.";
const TITLE_SAVE_FAILED: &str = "Error Saving List Changes";
const TITLE_SAVED: &str = "List Successfully Saved";
const TITLE_BUSY: &str = "Save Already In Progress";
const TITLE_MEMBERS_FAILED: &str = "Error Getting Active Record Members";
const TITLE_LISTS_FAILED: &str = "Error Getting Record Lists";
const TITLE_TASKS_FAILED: &str = "Error Getting List's Tasks";

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("select or save a list before adding tasks")]
    NoListSelected,
    #[error("the default task template has not been loaded")]
    MissingTemplate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStage {
    Save,
    Recalculate,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Another save was still in flight.
    Busy,
    NoChanges,
    Invalid { violations: Vec<Violation> },
    Saved { list_id: String, recalculated: bool },
    Failed { stage: SaveStage, message: String },
}

pub struct ListManager<R> {
    remote: Arc<R>,
    record_id: String,
    members: Vec<Member>,
    record_lists: Vec<RecordList>,
    picklists: Picklists,
    header: ListHeader,
    rows: Vec<EditableTask>,
    deletions: Vec<TaskRecord>,
    template: Option<TaskRecord>,
    tasks_loaded: bool,
    loading: LoadingHandle,
    phase: PhaseHandle,
    notices: Vec<Notice>,
}

impl<R: ListRemote> ListManager<R> {
    pub fn new(remote: Arc<R>, record_id: impl Into<String>) -> Self {
        let record_id = record_id.into();
        Self {
            remote,
            header: ListHeader::blank(&record_id),
            record_id,
            members: Vec::new(),
            record_lists: Vec::new(),
            picklists: Picklists::builtin(),
            rows: Vec::new(),
            deletions: Vec::new(),
            template: None,
            tasks_loaded: false,
            loading: LoadingHandle::default(),
            phase: PhaseHandle::new(),
            notices: Vec::new(),
        }
    }

    /// Load the roster, the record's lists and the picklist options.
    pub async fn connect(&mut self) {
        let _loading = self.loading.enter();

        match self.remote.get_active_record_members(&self.record_id).await {
            Ok(members) => {
                debug!(record_id = %self.record_id, count = members.len(), "loaded active members");
                self.members = members;
            }
            Err(err) => {
                error!(record_id = %self.record_id, error = %err, "failed to load active members");
                self.notify(Notice::new(Severity::Error, TITLE_MEMBERS_FAILED).with_message(err.message));
            }
        }

        if let Err(err) = self.fetch_record_lists().await {
            self.notify(Notice::new(Severity::Error, TITLE_LISTS_FAILED).with_message(err.message));
        }

        self.load_picklists().await;
    }

    /// Failures keep the built-in options and are only logged.
    pub async fn load_picklists(&mut self) {
        for field in PicklistField::value_variants() {
            match self.remote.picklist_values(*field).await {
                Ok(values) => self.picklists.set(*field, values),
                Err(err) => {
                    error!(field = ?field, error = %err, "could not retrieve picklist values")
                }
            }
        }
    }

    /// Switch to a list from the cache, or back to a blank header with `None`.
    pub async fn select_list(&mut self, list_id: Option<&str>) {
        let Some(list_id) = list_id else {
            self.cancel().await;
            return;
        };

        let selected = self
            .record_lists
            .iter()
            .find(|list| list.id.as_deref() == Some(list_id))
            .cloned();
        let Some(list) = selected else {
            warn!(list_id, "selected list is not among the record's lists");
            self.reset();
            return;
        };

        let _loading = self.loading.enter();
        self.header = ListHeader::from_list(list);
        if let Err(err) = self.load_tasks().await {
            self.notify(Notice::new(Severity::Error, TITLE_TASKS_FAILED).with_message(err.message));
        }
    }

    /// Drop every edit and selection, then refresh the list cache.
    pub async fn cancel(&mut self) {
        self.reset();
        if let Err(err) = self.fetch_record_lists().await {
            self.notify(Notice::new(Severity::Error, TITLE_LISTS_FAILED).with_message(err.message));
        }
    }

    pub fn add_task(&mut self) -> Result<RowKey, ManagerError> {
        if self.is_add_task_disabled() {
            return Err(ManagerError::NoListSelected);
        }
        let template = self.template.as_ref().ok_or(ManagerError::MissingTemplate)?;
        let row = reconcile::new_task(template, &self.members, &self.rows);
        let key = row.key.clone();
        debug!(key = %key, "added task row");
        self.rows.push(row);
        Ok(key)
    }

    pub fn remove_task(&mut self, key: &str) -> Result<Removal, ManagerError> {
        let removal = reconcile::remove_task(&mut self.rows, &mut self.deletions, key)?;
        debug!(key, ?removal, "removed task row");
        Ok(removal)
    }

    pub fn edit_task(&mut self, key: &str, edit: TaskEdit) -> Result<(), ManagerError> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.key == key)
            .ok_or_else(|| ReconcileError::UnknownRow(key.to_string()))?;
        if let TaskEdit::Owner(owner_id) = &edit {
            row.candidates = reconcile::candidates_for(&self.members, owner_id.as_deref());
        }
        row.inputs.apply(edit);
        Ok(())
    }

    pub fn edit_list(&mut self, edit: ListEdit) {
        self.header.apply(edit);
    }

    /// Validate and diff the current inputs without side effects.
    pub fn assess(&self) -> Result<SaveAssessment, ReconcileError> {
        reconcile::assess(&self.header, &self.rows, &self.deletions, &self.members)
    }

    pub async fn save(&mut self) -> SaveOutcome {
        let guard = match self.phase.begin() {
            Ok(guard) => guard,
            Err(err) => {
                warn!(error = %err, "save rejected");
                self.notify(Notice::new(Severity::Warning, TITLE_BUSY));
                return SaveOutcome::Busy;
            }
        };

        let outcome = self.run_save(&guard).await;
        let settled = match &outcome {
            SaveOutcome::Failed { message, .. } => guard.fail(message.clone()),
            _ => guard.finish(),
        };
        if let Err(err) = settled {
            error!(error = %err, "save phase out of sync");
        }
        outcome
    }

    async fn run_save(&mut self, guard: &SaveGuard) -> SaveOutcome {
        let assessment = match self.assess() {
            Ok(assessment) => assessment,
            Err(err) => {
                error!(error = %err, "error occurred during validation");
                self.notify(Notice::new(Severity::Warning, TITLE_INVALID).with_message(MESSAGE_INVALID));
                return SaveOutcome::Invalid {
                    violations: Vec::new(),
                };
            }
        };

        if !assessment.values_changed {
            self.notify(Notice::new(Severity::Info, TITLE_NO_CHANGES));
            return SaveOutcome::NoChanges;
        }

        if !assessment.validation_passed {
            debug!(violations = assessment.violations.len(), "save blocked by validation");
            self.notify(Notice::new(Severity::Warning, TITLE_INVALID).with_message(MESSAGE_INVALID));
            return SaveOutcome::Invalid {
                violations: assessment.violations,
            };
        }

        if let Err(err) = guard.advance(SavePhase::Saving) {
            return self.fail(SaveStage::Save, err.to_string());
        }
        let request = self.build_request(&assessment);
        info!(
            record_id = %self.record_id,
            upserts = request.tasks_to_upsert.len(),
            deletes = request.tasks_to_delete.len(),
            "saving list"
        );
        let list_id = match self.remote.save_list(request).await {
            Ok(list_id) => list_id,
            Err(err) => {
                error!(error = %err, "failed to save list");
                return self.fail(SaveStage::Save, err.message);
            }
        };

        let mut list = assessment.list.clone();
        list.id = Some(list_id.clone());
        self.header = ListHeader::from_list(list);
        self.deletions.clear();

        let mut failure = None;
        let recalculate = assessment.should_recalculate();
        if recalculate {
            if let Err(err) = guard.advance(SavePhase::Recalculating) {
                return self.fail(SaveStage::Recalculate, err.to_string());
            }
            if let Err(err) = self.remote.recalculate(&self.header.baseline).await {
                error!(list_id = %list_id, error = %err, "failed to recalculate list");
                failure = Some((SaveStage::Recalculate, err.message));
            }
        }

        // Refresh even after a failed recalculation so new rows pick up their ids.
        if let Err(err) = guard.advance(SavePhase::Refreshing) {
            return self.fail(SaveStage::Refresh, err.to_string());
        }
        if let Err(err) = self.refresh_after_save().await {
            error!(list_id = %list_id, error = %err, "failed to refresh list after save");
            failure.get_or_insert((SaveStage::Refresh, err.message));
        }

        if let Some((stage, message)) = failure {
            return self.fail(stage, message);
        }

        info!(list_id = %list_id, recalculated = recalculate, "list saved");
        self.notify(Notice::new(Severity::Success, TITLE_SAVED));
        SaveOutcome::Saved {
            list_id,
            recalculated: recalculate,
        }
    }

    fn build_request(&self, assessment: &SaveAssessment) -> SaveListRequest {
        let mut list_record = assessment.list.clone();
        if list_record.parent_id.is_none() {
            list_record.parent_id = Some(self.record_id.clone());
        }
        let start = list_record.start_date;
        let payload = |record: &TaskRecord| TaskPayload::from_record(record, start, &self.record_id);

        SaveListRequest {
            record_id: self.record_id.clone(),
            tasks_to_upsert: assessment
                .tasks
                .iter()
                .map(|task| payload(&task.record))
                .collect(),
            tasks_to_delete: self.deletions.iter().map(payload).collect(),
            list_record,
        }
    }

    /// Reload tasks even when the list fetch fails; the first error wins.
    async fn refresh_after_save(&mut self) -> RemoteResult<()> {
        let lists = self.fetch_record_lists().await;
        if lists.is_ok() {
            let refreshed = self.header.list_id().and_then(|id| {
                self.record_lists
                    .iter()
                    .find(|list| list.id.as_deref() == Some(id))
                    .cloned()
            });
            if let Some(list) = refreshed {
                self.header = ListHeader::from_list(list);
            }
        }
        let tasks = self.load_tasks().await;
        lists.and(tasks)
    }

    async fn fetch_record_lists(&mut self) -> RemoteResult<()> {
        match self.remote.get_record_lists(&self.record_id).await {
            Ok(lists) => {
                debug!(record_id = %self.record_id, count = lists.len(), "loaded record lists");
                self.record_lists = lists;
                Ok(())
            }
            Err(err) => {
                error!(record_id = %self.record_id, error = %err, "failed to load record lists");
                Err(err)
            }
        }
    }

    /// Replace the baseline rows with the selected list's persisted tasks.
    async fn load_tasks(&mut self) -> RemoteResult<()> {
        self.deletions.clear();
        let Some(list_id) = self.header.list_id().map(str::to_string) else {
            self.rows.clear();
            self.tasks_loaded = false;
            return Ok(());
        };

        let records = match self.remote.get_list_tasks(&self.record_id, &list_id).await {
            Ok(records) => records,
            Err(err) => {
                error!(list_id = %list_id, error = %err, "failed to load list tasks");
                self.rows.clear();
                self.template = None;
                self.tasks_loaded = false;
                return Err(err);
            }
        };
        debug!(list_id = %list_id, count = records.len(), "loaded list tasks");
        self.rows = reconcile::load_tasks(records, &self.members);
        self.tasks_loaded = true;

        match self.remote.init_default_task(&self.record_id, &list_id).await {
            Ok(template) => self.template = Some(template),
            Err(err) => error!(list_id = %list_id, error = %err, "could not initialize default task"),
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.header = ListHeader::blank(&self.record_id);
        self.rows.clear();
        self.deletions.clear();
        self.template = None;
        self.tasks_loaded = false;
    }

    fn fail(&mut self, stage: SaveStage, message: String) -> SaveOutcome {
        self.notify(Notice::new(Severity::Error, TITLE_SAVE_FAILED).with_message(message.clone()));
        SaveOutcome::Failed { stage, message }
    }

    fn notify(&mut self, notice: Notice) {
        debug!(severity = notice.severity.as_str(), title = %notice.title, "notice raised");
        self.notices.push(notice);
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn record_lists(&self) -> &[RecordList] {
        &self.record_lists
    }

    pub fn picklists(&self) -> &Picklists {
        &self.picklists
    }

    pub fn header(&self) -> &ListHeader {
        &self.header
    }

    pub fn rows(&self) -> &[EditableTask] {
        &self.rows
    }

    pub fn row(&self, key: &str) -> Option<&EditableTask> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn deletions(&self) -> &[TaskRecord] {
        &self.deletions
    }

    pub fn phase(&self) -> SavePhase {
        self.phase.current()
    }

    pub fn phase_handle(&self) -> PhaseHandle {
        self.phase.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.loading.is_loading() || self.phase.is_busy()
    }

    pub fn is_add_task_disabled(&self) -> bool {
        self.header.list_id().is_none()
    }

    pub fn shows_empty_list_message(&self) -> bool {
        self.header.list_id().is_some() && self.tasks_loaded && self.rows.is_empty()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
