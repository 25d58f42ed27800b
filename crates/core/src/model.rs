use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNT_BY: &str = "DAYS";
pub const DEFAULT_PRIORITY: &str = "Normal";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A named list of tasks hanging off a parent record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RecordList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub parent_id: Option<String>,
}

impl RecordList {
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Member {
    pub user_id: String,
    pub user_name: String,
}

/// Task record as exchanged with the remote layer. Offsets are signed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskRecord {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub activity_date: Option<NaiveDate>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub priority: Option<String>,
    pub date_offset: i32,
    pub date_offset_units: Option<String>,
    pub do_not_recalculate: bool,
    pub reminder_offset: Option<i32>,
    pub reminder_time: Option<NaiveTime>,
    pub recurrence_type: Option<String>,
    pub recurrence_interval: Option<u32>,
    pub list_id: Option<String>,
    pub what_id: Option<String>,
    pub activity_sidecar: Option<String>,
    pub date_source: Option<String>,
    pub date_source_field: Option<String>,
    pub date_source_record_id: Option<String>,
}

impl TaskRecord {
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Outbound task shape. Pass-through strings are never null on the wire:
/// absent values travel as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub activity_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub owner_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub date_offset: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_offset_units: Option<String>,
    pub do_not_recalculate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_offset: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_interval: Option<u32>,
    pub list_id: String,
    pub what_id: String,
    pub activity_sidecar: String,
    pub date_source: String,
    pub date_source_field: String,
    pub date_source_record_id: String,
}

impl TaskPayload {
    /// Build the transport shape, backfilling the due date from the list target
    /// date and the parent link from `record_id`.
    pub fn from_record(
        record: &TaskRecord,
        list_start: Option<NaiveDate>,
        record_id: &str,
    ) -> Self {
        Self {
            id: record.id.clone().unwrap_or_default(),
            subject: record.subject.clone(),
            description: record.description.clone(),
            activity_date: record
                .activity_date
                .or(list_start)
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            owner_id: record.owner_id.clone(),
            owner_name: record.owner_name.clone().unwrap_or_default(),
            priority: record.priority.clone(),
            date_offset: record.date_offset,
            date_offset_units: record.date_offset_units.clone(),
            do_not_recalculate: record.do_not_recalculate,
            reminder_offset: record.reminder_offset,
            reminder_time: record.reminder_time,
            recurrence_type: record.recurrence_type.clone(),
            recurrence_interval: record.recurrence_interval,
            list_id: record.list_id.clone().unwrap_or_default(),
            what_id: record
                .what_id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| record_id.to_string()),
            activity_sidecar: record.activity_sidecar.clone().unwrap_or_default(),
            date_source: record.date_source.clone().unwrap_or_default(),
            date_source_field: record.date_source_field.clone().unwrap_or_default(),
            date_source_record_id: record.date_source_record_id.clone().unwrap_or_default(),
        }
    }
}

impl TryFrom<TaskPayload> for TaskRecord {
    type Error = anyhow::Error;

    fn try_from(payload: TaskPayload) -> Result<Self, Self::Error> {
        let activity_date = match payload.activity_date.trim() {
            "" => None,
            raw => Some(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|err| {
                anyhow!("Invalid ActivityDate '{}': {}", payload.activity_date, err)
            })?),
        };

        Ok(Self {
            id: blank_to_none(payload.id),
            subject: payload.subject,
            description: payload.description,
            activity_date,
            owner_id: payload.owner_id,
            owner_name: blank_to_none(payload.owner_name),
            priority: payload.priority,
            date_offset: payload.date_offset,
            date_offset_units: payload.date_offset_units,
            do_not_recalculate: payload.do_not_recalculate,
            reminder_offset: payload.reminder_offset,
            reminder_time: payload.reminder_time,
            recurrence_type: payload.recurrence_type,
            recurrence_interval: payload.recurrence_interval,
            list_id: blank_to_none(payload.list_id),
            what_id: blank_to_none(payload.what_id),
            activity_sidecar: blank_to_none(payload.activity_sidecar),
            date_source: blank_to_none(payload.date_source),
            date_source_field: blank_to_none(payload.date_source_field),
            date_source_record_id: blank_to_none(payload.date_source_record_id),
        })
    }
}

/// Arguments of the batched persistence call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveListRequest {
    pub record_id: String,
    pub list_record: RecordList,
    pub tasks_to_upsert: Vec<TaskPayload>,
    pub tasks_to_delete: Vec<TaskPayload>,
}

fn blank_to_none(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
