//! Editable, input-backed shapes of a list header and its task rows.
//!
//! Edit handlers only ever touch the `inputs` side; the loaded record stays
//! untouched as the baseline that the save pass diffs against.

use std::str::FromStr;

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::model::{Member, RecordList, TaskRecord};
use crate::offset::{Direction, Offset};

pub type RowKey = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    Subject,
    Description,
    Deadline,
    DeadlineDirection,
    CountBy,
    Owner,
    DueDate,
    DoNotRecalculate,
    Priority,
    ReminderOffset,
    ReminderDirection,
    ReminderTime,
    RecurrenceType,
    RecurrenceInterval,
}

impl TaskField {
    pub const ALL: [TaskField; 14] = [
        TaskField::Subject,
        TaskField::Description,
        TaskField::Deadline,
        TaskField::DeadlineDirection,
        TaskField::CountBy,
        TaskField::Owner,
        TaskField::DueDate,
        TaskField::DoNotRecalculate,
        TaskField::Priority,
        TaskField::ReminderOffset,
        TaskField::ReminderDirection,
        TaskField::ReminderTime,
        TaskField::RecurrenceType,
        TaskField::RecurrenceInterval,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskField::Subject => "subject",
            TaskField::Description => "description",
            TaskField::Deadline => "deadline",
            TaskField::DeadlineDirection => "deadline-direction",
            TaskField::CountBy => "count-by",
            TaskField::Owner => "owner",
            TaskField::DueDate => "due-date",
            TaskField::DoNotRecalculate => "do-not-recalculate",
            TaskField::Priority => "priority",
            TaskField::ReminderOffset => "reminder-offset",
            TaskField::ReminderDirection => "reminder-direction",
            TaskField::ReminderTime => "reminder-time",
            TaskField::RecurrenceType => "repeat-type",
            TaskField::RecurrenceInterval => "repeat-interval",
        }
    }
}

impl FromStr for TaskField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        TaskField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| anyhow!("Unknown task field '{}'", s))
    }
}

/// A single change coming from a row's form control. `None` means the
/// control was cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEdit {
    Subject(Option<String>),
    Description(Option<String>),
    Deadline(Option<u32>),
    DeadlineDirection(Direction),
    CountBy(Option<String>),
    Owner(Option<String>),
    DueDate(Option<NaiveDate>),
    DoNotRecalculate(bool),
    Priority(Option<String>),
    ReminderOffset(Option<u32>),
    ReminderDirection(Direction),
    ReminderTime(Option<NaiveTime>),
    RecurrenceType(Option<String>),
    RecurrenceInterval(Option<u32>),
}

impl TaskEdit {
    pub fn field(&self) -> TaskField {
        match self {
            TaskEdit::Subject(_) => TaskField::Subject,
            TaskEdit::Description(_) => TaskField::Description,
            TaskEdit::Deadline(_) => TaskField::Deadline,
            TaskEdit::DeadlineDirection(_) => TaskField::DeadlineDirection,
            TaskEdit::CountBy(_) => TaskField::CountBy,
            TaskEdit::Owner(_) => TaskField::Owner,
            TaskEdit::DueDate(_) => TaskField::DueDate,
            TaskEdit::DoNotRecalculate(_) => TaskField::DoNotRecalculate,
            TaskEdit::Priority(_) => TaskField::Priority,
            TaskEdit::ReminderOffset(_) => TaskField::ReminderOffset,
            TaskEdit::ReminderDirection(_) => TaskField::ReminderDirection,
            TaskEdit::ReminderTime(_) => TaskField::ReminderTime,
            TaskEdit::RecurrenceType(_) => TaskField::RecurrenceType,
            TaskEdit::RecurrenceInterval(_) => TaskField::RecurrenceInterval,
        }
    }
}

/// Current values of a row's controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInputs {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<u32>,
    pub deadline_direction: Direction,
    pub count_by: Option<String>,
    pub owner_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub do_not_recalculate: Option<bool>,
    pub priority: Option<String>,
    pub reminder_offset: Option<u32>,
    pub reminder_direction: Direction,
    pub reminder_time: Option<NaiveTime>,
    pub recurrence_type: Option<String>,
    pub recurrence_interval: Option<u32>,
}

impl TaskInputs {
    pub fn from_record(record: &TaskRecord) -> Self {
        let deadline = Offset::decompose(record.date_offset);
        let reminder = record.reminder_offset.map(Offset::decompose);

        Self {
            subject: present(record.subject.clone()),
            description: present(record.description.clone()),
            deadline: Some(deadline.magnitude),
            deadline_direction: deadline.direction,
            count_by: present(record.date_offset_units.clone()),
            owner_id: present(record.owner_id.clone()),
            due_date: record.activity_date,
            do_not_recalculate: Some(record.do_not_recalculate),
            priority: present(record.priority.clone()),
            reminder_offset: reminder.map(|offset| offset.magnitude),
            reminder_direction: reminder.map(|offset| offset.direction).unwrap_or_default(),
            reminder_time: record.reminder_time,
            recurrence_type: present(record.recurrence_type.clone()),
            recurrence_interval: record.recurrence_interval,
        }
    }

    pub fn apply(&mut self, edit: TaskEdit) {
        match edit {
            TaskEdit::Subject(value) => self.subject = present(value),
            TaskEdit::Description(value) => self.description = present(value),
            TaskEdit::Deadline(value) => self.deadline = value,
            TaskEdit::DeadlineDirection(direction) => self.deadline_direction = direction,
            TaskEdit::CountBy(value) => self.count_by = present(value),
            TaskEdit::Owner(value) => self.owner_id = present(value),
            TaskEdit::DueDate(value) => self.due_date = value,
            TaskEdit::DoNotRecalculate(value) => self.do_not_recalculate = Some(value),
            TaskEdit::Priority(value) => self.priority = present(value),
            TaskEdit::ReminderOffset(value) => self.reminder_offset = value,
            TaskEdit::ReminderDirection(direction) => self.reminder_direction = direction,
            TaskEdit::ReminderTime(value) => self.reminder_time = value,
            TaskEdit::RecurrenceType(value) => self.recurrence_type = present(value),
            TaskEdit::RecurrenceInterval(value) => self.recurrence_interval = value,
        }
    }
}

/// A task row as held by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableTask {
    pub key: RowKey,
    pub baseline: TaskRecord,
    pub candidates: Vec<Member>,
    pub inputs: TaskInputs,
}

impl EditableTask {
    pub fn new(key: RowKey, baseline: TaskRecord, candidates: Vec<Member>) -> Self {
        let inputs = TaskInputs::from_record(&baseline);
        Self {
            key,
            baseline,
            candidates,
            inputs,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.baseline.is_persisted()
    }

    pub fn baseline_deadline(&self) -> Offset {
        Offset::decompose(self.baseline.date_offset)
    }

    pub fn baseline_reminder(&self) -> Option<Offset> {
        self.baseline.reminder_offset.map(Offset::decompose)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListField {
    Name,
    TargetDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEdit {
    Name(Option<String>),
    TargetDate(Option<NaiveDate>),
}

/// The selected list's header controls plus the record they were loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListHeader {
    pub baseline: RecordList,
    pub name: Option<String>,
    pub target_date: Option<NaiveDate>,
}

impl ListHeader {
    pub fn from_list(list: RecordList) -> Self {
        Self {
            name: present(list.name.clone()),
            target_date: list.start_date,
            baseline: list,
        }
    }

    /// Header for a list that does not exist yet.
    pub fn blank(parent_id: &str) -> Self {
        Self::from_list(RecordList {
            parent_id: Some(parent_id.to_string()),
            ..RecordList::default()
        })
    }

    pub fn list_id(&self) -> Option<&str> {
        self.baseline.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn apply(&mut self, edit: ListEdit) {
        match edit {
            ListEdit::Name(value) => self.name = present(value),
            ListEdit::TargetDate(value) => self.target_date = value,
        }
    }
}

/// Blank text counts as an absent value.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inputs_mirror_loaded_record() {
        let record = TaskRecord {
            id: Some("T1".into()),
            subject: Some("Draft answer".into()),
            date_offset: -10,
            reminder_offset: Some(-2),
            reminder_time: NaiveTime::from_hms_opt(9, 0, 0),
            ..TaskRecord::default()
        };
        let inputs = TaskInputs::from_record(&record);

        assert_eq!(inputs.subject.as_deref(), Some("Draft answer"));
        assert_eq!(inputs.deadline, Some(10));
        assert_eq!(inputs.deadline_direction, Direction::Before);
        assert_eq!(inputs.reminder_offset, Some(2));
        assert_eq!(inputs.reminder_direction, Direction::Before);
        assert_eq!(inputs.do_not_recalculate, Some(false));
    }

    #[test]
    fn blank_text_edits_clear_the_control() {
        let mut inputs = TaskInputs::from_record(&TaskRecord {
            subject: Some("Call client".into()),
            ..TaskRecord::default()
        });
        inputs.apply(TaskEdit::Subject(Some("   ".into())));
        assert_eq!(inputs.subject, None);
    }

    #[test]
    fn field_names_parse_back() {
        for field in TaskField::ALL {
            assert_eq!(field.as_str().parse::<TaskField>().unwrap(), field);
        }
        assert_eq!("due_date".parse::<TaskField>().unwrap(), TaskField::DueDate);
        assert!("colour".parse::<TaskField>().is_err());
    }

    #[test]
    fn blank_header_belongs_to_parent() {
        let mut header = ListHeader::blank("MATTER-1");
        assert_eq!(header.list_id(), None);
        assert_eq!(header.baseline.parent_id.as_deref(), Some("MATTER-1"));

        header.apply(ListEdit::Name(Some("Trial prep".into())));
        assert_eq!(header.name.as_deref(), Some("Trial prep"));
    }
}
