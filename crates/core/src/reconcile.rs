//! Load-side and save-side transforms between task records and editable rows.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use ulid::Ulid;

use crate::form::{present, EditableTask, ListField, ListHeader, RowKey, TaskField};
use crate::model::{Member, RecordList, TaskRecord, DEFAULT_COUNT_BY, DEFAULT_PRIORITY};
use crate::offset::Offset;

const KEY_SPACE: u128 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("no task row with key {0}")]
    UnknownRow(RowKey),
    #[error("{field:?} offset on row {key} does not fit a signed 32-bit value")]
    OffsetOverflow { key: RowKey, field: TaskField },
}

/// Outcome of removing a row from the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The row exists server-side and was queued for deletion.
    Queued,
    /// The row was never persisted and was dropped.
    Discarded,
}

/// Required field left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Violation {
    List { field: ListField },
    Task { key: RowKey, field: TaskField },
}

/// A row with its inputs folded back into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    pub key: RowKey,
    pub record: TaskRecord,
}

/// Result of one validate-and-diff pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAssessment {
    pub dates_changed: bool,
    pub recalculate_based_on_target_date: bool,
    pub validation_passed: bool,
    pub values_changed: bool,
    pub target_date_changed: bool,
    pub violations: Vec<Violation>,
    pub list: RecordList,
    pub tasks: Vec<ResolvedTask>,
}

impl SaveAssessment {
    pub fn should_recalculate(&self) -> bool {
        self.dates_changed || self.recalculate_based_on_target_date
    }
}

/// Roster minus the member owning the row, order preserved.
pub fn candidates_for(roster: &[Member], owner_id: Option<&str>) -> Vec<Member> {
    roster
        .iter()
        .filter(|member| Some(member.user_id.as_str()) != owner_id)
        .cloned()
        .collect()
}

/// Turn fetched records into editable rows keyed by their identifiers.
pub fn load_tasks(records: Vec<TaskRecord>, roster: &[Member]) -> Vec<EditableTask> {
    let mut rows: Vec<EditableTask> = Vec::with_capacity(records.len());
    for record in records {
        let key = match record.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => generate_key(&rows),
        };
        let candidates = candidates_for(roster, record.owner_id.as_deref());
        rows.push(EditableTask::new(key, record, candidates));
    }
    rows
}

/// Build a fresh row from the default template. The first roster member
/// becomes the owner and is left out of the row's candidates.
pub fn new_task(template: &TaskRecord, roster: &[Member], existing: &[EditableTask]) -> EditableTask {
    let mut record = template.clone();
    record.id = None;

    let mut candidates = roster.to_vec();
    if candidates.is_empty() {
        record.owner_id = None;
        record.owner_name = None;
    } else {
        let owner = candidates.remove(0);
        record.owner_id = Some(owner.user_id);
        record.owner_name = Some(owner.user_name);
    }

    EditableTask::new(generate_key(existing), record, candidates)
}

/// Random six-digit key, redrawn on collision with a row already present.
pub fn generate_key(existing: &[EditableTask]) -> RowKey {
    let taken: HashSet<&str> = existing.iter().map(|row| row.key.as_str()).collect();
    loop {
        let key = (Ulid::new().random() % KEY_SPACE).to_string();
        if !taken.contains(key.as_str()) {
            return key;
        }
    }
}

/// Drop the row with `key`; persisted rows move to `deletions`.
pub fn remove_task(
    rows: &mut Vec<EditableTask>,
    deletions: &mut Vec<TaskRecord>,
    key: &str,
) -> Result<Removal, ReconcileError> {
    let index = rows
        .iter()
        .position(|row| row.key == key)
        .ok_or_else(|| ReconcileError::UnknownRow(key.to_string()))?;
    let row = rows.remove(index);
    if row.is_persisted() {
        deletions.push(row.baseline);
        Ok(Removal::Queued)
    } else {
        Ok(Removal::Discarded)
    }
}

/// Validate every input and diff it against the loaded baseline.
///
/// The scan always covers the header and every row so that all violations
/// are reported together.
pub fn assess(
    header: &ListHeader,
    rows: &[EditableTask],
    deletions: &[TaskRecord],
    roster: &[Member],
) -> Result<SaveAssessment, ReconcileError> {
    let mut violations = Vec::new();
    let mut values_changed = !deletions.is_empty() || header.list_id().is_none();

    let mut list = header.baseline.clone();

    let name = present(header.name.clone());
    if name.is_none() {
        violations.push(Violation::List {
            field: ListField::Name,
        });
    }
    if name != present(list.name.clone()) {
        list.name = name;
        values_changed = true;
    }

    let target_date = header.target_date;
    if target_date.is_none() {
        violations.push(Violation::List {
            field: ListField::TargetDate,
        });
    }
    let target_date_changed = target_date != list.start_date;
    if target_date_changed {
        list.start_date = target_date;
        values_changed = true;
    }

    let mut dates_changed = false;
    let mut tasks = Vec::with_capacity(rows.len());
    for row in rows {
        let resolution = resolve_task(row, target_date, roster)?;
        dates_changed |= resolution.dates_changed;
        values_changed |= resolution.values_changed;
        violations.extend(resolution.violations);
        tasks.push(ResolvedTask {
            key: row.key.clone(),
            record: resolution.record,
        });
    }

    let recalculate_based_on_target_date = !(target_date_changed
        && tasks.iter().any(|task| task.record.do_not_recalculate));

    Ok(SaveAssessment {
        dates_changed,
        recalculate_based_on_target_date,
        validation_passed: violations.is_empty(),
        values_changed,
        target_date_changed,
        violations,
        list,
        tasks,
    })
}

struct RowResolution {
    record: TaskRecord,
    values_changed: bool,
    dates_changed: bool,
    violations: Vec<Violation>,
}

fn resolve_task(
    row: &EditableTask,
    target_date: Option<NaiveDate>,
    roster: &[Member],
) -> Result<RowResolution, ReconcileError> {
    let base = &row.baseline;
    let inputs = &row.inputs;
    let mut record = base.clone();
    let mut values_changed = !row.is_persisted();
    let mut dates_changed = false;
    let mut violations = Vec::new();
    let mut require = |field: TaskField| {
        violations.push(Violation::Task {
            key: row.key.clone(),
            field,
        })
    };

    // Subject
    if inputs.subject.is_none() {
        require(TaskField::Subject);
    }
    if inputs.subject != present(base.subject.clone()) {
        record.subject = inputs.subject.clone();
        values_changed = true;
    }

    // Description
    let description = inputs.description.clone().unwrap_or_default();
    if description != base.description.clone().unwrap_or_default() {
        record.description = Some(description);
        values_changed = true;
    }

    // Deadline
    if inputs.deadline.is_none() {
        values_changed = true;
    }
    let deadline = Offset::new(inputs.deadline.unwrap_or(0), inputs.deadline_direction);
    if !deadline.equivalent(&row.baseline_deadline()) {
        record.date_offset = signed(deadline, &row.key, TaskField::Deadline)?;
        dates_changed = true;
        values_changed = true;
    }

    // Count by
    let count_by = inputs.count_by.as_deref().unwrap_or(DEFAULT_COUNT_BY);
    let base_count_by = present(base.date_offset_units.clone());
    if count_by != base_count_by.as_deref().unwrap_or(DEFAULT_COUNT_BY) {
        record.date_offset_units = Some(count_by.to_string());
        dates_changed = true;
        values_changed = true;
    }

    // Owner
    match inputs.owner_id.as_deref() {
        None => require(TaskField::Owner),
        Some(owner_id) if base.owner_id.as_deref() != Some(owner_id) => {
            record.owner_id = Some(owner_id.to_string());
            record.owner_name = roster
                .iter()
                .find(|member| member.user_id == owner_id)
                .map(|member| member.user_name.clone());
            values_changed = true;
        }
        Some(_) => {}
    }

    // Due date; a cleared control falls back to the list target date
    if inputs.due_date != base.activity_date {
        let due_date = inputs.due_date.or(target_date);
        if due_date != base.activity_date {
            record.activity_date = due_date;
            values_changed = true;
        }
    }

    // Do not recalculate
    let do_not_recalculate = inputs.do_not_recalculate.unwrap_or(false);
    if do_not_recalculate != base.do_not_recalculate {
        record.do_not_recalculate = do_not_recalculate;
        values_changed = true;
        if !do_not_recalculate {
            dates_changed = true;
        }
    }

    // Priority
    let priority = inputs.priority.as_deref().unwrap_or(DEFAULT_PRIORITY);
    let base_priority = present(base.priority.clone());
    if priority != base_priority.as_deref().unwrap_or(DEFAULT_PRIORITY) {
        record.priority = Some(priority.to_string());
        values_changed = true;
    }

    // Reminder, only as a complete pair
    if let (Some(magnitude), Some(time)) = (inputs.reminder_offset, inputs.reminder_time) {
        let reminder = Offset::new(magnitude, inputs.reminder_direction);
        let unchanged = row
            .baseline_reminder()
            .is_some_and(|base| reminder.equivalent(&base));
        if !unchanged {
            record.reminder_offset = Some(signed(reminder, &row.key, TaskField::ReminderOffset)?);
            values_changed = true;
        }
        if base.reminder_time != Some(time) {
            record.reminder_time = Some(time);
            values_changed = true;
        }
    }

    // Recurrence, only as a complete pair
    if let (Some(kind), Some(interval)) = (&inputs.recurrence_type, inputs.recurrence_interval) {
        if base.recurrence_type.as_ref() != Some(kind) {
            record.recurrence_type = Some(kind.clone());
            values_changed = true;
        }
        if base.recurrence_interval != Some(interval) {
            record.recurrence_interval = Some(interval);
            values_changed = true;
        }
    }

    Ok(RowResolution {
        record,
        values_changed,
        dates_changed,
        violations,
    })
}

fn signed(offset: Offset, key: &str, field: TaskField) -> Result<i32, ReconcileError> {
    offset.recombine().ok_or_else(|| ReconcileError::OffsetOverflow {
        key: key.to_string(),
        field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{ListEdit, TaskEdit};
    use crate::offset::Direction;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn member(id: &str) -> Member {
        Member {
            user_id: id.to_string(),
            user_name: format!("User {}", id),
        }
    }

    fn roster() -> Vec<Member> {
        vec![member("A"), member("B"), member("C")]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn header() -> ListHeader {
        ListHeader::from_list(RecordList {
            id: Some("L1".into()),
            name: Some("Discovery".into()),
            start_date: Some(date(2024, 1, 1)),
            parent_id: Some("MATTER-1".into()),
        })
    }

    fn stored_task(id: &str, owner: &str) -> TaskRecord {
        TaskRecord {
            id: Some(id.into()),
            subject: Some(format!("Task {}", id)),
            description: None,
            activity_date: Some(date(2024, 1, 11)),
            owner_id: Some(owner.into()),
            owner_name: Some(format!("User {}", owner)),
            priority: Some("High".into()),
            date_offset: 10,
            date_offset_units: Some("DAYS".into()),
            reminder_offset: Some(-1),
            reminder_time: NaiveTime::from_hms_opt(8, 30, 0),
            list_id: Some("L1".into()),
            what_id: Some("MATTER-1".into()),
            ..TaskRecord::default()
        }
    }

    fn row_mut<'a>(rows: &'a mut [EditableTask], key: &str) -> &'a mut EditableTask {
        rows.iter_mut().find(|row| row.key == key).unwrap()
    }

    #[test]
    fn load_keys_rows_by_id_and_filters_owner() {
        let rows = load_tasks(vec![stored_task("T1", "B")], &roster());
        assert_eq!(rows[0].key, "T1");
        let candidates: Vec<&str> = rows[0]
            .candidates
            .iter()
            .map(|m| m.user_id.as_str())
            .collect();
        assert_eq!(candidates, vec!["A", "C"]);
    }

    #[test]
    fn load_assigns_keys_to_rows_without_id() {
        let mut record = stored_task("T1", "A");
        record.id = None;
        let rows = load_tasks(vec![record, stored_task("T2", "A")], &roster());
        assert!(rows[0].key.len() <= 6);
        assert_ne!(rows[0].key, rows[1].key);
    }

    #[test]
    fn new_task_defaults_owner_to_first_member() {
        let template = TaskRecord {
            priority: Some("Normal".into()),
            list_id: Some("L1".into()),
            ..TaskRecord::default()
        };
        let row = new_task(&template, &roster(), &[]);

        assert_eq!(row.baseline.owner_id.as_deref(), Some("A"));
        assert_eq!(row.inputs.owner_id.as_deref(), Some("A"));
        let candidates: Vec<&str> = row.candidates.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(candidates, vec!["B", "C"]);
        assert!(!row.is_persisted());
        assert!(row.key.parse::<u32>().unwrap() < 1_000_000);
    }

    #[test]
    fn new_task_with_empty_roster_has_no_owner() {
        let row = new_task(&TaskRecord::default(), &[], &[]);
        assert_eq!(row.baseline.owner_id, None);
        assert!(row.candidates.is_empty());
    }

    #[test]
    fn removing_persisted_row_queues_deletion() {
        let mut rows = load_tasks(vec![stored_task("T1", "A")], &roster());
        rows.push(new_task(&TaskRecord::default(), &roster(), &rows));
        let new_key = rows[1].key.clone();
        let mut deletions = Vec::new();

        assert_eq!(remove_task(&mut rows, &mut deletions, &new_key), Ok(Removal::Discarded));
        assert!(deletions.is_empty());

        assert_eq!(remove_task(&mut rows, &mut deletions, "T1"), Ok(Removal::Queued));
        assert_eq!(deletions.len(), 1);
        assert_eq!(deletions[0].id.as_deref(), Some("T1"));
        assert!(rows.is_empty());

        assert_eq!(
            remove_task(&mut rows, &mut deletions, "T1"),
            Err(ReconcileError::UnknownRow("T1".into()))
        );
    }

    #[test]
    fn unedited_rows_report_no_changes_and_match_baseline() {
        let records = vec![stored_task("T1", "A"), stored_task("T2", "B")];
        let rows = load_tasks(records.clone(), &roster());

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();

        assert!(!assessment.values_changed);
        assert!(!assessment.dates_changed);
        assert!(assessment.validation_passed);
        let resolved: Vec<TaskRecord> = assessment.tasks.into_iter().map(|t| t.record).collect();
        assert_eq!(resolved, records);
        assert_eq!(assessment.list, header().baseline);
    }

    #[test]
    fn sparse_records_round_trip_without_changes() {
        let record = TaskRecord {
            id: Some("T9".into()),
            subject: Some("Bare".into()),
            owner_id: Some("A".into()),
            ..TaskRecord::default()
        };
        let rows = load_tasks(vec![record.clone()], &roster());
        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(!assessment.values_changed);
        assert_eq!(assessment.tasks[0].record, record);
    }

    #[test]
    fn missing_subject_or_owner_fails_validation_but_scans_all_rows() {
        let mut rows = load_tasks(vec![stored_task("T1", "A"), stored_task("T2", "B")], &roster());
        row_mut(&mut rows, "T1").inputs.apply(TaskEdit::Subject(None));
        row_mut(&mut rows, "T2").inputs.apply(TaskEdit::Owner(None));

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();

        assert!(!assessment.validation_passed);
        assert!(assessment.values_changed);
        assert_eq!(
            assessment.violations,
            vec![
                Violation::Task {
                    key: "T1".into(),
                    field: TaskField::Subject
                },
                Violation::Task {
                    key: "T2".into(),
                    field: TaskField::Owner
                },
            ]
        );
    }

    #[test]
    fn missing_list_name_and_target_date_fail_validation() {
        let mut header = header();
        header.apply(ListEdit::Name(None));
        header.apply(ListEdit::TargetDate(None));

        let assessment = assess(&header, &[], &[], &roster()).unwrap();
        assert_eq!(
            assessment.violations,
            vec![
                Violation::List {
                    field: ListField::Name
                },
                Violation::List {
                    field: ListField::TargetDate
                },
            ]
        );
    }

    #[test]
    fn target_date_change_with_do_not_recalculate_row_suppresses_recalculation() {
        let mut pinned = stored_task("T1", "A");
        pinned.do_not_recalculate = true;
        let rows = load_tasks(vec![pinned, stored_task("T2", "B")], &roster());
        let mut header = header();
        header.apply(ListEdit::TargetDate(Some(date(2024, 2, 1))));

        let assessment = assess(&header, &rows, &[], &roster()).unwrap();

        assert!(assessment.target_date_changed);
        assert!(!assessment.recalculate_based_on_target_date);
        assert!(!assessment.dates_changed);
        assert!(!assessment.should_recalculate());
        assert_eq!(assessment.list.start_date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn target_date_change_without_pinned_rows_keeps_recalculation() {
        let rows = load_tasks(vec![stored_task("T1", "A")], &roster());
        let mut header = header();
        header.apply(ListEdit::TargetDate(Some(date(2024, 2, 1))));

        let assessment = assess(&header, &rows, &[], &roster()).unwrap();
        assert!(assessment.recalculate_based_on_target_date);
    }

    #[test]
    fn clearing_do_not_recalculate_marks_dates_changed() {
        let mut pinned = stored_task("T1", "A");
        pinned.do_not_recalculate = true;
        let mut rows = load_tasks(vec![pinned], &roster());
        rows[0].inputs.apply(TaskEdit::DoNotRecalculate(false));

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(assessment.dates_changed);
        assert!(!assessment.tasks[0].record.do_not_recalculate);
    }

    #[test]
    fn deadline_direction_flip_recombines_offset() {
        let mut rows = load_tasks(vec![stored_task("T1", "A")], &roster());
        rows[0].inputs.apply(TaskEdit::DeadlineDirection(Direction::Before));

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(assessment.dates_changed);
        assert_eq!(assessment.tasks[0].record.date_offset, -10);
    }

    #[test]
    fn cleared_deadline_defaults_to_zero_and_counts_as_change() {
        let mut record = stored_task("T1", "A");
        record.date_offset = 0;
        let mut rows = load_tasks(vec![record], &roster());
        rows[0].inputs.apply(TaskEdit::Deadline(None));

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(assessment.values_changed);
        assert!(!assessment.dates_changed);
        assert_eq!(assessment.tasks[0].record.date_offset, 0);
    }

    #[test]
    fn cleared_optional_fields_take_defaults() {
        let mut record = stored_task("T1", "A");
        record.description = Some("Notes".into());
        record.date_offset_units = Some("WEEKS".into());
        let mut rows = load_tasks(vec![record], &roster());
        let inputs = &mut rows[0].inputs;
        inputs.apply(TaskEdit::Description(None));
        inputs.apply(TaskEdit::CountBy(None));
        inputs.apply(TaskEdit::Priority(None));
        inputs.apply(TaskEdit::DueDate(None));

        let mut header = header();
        header.apply(ListEdit::TargetDate(Some(date(2024, 3, 1))));
        let assessment = assess(&header, &rows, &[], &roster()).unwrap();
        let resolved = &assessment.tasks[0].record;

        assert_eq!(resolved.description.as_deref(), Some(""));
        assert_eq!(resolved.date_offset_units.as_deref(), Some("DAYS"));
        assert_eq!(resolved.priority.as_deref(), Some("Normal"));
        assert_eq!(resolved.activity_date, Some(date(2024, 3, 1)));
        assert!(assessment.dates_changed);
    }

    #[test]
    fn partial_reminder_is_not_applied() {
        let mut record = stored_task("T1", "A");
        record.reminder_offset = None;
        record.reminder_time = None;
        let mut rows = load_tasks(vec![record.clone()], &roster());
        rows[0].inputs.apply(TaskEdit::ReminderOffset(Some(3)));

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(!assessment.values_changed);
        assert_eq!(assessment.tasks[0].record.reminder_offset, None);
        assert_eq!(assessment.tasks[0].record, record);
    }

    #[test]
    fn reminder_time_without_offset_is_not_applied() {
        let mut record = stored_task("T1", "A");
        record.reminder_offset = None;
        record.reminder_time = None;
        let mut rows = load_tasks(vec![record.clone()], &roster());
        rows[0].inputs.apply(TaskEdit::ReminderTime(NaiveTime::from_hms_opt(9, 0, 0)));

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(!assessment.values_changed);
        assert_eq!(assessment.tasks[0].record, record);
    }

    #[rstest]
    #[case::offset_cleared(TaskEdit::ReminderOffset(None))]
    #[case::time_cleared(TaskEdit::ReminderTime(None))]
    fn partially_cleared_reminder_keeps_baseline(#[case] edit: TaskEdit) {
        let record = stored_task("T1", "A");
        let mut rows = load_tasks(vec![record.clone()], &roster());
        rows[0].inputs.apply(edit);

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(!assessment.values_changed);
        let resolved = &assessment.tasks[0].record;
        assert_eq!(resolved.reminder_offset, Some(-1));
        assert_eq!(resolved.reminder_time, NaiveTime::from_hms_opt(8, 30, 0));
    }

    #[rstest]
    #[case::type_only(TaskEdit::RecurrenceType(Some("RecurrenceRegenerateAfterDueDate".into())))]
    #[case::interval_only(TaskEdit::RecurrenceInterval(Some(3)))]
    fn half_filled_recurrence_is_not_applied(#[case] edit: TaskEdit) {
        let record = stored_task("T1", "A");
        let mut rows = load_tasks(vec![record.clone()], &roster());
        rows[0].inputs.apply(edit);

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(!assessment.values_changed);
        assert_eq!(assessment.tasks[0].record, record);
    }

    #[rstest]
    #[case::type_cleared(TaskEdit::RecurrenceType(None))]
    #[case::interval_cleared(TaskEdit::RecurrenceInterval(None))]
    fn partially_cleared_recurrence_keeps_baseline(#[case] edit: TaskEdit) {
        let mut record = stored_task("T1", "A");
        record.recurrence_type = Some("RecurrenceRegenerateAfterDueDate".into());
        record.recurrence_interval = Some(2);
        let mut rows = load_tasks(vec![record.clone()], &roster());
        rows[0].inputs.apply(edit);

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert!(!assessment.values_changed);
        assert_eq!(assessment.tasks[0].record, record);
    }

    #[test]
    fn complete_reminder_and_recurrence_pairs_apply() {
        let mut rows = load_tasks(vec![stored_task("T1", "A")], &roster());
        let inputs = &mut rows[0].inputs;
        inputs.apply(TaskEdit::ReminderOffset(Some(4)));
        inputs.apply(TaskEdit::ReminderDirection(Direction::Before));
        inputs.apply(TaskEdit::ReminderTime(NaiveTime::from_hms_opt(7, 0, 0)));
        inputs.apply(TaskEdit::RecurrenceType(Some("RecurrenceRegenerateAfterDueDate".into())));
        inputs.apply(TaskEdit::RecurrenceInterval(Some(2)));

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        let resolved = &assessment.tasks[0].record;
        assert_eq!(resolved.reminder_offset, Some(-4));
        assert_eq!(resolved.reminder_time, NaiveTime::from_hms_opt(7, 0, 0));
        assert_eq!(resolved.recurrence_interval, Some(2));
        assert!(assessment.values_changed);
        assert!(!assessment.dates_changed);
    }

    #[test]
    fn owner_change_resolves_owner_name() {
        let mut rows = load_tasks(vec![stored_task("T1", "A")], &roster());
        rows[0].inputs.apply(TaskEdit::Owner(Some("C".into())));

        let assessment = assess(&header(), &rows, &[], &roster()).unwrap();
        assert_eq!(assessment.tasks[0].record.owner_id.as_deref(), Some("C"));
        assert_eq!(assessment.tasks[0].record.owner_name.as_deref(), Some("User C"));
    }

    #[test]
    fn pending_deletions_and_new_lists_count_as_changes() {
        let deletions = vec![stored_task("T1", "A")];
        let assessment = assess(&header(), &[], &deletions, &roster()).unwrap();
        assert!(assessment.values_changed);

        let mut blank = ListHeader::blank("MATTER-1");
        blank.apply(ListEdit::Name(Some("New list".into())));
        blank.apply(ListEdit::TargetDate(Some(date(2024, 5, 1))));
        let assessment = assess(&blank, &[], &[], &roster()).unwrap();
        assert!(assessment.values_changed);
        assert!(assessment.validation_passed);
    }

    #[test]
    fn oversized_offsets_surface_as_errors() {
        let mut rows = load_tasks(vec![stored_task("T1", "A")], &roster());
        rows[0].inputs.apply(TaskEdit::Deadline(Some(u32::MAX)));

        let err = assess(&header(), &rows, &[], &roster()).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::OffsetOverflow {
                key: "T1".into(),
                field: TaskField::Deadline
            }
        );
    }
}
