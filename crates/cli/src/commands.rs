use std::fmt;
use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;
use listmgr_core::form::{EditableTask, ListEdit, TaskEdit};
use listmgr_core::manager::{ListManager, SaveOutcome};
use listmgr_core::notice::{Notice, Severity};
use listmgr_core::offset::Direction;
use listmgr_core::picklist::{PicklistField, Picklists};
use listmgr_core::reconcile::Violation;
use listmgr_core::services::LocalRemote;
use listmgr_core::ListRemote;
use serde::Serialize;
use tracing::debug;

use crate::cli::{CliCommand, EditArgs, OutputArgs, RecordArgs, TasksArgs};
use crate::config::AppConfig;
use crate::edits::RowTarget;

pub async fn execute<W: Write>(config: &AppConfig, command: CliCommand, mut writer: W) -> Result<()> {
    debug!(data_dir = %config.data_dir().display(), source = %config.source(), "opening local store");
    let remote = Arc::new(LocalRemote::new(config.clone())?);
    match command {
        CliCommand::Seed(args) => handle_seed(&remote, &args, &mut writer).await,
        CliCommand::Lists(args) => handle_lists(&remote, &args, &mut writer).await,
        CliCommand::Members(args) => handle_members(&remote, &args, &mut writer).await,
        CliCommand::Tasks(args) => handle_tasks(remote, &args, &mut writer).await,
        CliCommand::Edit(args) => handle_edit(remote, &args, &mut writer).await,
    }
}

async fn handle_seed<W: Write>(remote: &LocalRemote, args: &RecordArgs, mut writer: W) -> Result<()> {
    let summary = remote.seed_sample(&args.record_id).await?;
    writeln!(
        writer,
        "Seeded list {} with {} tasks and {} members for record {}",
        summary.list_id, summary.tasks, summary.members, args.record_id
    )?;
    Ok(())
}

async fn handle_lists<W: Write>(remote: &LocalRemote, args: &OutputArgs, mut writer: W) -> Result<()> {
    let lists = remote.get_record_lists(&args.record.record_id).await?;
    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&lists)?)?;
        return Ok(());
    }
    if lists.is_empty() {
        writeln!(writer, "No lists for record {}", args.record.record_id)?;
    }
    for list in lists {
        writeln!(
            writer,
            "{}\t{}\t{}",
            list.id.unwrap_or_default(),
            list.name.unwrap_or_default(),
            display_date(list.start_date)
        )?;
    }
    Ok(())
}

async fn handle_members<W: Write>(remote: &LocalRemote, args: &OutputArgs, mut writer: W) -> Result<()> {
    let members = remote
        .get_active_record_members(&args.record.record_id)
        .await?;
    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&members)?)?;
        return Ok(());
    }
    for member in members {
        writeln!(writer, "{}\t{}", member.user_id, member.user_name)?;
    }
    Ok(())
}

async fn handle_tasks<W: Write>(remote: Arc<LocalRemote>, args: &TasksArgs, mut writer: W) -> Result<()> {
    let mut manager = ListManager::new(remote, args.output.record.record_id.as_str());
    manager.connect().await;
    select_existing(&mut manager, &args.list_id).await?;
    ensure_loaded(&mut manager, &mut writer)?;

    let rows: Vec<TaskRow> = manager.rows().iter().map(TaskRow::from).collect();
    if args.output.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    let header = manager.header();
    writeln!(
        writer,
        "{} (target {})",
        header.name.as_deref().unwrap_or_default(),
        display_date(header.target_date)
    )?;
    if manager.shows_empty_list_message() {
        writeln!(writer, "This list has no tasks yet.")?;
    }
    for row in rows {
        writeln!(writer, "{}", row)?;
    }
    Ok(())
}

async fn handle_edit<W: Write>(remote: Arc<LocalRemote>, args: &EditArgs, mut writer: W) -> Result<()> {
    let mut manager = ListManager::new(remote, args.record.record_id.as_str());
    manager.connect().await;
    if let Some(list_id) = &args.list_id {
        select_existing(&mut manager, list_id).await?;
    }
    ensure_loaded(&mut manager, &mut writer)?;

    if let Some(name) = &args.name {
        manager.edit_list(ListEdit::Name(Some(name.clone())));
    }
    if let Some(date) = args.target_date {
        manager.edit_list(ListEdit::TargetDate(Some(date)));
    } else if args.clear_target_date {
        manager.edit_list(ListEdit::TargetDate(None));
    }

    for key in &args.remove {
        manager.remove_task(key)?;
    }

    let mut added = Vec::with_capacity(args.add.len());
    for subject in &args.add {
        let key = manager.add_task()?;
        manager.edit_task(&key, TaskEdit::Subject(Some(subject.clone())))?;
        added.push(key);
    }

    for assignment in &args.set {
        check_picklist(manager.picklists(), &assignment.edit)?;
        let key = match &assignment.target {
            RowTarget::Key(key) => key.as_str(),
            RowTarget::Added(index) => added
                .get(index - 1)
                .map(String::as_str)
                .ok_or_else(|| anyhow!("Only {} task(s) were added; +{} does not exist", added.len(), index))?,
        };
        manager.edit_task(key, assignment.edit.clone())?;
    }

    let outcome = manager.save().await;
    writeln!(writer, "{}", SaveSummary(&outcome))?;
    write_notices(&mut writer, &manager.drain_notices())?;

    if let SaveOutcome::Failed { stage, message } = outcome {
        bail!("save failed during {:?}: {}", stage, message);
    }
    Ok(())
}

async fn select_existing(manager: &mut ListManager<LocalRemote>, list_id: &str) -> Result<()> {
    if !manager
        .record_lists()
        .iter()
        .any(|list| list.id.as_deref() == Some(list_id))
    {
        bail!(
            "List {} not found for record {}",
            list_id,
            manager.record_id()
        );
    }
    manager.select_list(Some(list_id)).await;
    Ok(())
}

/// Surface load notices; any error means the rows cannot be trusted.
fn ensure_loaded<W: Write>(manager: &mut ListManager<LocalRemote>, mut writer: W) -> Result<()> {
    let notices = manager.drain_notices();
    write_notices(&mut writer, &notices)?;
    if let Some(notice) = notices.iter().find(|n| n.severity == Severity::Error) {
        bail!("{}", notice);
    }
    Ok(())
}

fn write_notices<W: Write>(mut writer: W, notices: &[Notice]) -> Result<()> {
    for notice in notices {
        writeln!(writer, "{}", notice)?;
    }
    Ok(())
}

fn check_picklist(picklists: &Picklists, edit: &TaskEdit) -> Result<()> {
    let (field, value) = match edit {
        TaskEdit::CountBy(Some(value)) => (PicklistField::CountBy, value),
        TaskEdit::Priority(Some(value)) => (PicklistField::Priority, value),
        TaskEdit::RecurrenceType(Some(value)) => (PicklistField::RepeatType, value),
        _ => return Ok(()),
    };
    let options = picklists.get(field);
    if options.iter().any(|option| option.value == *value) {
        return Ok(());
    }
    let allowed: Vec<&str> = options
        .iter()
        .map(|option| option.value.as_str())
        .filter(|value| !value.is_empty())
        .collect();
    let name = field
        .to_possible_value()
        .map(|value| value.get_name().to_string())
        .unwrap_or_default();
    bail!(
        "'{}' is not a valid {} (expected one of: {})",
        value,
        name,
        allowed.join(", ")
    )
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

#[derive(Debug, Serialize)]
struct TaskRow {
    key: String,
    subject: Option<String>,
    owner: Option<String>,
    due_date: Option<NaiveDate>,
    deadline: Option<u32>,
    deadline_direction: Direction,
    count_by: Option<String>,
    priority: Option<String>,
    do_not_recalculate: bool,
    reminder_offset: Option<u32>,
    reminder_direction: Direction,
    reminder_time: Option<NaiveTime>,
    repeat_type: Option<String>,
    repeat_interval: Option<u32>,
}

impl From<&EditableTask> for TaskRow {
    fn from(row: &EditableTask) -> Self {
        let inputs = &row.inputs;
        Self {
            key: row.key.clone(),
            subject: inputs.subject.clone(),
            owner: row
                .baseline
                .owner_name
                .clone()
                .or_else(|| inputs.owner_id.clone()),
            due_date: inputs.due_date,
            deadline: inputs.deadline,
            deadline_direction: inputs.deadline_direction,
            count_by: inputs.count_by.clone(),
            priority: inputs.priority.clone(),
            do_not_recalculate: inputs.do_not_recalculate.unwrap_or(false),
            reminder_offset: inputs.reminder_offset,
            reminder_direction: inputs.reminder_direction,
            reminder_time: inputs.reminder_time,
            repeat_type: inputs.recurrence_type.clone(),
            repeat_interval: inputs.recurrence_interval,
        }
    }
}

impl fmt::Display for TaskRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  owner={}  due={}  deadline={} {} {}",
            self.key,
            self.subject.as_deref().unwrap_or("(no subject)"),
            self.owner.as_deref().unwrap_or("-"),
            display_date(self.due_date),
            self.deadline.unwrap_or(0),
            self.count_by.as_deref().unwrap_or("DAYS").to_lowercase(),
            self.deadline_direction
        )?;
        if self.do_not_recalculate {
            write!(f, "  [pinned]")?;
        }
        if let (Some(offset), Some(time)) = (self.reminder_offset, self.reminder_time) {
            write!(
                f,
                "  reminder={} {} at {}",
                offset,
                self.reminder_direction,
                time.format("%H:%M")
            )?;
        }
        if let (Some(kind), Some(interval)) = (&self.repeat_type, self.repeat_interval) {
            write!(f, "  repeat={} every {}", kind, interval)?;
        }
        Ok(())
    }
}

struct SaveSummary<'a>(&'a SaveOutcome);

impl fmt::Display for SaveSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            SaveOutcome::Busy => write!(f, "Save skipped: another save is in progress"),
            SaveOutcome::NoChanges => write!(f, "No changes to save"),
            SaveOutcome::Invalid { violations } => {
                write!(
                    f,
                    "Not saved: {} required field{} missing",
                    violations.len(),
                    if violations.len() == 1 { "" } else { "s" }
                )?;
                for violation in violations {
                    match violation {
                        Violation::List { field } => write!(f, "\n  - list {:?}", field)?,
                        Violation::Task { key, field } => {
                            write!(f, "\n  - task {}: {}", key, field.as_str())?
                        }
                    }
                }
                Ok(())
            }
            SaveOutcome::Saved {
                list_id,
                recalculated,
            } => {
                write!(f, "Saved list {}", list_id)?;
                if *recalculated {
                    write!(f, " (due dates recalculated)")?;
                }
                Ok(())
            }
            SaveOutcome::Failed { stage, message } => {
                write!(f, "Save failed during {:?}: {}", stage, message)
            }
        }
    }
}
