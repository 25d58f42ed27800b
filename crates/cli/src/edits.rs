//! `KEY:FIELD=VALUE` assignments accepted by `listmgr edit --set`.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use listmgr_core::form::{TaskEdit, TaskField};
use listmgr_core::offset::Direction;

/// Row addressed by an assignment: an existing key, or `+N` for the N-th row
/// added by the same invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowTarget {
    Key(String),
    Added(usize),
}

impl FromStr for RowTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if key.is_empty() {
            bail!("Row key is required");
        }
        match key.strip_prefix('+') {
            Some(index) => {
                let index: usize = index
                    .parse()
                    .with_context(|| format!("Invalid added-row reference '{}'", key))?;
                if index == 0 {
                    bail!("Added rows are numbered from +1");
                }
                Ok(RowTarget::Added(index))
            }
            None => Ok(RowTarget::Key(key.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAssignment {
    pub target: RowTarget,
    pub edit: TaskEdit,
}

impl FromStr for TaskAssignment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, rest) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Expected KEY:FIELD=VALUE, got '{}'", s))?;
        let (field, value) = rest
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY:FIELD=VALUE, got '{}'", s))?;

        let field: TaskField = field.parse()?;
        Ok(Self {
            target: key.parse()?,
            edit: edit_for(field, value)?,
        })
    }
}

/// An empty value clears the control.
pub fn edit_for(field: TaskField, value: &str) -> Result<TaskEdit> {
    let value = value.trim();
    let text = (!value.is_empty()).then(|| value.to_string());

    let edit = match field {
        TaskField::Subject => TaskEdit::Subject(text),
        TaskField::Description => TaskEdit::Description(text),
        TaskField::Deadline => TaskEdit::Deadline(parse_optional(field, value)?),
        TaskField::DeadlineDirection => TaskEdit::DeadlineDirection(parse_direction(value)?),
        TaskField::CountBy => TaskEdit::CountBy(text),
        TaskField::Owner => TaskEdit::Owner(text),
        TaskField::DueDate => TaskEdit::DueDate(parse_optional::<NaiveDate>(field, value)?),
        TaskField::DoNotRecalculate => TaskEdit::DoNotRecalculate(parse_flag(value)?),
        TaskField::Priority => TaskEdit::Priority(text),
        TaskField::ReminderOffset => TaskEdit::ReminderOffset(parse_optional(field, value)?),
        TaskField::ReminderDirection => TaskEdit::ReminderDirection(parse_direction(value)?),
        TaskField::ReminderTime => TaskEdit::ReminderTime(parse_time(value)?),
        TaskField::RecurrenceType => TaskEdit::RecurrenceType(text),
        TaskField::RecurrenceInterval => {
            TaskEdit::RecurrenceInterval(parse_optional(field, value)?)
        }
    };
    Ok(edit)
}

fn parse_optional<T>(field: TaskField, value: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|err| anyhow!("Invalid {} '{}': {}", field.as_str(), value, err))
}

fn parse_direction(value: &str) -> Result<Direction> {
    if value.is_empty() {
        return Ok(Direction::default());
    }
    value.parse()
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" | "off" => Ok(false),
        "true" | "yes" | "1" | "on" => Ok(true),
        other => Err(anyhow!("Invalid flag '{}': expected true|false", other)),
    }
}

fn parse_time(value: &str) -> Result<Option<NaiveTime>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map(Some)
        .map_err(|err| anyhow!("Invalid reminder-time '{}': {}", value, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("T1:subject=File answer", RowTarget::Key("T1".into()), TaskEdit::Subject(Some("File answer".into())))]
    #[case("T1:subject=", RowTarget::Key("T1".into()), TaskEdit::Subject(None))]
    #[case("+2:deadline=15", RowTarget::Added(2), TaskEdit::Deadline(Some(15)))]
    #[case("T1:deadline-direction=before", RowTarget::Key("T1".into()), TaskEdit::DeadlineDirection(Direction::Before))]
    #[case("T1:due-date=2024-03-01", RowTarget::Key("T1".into()), TaskEdit::DueDate(NaiveDate::from_ymd_opt(2024, 3, 1)))]
    #[case("T1:do-not-recalculate=yes", RowTarget::Key("T1".into()), TaskEdit::DoNotRecalculate(true))]
    #[case("T1:reminder-time=09:30", RowTarget::Key("T1".into()), TaskEdit::ReminderTime(NaiveTime::from_hms_opt(9, 30, 0)))]
    #[case("T1:repeat-interval=", RowTarget::Key("T1".into()), TaskEdit::RecurrenceInterval(None))]
    fn parses_assignments(#[case] raw: &str, #[case] target: RowTarget, #[case] edit: TaskEdit) {
        let assignment: TaskAssignment = raw.parse().unwrap();
        assert_eq!(assignment, TaskAssignment { target, edit });
    }

    #[rstest]
    #[case("subject=missing key")]
    #[case("T1:subject")]
    #[case("T1:colour=red")]
    #[case("T1:deadline=-3")]
    #[case("+0:subject=x")]
    #[case("T1:reminder-time=noon")]
    fn rejects_malformed_assignments(#[case] raw: &str) {
        assert!(raw.parse::<TaskAssignment>().is_err());
    }
}
