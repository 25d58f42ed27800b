use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const NONE_LABEL: &str = "-- None --";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PicklistField {
    CountBy,
    Priority,
    RepeatType,
}

impl PicklistField {
    /// Fields where leaving the control empty is a valid choice.
    pub fn offers_none(&self) -> bool {
        !matches!(self, PicklistField::CountBy)
    }

    pub fn builtin_values(&self) -> Vec<PicklistOption> {
        let values: &[(&str, &str)] = match self {
            PicklistField::CountBy => &[
                ("Days", "DAYS"),
                ("Business Days", "BUSINESS DAYS"),
                ("Weeks", "WEEKS"),
                ("Months", "MONTHS"),
            ],
            PicklistField::Priority => &[("High", "High"), ("Normal", "Normal"), ("Low", "Low")],
            PicklistField::RepeatType => &[
                ("After due date", "RecurrenceRegenerateAfterDueDate"),
                ("After date completed", "RecurrenceRegenerateAfterToday"),
                ("Repeat this task", "RecurrenceRegenerated"),
            ],
        };
        values
            .iter()
            .map(|(label, value)| PicklistOption::new(*label, *value))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicklistOption {
    pub label: String,
    pub value: String,
}

impl PicklistOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Options shown by the row comboboxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picklists {
    pub count_by: Vec<PicklistOption>,
    pub priority: Vec<PicklistOption>,
    pub repeat_type: Vec<PicklistOption>,
}

impl Picklists {
    pub fn builtin() -> Self {
        let mut picklists = Self {
            count_by: Vec::new(),
            priority: Vec::new(),
            repeat_type: Vec::new(),
        };
        for field in PicklistField::value_variants() {
            picklists.set(*field, field.builtin_values());
        }
        picklists
    }

    /// Replace a field's options, prefixing the empty choice where allowed.
    pub fn set(&mut self, field: PicklistField, values: Vec<PicklistOption>) {
        let options = if field.offers_none() {
            std::iter::once(PicklistOption::new(NONE_LABEL, ""))
                .chain(values)
                .collect()
        } else {
            values
        };
        match field {
            PicklistField::CountBy => self.count_by = options,
            PicklistField::Priority => self.priority = options,
            PicklistField::RepeatType => self.repeat_type = options,
        }
    }

    pub fn get(&self, field: PicklistField) -> &[PicklistOption] {
        match field {
            PicklistField::CountBy => &self.count_by,
            PicklistField::Priority => &self.priority,
            PicklistField::RepeatType => &self.repeat_type,
        }
    }
}

impl Default for Picklists {
    fn default() -> Self {
        Self::builtin()
    }
}
