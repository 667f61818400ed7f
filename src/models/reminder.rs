use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned reminder identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(pub String);

impl ReminderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReminderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    #[default]
    #[serde(alias = "Exact")]
    Exact,
    #[serde(alias = "before", alias = "BeforeDueDate")]
    BeforeDueDate,
}

/// A persisted reminder as the remote store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub time: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: ReminderKind,
}

/// Reminder entry in a create body; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReminder {
    pub time: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: ReminderKind,
}

/// Reminder entry in an update body. `id: None` asks the store to create it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderUpdate {
    #[serde(default)]
    pub id: Option<ReminderId>,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReminderKind>,
}
