use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NewReminder, Reminder, ReminderId, ReminderUpdate};

/// Server-assigned task identity. Never changes once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    #[default]
    Study,
    Assignment,
    Exam,
    Personal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

/// Incomplete tasks first, then by ascending due date.
pub fn display_order(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(compare_for_display);
    sorted
}

fn compare_for_display(a: &Task, b: &Task) -> Ordering {
    a.is_completed
        .cmp(&b.is_completed)
        .then_with(|| a.due_date.cmp(&b.due_date))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaskRequest {
    pub title: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub reminders: Vec<NewReminder>,
}

/// Partial update: only the fields that are `Some` are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<ReminderUpdate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_reminder_ids: Option<Vec<ReminderId>>,
}

impl UpdateTaskRequest {
    pub fn completion() -> Self {
        Self {
            is_completed: Some(true),
            ..Self::default()
        }
    }
}
