use thiserror::Error;

use crate::models::{ReminderId, TaskId};

pub const GENERIC_TRANSPORT_MESSAGE: &str = "Network error: the task service could not be reached";

#[derive(Debug, Clone, Error)]
pub enum PlannerError {
    #[error("Validation failed: {}", describe_validation(.missing_fields, .invalid_fields))]
    ValidationFailed {
        missing_fields: Vec<String>,
        invalid_fields: Vec<String>,
    },

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Reminder {0} does not belong to the original task")]
    Reference(ReminderId),

    #[error("Reminder {0} appears more than once")]
    DuplicateReminder(ReminderId),

    #[error("Draft for task {draft} cannot be applied to task {task}")]
    TaskMismatch { draft: String, task: TaskId },

    #[error("Transport error: {}", transport_message(.detail, .reason))]
    Transport {
        status: Option<u16>,
        detail: Option<String>,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlannerError {
    pub fn missing(fields: &[&str]) -> Self {
        PlannerError::ValidationFailed {
            missing_fields: fields.iter().map(|f| f.to_string()).collect(),
            invalid_fields: Vec::new(),
        }
    }

    /// A remote failure carrying the server-provided `detail`.
    pub fn remote(status: u16, detail: impl Into<String>) -> Self {
        PlannerError::Transport {
            status: Some(status),
            detail: Some(detail.into()),
            reason: format!("Request failed with status code {}", status),
        }
    }

    /// Local errors never reach the remote store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlannerError::ValidationFailed { .. }
                | PlannerError::InvalidTimestamp(_)
                | PlannerError::Reference(_)
                | PlannerError::DuplicateReminder(_)
                | PlannerError::TaskMismatch { .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PlannerError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Text shown to the user: the server detail when there is one.
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Transport { detail, reason, .. } => transport_message(detail, reason),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() || err.is_connect() {
            GENERIC_TRANSPORT_MESSAGE.to_string()
        } else {
            err.to_string()
        };
        PlannerError::Transport {
            status: err.status().map(|s| s.as_u16()),
            detail: None,
            reason,
        }
    }
}

fn transport_message(detail: &Option<String>, reason: &str) -> String {
    match detail {
        Some(detail) if !detail.trim().is_empty() => detail.clone(),
        _ if !reason.is_empty() => reason.to_string(),
        _ => GENERIC_TRANSPORT_MESSAGE.to_string(),
    }
}

fn describe_validation(missing: &[String], invalid: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing {}", missing.join(", ")));
    }
    if !invalid.is_empty() {
        parts.push(format!("invalid {}", invalid.join(", ")));
    }
    parts.join("; ")
}
