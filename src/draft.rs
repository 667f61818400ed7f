//! Editable working copy of a single task.

use chrono::{DateTime, Utc};

use crate::codec::TemporalCodec;
use crate::error::PlannerError;
use crate::models::{
    NewTaskRequest, ReminderId, ReminderKind, Task, TaskId, TaskType, UpdateTaskRequest,
};
use crate::reconcile::{ReminderEdit, reconcile};

/// A reminder row in the editor. Times are wall-clock strings and may be
/// empty while the user is still typing.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftReminder {
    Pending {
        time: String,
        kind: ReminderKind,
    },
    Existing {
        id: ReminderId,
        time: String,
        kind: ReminderKind,
    },
}

impl DraftReminder {
    pub fn pending(time: impl Into<String>) -> Self {
        DraftReminder::Pending {
            time: time.into(),
            kind: ReminderKind::Exact,
        }
    }

    pub fn existing(id: impl Into<ReminderId>, time: impl Into<String>) -> Self {
        DraftReminder::Existing {
            id: id.into(),
            time: time.into(),
            kind: ReminderKind::Exact,
        }
    }

    pub fn id(&self) -> Option<&ReminderId> {
        match self {
            DraftReminder::Pending { .. } => None,
            DraftReminder::Existing { id, .. } => Some(id),
        }
    }

    pub fn time(&self) -> &str {
        match self {
            DraftReminder::Pending { time, .. } | DraftReminder::Existing { time, .. } => time,
        }
    }

    pub fn set_time(&mut self, value: impl Into<String>) {
        match self {
            DraftReminder::Pending { time, .. } | DraftReminder::Existing { time, .. } => {
                *time = value.into();
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub id: Option<TaskId>,
    pub title: String,
    pub subject: String,
    pub task_type: TaskType,
    pub due_date: String,
    pub notes: String,
    pub is_completed: bool,
    pub reminders: Vec<DraftReminder>,
}

struct ResolvedDraft {
    due_date: DateTime<Utc>,
    reminders: Vec<ReminderEdit>,
}

impl TaskDraft {
    /// Blank draft for the create flow.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_server_task(task: &Task, codec: &TemporalCodec) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            subject: task.subject.clone(),
            task_type: task.task_type,
            due_date: codec.to_local_wall_clock(&task.due_date),
            notes: task.notes.clone().unwrap_or_default(),
            is_completed: task.is_completed,
            reminders: task
                .reminders
                .iter()
                .map(|r| DraftReminder::Existing {
                    id: r.id.clone(),
                    time: codec.to_local_wall_clock(&r.time),
                    kind: r.kind,
                })
                .collect(),
        }
    }

    pub fn add_reminder(&mut self) {
        self.reminders.push(DraftReminder::pending(""));
    }

    pub fn remove_reminder(&mut self, index: usize) -> Option<DraftReminder> {
        if index < self.reminders.len() {
            Some(self.reminders.remove(index))
        } else {
            None
        }
    }

    pub fn set_reminder_time(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.reminders.get_mut(index) {
            Some(reminder) => {
                reminder.set_time(value);
                true
            }
            None => false,
        }
    }

    pub fn validate(&self, codec: &TemporalCodec) -> Result<(), PlannerError> {
        self.resolve(codec).map(|_| ())
    }

    /// Body for `POST /tasks/`. Reminders left without a time are dropped.
    pub fn to_create_request(&self, codec: &TemporalCodec) -> Result<NewTaskRequest, PlannerError> {
        let resolved = self.resolve(codec)?;
        let plan = reconcile(&[], &resolved.reminders)?;
        let notes = self.notes.trim();

        Ok(NewTaskRequest {
            title: self.title.trim().to_string(),
            subject: self.subject.trim().to_string(),
            task_type: self.task_type,
            due_date: resolved.due_date,
            notes: (!notes.is_empty()).then(|| self.notes.clone()),
            is_completed: false,
            reminders: plan.to_create,
        })
    }

    /// Body for `PUT /tasks/{id}`: every editable field plus the reminder
    /// diff against `original`.
    pub fn to_update_payload(
        &self,
        original: &Task,
        codec: &TemporalCodec,
    ) -> Result<UpdateTaskRequest, PlannerError> {
        if self.id.as_ref() != Some(&original.id) {
            return Err(PlannerError::TaskMismatch {
                draft: self
                    .id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "<unsaved>".to_string()),
                task: original.id.clone(),
            });
        }

        let resolved = self.resolve(codec)?;
        let plan = reconcile(&original.reminders, &resolved.reminders)?;

        Ok(UpdateTaskRequest {
            title: Some(self.title.trim().to_string()),
            subject: Some(self.subject.trim().to_string()),
            task_type: Some(self.task_type),
            due_date: Some(resolved.due_date),
            // Null notes stay null unless something was typed.
            notes: (!self.notes.is_empty() || original.notes.is_some()).then(|| self.notes.clone()),
            is_completed: Some(self.is_completed),
            reminders: Some(plan.reminder_updates()),
            remove_reminder_ids: Some(plan.to_remove),
        })
    }

    // Collects every missing and unparsable field before failing so the
    // editor can flag them all at once.
    fn resolve(&self, codec: &TemporalCodec) -> Result<ResolvedDraft, PlannerError> {
        let mut missing_fields = Vec::new();
        let mut invalid_fields = Vec::new();

        if self.title.trim().is_empty() {
            missing_fields.push("title".to_string());
        }
        if self.subject.trim().is_empty() {
            missing_fields.push("subject".to_string());
        }

        let due_date = if self.due_date.trim().is_empty() {
            missing_fields.push("due_date".to_string());
            None
        } else {
            match codec.to_instant(&self.due_date) {
                Ok(instant) => Some(instant),
                Err(_) => {
                    invalid_fields.push("due_date".to_string());
                    None
                }
            }
        };

        let mut reminders = Vec::with_capacity(self.reminders.len());
        for (index, reminder) in self.reminders.iter().enumerate() {
            let time = if reminder.time().trim().is_empty() {
                None
            } else {
                match codec.to_instant(reminder.time()) {
                    Ok(instant) => Some(instant),
                    Err(_) => {
                        invalid_fields.push(format!("reminders[{}]", index));
                        None
                    }
                }
            };

            reminders.push(match reminder {
                DraftReminder::Pending { kind, .. } => ReminderEdit::Pending { time, kind: *kind },
                DraftReminder::Existing { id, kind, .. } => ReminderEdit::Existing {
                    id: id.clone(),
                    time,
                    kind: *kind,
                },
            });
        }

        match due_date {
            Some(due_date) if missing_fields.is_empty() && invalid_fields.is_empty() => {
                Ok(ResolvedDraft {
                    due_date,
                    reminders,
                })
            }
            _ => Err(PlannerError::ValidationFailed {
                missing_fields,
                invalid_fields,
            }),
        }
    }
}
