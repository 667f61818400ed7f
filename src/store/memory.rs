//! Authoritative in-memory task store. Backs the bundled HTTP server and
//! doubles as an in-process [`TaskStore`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use super::TaskStore;
use crate::error::PlannerError;
use crate::models::{NewTaskRequest, Reminder, ReminderId, Task, TaskId, UpdateTaskRequest};

/// A reminder stops being snoozed once it has been acknowledged this often.
pub const MAX_SNOOZES: u32 = 3;
pub const SNOOZE_MINUTES: i64 = 15;

struct StoredTask {
    task: Task,
    snoozes: HashMap<ReminderId, u32>,
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<StoredTask>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredTask>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn list(&self) -> Vec<Task> {
        self.lock().iter().map(|stored| stored.task.clone()).collect()
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.lock()
            .iter()
            .find(|stored| &stored.task.id == id)
            .map(|stored| stored.task.clone())
    }

    pub fn create(&self, request: NewTaskRequest) -> Task {
        let task = Task {
            id: TaskId(Uuid::new_v4().to_string()),
            title: request.title,
            subject: request.subject,
            task_type: request.task_type,
            due_date: request.due_date,
            notes: request.notes,
            is_completed: request.is_completed,
            reminders: request
                .reminders
                .into_iter()
                .map(|r| Reminder {
                    id: new_reminder_id(),
                    time: r.time,
                    kind: r.kind,
                })
                .collect(),
        };

        info!("created task {} ({})", task.id, task.title);
        self.lock().push(StoredTask {
            task: task.clone(),
            snoozes: HashMap::new(),
        });
        task
    }

    /// Applies the provided fields only. Reminders listed in
    /// `remove_reminder_ids` are dropped first; then each reminder entry
    /// updates the reminder with its id, or creates a new one when the id is
    /// absent or unknown.
    pub fn update(&self, id: &TaskId, request: UpdateTaskRequest) -> Option<Task> {
        let mut tasks = self.lock();
        let stored = tasks.iter_mut().find(|stored| &stored.task.id == id)?;
        let task = &mut stored.task;

        if let Some(title) = request.title {
            task.title = title;
        }
        if let Some(subject) = request.subject {
            task.subject = subject;
        }
        if let Some(task_type) = request.task_type {
            task.task_type = task_type;
        }
        if let Some(due_date) = request.due_date {
            task.due_date = due_date;
        }
        if let Some(notes) = request.notes {
            task.notes = Some(notes);
        }
        if let Some(is_completed) = request.is_completed {
            task.is_completed = is_completed;
        }

        if let Some(remove_ids) = request.remove_reminder_ids {
            task.reminders.retain(|r| !remove_ids.contains(&r.id));
            stored.snoozes.retain(|rid, _| !remove_ids.contains(rid));
        }

        for entry in request.reminders.unwrap_or_default() {
            let position = entry
                .id
                .as_ref()
                .and_then(|rid| task.reminders.iter().position(|r| &r.id == rid));

            match position {
                Some(index) => {
                    let reminder = &mut task.reminders[index];
                    if let Some(time) = entry.time {
                        reminder.time = time;
                    }
                    if let Some(kind) = entry.kind {
                        reminder.kind = kind;
                    }
                }
                None => {
                    if let Some(time) = entry.time {
                        task.reminders.push(Reminder {
                            id: new_reminder_id(),
                            time,
                            kind: entry.kind.unwrap_or_default(),
                        });
                    }
                }
            }
        }

        info!("updated task {}", task.id);
        Some(task.clone())
    }

    pub fn delete(&self, id: &TaskId) -> bool {
        let mut tasks = self.lock();
        let before = tasks.len();
        tasks.retain(|stored| &stored.task.id != id);
        let removed = tasks.len() != before;
        if removed {
            info!("deleted task {}", id);
        }
        removed
    }

    pub fn acknowledge(&self, id: &TaskId) -> Option<Task> {
        self.acknowledge_at(id, Utc::now())
    }

    /// Snoozes the earliest reminder that still has snoozes left, moving it
    /// to `now + 15 minutes`.
    pub fn acknowledge_at(&self, id: &TaskId, now: DateTime<Utc>) -> Option<Task> {
        let mut tasks = self.lock();
        let stored = tasks.iter_mut().find(|stored| &stored.task.id == id)?;

        let snoozes = &stored.snoozes;
        let target = stored
            .task
            .reminders
            .iter_mut()
            .filter(|r| snoozes.get(&r.id).copied().unwrap_or(0) < MAX_SNOOZES)
            .min_by_key(|r| r.time);

        if let Some(reminder) = target {
            reminder.time = now + Duration::minutes(SNOOZE_MINUTES);
            let count = stored.snoozes.entry(reminder.id.clone()).or_insert(0);
            *count += 1;
            info!(
                "snoozed reminder {} of task {} ({} of {})",
                reminder.id, stored.task.id, count, MAX_SNOOZES
            );
        }

        Some(stored.task.clone())
    }
}

fn new_reminder_id() -> ReminderId {
    ReminderId(Uuid::new_v4().to_string())
}

fn not_found(id: &TaskId) -> PlannerError {
    PlannerError::remote(404, format!("Task with ID {} not found.", id))
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, PlannerError> {
        Ok(self.list())
    }

    async fn create_task(&self, request: &NewTaskRequest) -> Result<Task, PlannerError> {
        Ok(self.create(request.clone()))
    }

    async fn update_task(&self, id: &TaskId, request: &UpdateTaskRequest) -> Result<Task, PlannerError> {
        self.update(id, request.clone()).ok_or_else(|| not_found(id))
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), PlannerError> {
        if self.delete(id) { Ok(()) } else { Err(not_found(id)) }
    }

    async fn acknowledge_task(&self, id: &TaskId) -> Result<Task, PlannerError> {
        self.acknowledge(id).ok_or_else(|| not_found(id))
    }
}
