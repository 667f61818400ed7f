#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use planner::PlannerError;
use planner::models::{NewReminder, NewTaskRequest, ReminderKind, Task, TaskId, TaskType, UpdateTaskRequest};
use planner::store::{MemoryTaskStore, TaskStore};

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn new_task(title: &str, due: DateTime<Utc>, reminders: &[DateTime<Utc>]) -> NewTaskRequest {
    NewTaskRequest {
        title: title.to_string(),
        subject: "Biology".to_string(),
        task_type: TaskType::Study,
        due_date: due,
        notes: None,
        is_completed: false,
        reminders: reminders
            .iter()
            .map(|t| NewReminder {
                time: *t,
                kind: ReminderKind::Exact,
            })
            .collect(),
    }
}

/// Memory-backed store that counts calls and can be told to fail or lag.
#[derive(Default)]
pub struct TestStore {
    pub inner: MemoryTaskStore,
    list_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
    list_delay: Mutex<Duration>,
    list_error: Mutex<Option<PlannerError>>,
    mutation_error: Mutex<Option<PlannerError>>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = delay;
    }

    pub fn fail_lists_with(&self, err: Option<PlannerError>) {
        *self.list_error.lock().unwrap() = err;
    }

    pub fn fail_mutations_with(&self, err: Option<PlannerError>) {
        *self.mutation_error.lock().unwrap() = err;
    }

    fn check_mutation(&self) -> Result<(), PlannerError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        match self.mutation_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskStore for TestStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, PlannerError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        // Snapshot first so a slow fetch returns what existed when it started.
        let snapshot = self.inner.list();
        let delay = *self.list_delay.lock().unwrap();
        let error = self.list_error.lock().unwrap().clone();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match error {
            Some(err) => Err(err),
            None => Ok(snapshot),
        }
    }

    async fn create_task(&self, request: &NewTaskRequest) -> Result<Task, PlannerError> {
        self.check_mutation()?;
        self.inner.create_task(request).await
    }

    async fn update_task(&self, id: &TaskId, request: &UpdateTaskRequest) -> Result<Task, PlannerError> {
        self.check_mutation()?;
        self.inner.update_task(id, request).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), PlannerError> {
        self.check_mutation()?;
        self.inner.delete_task(id).await
    }

    async fn acknowledge_task(&self, id: &TaskId) -> Result<Task, PlannerError> {
        self.check_mutation()?;
        self.inner.acknowledge_task(id).await
    }
}
