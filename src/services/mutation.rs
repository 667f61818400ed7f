use std::sync::Arc;

use tracing::{info, warn};

use crate::codec::TemporalCodec;
use crate::draft::TaskDraft;
use crate::error::PlannerError;
use crate::models::{Task, TaskId, UpdateTaskRequest};
use crate::notify::{Notification, NotificationBus, Severity};
use crate::services::QueryCache;
use crate::store::TaskStore;

/// Runs one mutation at a time against the remote store. Success invalidates
/// the query cache and publishes a notification; failure publishes an error
/// and leaves the cache alone. Nothing is retried.
pub struct MutationCoordinator {
    store: Arc<dyn TaskStore>,
    cache: Arc<QueryCache>,
    bus: Arc<dyn NotificationBus>,
    codec: TemporalCodec,
}

impl MutationCoordinator {
    pub fn new(
        store: Arc<dyn TaskStore>,
        cache: Arc<QueryCache>,
        bus: Arc<dyn NotificationBus>,
        codec: TemporalCodec,
    ) -> Self {
        Self {
            store,
            cache,
            bus,
            codec,
        }
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<Task, PlannerError> {
        let request = draft
            .to_create_request(&self.codec)
            .map_err(|e| self.fail("Error creating task", e))?;

        let task = self
            .store
            .create_task(&request)
            .await
            .map_err(|e| self.fail("Error creating task", e))?;

        info!("created task {} ({})", task.id, task.title);
        self.succeed(Notification::new(
            format!("Task \"{}\" created successfully!", task.title),
            Severity::Success,
        ));
        Ok(task)
    }

    pub async fn update(&self, task_id: &TaskId, payload: &UpdateTaskRequest) -> Result<Task, PlannerError> {
        ensure_persisted(task_id).map_err(|e| self.fail("Error updating task", e))?;

        let task = self
            .store
            .update_task(task_id, payload)
            .await
            .map_err(|e| self.fail("Error updating task", e))?;

        info!("updated task {}", task.id);
        self.succeed(Notification::new(
            format!("Task \"{}\" updated successfully!", task.title),
            Severity::Success,
        ));
        Ok(task)
    }

    /// Builds the update payload from an edit session and submits it.
    pub async fn save_draft(&self, draft: &TaskDraft, original: &Task) -> Result<Task, PlannerError> {
        let payload = draft
            .to_update_payload(original, &self.codec)
            .map_err(|e| self.fail("Error updating task", e))?;
        self.update(&original.id, &payload).await
    }

    pub async fn delete(&self, task_id: &TaskId) -> Result<(), PlannerError> {
        ensure_persisted(task_id).map_err(|e| self.fail("Error deleting task", e))?;

        self.store
            .delete_task(task_id)
            .await
            .map_err(|e| self.fail("Error deleting task", e))?;

        info!("deleted task {}", task_id);
        self.succeed(Notification::new("Task deleted successfully!", Severity::Success));
        Ok(())
    }

    pub async fn complete(&self, task_id: &TaskId) -> Result<Task, PlannerError> {
        ensure_persisted(task_id).map_err(|e| self.fail("Error completing task", e))?;

        let task = self
            .store
            .update_task(task_id, &UpdateTaskRequest::completion())
            .await
            .map_err(|e| self.fail("Error completing task", e))?;

        info!("completed task {}", task.id);
        self.succeed(Notification::new(
            format!("Task \"{}\" marked as complete! Great job!", task.title),
            Severity::Success,
        ));
        Ok(task)
    }

    /// Snooze. The store decides when the next reminder fires.
    pub async fn acknowledge(&self, task_id: &TaskId) -> Result<Task, PlannerError> {
        ensure_persisted(task_id).map_err(|e| self.fail("Error snoozing reminder", e))?;

        let task = self
            .store
            .acknowledge_task(task_id)
            .await
            .map_err(|e| self.fail("Error snoozing reminder", e))?;

        info!("acknowledged task {}", task.id);
        self.succeed(Notification::new(
            format!("Task \"{}\" snoozed! Reminder rescheduled.", task.title),
            Severity::Neutral,
        ));
        Ok(task)
    }

    fn succeed(&self, notification: Notification) {
        self.cache.invalidate();
        self.bus.publish(notification);
    }

    fn fail(&self, action: &str, err: PlannerError) -> PlannerError {
        warn!("{}: {}", action, err);
        self.bus.publish(Notification::new(
            format!("{}: {}", action, err.user_message()),
            Severity::Error,
        ));
        err
    }
}

fn ensure_persisted(task_id: &TaskId) -> Result<(), PlannerError> {
    if task_id.as_str().trim().is_empty() {
        return Err(PlannerError::missing(&["id"]));
    }
    Ok(())
}
