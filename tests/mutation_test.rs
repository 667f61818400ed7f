mod common;

use std::sync::Arc;

use planner::api::{ServerState, router};
use planner::config::PlannerConfig;
use planner::models::{TaskId, UpdateTaskRequest};
use planner::notify::{BroadcastBus, Notification, Severity, TracingBus};
use planner::state::AppState;
use planner::store::MemoryTaskStore;
use planner::{DraftReminder, PlannerError, TaskDraft, TemporalCodec};
use tokio::sync::broadcast::Receiver;

use common::{TestStore, at, new_task};

struct Harness {
    store: Arc<TestStore>,
    state: AppState,
    notifications: Receiver<Notification>,
}

fn harness() -> Harness {
    let store = Arc::new(TestStore::new());
    let bus = Arc::new(BroadcastBus::default());
    let notifications = bus.subscribe();
    let config = PlannerConfig::from_lookup(|key| match key {
        "PLANNER_UTC_OFFSET" => Some("+00:00".to_string()),
        _ => None,
    })
    .unwrap();
    let state = AppState::new(store.clone(), bus, &config);
    Harness {
        store,
        state,
        notifications,
    }
}

fn next(rx: &mut Receiver<Notification>) -> Notification {
    rx.try_recv().expect("a notification was published")
}

fn read_ch3() -> TaskDraft {
    let mut draft = TaskDraft::new();
    draft.title = "Read Ch.3".to_string();
    draft.subject = "Biology".to_string();
    draft.due_date = "2025-01-10T09:00:00Z".to_string();
    draft
}

#[tokio::test]
async fn created_task_shows_up_after_invalidation() {
    let mut h = harness();
    assert!(h.state.cache.get().await.unwrap().tasks.is_empty());

    let created = h.state.mutations.create(&read_ch3()).await.unwrap();

    let note = next(&mut h.notifications);
    assert_eq!(note.severity, Severity::Success);
    assert_eq!(note.message, "Task \"Read Ch.3\" created successfully!");
    assert!(h.state.cache.peek().unwrap().is_stale);

    let view = h.state.cache.get().await.unwrap();
    let task = view.find(&created.id).expect("created task is listed");
    assert_eq!(task.title, "Read Ch.3");
    assert_eq!(task.due_date, at(2025, 1, 10, 9, 0));
    assert!(!task.id.as_str().is_empty());
    assert_eq!(h.store.list_calls(), 2);
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_store() {
    let mut h = harness();
    h.state.cache.get().await.unwrap();
    let mut draft = read_ch3();
    draft.subject.clear();

    let err = h.state.mutations.create(&draft).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.store.mutation_calls(), 0);
    let note = next(&mut h.notifications);
    assert_eq!(note.severity, Severity::Error);
    assert!(note.message.starts_with("Error creating task:"));
    assert!(note.message.contains("subject"));
    assert!(!h.state.cache.peek().unwrap().is_stale);
}

#[tokio::test]
async fn failed_update_leaves_the_cache_untouched() {
    let mut h = harness();
    let task = h.store.inner.create(new_task("Read Ch.3", at(2025, 1, 10, 9, 0), &[]));
    let before = h.state.cache.get().await.unwrap();

    h.store
        .fail_mutations_with(Some(PlannerError::remote(404, "Task not found")));
    let mut draft = TaskDraft::from_server_task(&task, &h.state.codec);
    draft.title = "Read Ch.4".to_string();

    let err = h.state.mutations.save_draft(&draft, &task).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    let note = next(&mut h.notifications);
    assert_eq!(note.severity, Severity::Error);
    assert!(note.message.contains("Task not found"), "{}", note.message);

    let after = h.state.cache.peek().unwrap();
    assert!(!after.is_stale);
    assert!(Arc::ptr_eq(&before.tasks, &after.tasks));
    assert_eq!(h.store.list_calls(), 1);
}

#[tokio::test]
async fn saving_an_edit_applies_the_reminder_diff() {
    let mut h = harness();
    let task = h.store.inner.create(new_task(
        "Read Ch.3",
        at(2025, 1, 10, 9, 0),
        &[at(2025, 1, 9, 9, 0), at(2025, 1, 9, 12, 0)],
    ));
    let kept = task.reminders[0].id.clone();

    let mut draft = TaskDraft::from_server_task(&task, &h.state.codec);
    draft.set_reminder_time(0, "2025-01-09T10:00");
    draft.remove_reminder(1);
    draft.reminders.push(DraftReminder::pending("2025-01-10T07:30"));

    let saved = h.state.mutations.save_draft(&draft, &task).await.unwrap();

    assert_eq!(saved.reminders.len(), 2);
    assert_eq!(saved.reminders[0].id, kept);
    assert_eq!(saved.reminders[0].time, at(2025, 1, 9, 10, 0));
    assert_eq!(saved.reminders[1].time, at(2025, 1, 10, 7, 30));
    assert_eq!(
        next(&mut h.notifications).message,
        "Task \"Read Ch.3\" updated successfully!"
    );
}

#[tokio::test]
async fn stale_draft_is_rejected_locally() {
    let mut h = harness();
    let task = h.store.inner.create(new_task("Read Ch.3", at(2025, 1, 10, 9, 0), &[]));
    let mut draft = TaskDraft::from_server_task(&task, &h.state.codec);
    draft
        .reminders
        .push(DraftReminder::existing("gone", "2025-01-09T10:00"));

    let err = h.state.mutations.save_draft(&draft, &task).await.unwrap_err();

    assert!(matches!(err, PlannerError::Reference(_)));
    assert_eq!(h.store.mutation_calls(), 0);
    assert_eq!(next(&mut h.notifications).severity, Severity::Error);
}

#[tokio::test]
async fn complete_marks_the_task_done() {
    let mut h = harness();
    let task = h.store.inner.create(new_task("Essay", at(2025, 2, 1, 12, 0), &[]));

    let done = h.state.mutations.complete(&task.id).await.unwrap();

    assert!(done.is_completed);
    assert_eq!(done.title, "Essay");
    assert_eq!(
        next(&mut h.notifications).message,
        "Task \"Essay\" marked as complete! Great job!"
    );
}

#[tokio::test]
async fn acknowledge_publishes_a_neutral_notice() {
    let mut h = harness();
    let task = h
        .store
        .inner
        .create(new_task("Quiz", at(2025, 2, 1, 12, 0), &[at(2020, 1, 1, 8, 0)]));

    let snoozed = h.state.mutations.acknowledge(&task.id).await.unwrap();

    assert!(snoozed.reminders[0].time > at(2020, 1, 1, 8, 0));
    let note = next(&mut h.notifications);
    assert_eq!(note.severity, Severity::Neutral);
    assert_eq!(note.message, "Task \"Quiz\" snoozed! Reminder rescheduled.");
}

#[tokio::test]
async fn delete_removes_the_task_from_the_next_read() {
    let mut h = harness();
    let task = h.store.inner.create(new_task("Essay", at(2025, 2, 1, 12, 0), &[]));
    assert_eq!(h.state.cache.get().await.unwrap().tasks.len(), 1);

    h.state.mutations.delete(&task.id).await.unwrap();

    assert_eq!(next(&mut h.notifications).message, "Task deleted successfully!");
    assert!(h.state.cache.get().await.unwrap().tasks.is_empty());
}

#[tokio::test]
async fn unknown_task_surfaces_server_detail() {
    let mut h = harness();

    let err = h
        .state
        .mutations
        .delete(&TaskId::from("missing"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(
        next(&mut h.notifications).message,
        "Error deleting task: Task with ID missing not found."
    );
}

#[tokio::test]
async fn blank_task_id_is_a_validation_error() {
    let mut h = harness();

    let err = h
        .state
        .mutations
        .update(&TaskId::from(""), &UpdateTaskRequest::completion())
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.store.mutation_calls(), 0);
    assert_eq!(next(&mut h.notifications).severity, Severity::Error);
}

#[test]
fn codec_follows_configured_offset() {
    let config = PlannerConfig::from_lookup(|key| match key {
        "PLANNER_UTC_OFFSET" => Some("+09:00".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(
        config.codec().to_instant("2025-01-10T18:00").unwrap(),
        TemporalCodec::utc().to_instant("2025-01-10T09:00").unwrap()
    );
}

#[tokio::test]
async fn connected_state_round_trips_through_the_reference_server() {
    let backing = Arc::new(MemoryTaskStore::new());
    let app = router(ServerState {
        store: backing.clone(),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api_url = format!("http://{}", addr);
    let config = PlannerConfig::from_lookup(|key| match key {
        "PLANNER_API_URL" => Some(api_url.clone()),
        "PLANNER_REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
        "PLANNER_STALE_TIME_SECS" => Some("60".to_string()),
        "PLANNER_UTC_OFFSET" => Some("+00:00".to_string()),
        _ => None,
    })
    .unwrap();
    let state = AppState::connect(&config, Arc::new(TracingBus)).unwrap();

    assert!(state.cache.get().await.unwrap().tasks.is_empty());
    let created = state.mutations.create(&read_ch3()).await.unwrap();

    assert_eq!(backing.list().len(), 1);
    let view = state.cache.get().await.unwrap();
    assert!(!view.is_stale);
    assert_eq!(view.find(&created.id).unwrap().due_date, at(2025, 1, 10, 9, 0));

    let err = state
        .mutations
        .complete(&TaskId::from("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}
