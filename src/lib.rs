//! Client-side engine of a task and reminder planner: edits are made on a
//! local draft, diffed against the last server state and pushed to a remote
//! task store, with a shared cache of the task list kept consistent after
//! every mutation.

pub mod api;
pub mod codec;
pub mod config;
pub mod draft;
pub mod error;
pub mod models;
pub mod notify;
pub mod reconcile;
pub mod services;
pub mod state;
pub mod store;

pub use codec::TemporalCodec;
pub use draft::{DraftReminder, TaskDraft};
pub use error::PlannerError;
pub use reconcile::{ReminderEdit, ReminderPlan, reconcile};
