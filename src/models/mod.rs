pub mod reminder;
pub mod task;

pub use reminder::{NewReminder, Reminder, ReminderId, ReminderKind, ReminderUpdate};
pub use task::{NewTaskRequest, Task, TaskId, TaskType, UpdateTaskRequest, display_order};
