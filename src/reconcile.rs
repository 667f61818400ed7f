//! Diffing of a task's reminder collection between the last server state
//! and an edited working set.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::PlannerError;
use crate::models::{NewReminder, Reminder, ReminderId, ReminderKind, ReminderUpdate};

/// One entry of an edited reminder set, with its time already resolved to
/// an instant. `time: None` means the editor left the field empty.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderEdit {
    Pending {
        time: Option<DateTime<Utc>>,
        kind: ReminderKind,
    },
    Existing {
        id: ReminderId,
        time: Option<DateTime<Utc>>,
        kind: ReminderKind,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderPlan {
    pub to_create: Vec<NewReminder>,
    pub to_update: Vec<Reminder>,
    pub to_remove: Vec<ReminderId>,
}

impl ReminderPlan {
    /// Updates first, then creations without an id.
    pub fn reminder_updates(&self) -> Vec<ReminderUpdate> {
        let updates = self.to_update.iter().map(|r| ReminderUpdate {
            id: Some(r.id.clone()),
            time: Some(r.time),
            kind: Some(r.kind),
        });
        let creations = self.to_create.iter().map(|r| ReminderUpdate {
            id: None,
            time: Some(r.time),
            kind: Some(r.kind),
        });
        updates.chain(creations).collect()
    }
}

/// Partitions `edited` against `original` into create/update/remove sets.
///
/// Pending entries without a time are dropped. An existing entry whose time
/// was cleared is removed. An existing id that is not part of `original`
/// fails with [`PlannerError::Reference`] rather than being recreated.
pub fn reconcile(original: &[Reminder], edited: &[ReminderEdit]) -> Result<ReminderPlan, PlannerError> {
    let original_ids: HashSet<&ReminderId> = original.iter().map(|r| &r.id).collect();
    let mut seen: HashSet<&ReminderId> = HashSet::new();
    let mut plan = ReminderPlan::default();

    for edit in edited {
        match edit {
            ReminderEdit::Pending { time: Some(time), kind } => {
                plan.to_create.push(NewReminder {
                    time: *time,
                    kind: *kind,
                });
            }
            ReminderEdit::Pending { time: None, .. } => {}
            ReminderEdit::Existing { id, time, kind } => {
                if !original_ids.contains(id) {
                    return Err(PlannerError::Reference(id.clone()));
                }
                if !seen.insert(id) {
                    return Err(PlannerError::DuplicateReminder(id.clone()));
                }
                match time {
                    Some(time) => plan.to_update.push(Reminder {
                        id: id.clone(),
                        time: *time,
                        kind: *kind,
                    }),
                    None => debug!("reminder {} had its time cleared; removing it", id),
                }
            }
        }
    }

    let kept: HashSet<&ReminderId> = plan.to_update.iter().map(|r| &r.id).collect();
    let mut removed: HashSet<&ReminderId> = HashSet::new();
    for reminder in original {
        if !kept.contains(&reminder.id) && removed.insert(&reminder.id) {
            plan.to_remove.push(reminder.id.clone());
        }
    }

    debug!(
        "reconciled reminders: {} create, {} update, {} remove",
        plan.to_create.len(),
        plan.to_update.len(),
        plan.to_remove.len()
    );

    Ok(plan)
}
