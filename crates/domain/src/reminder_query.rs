use crate::reminder::{Reminder, ReminderStatus};
use serde::{Deserialize, Serialize};

/// Filters that are applied in memory after fetching the reminders of a
/// single parent or baby
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderFilters {
    pub status: Option<ReminderStatus>,
    /// Inclusive lower bound on `scheduled_for`
    pub start_ts: Option<i64>,
    /// Exclusive upper bound on `scheduled_for`
    pub end_ts: Option<i64>,
}

impl ReminderFilters {
    pub fn matches(&self, reminder: &Reminder) -> bool {
        self.status.map(|s| s == reminder.status).unwrap_or(true)
            && self
                .start_ts
                .map(|start| reminder.scheduled_for >= start)
                .unwrap_or(true)
            && self
                .end_ts
                .map(|end| reminder.scheduled_for < end)
                .unwrap_or(true)
    }

    /// Applies the filters and sorts the remaining reminders by schedule
    pub fn apply(&self, reminders: Vec<Reminder>) -> Vec<Reminder> {
        let mut reminders = reminders
            .into_iter()
            .filter(|r| self.matches(r))
            .collect::<Vec<_>>();
        sort_by_schedule(&mut reminders);
        reminders
    }
}

pub fn sort_by_schedule(reminders: &mut Vec<Reminder>) {
    reminders.sort_by(|r1, r2| {
        r1.scheduled_for
            .cmp(&r2.scheduled_for)
            .then_with(|| r1.medicine_name.cmp(&r2.medicine_name))
    });
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReminderSummary {
    pub total: usize,
    pub pending: usize,
    pub sent: usize,
    pub dismissed: usize,
    pub failed: usize,
}

impl ReminderSummary {
    pub fn from_reminders(reminders: &[Reminder]) -> Self {
        reminders
            .iter()
            .fold(Self::default(), |mut summary, reminder| {
                summary.total += 1;
                match reminder.status {
                    ReminderStatus::Pending => summary.pending += 1,
                    ReminderStatus::Sent => summary.sent += 1,
                    ReminderStatus::Dismissed => summary.dismissed += 1,
                    ReminderStatus::Failed => summary.failed += 1,
                }
                summary
            })
    }
}
