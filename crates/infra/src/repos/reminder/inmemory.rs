use super::IReminderRepo;
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use dosewatch_domain::{
    sort_by_schedule, Reminder, ReminderFilters, ReminderStatusUpdate, TimeSpan, ID,
};

/// Keeps the `limit` latest scheduled reminders, same as the Postgres `ORDER BY scheduled_for DESC LIMIT`
fn newest_first(mut reminders: Vec<Reminder>, limit: usize) -> Vec<Reminder> {
    reminders.sort_by(|a, b| b.scheduled_for.cmp(&a.scheduled_for));
    reminders.truncate(limit);
    reminders
}

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryReminderRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert_many(&self, reminders: &[Reminder]) -> anyhow::Result<usize> {
        Ok(insert_unique_by(reminders, &self.reminders, |r| {
            r.dedupe_key()
        }))
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        Ok(find(reminder_id, &self.reminders))
    }

    async fn find_pending_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<Reminder>> {
        let mut reminders = find_by(&self.reminders, |r| r.is_due(now));
        sort_by_schedule(&mut reminders);
        reminders.truncate(limit);
        Ok(reminders)
    }

    async fn find_by_baby_in_range(
        &self,
        baby_id: &ID,
        span: TimeSpan,
        limit: usize,
    ) -> anyhow::Result<Vec<Reminder>> {
        let reminders = newest_first(find_by(&self.reminders, |r| r.baby_id == *baby_id), limit);
        let filters = ReminderFilters {
            status: None,
            start_ts: Some(span.start_ts),
            end_ts: Some(span.end_ts),
        };
        Ok(filters.apply(reminders))
    }

    async fn find_by_parent(
        &self,
        parent_id: &ID,
        filters: &ReminderFilters,
        limit: usize,
    ) -> anyhow::Result<Vec<Reminder>> {
        let reminders = newest_first(find_by(&self.reminders, |r| r.parent_id == *parent_id), limit);
        Ok(filters.apply(reminders))
    }

    async fn claim(
        &self,
        reminder_id: &ID,
        expected_version: i64,
        now: i64,
        lease_millis: i64,
    ) -> anyhow::Result<Option<Reminder>> {
        let res = update_one(reminder_id, &self.reminders, |r| {
            r.claim(expected_version, now, lease_millis)
                .map(|_| r.clone())
        });
        Ok(res.and_then(|claimed| claimed.ok()))
    }

    async fn release_claim(&self, reminder_id: &ID, now: i64) -> anyhow::Result<()> {
        update_one(reminder_id, &self.reminders, |r| r.release_claim(now));
        Ok(())
    }

    async fn update_status(
        &self,
        update: &ReminderStatusUpdate,
    ) -> anyhow::Result<Option<Reminder>> {
        let res = update_one(&update.reminder_id, &self.reminders, |r| {
            r.apply_status_update(update).map(|_| r.clone())
        });
        Ok(res.and_then(|updated| updated.ok()))
    }

    async fn dismiss(&self, reminder_id: &ID, now: i64) -> anyhow::Result<Option<Reminder>> {
        Ok(update_one(reminder_id, &self.reminders, |r| {
            r.dismiss(now);
            r.clone()
        }))
    }

    async fn delete_older_than(
        &self,
        cutoff: i64,
        terminal_only: bool,
    ) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.reminders, |r| {
            r.updated < cutoff && (!terminal_only || r.status.is_terminal())
        }))
    }
}
