mod inmemory;
mod postgres;

use crate::repos::shared::repo::DeleteResult;
use dosewatch_domain::{Reminder, ReminderFilters, ReminderStatusUpdate, TimeSpan, ID};
pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;

/// Every query filters on one indexed field (`baby_id`, `parent_id` or
/// `status`) and fetches at most `limit` rows. Date ranges and status
/// filters are applied in memory on the fetched rows.
#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    /// Inserts the reminders whose (`baby_id`, `medicine_name`, `scheduled_for`)
    /// is not already taken and returns how many were inserted
    async fn insert_many(&self, reminders: &[Reminder]) -> anyhow::Result<usize>;
    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>>;
    /// Pending reminders with `scheduled_for <= now` whose retry backoff has passed
    async fn find_pending_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<Reminder>>;
    async fn find_by_baby_in_range(
        &self,
        baby_id: &ID,
        span: TimeSpan,
        limit: usize,
    ) -> anyhow::Result<Vec<Reminder>>;
    async fn find_by_parent(
        &self,
        parent_id: &ID,
        filters: &ReminderFilters,
        limit: usize,
    ) -> anyhow::Result<Vec<Reminder>>;
    /// Conditional claim. Returns the claimed reminder, or `None` if someone
    /// else won the claim or the reminder is no longer due.
    async fn claim(
        &self,
        reminder_id: &ID,
        expected_version: i64,
        now: i64,
        lease_millis: i64,
    ) -> anyhow::Result<Option<Reminder>>;
    async fn release_claim(&self, reminder_id: &ID, now: i64) -> anyhow::Result<()>;
    /// Writes the result of a dispatch pass. Returns `None` when the reminder
    /// was changed in the meantime, e.g. dismissed by the user.
    async fn update_status(
        &self,
        update: &ReminderStatusUpdate,
    ) -> anyhow::Result<Option<Reminder>>;
    /// Returns `None` if the reminder does not exist. Dismissing a dismissed
    /// reminder returns it unchanged.
    async fn dismiss(&self, reminder_id: &ID, now: i64) -> anyhow::Result<Option<Reminder>>;
    /// Deletes reminders last updated before `cutoff`
    async fn delete_older_than(
        &self,
        cutoff: i64,
        terminal_only: bool,
    ) -> anyhow::Result<DeleteResult>;
}
