use crate::shared::usecase::UseCase;
use dosewatch_domain::{Reminder, ReminderStatus, ReminderStatusUpdate};
use dosewatch_infra::{DosewatchContext, NotificationDispatcher};
use futures::{stream, StreamExt};
use std::time::Duration;
use tracing::{error, info, warn};

/// Number of times the outcome of a dispatch is written before giving up
const STATUS_WRITE_ATTEMPTS: u32 = 3;
const STATUS_WRITE_BACKOFF_MILLIS: u64 = 100;

/// One processing pass: every due reminder is claimed, dispatched through
/// its channels and gets the outcome written back
#[derive(Debug)]
pub struct ProcessDueRemindersUseCase {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Number of due reminders found
    pub batch_size: usize,
    pub sent: usize,
    pub failed: usize,
    /// Still pending and waiting for a new attempt
    pub retry_scheduled: usize,
    /// Claimed by someone else, dismissed meanwhile or hit a storage error
    pub skipped: usize,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    StorageError,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ReminderResult {
    Sent,
    Failed,
    RetryScheduled,
    Skipped,
}

impl DispatchReport {
    fn record(&mut self, result: ReminderResult) {
        match result {
            ReminderResult::Sent => self.sent += 1,
            ReminderResult::Failed => self.failed += 1,
            ReminderResult::RetryScheduled => self.retry_scheduled += 1,
            ReminderResult::Skipped => self.skipped += 1,
        }
    }
}

async fn write_status(
    update: &ReminderStatusUpdate,
    ctx: &DosewatchContext,
) -> anyhow::Result<Option<Reminder>> {
    let mut attempt = 1;
    loop {
        match ctx.repos.reminders.update_status(update).await {
            Ok(res) => return Ok(res),
            Err(e) if attempt < STATUS_WRITE_ATTEMPTS => {
                warn!(
                    "Unable to write status of reminder: {} (attempt {}). Error: {:?}",
                    update.reminder_id, attempt, e
                );
                let backoff = STATUS_WRITE_BACKOFF_MILLIS * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn release(reminder: &Reminder, ctx: &DosewatchContext) {
    let now = ctx.sys.get_timestamp_millis();
    if let Err(e) = ctx.repos.reminders.release_claim(&reminder.id, now).await {
        // The claim lease will run out
        error!(
            "Unable to release claim on reminder: {}. Error: {:?}",
            reminder.id, e
        );
    }
}

async fn process_reminder(
    reminder: Reminder,
    ctx: &DosewatchContext,
    dispatcher: &NotificationDispatcher,
) -> ReminderResult {
    let now = ctx.sys.get_timestamp_millis();
    let claimed = match ctx
        .repos
        .reminders
        .claim(&reminder.id, reminder.version, now, ctx.config.claim_lease_millis)
        .await
    {
        Ok(Some(claimed)) => claimed,
        Ok(None) => return ReminderResult::Skipped,
        Err(e) => {
            error!("Unable to claim reminder: {}. Error: {:?}", reminder.id, e);
            return ReminderResult::Skipped;
        }
    };

    let outcome = match dispatcher.dispatch(&claimed).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(
                "Unable to dispatch reminder: {}, it will be retried on a later tick. Error: {:?}",
                claimed.id, e
            );
            release(&claimed, ctx).await;
            return ReminderResult::Skipped;
        }
    };

    let update = ReminderStatusUpdate::from_outcome(
        &claimed,
        &outcome,
        &ctx.config.retry_policy,
        ctx.sys.get_timestamp_millis(),
    );
    match write_status(&update, ctx).await {
        Ok(Some(updated)) => match updated.status {
            ReminderStatus::Sent => ReminderResult::Sent,
            ReminderStatus::Failed => {
                warn!(
                    "Reminder: {} failed. Reason: {}",
                    updated.id,
                    updated.error_message.as_deref().unwrap_or_default()
                );
                ReminderResult::Failed
            }
            ReminderStatus::Pending => ReminderResult::RetryScheduled,
            ReminderStatus::Dismissed => ReminderResult::Skipped,
        },
        Ok(None) => {
            info!(
                "Discarding dispatch result of reminder: {} as it was changed meanwhile",
                claimed.id
            );
            ReminderResult::Skipped
        }
        Err(e) => {
            error!(
                "Giving up writing status of reminder: {}. Error: {:?}",
                claimed.id, e
            );
            release(&claimed, ctx).await;
            ReminderResult::Skipped
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ProcessDueRemindersUseCase {
    type Response = DispatchReport;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "ProcessDueReminders";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let due = ctx
            .repos
            .reminders
            .find_pending_due(now, ctx.config.query_limit)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        let mut report = DispatchReport {
            batch_size: due.len(),
            ..Default::default()
        };
        if due.is_empty() {
            return Ok(report);
        }

        let dispatcher = ctx.dispatcher();
        let results = stream::iter(due)
            .map(|reminder| process_reminder(reminder, ctx, &dispatcher))
            .buffer_unordered(ctx.config.dispatch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;
        for result in results {
            report.record(result);
        }

        info!(
            "Processed {} due reminders. Sent: {}, failed: {}, retry scheduled: {}, skipped: {}",
            report.batch_size, report.sent, report.failed, report.retry_scheduled, report.skipped
        );
        Ok(report)
    }
}
