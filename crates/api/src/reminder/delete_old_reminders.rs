use crate::shared::usecase::UseCase;
use dosewatch_infra::DosewatchContext;
use tracing::info;

/// Deletes sent, failed and dismissed reminders that have not been updated
/// within the retention window, together with plans that ended before it.
/// Pending reminders are kept regardless of age.
#[derive(Debug)]
pub struct DeleteOldRemindersUseCase {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanupReport {
    pub reminders_deleted: i64,
    pub plans_deleted: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteOldRemindersUseCase {
    type Response = CleanupReport;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "DeleteOldReminders";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        let cutoff = ctx.sys.get_timestamp_millis() - ctx.config.retention_millis;

        let reminders = ctx
            .repos
            .reminders
            .delete_older_than(cutoff, true)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        let plans = ctx
            .repos
            .medication_plans
            .delete_expired(cutoff)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        info!(
            "Cleanup deleted {} reminders and {} medication plans",
            reminders.deleted_count, plans.deleted_count
        );

        Ok(CleanupReport {
            reminders_deleted: reminders.deleted_count,
            plans_deleted: plans.deleted_count,
        })
    }
}
