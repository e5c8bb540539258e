use crate::reminder::generate_reminders::GenerateRemindersUseCase;
use crate::shared::usecase::{execute, UseCase};
use dosewatch_infra::DosewatchContext;
use tracing::info;

/// Rolls the generation window forward for every active `MedicationPlan`.
/// Reminders that already exist are left untouched.
#[derive(Debug)]
pub struct ExpandRemindersUseCase {}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExpansionReport {
    pub plans: usize,
    pub created: usize,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ExpandRemindersUseCase {
    type Response = ExpansionReport;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "ExpandReminders";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let plans = ctx
            .repos
            .medication_plans
            .find_active(now)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        let mut report = ExpansionReport {
            plans: plans.len(),
            created: 0,
        };
        for plan in plans {
            let usecase = GenerateRemindersUseCase {
                input: plan.generation_input(),
                window_millis: plan.generation_window(now, ctx.config.generation_window_millis),
            };
            // Errors are logged by execute and the next plan is still expanded
            if let Ok(generated) = execute(usecase, ctx).await {
                report.created += generated.created;
            }
        }

        if report.created > 0 {
            info!(
                "Expanded {} medication plans into {} new reminders",
                report.plans, report.created
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup, NOW};
    use dosewatch_domain::{DoseTime, MedicationPlan, MedicineDescriptor, NotificationChannel, ID};

    const HOUR: i64 = 1000 * 60 * 60;

    fn plan_factory(active_until: Option<i64>) -> MedicationPlan {
        MedicationPlan::new(
            ID::new(),
            ID::new(),
            MedicineDescriptor {
                name: "Amoxicillin".into(),
                dosage: "5ml".into(),
                frequency: "Twice a day".into(),
                dose_schedule: vec![DoseTime::new(8, 0).unwrap(), DoseTime::new(20, 0).unwrap()],
            },
            vec![NotificationChannel::Push],
            chrono_tz::UTC,
            active_until,
            NOW,
        )
    }

    #[actix_web::test]
    async fn rolls_the_window_of_active_plans_forward() {
        let test_ctx = setup();
        let ctx = test_ctx.ctx;
        let plan = plan_factory(None);
        let ended = plan_factory(Some(NOW - HOUR));
        ctx.repos.medication_plans.save(&plan).await.unwrap();
        ctx.repos.medication_plans.save(&ended).await.unwrap();

        let report = ExpandRemindersUseCase {}.execute(&ctx).await.unwrap();
        assert_eq!(report, ExpansionReport { plans: 1, created: 2 });

        // Nothing new within the same window
        let report = ExpandRemindersUseCase {}.execute(&ctx).await.unwrap();
        assert_eq!(report.created, 0);

        // 12 hours later the window reaches one more dose
        test_ctx.sys.advance(12 * HOUR);
        let report = ExpandRemindersUseCase {}.execute(&ctx).await.unwrap();
        assert_eq!(report.created, 1);
    }

    #[actix_web::test]
    async fn stops_generating_when_the_plan_ends() {
        let ctx = setup().ctx;
        // 09:00 now, ends 19:00, so the 20:00 dose is never generated
        let plan = plan_factory(Some(NOW + 10 * HOUR));
        ctx.repos.medication_plans.save(&plan).await.unwrap();

        let report = ExpandRemindersUseCase {}.execute(&ctx).await.unwrap();
        assert_eq!(report.created, 0);
    }
}
