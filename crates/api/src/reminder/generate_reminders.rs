use crate::shared::usecase::UseCase;
use dosewatch_domain::{generate_reminders, Reminder, ReminderGenerationInput, ValidationError};
use dosewatch_infra::DosewatchContext;
use tracing::info;

/// Expands a dosing schedule into pending reminders for the generation
/// window and stores the ones that do not exist yet
#[derive(Debug)]
pub struct GenerateRemindersUseCase {
    pub input: ReminderGenerationInput,
    /// Length of the generation window in millis
    pub window_millis: i64,
}

#[derive(Debug, PartialEq)]
pub struct GeneratedReminders {
    /// Number of reminders that were actually inserted
    pub created: usize,
    /// Every reminder of the window, including those that already existed
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    Validation(ValidationError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GenerateRemindersUseCase {
    type Response = GeneratedReminders;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GenerateReminders";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let reminders = generate_reminders(&self.input, now, self.window_millis)
            .map_err(UseCaseErrors::Validation)?;

        let created = ctx
            .repos
            .reminders
            .insert_many(&reminders)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        if created > 0 {
            info!(
                "Generated {} reminders for medicine: {}",
                created, self.input.medicine.name
            );
        }

        Ok(GeneratedReminders { created, reminders })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup, NOW};
    use dosewatch_domain::{
        DoseTime, MedicineDescriptor, NotificationChannel, ReminderStatus, ID,
    };

    const HOUR: i64 = 1000 * 60 * 60;

    fn input(times: &[&str]) -> ReminderGenerationInput {
        ReminderGenerationInput {
            baby_id: Some(ID::new()),
            parent_id: Some(ID::new()),
            plan_id: None,
            medicine: MedicineDescriptor {
                name: "Amoxicillin".into(),
                dosage: "5ml".into(),
                frequency: "4 times a day".into(),
                dose_schedule: times
                    .iter()
                    .map(|t| t.parse::<DoseTime>().unwrap())
                    .collect(),
            },
            channels: vec![NotificationChannel::Push],
            timezone: chrono_tz::UTC,
        }
    }

    #[actix_web::test]
    async fn generates_one_reminder_per_dose_time() {
        let ctx = setup().ctx;
        // Generated at 09:00
        let mut usecase = GenerateRemindersUseCase {
            input: input(&["08:00", "14:00", "20:00", "02:00"]),
            window_millis: 24 * HOUR,
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.created, 4);
        assert_eq!(
            res.reminders
                .iter()
                .map(|r| (r.dose_time.to_string(), r.scheduled_for))
                .collect::<Vec<_>>(),
            vec![
                ("14:00".to_string(), NOW + 5 * HOUR),
                ("20:00".to_string(), NOW + 11 * HOUR),
                ("02:00".to_string(), NOW + 17 * HOUR),
                ("08:00".to_string(), NOW + 23 * HOUR),
            ]
        );
        assert!(res
            .reminders
            .iter()
            .all(|r| r.status == ReminderStatus::Pending && r.attempt_count == 0));
    }

    #[actix_web::test]
    async fn regenerating_does_not_duplicate() {
        let ctx = setup().ctx;
        let input = input(&["14:00", "20:00"]);
        let baby_id = input.baby_id.clone().unwrap();

        let mut usecase = GenerateRemindersUseCase {
            input,
            window_millis: 24 * HOUR,
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap().created, 2);
        assert_eq!(usecase.execute(&ctx).await.unwrap().created, 0);

        let stored = ctx
            .repos
            .reminders
            .find_by_baby_in_range(
                &baby_id,
                dosewatch_domain::TimeSpan {
                    start_ts: NOW,
                    end_ts: NOW + 24 * HOUR,
                },
                100,
            )
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[actix_web::test]
    async fn rejects_input_without_baby() {
        let ctx = setup().ctx;
        let mut input = input(&["14:00"]);
        input.baby_id = None;

        let mut usecase = GenerateRemindersUseCase {
            input,
            window_millis: 24 * HOUR,
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::Validation(ValidationError::MissingBabyId))
        );
    }
}
