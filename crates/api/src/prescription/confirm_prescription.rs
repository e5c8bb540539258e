use crate::error::DosewatchError;
use crate::reminder::generate_reminders::GenerateRemindersUseCase;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono_tz::Tz;
use dosewatch_api_structs::confirm_prescription::*;
use dosewatch_domain::{
    DoseTime, MedicationPlan, MedicineDescriptor, NotificationChannel, ReminderGenerationInput,
    ValidationError, ID,
};
use dosewatch_infra::DosewatchContext;
use tracing::{error, warn};

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

fn handle_error(e: UseCaseErrors) -> DosewatchError {
    match e {}
}

pub async fn confirm_prescription_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<DosewatchContext>,
) -> Result<HttpResponse, DosewatchError> {
    protect_route(&http_req, &ctx)?;

    let body = body.into_inner();
    let usecase = ConfirmPrescriptionUseCase {
        baby_id: body.baby_id,
        parent_id: body.parent_id,
        channels: body.channels,
        timezone: body.timezone,
        medicines: body.medicines,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse::new(
                res.plans,
                res.reminders_created,
                res.warnings,
            ))
        })
        .map_err(handle_error)
}

/// Persists one `MedicationPlan` per medicine of a confirmed prescription
/// and generates the first window of reminders for each of them. Confirming
/// a medicine the baby already has a plan for updates that plan.
///
/// Confirming never fails: a medicine that can not be scheduled only adds
/// a warning to the response.
#[derive(Debug)]
pub struct ConfirmPrescriptionUseCase {
    pub baby_id: Option<ID>,
    pub parent_id: Option<ID>,
    pub channels: Option<Vec<NotificationChannel>>,
    pub timezone: Option<String>,
    pub medicines: Vec<MedicineBody>,
}

#[derive(Debug, Default)]
pub struct ConfirmedPrescription {
    pub plans: Vec<MedicationPlan>,
    pub reminders_created: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {}

impl ConfirmPrescriptionUseCase {
    fn timezone(&self, ctx: &DosewatchContext, warnings: &mut Vec<String>) -> Tz {
        match &self.timezone {
            Some(timezone) => match timezone.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warnings.push(format!(
                        "Invalid timezone: {}, using {} instead",
                        timezone, ctx.config.default_timezone
                    ));
                    ctx.config.default_timezone
                }
            },
            None => ctx.config.default_timezone,
        }
    }

    fn medicine_descriptor(medicine: &MedicineBody) -> Result<MedicineDescriptor, ValidationError> {
        let dose_schedule = medicine
            .dose_schedule
            .iter()
            .map(|time| time.parse::<DoseTime>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MedicineDescriptor {
            name: medicine.medicine_name.trim().to_string(),
            dosage: medicine.dosage.clone(),
            frequency: medicine.frequency.clone(),
            dose_schedule,
        })
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ConfirmPrescriptionUseCase {
    type Response = ConfirmedPrescription;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "ConfirmPrescription";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let mut res = ConfirmedPrescription::default();
        let timezone = self.timezone(ctx, &mut res.warnings);
        let channels = self.channels.clone().unwrap_or_else(NotificationChannel::all);

        for medicine in &self.medicines {
            let name = medicine.medicine_name.trim();
            let descriptor = match Self::medicine_descriptor(medicine) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    warn!("Skipping medicine: {}. Error: {:?}", name, e);
                    res.warnings.push(format!("{}: {}", name, e));
                    continue;
                }
            };

            let input = ReminderGenerationInput {
                baby_id: self.baby_id.clone(),
                parent_id: self.parent_id.clone(),
                plan_id: None,
                medicine: descriptor,
                channels: channels.clone(),
                timezone,
            };
            let (baby_id, parent_id) = match input.validate() {
                Ok((baby_id, parent_id)) => (baby_id.clone(), parent_id.clone()),
                Err(e) => {
                    warn!("Skipping medicine: {}. Error: {:?}", name, e);
                    res.warnings.push(format!("{}: {}", name, e));
                    continue;
                }
            };

            let active_until = medicine
                .duration_days
                .filter(|days| *days > 0)
                .map(|days| now + days * MILLIS_PER_DAY);
            let plan = MedicationPlan::new(
                baby_id,
                parent_id,
                input.medicine,
                input.channels,
                timezone,
                active_until,
                now,
            );
            let plan = match ctx.repos.medication_plans.save(&plan).await {
                Ok(stored) => stored,
                Err(e) => {
                    error!("Unable to store medication plan: {:?}. Error: {:?}", plan, e);
                    res.warnings
                        .push(format!("{}: Unable to store the medication plan", name));
                    continue;
                }
            };

            let generate = GenerateRemindersUseCase {
                input: plan.generation_input(),
                window_millis: plan.generation_window(now, ctx.config.generation_window_millis),
            };
            match execute(generate, ctx).await {
                Ok(generated) => res.reminders_created += generated.created,
                Err(_) => res
                    .warnings
                    .push(format!("{}: Unable to generate reminders", name)),
            }
            res.plans.push(plan);
        }

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup, NOW};
    use dosewatch_domain::{ReminderStatus, TimeSpan};

    const HOUR: i64 = 1000 * 60 * 60;

    fn medicine(name: &str, times: &[&str]) -> MedicineBody {
        MedicineBody {
            medicine_name: name.into(),
            dosage: "5ml".into(),
            frequency: "4 times a day".into(),
            dose_schedule: times.iter().map(|t| t.to_string()).collect(),
            duration_days: Some(7),
        }
    }

    fn usecase(medicines: Vec<MedicineBody>) -> ConfirmPrescriptionUseCase {
        ConfirmPrescriptionUseCase {
            baby_id: Some(ID::new()),
            parent_id: Some(ID::new()),
            channels: None,
            timezone: None,
            medicines,
        }
    }

    #[actix_web::test]
    async fn confirms_prescription_and_generates_reminders() {
        let ctx = setup().ctx;
        let mut usecase = usecase(vec![
            medicine("Amoxicillin", &["08:00", "14:00", "20:00", "02:00"]),
            medicine("Vitamin D", &["12:00"]),
        ]);
        let baby_id = usecase.baby_id.clone().unwrap();

        let res = usecase.execute(&ctx).await.unwrap();
        assert!(res.warnings.is_empty());
        assert_eq!(res.plans.len(), 2);
        assert_eq!(res.reminders_created, 5);
        assert_eq!(res.plans[0].active_until, Some(NOW + 7 * 24 * HOUR));
        assert_eq!(res.plans[0].channels, NotificationChannel::all());

        let plan = ctx
            .repos
            .medication_plans
            .find(&res.plans[0].id)
            .await
            .unwrap();
        assert!(plan.is_some());

        let reminders = ctx
            .repos
            .reminders
            .find_by_baby_in_range(
                &baby_id,
                TimeSpan {
                    start_ts: NOW,
                    end_ts: NOW + 24 * HOUR,
                },
                100,
            )
            .await
            .unwrap();
        assert_eq!(reminders.len(), 5);
        assert!(reminders
            .iter()
            .all(|r| r.status == ReminderStatus::Pending && r.plan_id.is_some()));
    }

    #[actix_web::test]
    async fn confirming_again_updates_the_existing_plan() {
        let ctx = setup().ctx;
        let mut first = usecase(vec![medicine("Amoxicillin", &["08:00", "20:00"])]);
        let res = first.execute(&ctx).await.unwrap();
        assert_eq!(res.reminders_created, 2);
        let plan_id = res.plans[0].id.clone();

        let mut again = ConfirmPrescriptionUseCase {
            baby_id: first.baby_id.clone(),
            parent_id: first.parent_id.clone(),
            channels: Some(vec![NotificationChannel::Push]),
            timezone: None,
            medicines: vec![medicine("Amoxicillin", &["08:00", "20:00"])],
        };
        let res = again.execute(&ctx).await.unwrap();
        assert!(res.warnings.is_empty());
        assert_eq!(res.reminders_created, 0);
        assert_eq!(res.plans[0].id, plan_id);
        assert_eq!(res.plans[0].channels, vec![NotificationChannel::Push]);

        let plans = ctx.repos.medication_plans.find_active(NOW).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].id, plan_id);
    }

    #[actix_web::test]
    async fn invalid_medicines_become_warnings() {
        let ctx = setup().ctx;
        let mut usecase = usecase(vec![
            medicine("Amoxicillin", &["08:00", "8 pm"]),
            medicine("Vitamin D", &[]),
            medicine("Ibuprofen", &["14:00"]),
        ]);
        usecase.timezone = Some("Atlantis/Capital".into());

        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.plans.len(), 1);
        assert_eq!(res.plans[0].medicine_name, "Ibuprofen");
        assert_eq!(res.reminders_created, 1);
        assert_eq!(
            res.warnings,
            vec![
                "Invalid timezone: Atlantis/Capital, using UTC instead".to_string(),
                "Amoxicillin: Invalid dose time: `8 pm`, expected the format HH:MM".to_string(),
                "Vitamin D: The dose schedule must contain at least one dose time".to_string(),
            ]
        );
    }

    #[actix_web::test]
    async fn missing_baby_does_not_fail_the_confirmation() {
        let ctx = setup().ctx;
        let mut usecase = usecase(vec![medicine("Amoxicillin", &["14:00"])]);
        usecase.baby_id = None;

        let res = usecase.execute(&ctx).await.unwrap();
        assert!(res.plans.is_empty());
        assert_eq!(res.reminders_created, 0);
        assert_eq!(
            res.warnings,
            vec!["Amoxicillin: A baby id is required to generate reminders".to_string()]
        );
    }
}
