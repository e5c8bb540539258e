use super::IMedicationPlanRepo;
use crate::repos::shared::repo::DeleteResult;
use dosewatch_domain::{DoseTime, MedicationPlan, NotificationChannel, Tz, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;

pub struct PostgresMedicationPlanRepo {
    pool: PgPool,
}

impl PostgresMedicationPlanRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MedicationPlanRaw {
    plan_uid: Uuid,
    baby_uid: Uuid,
    parent_uid: Uuid,
    medicine_name: String,
    dosage: String,
    frequency: String,
    dose_schedule: Vec<String>,
    channels: Vec<String>,
    timezone: String,
    active_until: Option<i64>,
    created: i64,
    updated: i64,
}

impl TryFrom<MedicationPlanRaw> for MedicationPlan {
    type Error = anyhow::Error;

    fn try_from(raw: MedicationPlanRaw) -> anyhow::Result<Self> {
        let dose_schedule = raw
            .dose_schedule
            .iter()
            .map(|t| t.parse::<DoseTime>())
            .collect::<Result<Vec<_>, _>>()?;
        let channels = raw
            .channels
            .iter()
            .map(|c| c.parse::<NotificationChannel>())
            .collect::<Result<Vec<_>, _>>()?;
        let timezone = raw
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::Error::msg(format!("Invalid stored timezone: {}", e)))?;

        Ok(MedicationPlan {
            id: raw.plan_uid.into(),
            baby_id: raw.baby_uid.into(),
            parent_id: raw.parent_uid.into(),
            medicine_name: raw.medicine_name,
            dosage: raw.dosage,
            frequency: raw.frequency,
            dose_schedule,
            channels,
            timezone,
            active_until: raw.active_until,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

#[async_trait::async_trait]
impl IMedicationPlanRepo for PostgresMedicationPlanRepo {
    async fn save(&self, plan: &MedicationPlan) -> anyhow::Result<MedicationPlan> {
        let dose_schedule = plan
            .dose_schedule
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();
        let channels = plan
            .channels
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>();
        let raw = sqlx::query_as::<_, MedicationPlanRaw>(
            r#"
            INSERT INTO medication_plans
            (plan_uid, baby_uid, parent_uid, medicine_name, dosage, frequency, dose_schedule,
             channels, timezone, active_until, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (baby_uid, medicine_name) DO UPDATE SET
                parent_uid = EXCLUDED.parent_uid,
                dosage = EXCLUDED.dosage,
                frequency = EXCLUDED.frequency,
                dose_schedule = EXCLUDED.dose_schedule,
                channels = EXCLUDED.channels,
                timezone = EXCLUDED.timezone,
                active_until = EXCLUDED.active_until,
                updated = EXCLUDED.updated
            RETURNING *
            "#,
        )
        .bind(plan.id.inner_ref())
        .bind(plan.baby_id.inner_ref())
        .bind(plan.parent_id.inner_ref())
        .bind(&plan.medicine_name)
        .bind(&plan.dosage)
        .bind(&plan.frequency)
        .bind(&dose_schedule)
        .bind(&channels)
        .bind(plan.timezone.name())
        .bind(plan.active_until)
        .bind(plan.created)
        .bind(plan.updated)
        .fetch_one(&self.pool)
        .await?;

        MedicationPlan::try_from(raw)
    }

    async fn find(&self, plan_id: &ID) -> anyhow::Result<Option<MedicationPlan>> {
        let raw = sqlx::query_as::<_, MedicationPlanRaw>(
            r#"
            SELECT * FROM medication_plans AS p
            WHERE p.plan_uid = $1
            "#,
        )
        .bind(plan_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(MedicationPlan::try_from).transpose()
    }

    async fn find_active(&self, now: i64) -> anyhow::Result<Vec<MedicationPlan>> {
        sqlx::query_as::<_, MedicationPlanRaw>(
            r#"
            SELECT * FROM medication_plans AS p
            WHERE p.active_until IS NULL OR p.active_until > $1
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(MedicationPlan::try_from)
        .collect()
    }

    async fn delete(&self, plan_id: &ID) -> anyhow::Result<Option<MedicationPlan>> {
        let raw = sqlx::query_as::<_, MedicationPlanRaw>(
            r#"
            DELETE FROM medication_plans AS p
            WHERE p.plan_uid = $1
            RETURNING *
            "#,
        )
        .bind(plan_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(MedicationPlan::try_from).transpose()
    }

    async fn delete_expired(&self, cutoff: i64) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM medication_plans AS p
            WHERE p.active_until < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
