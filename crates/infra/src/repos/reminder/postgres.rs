use super::IReminderRepo;
use crate::repos::shared::repo::DeleteResult;
use dosewatch_domain::{
    NotificationChannel, Reminder, ReminderFilters, ReminderStatusUpdate, TimeSpan, ID,
};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::warn;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    baby_uid: Uuid,
    parent_uid: Uuid,
    plan_uid: Option<Uuid>,
    medicine_name: String,
    dosage: String,
    frequency: String,
    dose_time: String,
    scheduled_for: i64,
    channels: Vec<String>,
    status: String,
    attempt_count: i64,
    last_attempt_at: Option<i64>,
    error_message: Option<String>,
    next_attempt_at: Option<i64>,
    claimed_at: Option<i64>,
    version: i64,
    created: i64,
    updated: i64,
}

impl TryFrom<ReminderRaw> for Reminder {
    type Error = anyhow::Error;

    fn try_from(raw: ReminderRaw) -> anyhow::Result<Self> {
        let channels = raw
            .channels
            .iter()
            .filter_map(|c| match c.parse::<NotificationChannel>() {
                Ok(channel) => Some(channel),
                Err(e) => {
                    warn!("Ignoring stored channel of reminder {}: {}", raw.reminder_uid, e);
                    None
                }
            })
            .collect();

        Ok(Reminder {
            id: raw.reminder_uid.into(),
            baby_id: raw.baby_uid.into(),
            parent_id: raw.parent_uid.into(),
            plan_id: raw.plan_uid.map(ID::from),
            medicine_name: raw.medicine_name,
            dosage: raw.dosage,
            frequency: raw.frequency,
            dose_time: raw.dose_time.parse()?,
            scheduled_for: raw.scheduled_for,
            channels,
            status: raw.status.parse()?,
            attempt_count: raw.attempt_count,
            last_attempt_at: raw.last_attempt_at,
            error_message: raw.error_message,
            next_attempt_at: raw.next_attempt_at,
            claimed_at: raw.claimed_at,
            version: raw.version,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn into_reminders(rows: Vec<ReminderRaw>) -> anyhow::Result<Vec<Reminder>> {
    rows.into_iter().map(Reminder::try_from).collect()
}

impl PostgresReminderRepo {
    async fn fetch_optional(
        &self,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, ReminderRaw, sqlx::postgres::PgArguments>,
    ) -> anyhow::Result<Option<Reminder>> {
        match query.fetch_optional(&self.pool).await? {
            Some(raw) => Ok(Some(Reminder::try_from(raw)?)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert_many(&self, reminders: &[Reminder]) -> anyhow::Result<usize> {
        let mut inserted = 0;
        for reminder in reminders {
            let channels = reminder
                .channels
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>();
            let res = sqlx::query(
                r#"
                INSERT INTO reminders
                (reminder_uid, baby_uid, parent_uid, plan_uid, medicine_name, dosage, frequency,
                 dose_time, scheduled_for, channels, status, attempt_count, last_attempt_at,
                 error_message, next_attempt_at, claimed_at, version, created, updated)
                VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
                ON CONFLICT (baby_uid, medicine_name, scheduled_for) DO NOTHING
                "#,
            )
            .bind(reminder.id.inner_ref())
            .bind(reminder.baby_id.inner_ref())
            .bind(reminder.parent_id.inner_ref())
            .bind(reminder.plan_id.as_ref().map(|id| *id.inner_ref()))
            .bind(&reminder.medicine_name)
            .bind(&reminder.dosage)
            .bind(&reminder.frequency)
            .bind(reminder.dose_time.to_string())
            .bind(reminder.scheduled_for)
            .bind(&channels)
            .bind(reminder.status.as_str())
            .bind(reminder.attempt_count)
            .bind(reminder.last_attempt_at)
            .bind(&reminder.error_message)
            .bind(reminder.next_attempt_at)
            .bind(reminder.claimed_at)
            .bind(reminder.version)
            .bind(reminder.created)
            .bind(reminder.updated)
            .execute(&self.pool)
            .await?;
            inserted += res.rows_affected() as usize;
        }
        Ok(inserted)
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        self.fetch_optional(
            sqlx::query_as::<_, ReminderRaw>(
                r#"
                SELECT * FROM reminders AS r
                WHERE r.reminder_uid = $1
                "#,
            )
            .bind(reminder_id.inner_ref()),
        )
        .await
    }

    async fn find_pending_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.status = 'pending'
                AND r.scheduled_for <= $1
                AND (r.next_attempt_at IS NULL OR r.next_attempt_at <= $1)
            ORDER BY r.scheduled_for
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        into_reminders(rows)
    }

    async fn find_by_baby_in_range(
        &self,
        baby_id: &ID,
        span: TimeSpan,
        limit: usize,
    ) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.baby_uid = $1
            ORDER BY r.scheduled_for DESC
            LIMIT $2
            "#,
        )
        .bind(baby_id.inner_ref())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let filters = ReminderFilters {
            status: None,
            start_ts: Some(span.start_ts),
            end_ts: Some(span.end_ts),
        };
        Ok(filters.apply(into_reminders(rows)?))
    }

    async fn find_by_parent(
        &self,
        parent_id: &ID,
        filters: &ReminderFilters,
        limit: usize,
    ) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.parent_uid = $1
            ORDER BY r.scheduled_for DESC
            LIMIT $2
            "#,
        )
        .bind(parent_id.inner_ref())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(filters.apply(into_reminders(rows)?))
    }

    async fn claim(
        &self,
        reminder_id: &ID,
        expected_version: i64,
        now: i64,
        lease_millis: i64,
    ) -> anyhow::Result<Option<Reminder>> {
        self.fetch_optional(
            sqlx::query_as::<_, ReminderRaw>(
                r#"
                UPDATE reminders AS r
                SET claimed_at = $3,
                    version = r.version + 1,
                    updated = $3
                WHERE r.reminder_uid = $1
                    AND r.version = $2
                    AND r.status = 'pending'
                    AND r.scheduled_for <= $3
                    AND (r.next_attempt_at IS NULL OR r.next_attempt_at <= $3)
                    AND (r.claimed_at IS NULL OR r.claimed_at + $4 <= $3)
                RETURNING *
                "#,
            )
            .bind(reminder_id.inner_ref())
            .bind(expected_version)
            .bind(now)
            .bind(lease_millis),
        )
        .await
    }

    async fn release_claim(&self, reminder_id: &ID, now: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminders AS r
            SET claimed_at = NULL,
                version = r.version + 1,
                updated = $2
            WHERE r.reminder_uid = $1
                AND r.status = 'pending'
                AND r.claimed_at IS NOT NULL
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_status(
        &self,
        update: &ReminderStatusUpdate,
    ) -> anyhow::Result<Option<Reminder>> {
        self.fetch_optional(
            sqlx::query_as::<_, ReminderRaw>(
                r#"
                UPDATE reminders AS r
                SET status = $3,
                    attempt_count = r.attempt_count + $4,
                    last_attempt_at = $5,
                    error_message = $6,
                    next_attempt_at = $7,
                    claimed_at = NULL,
                    version = r.version + 1,
                    updated = $5
                WHERE r.reminder_uid = $1
                    AND r.version = $2
                    AND r.status = 'pending'
                RETURNING *
                "#,
            )
            .bind(update.reminder_id.inner_ref())
            .bind(update.expected_version)
            .bind(update.status.as_str())
            .bind(update.attempt_delta)
            .bind(update.attempted_at)
            .bind(&update.error_message)
            .bind(update.next_attempt_at),
        )
        .await
    }

    async fn dismiss(&self, reminder_id: &ID, now: i64) -> anyhow::Result<Option<Reminder>> {
        let dismissed = self
            .fetch_optional(
                sqlx::query_as::<_, ReminderRaw>(
                    r#"
                    UPDATE reminders AS r
                    SET status = 'dismissed',
                        claimed_at = NULL,
                        next_attempt_at = NULL,
                        version = r.version + 1,
                        updated = $2
                    WHERE r.reminder_uid = $1
                        AND r.status <> 'dismissed'
                    RETURNING *
                    "#,
                )
                .bind(reminder_id.inner_ref())
                .bind(now),
            )
            .await?;

        match dismissed {
            Some(reminder) => Ok(Some(reminder)),
            // Either missing or already dismissed
            None => self.find(reminder_id).await,
        }
    }

    async fn delete_older_than(
        &self,
        cutoff: i64,
        terminal_only: bool,
    ) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM reminders AS r
            WHERE r.updated < $1
                AND (NOT $2 OR r.status <> 'pending')
            "#,
        )
        .bind(cutoff)
        .bind(terminal_only)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
