mod medication_plan;
mod reminder;
mod shared;

pub use medication_plan::{IMedicationPlanRepo, InMemoryMedicationPlanRepo};
use medication_plan::PostgresMedicationPlanRepo;
pub use reminder::{IReminderRepo, InMemoryReminderRepo};
use reminder::PostgresReminderRepo;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

pub use shared::repo::DeleteResult;

#[derive(Clone)]
pub struct Repos {
    pub reminders: Arc<dyn IReminderRepo>,
    pub medication_plans: Arc<dyn IMedicationPlanRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        info!("DB RUNNING MIGRATIONS ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB RUNNING MIGRATIONS ... [done]");

        Ok(Self {
            reminders: Arc::new(PostgresReminderRepo::new(pool.clone())),
            medication_plans: Arc::new(PostgresMedicationPlanRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            reminders: Arc::new(InMemoryReminderRepo::new()),
            medication_plans: Arc::new(InMemoryMedicationPlanRepo::new()),
        }
    }
}
