use super::IMedicationPlanRepo;
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use dosewatch_domain::{MedicationPlan, ID};

pub struct InMemoryMedicationPlanRepo {
    plans: std::sync::Mutex<Vec<MedicationPlan>>,
}

impl InMemoryMedicationPlanRepo {
    pub fn new() -> Self {
        Self {
            plans: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryMedicationPlanRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IMedicationPlanRepo for InMemoryMedicationPlanRepo {
    async fn save(&self, plan: &MedicationPlan) -> anyhow::Result<MedicationPlan> {
        Ok(upsert_by(
            plan,
            &self.plans,
            |p| (p.baby_id.clone(), p.medicine_name.clone()),
            |stored, confirmed| stored.reconfirm(confirmed),
        ))
    }

    async fn find(&self, plan_id: &ID) -> anyhow::Result<Option<MedicationPlan>> {
        Ok(find(plan_id, &self.plans))
    }

    async fn find_active(&self, now: i64) -> anyhow::Result<Vec<MedicationPlan>> {
        Ok(find_by(&self.plans, |plan| plan.is_active(now)))
    }

    async fn delete(&self, plan_id: &ID) -> anyhow::Result<Option<MedicationPlan>> {
        Ok(delete(plan_id, &self.plans))
    }

    async fn delete_expired(&self, cutoff: i64) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.plans, |plan| {
            plan.active_until.map(|until| until < cutoff).unwrap_or(false)
        }))
    }
}
