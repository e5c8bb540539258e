mod inmemory;
mod postgres;

use crate::repos::shared::repo::DeleteResult;
use dosewatch_domain::{MedicationPlan, ID};
pub use inmemory::InMemoryMedicationPlanRepo;
pub use postgres::PostgresMedicationPlanRepo;

#[async_trait::async_trait]
pub trait IMedicationPlanRepo: Send + Sync {
    /// Stores the plan. A plan of the same baby and medicine is replaced
    /// in place and keeps its id. Returns the stored plan.
    async fn save(&self, plan: &MedicationPlan) -> anyhow::Result<MedicationPlan>;
    async fn find(&self, plan_id: &ID) -> anyhow::Result<Option<MedicationPlan>>;
    /// Plans without `active_until` or with `active_until` after `now`
    async fn find_active(&self, now: i64) -> anyhow::Result<Vec<MedicationPlan>>;
    async fn delete(&self, plan_id: &ID) -> anyhow::Result<Option<MedicationPlan>>;
    /// Deletes plans that ended before `cutoff`
    async fn delete_expired(&self, cutoff: i64) -> anyhow::Result<DeleteResult>;
}

#[cfg(test)]
mod tests {
    use crate::repos::Repos;
    use dosewatch_domain::{MedicationPlan, MedicineDescriptor, NotificationChannel, ID};

    fn plan_factory(active_until: Option<i64>) -> MedicationPlan {
        MedicationPlan::new(
            ID::new(),
            ID::new(),
            MedicineDescriptor {
                name: "Vitamin D".into(),
                dosage: "1 drop".into(),
                frequency: "Once a day".into(),
                dose_schedule: vec!["09:00".parse().unwrap()],
            },
            vec![NotificationChannel::Push, NotificationChannel::Messaging],
            chrono_tz::Europe::Oslo,
            active_until,
            0,
        )
    }

    #[tokio::test]
    async fn create_find_and_delete() {
        let repos = Repos::create_inmemory();
        let plan = plan_factory(None);

        assert_eq!(repos.medication_plans.save(&plan).await.unwrap(), plan);
        let res = repos.medication_plans.find(&plan.id).await.unwrap();
        assert_eq!(res, Some(plan.clone()));

        let deleted = repos.medication_plans.delete(&plan.id).await.unwrap();
        assert_eq!(deleted, Some(plan.clone()));
        assert!(repos.medication_plans.find(&plan.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saving_the_same_medicine_replaces_the_plan() {
        let repos = Repos::create_inmemory();
        let plan = plan_factory(None);
        repos.medication_plans.save(&plan).await.unwrap();

        let mut confirmed_again = plan_factory(Some(1000));
        confirmed_again.baby_id = plan.baby_id.clone();
        confirmed_again.dosage = "2 drops".into();
        let stored = repos.medication_plans.save(&confirmed_again).await.unwrap();
        assert_eq!(stored.id, plan.id);
        assert_eq!(stored.dosage, "2 drops");
        assert_eq!(stored.active_until, Some(1000));
        assert!(repos
            .medication_plans
            .find(&confirmed_again.id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(repos.medication_plans.find_active(0).await.unwrap().len(), 1);

        // Another baby gets its own plan
        let other = plan_factory(None);
        let stored = repos.medication_plans.save(&other).await.unwrap();
        assert_eq!(stored.id, other.id);
        assert_eq!(repos.medication_plans.find_active(0).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn active_and_expired_plans() {
        let repos = Repos::create_inmemory();
        let open_ended = plan_factory(None);
        let running = plan_factory(Some(1000));
        let ended = plan_factory(Some(100));
        for plan in &[&open_ended, &running, &ended] {
            repos.medication_plans.save(plan).await.unwrap();
        }

        let active = repos.medication_plans.find_active(500).await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|p| p.id != ended.id));

        let res = repos.medication_plans.delete_expired(500).await.unwrap();
        assert_eq!(res.deleted_count, 1);
        assert!(repos.medication_plans.find(&ended.id).await.unwrap().is_none());
        assert!(repos.medication_plans.find(&running.id).await.unwrap().is_some());
    }
}
