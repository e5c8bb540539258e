use crate::dose::{DoseTime, MedicineDescriptor, ReminderGenerationInput};
use crate::reminder::NotificationChannel;
use crate::shared::entity::{Entity, ID};
use chrono_tz::Tz;

/// A `MedicationPlan` is the confirmed dosing schedule of one medicine for
/// one baby. `Reminder`s are generated from it for a rolling window until
/// `active_until` has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationPlan {
    pub id: ID,
    pub baby_id: ID,
    pub parent_id: ID,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub dose_schedule: Vec<DoseTime>,
    pub channels: Vec<NotificationChannel>,
    pub timezone: Tz,
    /// Plans without an end stay active until they are deleted
    pub active_until: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

impl MedicationPlan {
    pub fn new(
        baby_id: ID,
        parent_id: ID,
        medicine: MedicineDescriptor,
        channels: Vec<NotificationChannel>,
        timezone: Tz,
        active_until: Option<i64>,
        now: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            baby_id,
            parent_id,
            medicine_name: medicine.name,
            dosage: medicine.dosage,
            frequency: medicine.frequency,
            dose_schedule: medicine.dose_schedule,
            channels,
            timezone,
            active_until,
            created: now,
            updated: now,
        }
    }

    /// Takes over the schedule of a confirmation of the same medicine. The
    /// id is kept so that generated reminders still point to this plan.
    pub fn reconfirm(&mut self, confirmed: &MedicationPlan) {
        self.parent_id = confirmed.parent_id.clone();
        self.dosage = confirmed.dosage.clone();
        self.frequency = confirmed.frequency.clone();
        self.dose_schedule = confirmed.dose_schedule.clone();
        self.channels = confirmed.channels.clone();
        self.timezone = confirmed.timezone;
        self.active_until = confirmed.active_until;
        self.updated = confirmed.updated;
    }

    pub fn is_active(&self, now: i64) -> bool {
        self.active_until.map(|until| until > now).unwrap_or(true)
    }

    pub fn medicine(&self) -> MedicineDescriptor {
        MedicineDescriptor {
            name: self.medicine_name.clone(),
            dosage: self.dosage.clone(),
            frequency: self.frequency.clone(),
            dose_schedule: self.dose_schedule.clone(),
        }
    }

    pub fn generation_input(&self) -> ReminderGenerationInput {
        ReminderGenerationInput {
            baby_id: Some(self.baby_id.clone()),
            parent_id: Some(self.parent_id.clone()),
            plan_id: Some(self.id.clone()),
            medicine: self.medicine(),
            channels: self.channels.clone(),
            timezone: self.timezone,
        }
    }

    /// The generation window, cut at `active_until` so that no reminders
    /// are created after the treatment has ended
    pub fn generation_window(&self, now: i64, window_millis: i64) -> i64 {
        match self.active_until {
            Some(until) => (until - now).max(0).min(window_millis),
            None => window_millis,
        }
    }
}

impl Entity for MedicationPlan {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dose::generate_reminders;

    fn plan(active_until: Option<i64>) -> MedicationPlan {
        MedicationPlan::new(
            ID::new(),
            ID::new(),
            MedicineDescriptor {
                name: "Paracetamol".into(),
                dosage: "2.5ml".into(),
                frequency: "Every 6 hours".into(),
                dose_schedule: vec!["06:00".parse().unwrap(), "18:00".parse().unwrap()],
            },
            vec![NotificationChannel::Push],
            chrono_tz::UTC,
            active_until,
            0,
        )
    }

    #[test]
    fn plan_activity() {
        assert!(plan(None).is_active(i64::MAX));
        assert!(plan(Some(100)).is_active(99));
        assert!(!plan(Some(100)).is_active(100));
    }

    #[test]
    fn generated_reminders_reference_the_plan() {
        let plan = plan(None);
        let reminders = generate_reminders(&plan.generation_input(), 0, 1000 * 60 * 60 * 24)
            .expect("To generate reminders");
        assert_eq!(reminders.len(), 2);
        for r in reminders {
            assert_eq!(r.plan_id.as_ref(), Some(&plan.id));
            assert_eq!(r.baby_id, plan.baby_id);
            assert_eq!(r.parent_id, plan.parent_id);
        }
    }

    #[test]
    fn reconfirm_keeps_the_identity_of_the_plan() {
        let mut stored = plan(None);
        let mut confirmed = plan(Some(5000));
        confirmed.baby_id = stored.baby_id.clone();
        confirmed.dosage = "5ml".into();
        confirmed.created = 1000;
        confirmed.updated = 1000;

        let id = stored.id.clone();
        stored.reconfirm(&confirmed);
        assert_eq!(stored.id, id);
        assert_eq!(stored.created, 0);
        assert_eq!(stored.updated, 1000);
        assert_eq!(stored.dosage, "5ml");
        assert_eq!(stored.active_until, Some(5000));
        assert_eq!(stored.parent_id, confirmed.parent_id);
    }

    #[test]
    fn generation_window_stops_at_end_of_plan() {
        let day = 1000 * 60 * 60 * 24;
        assert_eq!(plan(None).generation_window(0, day), day);
        assert_eq!(plan(Some(100)).generation_window(0, day), 100);
        assert_eq!(plan(Some(100)).generation_window(200, day), 0);
    }
}
