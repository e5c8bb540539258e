use crate::reminder::{NotificationChannel, Reminder};
use crate::shared::entity::ID;
use chrono::prelude::*;
use chrono_tz::Tz;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("A baby id is required to generate reminders")]
    MissingBabyId,
    #[error("A parent id is required to generate reminders")]
    MissingParentId,
    #[error("The medicine name can not be empty")]
    MissingMedicineName,
    #[error("The dose schedule must contain at least one dose time")]
    EmptyDoseSchedule,
    #[error("At least one notification channel is required")]
    EmptyChannels,
    #[error("Invalid dose time: `{0}`, expected the format HH:MM")]
    InvalidDoseTime(String),
}

/// A time of day at which a dose should be given, e.g. `08:00`.
/// It is interpreted in the timezone of the `MedicationPlan` it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoseTime {
    hour: u32,
    minute: u32,
}

impl DoseTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    fn naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

impl Display for DoseTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for DoseTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidDoseTime(s.to_string());
        let mut parts = s.trim().splitn(2, ':');
        let hour = parts
            .next()
            .filter(|h| !h.is_empty() && h.len() <= 2)
            .and_then(|h| h.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let minute = parts
            .next()
            .filter(|m| m.len() == 2)
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or_else(invalid)?;

        DoseTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for DoseTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DoseTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DoseTimeVisitor;

        impl<'de> Visitor<'de> for DoseTimeVisitor {
            type Value = DoseTime;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A time of day in the format HH:MM")
            }

            fn visit_str<E>(self, value: &str) -> Result<DoseTime, E>
            where
                E: serde::de::Error,
            {
                value.parse::<DoseTime>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DoseTimeVisitor)
    }
}

/// The medicine part of a confirmed prescription
#[derive(Debug, Clone, PartialEq)]
pub struct MedicineDescriptor {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub dose_schedule: Vec<DoseTime>,
}

/// Everything needed to expand a dosing schedule into `Reminder`s
#[derive(Debug, Clone)]
pub struct ReminderGenerationInput {
    pub baby_id: Option<ID>,
    pub parent_id: Option<ID>,
    /// The `MedicationPlan` the reminders belongs to, if any
    pub plan_id: Option<ID>,
    pub medicine: MedicineDescriptor,
    pub channels: Vec<NotificationChannel>,
    pub timezone: Tz,
}

/// Finds every occurrence of the given dose times inside the half open
/// window `[now, now + window_millis)` in the given timezone.
///
/// A dose time that already passed today rolls over to tomorrow. Local times
/// skipped by a DST transition produce no occurrence for that day, and
/// ambiguous local times resolve to the earliest instant.
pub fn dose_occurrences(
    dose_schedule: &[DoseTime],
    tz: &Tz,
    now: i64,
    window_millis: i64,
) -> Vec<(DoseTime, i64)> {
    let now_local = match tz.timestamp_millis_opt(now).single() {
        Some(dt) => dt,
        None => return Vec::new(),
    };
    let window_end = now + window_millis.max(0);

    let mut dose_times = dose_schedule.to_vec();
    dose_times.sort();
    dose_times.dedup();

    // One extra day covers occurrences shifted by timezone offsets
    let days_to_visit = window_millis.max(0) / MILLIS_PER_DAY + 2;

    let mut occurrences = Vec::new();
    let mut date = now_local.date_naive();
    for _ in 0..days_to_visit {
        for dose_time in &dose_times {
            let local = match dose_time.naive_time() {
                Some(time) => date.and_time(time),
                None => continue,
            };
            let timestamp = match tz.from_local_datetime(&local).earliest() {
                Some(dt) => dt.timestamp_millis(),
                None => continue,
            };
            if timestamp >= now && timestamp < window_end {
                occurrences.push((*dose_time, timestamp));
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    occurrences.sort_by_key(|(_, timestamp)| *timestamp);
    occurrences
}

impl ReminderGenerationInput {
    pub fn validate(&self) -> Result<(&ID, &ID), ValidationError> {
        let baby_id = self.baby_id.as_ref().ok_or(ValidationError::MissingBabyId)?;
        let parent_id = self
            .parent_id
            .as_ref()
            .ok_or(ValidationError::MissingParentId)?;
        if self.medicine.name.trim().is_empty() {
            return Err(ValidationError::MissingMedicineName);
        }
        if self.medicine.dose_schedule.is_empty() {
            return Err(ValidationError::EmptyDoseSchedule);
        }
        if self.channels.is_empty() {
            return Err(ValidationError::EmptyChannels);
        }
        Ok((baby_id, parent_id))
    }
}

/// Expands the dosing schedule into one pending `Reminder` per dose occurrence
/// inside the generation window.
pub fn generate_reminders(
    input: &ReminderGenerationInput,
    now: i64,
    window_millis: i64,
) -> Result<Vec<Reminder>, ValidationError> {
    let (baby_id, parent_id) = input.validate()?;

    let reminders = dose_occurrences(
        &input.medicine.dose_schedule,
        &input.timezone,
        now,
        window_millis,
    )
    .into_iter()
    .map(|(dose_time, scheduled_for)| {
        let mut reminder = Reminder::new(
            baby_id.clone(),
            parent_id.clone(),
            &input.medicine,
            dose_time,
            scheduled_for,
            input.channels.clone(),
            now,
        );
        reminder.plan_id = input.plan_id.clone();
        reminder
    })
    .collect();

    Ok(reminders)
}
