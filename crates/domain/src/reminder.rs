use crate::dispatch::{DispatchOutcome, RetryPolicy};
use crate::dose::{DoseTime, MedicineDescriptor};
use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Failed,
    Dismissed,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Dismissed => "dismissed",
        }
    }

    /// No automatic transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The allowed lifecycle transitions:
    /// - `pending -> sent | failed` as the result of a dispatch attempt
    /// - `pending | sent | failed -> dismissed` by the user at any time
    pub fn can_transition_to(&self, next: ReminderStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Sent) | (Self::Pending, Self::Failed) => true,
            (Self::Dismissed, Self::Dismissed) => false,
            (_, Self::Dismissed) => true,
            _ => false,
        }
    }
}

impl Display for ReminderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("Unknown reminder status: `{0}`")]
pub struct InvalidStatusError(String);

impl FromStr for ReminderStatus {
    type Err = InvalidStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            "dismissed" => Ok(Self::Dismissed),
            _ => Err(InvalidStatusError(s.to_string())),
        }
    }
}

/// An independent delivery mechanism a `Reminder` can be sent through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Push,
    Messaging,
}

impl NotificationChannel {
    pub fn all() -> Vec<Self> {
        vec![Self::Push, Self::Messaging]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Messaging => "messaging",
        }
    }
}

impl Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("Unknown notification channel: `{0}`")]
pub struct InvalidChannelError(String);

impl FromStr for NotificationChannel {
    type Err = InvalidChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(Self::Push),
            "messaging" => Ok(Self::Messaging),
            _ => Err(InvalidChannelError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum LifecycleError {
    #[error("A reminder can not go from `{from}` to `{to}`")]
    InvalidTransition {
        from: ReminderStatus,
        to: ReminderStatus,
    },
    #[error("The reminder was modified concurrently (expected version {expected}, found {found})")]
    VersionMismatch { expected: i64, found: i64 },
    #[error("The reminder is not due or is already claimed")]
    NotClaimable,
}

/// A `Reminder` is a notification for one dose occurrence of one medicine.
///
/// It is owned by the (`baby_id`, `parent_id`) pair it was generated for and
/// `scheduled_for` never changes after creation. Every write bumps `version`
/// which is used as an optimistic concurrency guard by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    pub baby_id: ID,
    pub parent_id: ID,
    /// The `MedicationPlan` that generated this `Reminder`, if any
    pub plan_id: Option<ID>,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub dose_time: DoseTime,
    /// Timestamp in millis of the dose occurrence
    pub scheduled_for: i64,
    pub channels: Vec<NotificationChannel>,
    pub status: ReminderStatus,
    /// Number of dispatch passes, not channel attempts
    pub attempt_count: i64,
    pub last_attempt_at: Option<i64>,
    pub error_message: Option<String>,
    /// Set when a failed dispatch is going to be retried
    pub next_attempt_at: Option<i64>,
    /// Set while a dispatch pass owns this `Reminder`
    pub claimed_at: Option<i64>,
    pub version: i64,
    pub created: i64,
    pub updated: i64,
}

/// Key that identifies a dose occurrence. Two reminders with the same
/// key must never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderDedupeKey {
    pub baby_id: ID,
    pub medicine_name: String,
    pub scheduled_for: i64,
}

impl Reminder {
    pub fn new(
        baby_id: ID,
        parent_id: ID,
        medicine: &MedicineDescriptor,
        dose_time: DoseTime,
        scheduled_for: i64,
        channels: Vec<NotificationChannel>,
        now: i64,
    ) -> Self {
        let mut channels = channels;
        channels.sort();
        channels.dedup();

        Self {
            id: Default::default(),
            baby_id,
            parent_id,
            plan_id: None,
            medicine_name: medicine.name.trim().to_string(),
            dosage: medicine.dosage.clone(),
            frequency: medicine.frequency.clone(),
            dose_time,
            scheduled_for,
            channels,
            status: ReminderStatus::Pending,
            attempt_count: 0,
            last_attempt_at: None,
            error_message: None,
            next_attempt_at: None,
            claimed_at: None,
            version: 0,
            created: now,
            updated: now,
        }
    }

    pub fn dedupe_key(&self) -> ReminderDedupeKey {
        ReminderDedupeKey {
            baby_id: self.baby_id.clone(),
            medicine_name: self.medicine_name.clone(),
            scheduled_for: self.scheduled_for,
        }
    }

    /// Due reminders are pending, scheduled at or before `now` and not
    /// waiting for a retry backoff to pass
    pub fn is_due(&self, now: i64) -> bool {
        self.status == ReminderStatus::Pending
            && self.scheduled_for <= now
            && self.next_attempt_at.map(|at| at <= now).unwrap_or(true)
    }

    /// A claim that is older than the lease is considered abandoned, e.g.
    /// because the process crashed in the middle of a dispatch pass
    pub fn is_claimable(&self, now: i64, lease_millis: i64) -> bool {
        self.is_due(now)
            && self
                .claimed_at
                .map(|claimed_at| claimed_at + lease_millis <= now)
                .unwrap_or(true)
    }

    pub fn claim(
        &mut self,
        expected_version: i64,
        now: i64,
        lease_millis: i64,
    ) -> Result<(), LifecycleError> {
        if self.version != expected_version {
            return Err(LifecycleError::VersionMismatch {
                expected: expected_version,
                found: self.version,
            });
        }
        if !self.is_claimable(now, lease_millis) {
            return Err(LifecycleError::NotClaimable);
        }
        self.claimed_at = Some(now);
        self.touch(now);
        Ok(())
    }

    pub fn release_claim(&mut self, now: i64) {
        if self.claimed_at.is_some() && self.status == ReminderStatus::Pending {
            self.claimed_at = None;
            self.touch(now);
        }
    }

    /// Records the result of a dispatch pass. Only pending reminders can be
    /// dispatched, so a reminder dismissed in the meantime rejects the update.
    pub fn apply_status_update(
        &mut self,
        update: &ReminderStatusUpdate,
    ) -> Result<(), LifecycleError> {
        if self.version != update.expected_version {
            return Err(LifecycleError::VersionMismatch {
                expected: update.expected_version,
                found: self.version,
            });
        }
        if self.status != ReminderStatus::Pending || update.status == ReminderStatus::Dismissed {
            return Err(LifecycleError::InvalidTransition {
                from: self.status,
                to: update.status,
            });
        }

        self.status = update.status;
        self.attempt_count += update.attempt_delta;
        self.last_attempt_at = Some(update.attempted_at);
        self.error_message = update.error_message.clone();
        self.next_attempt_at = update.next_attempt_at;
        self.claimed_at = None;
        self.touch(update.attempted_at);
        Ok(())
    }

    /// Dismisses the reminder. Returns false if it already was dismissed.
    /// Never touches `attempt_count` or `error_message`.
    pub fn dismiss(&mut self, now: i64) -> bool {
        if !self.status.can_transition_to(ReminderStatus::Dismissed) {
            return false;
        }
        self.status = ReminderStatus::Dismissed;
        self.claimed_at = None;
        self.next_attempt_at = None;
        self.touch(now);
        true
    }

    fn touch(&mut self, now: i64) {
        self.version += 1;
        self.updated = now;
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// The write produced by one dispatch pass over a claimed `Reminder`
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderStatusUpdate {
    pub reminder_id: ID,
    /// The version of the claimed `Reminder`
    pub expected_version: i64,
    pub status: ReminderStatus,
    pub attempt_delta: i64,
    pub error_message: Option<String>,
    pub next_attempt_at: Option<i64>,
    pub attempted_at: i64,
}

impl ReminderStatusUpdate {
    pub fn from_outcome(
        reminder: &Reminder,
        outcome: &DispatchOutcome,
        retry_policy: &RetryPolicy,
        now: i64,
    ) -> Self {
        let attempts = reminder.attempt_count + 1;
        let (status, error_message, next_attempt_at) = match outcome {
            DispatchOutcome::Sent { .. } => (ReminderStatus::Sent, None, None),
            DispatchOutcome::Failed { reason, retryable } => {
                if *retryable && retry_policy.should_retry(attempts) {
                    (
                        ReminderStatus::Pending,
                        Some(reason.clone()),
                        Some(now + retry_policy.next_delay_millis(attempts)),
                    )
                } else {
                    (ReminderStatus::Failed, Some(reason.clone()), None)
                }
            }
        };

        Self {
            reminder_id: reminder.id.clone(),
            expected_version: reminder.version,
            status,
            attempt_delta: 1,
            error_message,
            next_attempt_at,
            attempted_at: now,
        }
    }
}
