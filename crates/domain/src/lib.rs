mod contact;
pub mod date;
mod dispatch;
mod dose;
mod medication_plan;
mod reminder;
mod reminder_query;
mod shared;

pub use chrono_tz::Tz;
pub use contact::RecipientContact;
pub use date::TimeSpan;
pub use dispatch::{
    ChannelDeliveryError, ChannelFailureKind, ChannelResult, DispatchOutcome, RetryPolicy,
    NO_DELIVERY_CHANNEL_AVAILABLE,
};
pub use dose::{
    dose_occurrences, generate_reminders, DoseTime, MedicineDescriptor, ReminderGenerationInput,
    ValidationError,
};
pub use medication_plan::MedicationPlan;
pub use reminder::{
    InvalidChannelError, InvalidStatusError, LifecycleError, NotificationChannel, Reminder,
    ReminderDedupeKey, ReminderStatus, ReminderStatusUpdate,
};
pub use reminder_query::{sort_by_schedule, ReminderFilters, ReminderSummary};
pub use shared::entity::{Entity, InvalidIDError, ID};
