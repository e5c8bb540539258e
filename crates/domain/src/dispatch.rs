use crate::reminder::NotificationChannel;
use itertools::Itertools;
use thiserror::Error;

pub const NO_DELIVERY_CHANNEL_AVAILABLE: &str = "no delivery channel available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFailureKind {
    /// The recipient has no address for the channel
    MissingAddress,
    /// There is no notifier registered for the channel
    NotConfigured,
    /// The provider rejected the message or the request failed
    Rejected,
    /// The provider did not answer within the dispatch timeout
    Timeout,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct ChannelDeliveryError {
    pub kind: ChannelFailureKind,
    pub reason: String,
}

impl ChannelDeliveryError {
    pub fn missing_address(channel: NotificationChannel) -> Self {
        Self {
            kind: ChannelFailureKind::MissingAddress,
            reason: format!("recipient has no address for {}", channel),
        }
    }

    pub fn not_configured(channel: NotificationChannel) -> Self {
        Self {
            kind: ChannelFailureKind::NotConfigured,
            reason: format!("{} channel is not configured", channel),
        }
    }

    pub fn rejected<T: Into<String>>(reason: T) -> Self {
        Self {
            kind: ChannelFailureKind::Rejected,
            reason: reason.into(),
        }
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self {
            kind: ChannelFailureKind::Timeout,
            reason: format!("timed out after {}s", timeout_secs),
        }
    }

    /// Whether a delivery was actually attempted through the provider
    pub fn was_attempted(&self) -> bool {
        matches!(
            self.kind,
            ChannelFailureKind::Rejected | ChannelFailureKind::Timeout
        )
    }
}

/// The result of delivering a `Reminder` through one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelResult {
    pub channel: NotificationChannel,
    /// The provider message id on success
    pub result: Result<String, ChannelDeliveryError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Sent {
        message_ids: Vec<(NotificationChannel, String)>,
    },
    Failed {
        reason: String,
        /// True when at least one provider failed in a way that might
        /// succeed on a later attempt
        retryable: bool,
    },
}

impl DispatchOutcome {
    /// Aggregates the channel results of one dispatch pass. One successful
    /// channel is enough for the `Reminder` to be sent.
    pub fn aggregate(results: &[ChannelResult]) -> Self {
        let message_ids = results
            .iter()
            .filter_map(|r| match &r.result {
                Ok(message_id) => Some((r.channel, message_id.clone())),
                Err(_) => None,
            })
            .collect::<Vec<_>>();
        if !message_ids.is_empty() {
            return Self::Sent { message_ids };
        }

        let attempted_failures = results
            .iter()
            .filter_map(|r| match &r.result {
                Err(e) if e.was_attempted() => Some((r.channel, e)),
                _ => None,
            })
            .collect::<Vec<_>>();

        if attempted_failures.is_empty() {
            return Self::Failed {
                reason: NO_DELIVERY_CHANNEL_AVAILABLE.into(),
                retryable: false,
            };
        }

        Self::Failed {
            reason: attempted_failures
                .iter()
                .map(|(channel, e)| format!("{}: {}", channel, e.reason))
                .join("; "),
            retryable: true,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Decides if and when a `Reminder` that could not be delivered is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of dispatch passes before the `Reminder` fails.
    /// A value of 1 means no retries.
    pub max_attempts: i64,
    pub base_delay_millis: i64,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn should_retry(&self, attempts: i64) -> bool {
        attempts < self.max_attempts
    }

    /// Exponential backoff: `base_delay * multiplier^(attempts - 1)`
    pub fn next_delay_millis(&self, attempts: i64) -> i64 {
        let exponent = attempts.saturating_sub(1).max(0) as i32;
        (self.base_delay_millis as f64 * self.multiplier.powi(exponent)) as i64
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_millis: 60 * 1000,
            multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::NotificationChannel::*;

    fn ok(channel: NotificationChannel) -> ChannelResult {
        ChannelResult {
            channel,
            result: Ok(format!("{}_id", channel)),
        }
    }

    fn err(channel: NotificationChannel, e: ChannelDeliveryError) -> ChannelResult {
        ChannelResult {
            channel,
            result: Err(e),
        }
    }

    #[test]
    fn one_successful_channel_is_enough() {
        let outcome = DispatchOutcome::aggregate(&[
            err(Push, ChannelDeliveryError::rejected("DeviceNotRegistered")),
            ok(Messaging),
        ]);
        assert_eq!(
            outcome,
            DispatchOutcome::Sent {
                message_ids: vec![(Messaging, "messaging_id".into())]
            }
        );
    }

    #[test]
    fn no_usable_address_fails_without_retry() {
        let outcome = DispatchOutcome::aggregate(&[
            err(Push, ChannelDeliveryError::missing_address(Push)),
            err(Messaging, ChannelDeliveryError::not_configured(Messaging)),
        ]);
        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                reason: NO_DELIVERY_CHANNEL_AVAILABLE.into(),
                retryable: false
            }
        );
        assert!(!DispatchOutcome::aggregate(&[]).is_sent());
    }

    #[test]
    fn concatenates_attempted_channel_failures() {
        let outcome = DispatchOutcome::aggregate(&[
            err(Push, ChannelDeliveryError::rejected("DeviceNotRegistered")),
            err(Messaging, ChannelDeliveryError::timeout(15)),
        ]);
        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                reason: "push: DeviceNotRegistered; messaging: timed out after 15s".into(),
                retryable: true
            }
        );

        // Channels that were never attempted are left out of the reason
        let outcome = DispatchOutcome::aggregate(&[
            err(Push, ChannelDeliveryError::rejected("InvalidCredentials")),
            err(Messaging, ChannelDeliveryError::missing_address(Messaging)),
        ]);
        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                reason: "push: InvalidCredentials".into(),
                retryable: true
            }
        );
    }

    #[test]
    fn exponential_backoff_increases() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay_millis: 2000,
            multiplier: 2.0,
        };
        assert_eq!(policy.next_delay_millis(1), 2000);
        assert_eq!(policy.next_delay_millis(2), 4000);
        assert_eq!(policy.next_delay_millis(3), 8000);
        assert!(policy.should_retry(3));
        assert!(!policy.should_retry(4));
        assert!(!RetryPolicy::default().should_retry(1));
    }
}
