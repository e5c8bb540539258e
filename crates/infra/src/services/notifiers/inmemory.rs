use super::{NotificationPayload, Notifier};
use dosewatch_domain::{ChannelDeliveryError, NotificationChannel};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Behaviour {
    Succeed,
    Fail(String),
    Hang,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub address: String,
    pub payload: NotificationPayload,
}

/// Notifier that records what it was asked to send. Used for tests and
/// local runs without provider credentials.
pub struct InMemoryNotifier {
    channel: NotificationChannel,
    behaviour: Behaviour,
    sent: Mutex<Vec<SentNotification>>,
}

impl InMemoryNotifier {
    pub fn new(channel: NotificationChannel) -> Self {
        Self::with_behaviour(channel, Behaviour::Succeed)
    }

    /// Rejects every notification with the given reason
    pub fn failing(channel: NotificationChannel, reason: &str) -> Self {
        Self::with_behaviour(channel, Behaviour::Fail(reason.to_string()))
    }

    /// Never answers
    pub fn hanging(channel: NotificationChannel) -> Self {
        Self::with_behaviour(channel, Behaviour::Hang)
    }

    fn with_behaviour(channel: NotificationChannel, behaviour: Behaviour) -> Self {
        Self {
            channel,
            behaviour,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Notifier for InMemoryNotifier {
    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    async fn send(
        &self,
        address: &str,
        payload: &NotificationPayload,
    ) -> Result<String, ChannelDeliveryError> {
        match &self.behaviour {
            Behaviour::Succeed => {
                let mut sent = self
                    .sent
                    .lock()
                    .map_err(|_| ChannelDeliveryError::rejected("notifier is poisoned"))?;
                sent.push(SentNotification {
                    address: address.to_string(),
                    payload: payload.clone(),
                });
                Ok(format!("{}_{}", self.channel, sent.len()))
            }
            Behaviour::Fail(reason) => Err(ChannelDeliveryError::rejected(reason.clone())),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(60 * 60)).await;
                Err(ChannelDeliveryError::rejected("no answer"))
            }
        }
    }
}
