mod expo_push;
mod inmemory;
mod twilio_messaging;

use crate::services::recipients::IRecipientDirectory;
use dosewatch_domain::{
    ChannelDeliveryError, ChannelResult, DispatchOutcome, NotificationChannel, RecipientContact,
    Reminder,
};
pub use expo_push::ExpoPushNotifier;
use futures::future::join_all;
pub use inmemory::{InMemoryNotifier, SentNotification};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
pub use twilio_messaging::TwilioMessagingNotifier;

/// The rendered content of a reminder notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl NotificationPayload {
    pub fn for_reminder(reminder: &Reminder) -> Self {
        let mut data = HashMap::new();
        data.insert("reminderId".to_string(), reminder.id.to_string());
        data.insert("babyId".to_string(), reminder.baby_id.to_string());
        data.insert("medicineName".to_string(), reminder.medicine_name.clone());

        Self {
            title: "Medicine reminder".into(),
            body: format!(
                "Time to give {} ({}) at {}",
                reminder.medicine_name, reminder.dosage, reminder.dose_time
            ),
            data,
        }
    }

    /// Single line rendering for text based channels
    pub fn as_text(&self) -> String {
        format!("{}: {}", self.title, self.body)
    }
}

/// A delivery mechanism for one `NotificationChannel`
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> NotificationChannel;

    fn address<'a>(&self, contact: &'a RecipientContact) -> Option<&'a str> {
        contact.address_for(self.channel())
    }

    /// Returns the provider message id
    async fn send(
        &self,
        address: &str,
        payload: &NotificationPayload,
    ) -> Result<String, ChannelDeliveryError>;
}

/// Fans one reminder out to the notifiers of its channels
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
    recipients: Arc<dyn IRecipientDirectory>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        notifiers: Vec<Arc<dyn Notifier>>,
        recipients: Arc<dyn IRecipientDirectory>,
        timeout: Duration,
    ) -> Self {
        Self {
            notifiers,
            recipients,
            timeout,
        }
    }

    fn notifier(&self, channel: NotificationChannel) -> Option<&Arc<dyn Notifier>> {
        self.notifiers.iter().find(|n| n.channel() == channel)
    }

    /// Errors only when the recipient lookup fails, in which case nothing
    /// was attempted
    pub async fn dispatch(&self, reminder: &Reminder) -> anyhow::Result<DispatchOutcome> {
        let contact = match tokio::time::timeout(
            self.timeout,
            self.recipients.find_contact(&reminder.parent_id),
        )
        .await
        {
            Ok(contact) => contact?.unwrap_or_default(),
            Err(_) => {
                return Err(anyhow::Error::msg(format!(
                    "Recipient lookup for parent: {} timed out after {}s",
                    reminder.parent_id,
                    self.timeout.as_secs()
                )))
            }
        };

        let payload = NotificationPayload::for_reminder(reminder);
        let attempts = reminder
            .channels
            .iter()
            .map(|channel| self.deliver(*channel, &contact, &payload));
        let results = join_all(attempts).await;

        for res in &results {
            if let Err(e) = &res.result {
                warn!(
                    "Reminder: {} could not be delivered through {}: {}",
                    reminder.id, res.channel, e
                );
            }
        }

        let outcome = DispatchOutcome::aggregate(&results);
        info!(
            "Reminder: {} dispatched through {} channel(s), sent: {}",
            reminder.id,
            results.len(),
            outcome.is_sent()
        );
        Ok(outcome)
    }

    async fn deliver(
        &self,
        channel: NotificationChannel,
        contact: &RecipientContact,
        payload: &NotificationPayload,
    ) -> ChannelResult {
        let notifier = match self.notifier(channel) {
            Some(notifier) => notifier,
            None => {
                return ChannelResult {
                    channel,
                    result: Err(ChannelDeliveryError::not_configured(channel)),
                }
            }
        };
        let address = match notifier.address(contact) {
            Some(address) => address,
            None => {
                return ChannelResult {
                    channel,
                    result: Err(ChannelDeliveryError::missing_address(channel)),
                }
            }
        };

        let result = match tokio::time::timeout(self.timeout, notifier.send(address, payload)).await
        {
            Ok(res) => res,
            Err(_) => Err(ChannelDeliveryError::timeout(self.timeout.as_secs())),
        };
        ChannelResult { channel, result }
    }
}
