use super::{NotificationPayload, Notifier};
use dosewatch_domain::{ChannelDeliveryError, NotificationChannel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

#[derive(Debug, Serialize)]
struct ExpoPushMessage<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
    data: &'a HashMap<String, String>,
    sound: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExpoPushTicketDetails {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpoPushTicket {
    status: String,
    id: Option<String>,
    message: Option<String>,
    details: Option<ExpoPushTicketDetails>,
}

#[derive(Debug, Deserialize)]
struct ExpoRequestError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ExpoPushResponse {
    data: Option<ExpoPushTicket>,
    errors: Option<Vec<ExpoRequestError>>,
}

impl ExpoPushResponse {
    fn into_result(self) -> Result<String, ChannelDeliveryError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            let reason = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ChannelDeliveryError::rejected(reason));
        }

        match self.data {
            Some(ticket) if ticket.status == "ok" => ticket
                .id
                .ok_or_else(|| ChannelDeliveryError::rejected("push ticket without id")),
            Some(ticket) => {
                let reason = ticket
                    .details
                    .and_then(|details| details.error)
                    .or(ticket.message)
                    .unwrap_or_else(|| "push provider rejected the message".into());
                Err(ChannelDeliveryError::rejected(reason))
            }
            None => Err(ChannelDeliveryError::rejected("empty push provider response")),
        }
    }
}

/// Sends push notifications through the Expo push API
pub struct ExpoPushNotifier {
    client: Client,
    api_url: String,
    access_token: Option<String>,
}

impl ExpoPushNotifier {
    pub fn new(api_url: String, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url,
            access_token,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for ExpoPushNotifier {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Push
    }

    async fn send(
        &self,
        address: &str,
        payload: &NotificationPayload,
    ) -> Result<String, ChannelDeliveryError> {
        let message = ExpoPushMessage {
            to: address,
            title: &payload.title,
            body: &payload.body,
            data: &payload.data,
            sound: "default",
        };

        let mut req = self
            .client
            .post(&self.api_url)
            .header("Accept", "application/json")
            .json(&message);
        if let Some(token) = &self.access_token {
            req = req.bearer_auth(token);
        }

        match req.send().await {
            Ok(res) => match res.json::<ExpoPushResponse>().await {
                Ok(res) => res.into_result(),
                Err(e) => {
                    error!("[Unexpected Response] Expo push send. Error: {:?}", e);
                    Err(ChannelDeliveryError::rejected(format!(
                        "unexpected push provider response: {}",
                        e
                    )))
                }
            },
            Err(e) => {
                error!("[Network Error] Expo push send. Error: {:?}", e);
                Err(ChannelDeliveryError::rejected(format!(
                    "push provider request failed: {}",
                    e
                )))
            }
        }
    }
}
