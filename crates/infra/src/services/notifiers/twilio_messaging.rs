use super::{NotificationPayload, Notifier};
use crate::config::TwilioConfig;
use dosewatch_domain::{ChannelDeliveryError, NotificationChannel};
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: Option<String>,
    message: Option<String>,
    code: Option<i64>,
}

impl TwilioMessageResponse {
    fn into_result(self) -> Result<String, ChannelDeliveryError> {
        match (self.sid, self.message) {
            (Some(sid), _) => Ok(sid),
            (None, Some(message)) => Err(ChannelDeliveryError::rejected(match self.code {
                Some(code) => format!("{} ({})", message, code),
                None => message,
            })),
            (None, None) => Err(ChannelDeliveryError::rejected(
                "messaging provider returned no message sid",
            )),
        }
    }
}

/// Sends text messages through the Twilio Messages API
pub struct TwilioMessagingNotifier {
    client: Client,
    config: TwilioConfig,
}

impl TwilioMessagingNotifier {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_url, self.config.account_sid
        )
    }
}

#[async_trait::async_trait]
impl Notifier for TwilioMessagingNotifier {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Messaging
    }

    async fn send(
        &self,
        address: &str,
        payload: &NotificationPayload,
    ) -> Result<String, ChannelDeliveryError> {
        let body = payload.as_text();
        let form = [
            ("From", self.config.from_number.as_str()),
            ("To", address),
            ("Body", body.as_str()),
        ];

        match self
            .client
            .post(&self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
        {
            Ok(res) => match res.json::<TwilioMessageResponse>().await {
                Ok(res) => res.into_result(),
                Err(e) => {
                    error!("[Unexpected Response] Twilio message send. Error: {:?}", e);
                    Err(ChannelDeliveryError::rejected(format!(
                        "unexpected messaging provider response: {}",
                        e
                    )))
                }
            },
            Err(e) => {
                error!("[Network Error] Twilio message send. Error: {:?}", e);
                Err(ChannelDeliveryError::rejected(format!(
                    "messaging provider request failed: {}",
                    e
                )))
            }
        }
    }
}
