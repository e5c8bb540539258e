use crate::reminder::NotificationChannel;
use serde::{Deserialize, Serialize};

/// How a parent can be reached, as known by the profile service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientContact {
    pub push_token: Option<String>,
    pub phone_number: Option<String>,
}

impl RecipientContact {
    /// The usable address for the given channel. Blank values are not usable.
    pub fn address_for(&self, channel: NotificationChannel) -> Option<&str> {
        let address = match channel {
            NotificationChannel::Push => self.push_token.as_deref(),
            NotificationChannel::Messaging => self.phone_number.as_deref(),
        };
        address.map(str::trim).filter(|a| !a.is_empty())
    }
}
