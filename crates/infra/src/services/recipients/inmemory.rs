use super::IRecipientDirectory;
use dosewatch_domain::{RecipientContact, ID};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct InMemoryRecipientDirectory {
    contacts: Mutex<HashMap<ID, RecipientContact>>,
}

impl InMemoryRecipientDirectory {
    pub fn new() -> Self {
        Self {
            contacts: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_contact(&self, parent_id: &ID, contact: RecipientContact) {
        if let Ok(mut contacts) = self.contacts.lock() {
            contacts.insert(parent_id.clone(), contact);
        }
    }
}

impl Default for InMemoryRecipientDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IRecipientDirectory for InMemoryRecipientDirectory {
    async fn find_contact(&self, parent_id: &ID) -> anyhow::Result<Option<RecipientContact>> {
        let contacts = self
            .contacts
            .lock()
            .map_err(|_| anyhow::Error::msg("Recipient directory lock is poisoned"))?;
        Ok(contacts.get(parent_id).cloned())
    }
}
