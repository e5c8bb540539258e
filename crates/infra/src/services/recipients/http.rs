use super::IRecipientDirectory;
use dosewatch_domain::{RecipientContact, ID};
use reqwest::{Client, StatusCode};
use tracing::error;

/// Looks up contacts with `GET {base_url}/parents/{parent_id}/contact`
pub struct HttpRecipientDirectory {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRecipientDirectory {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn contact_url(&self, parent_id: &ID) -> String {
        format!("{}/parents/{}/contact", self.base_url, parent_id)
    }
}

#[async_trait::async_trait]
impl IRecipientDirectory for HttpRecipientDirectory {
    async fn find_contact(&self, parent_id: &ID) -> anyhow::Result<Option<RecipientContact>> {
        let mut req = self.client.get(&self.contact_url(parent_id));
        if let Some(api_key) = &self.api_key {
            req = req.header("x-api-key", api_key);
        }

        let res = req.send().await.map_err(|e| {
            error!(
                "[Network Error] Profile service contact lookup for parent: {}. Error: {:?}",
                parent_id, e
            );
            anyhow::Error::new(e)
        })?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let res = res.error_for_status().map_err(|e| {
            error!(
                "[Unexpected Response] Profile service contact lookup for parent: {}. Error: {:?}",
                parent_id, e
            );
            anyhow::Error::new(e)
        })?;

        res.json::<RecipientContact>().await.map(Some).map_err(|e| {
            error!(
                "[Unexpected Response] Profile service contact lookup for parent: {}. Error: {:?}",
                parent_id, e
            );
            anyhow::Error::new(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_contact_url() {
        let directory = HttpRecipientDirectory::new("http://profiles.local".into(), None);
        let parent_id = ID::new();
        assert_eq!(
            directory.contact_url(&parent_id),
            format!("http://profiles.local/parents/{}/contact", parent_id)
        );
    }
}
