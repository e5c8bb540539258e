mod http;
mod inmemory;

use dosewatch_domain::{RecipientContact, ID};
pub use http::HttpRecipientDirectory;
pub use inmemory::InMemoryRecipientDirectory;

/// Resolves how a parent can be reached. Owned by the profile service.
#[async_trait::async_trait]
pub trait IRecipientDirectory: Send + Sync {
    /// `None` when the profile service does not know the parent
    async fn find_contact(&self, parent_id: &ID) -> anyhow::Result<Option<RecipientContact>>;
}
