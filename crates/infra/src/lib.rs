mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, TwilioConfig};
pub use repos::{
    DeleteResult, IMedicationPlanRepo, IReminderRepo, InMemoryMedicationPlanRepo,
    InMemoryReminderRepo, Repos,
};
pub use services::notifiers::{
    ExpoPushNotifier, InMemoryNotifier, NotificationDispatcher, NotificationPayload, Notifier,
    SentNotification, TwilioMessagingNotifier,
};
pub use services::recipients::{
    HttpRecipientDirectory, IRecipientDirectory, InMemoryRecipientDirectory,
};
use std::sync::Arc;
use std::time::Duration;
pub use system::{ISys, RealSys, SettableSys};
use tracing::{info, warn};

/// The collaborators used to deliver reminders
#[derive(Clone)]
pub struct Services {
    pub notifiers: Vec<Arc<dyn Notifier>>,
    pub recipients: Arc<dyn IRecipientDirectory>,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let mut notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(ExpoPushNotifier::new(
            config.push_api_url.clone(),
            config.push_access_token.clone(),
        ))];
        if let Some(twilio) = &config.twilio {
            notifiers.push(Arc::new(TwilioMessagingNotifier::new(twilio.clone())));
        }

        let recipients: Arc<dyn IRecipientDirectory> = match &config.profile_service_url {
            Some(url) => Arc::new(HttpRecipientDirectory::new(
                url.clone(),
                config.profile_service_api_key.clone(),
            )),
            None => {
                warn!("PROFILE_SERVICE_URL is not set, no recipient will have a usable address.");
                Arc::new(InMemoryRecipientDirectory::new())
            }
        };

        Self {
            notifiers,
            recipients,
        }
    }
}

#[derive(Clone)]
pub struct DosewatchContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
}

impl DosewatchContext {
    /// In-memory repositories with the given services and clock
    pub fn create_inmemory(config: Config, services: Services, sys: Arc<dyn ISys>) -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config,
            sys,
            services,
        }
    }

    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(
            self.services.notifiers.clone(),
            self.services.recipients.clone(),
            Duration::from_secs(self.config.notifier_timeout_secs),
        )
    }
}

/// Will setup the infrastructure context given the environment. Uses
/// Postgres when `DATABASE_URL` is set and in-memory repositories otherwise.
pub async fn setup_context() -> anyhow::Result<DosewatchContext> {
    let config = Config::new();
    let repos = match get_psql_connection_string() {
        Some(connection_string) => Repos::create_postgres(&connection_string).await?,
        None => {
            info!("DATABASE_URL is not set, using in-memory repositories.");
            Repos::create_inmemory()
        }
    };
    let services = Services::from_config(&config);

    Ok(DosewatchContext {
        repos,
        config,
        sys: Arc::new(RealSys {}),
        services,
    })
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .ok()
        .filter(|s| !s.trim().is_empty())
}
