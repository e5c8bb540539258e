use dosewatch_api::{Application, ReminderScheduler};
use dosewatch_domain::NotificationChannel;
use dosewatch_infra::{
    Config, DosewatchContext, InMemoryNotifier, InMemoryRecipientDirectory, Notifier, Services,
    SettableSys,
};
use dosewatch_sdk::DosewatchSDK;
use std::sync::Arc;

/// 2026-10-16 09:00:00 UTC
pub const NOW: i64 = 1792141200000;

pub struct TestApp {
    pub config: Config,
    pub sys: Arc<SettableSys>,
    pub push: Arc<InMemoryNotifier>,
    pub messaging: Arc<InMemoryNotifier>,
    pub recipients: Arc<InMemoryRecipientDirectory>,
    pub scheduler: ReminderScheduler,
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, DosewatchSDK, String) {
    let sys = Arc::new(SettableSys::new(NOW));
    let push = Arc::new(InMemoryNotifier::new(NotificationChannel::Push));
    let messaging = Arc::new(InMemoryNotifier::new(NotificationChannel::Messaging));
    let recipients = Arc::new(InMemoryRecipientDirectory::new());
    let services = Services {
        notifiers: vec![push.clone() as Arc<dyn Notifier>, messaging.clone()],
        recipients: recipients.clone(),
    };

    let mut config = Config::new();
    config.port = 0; // Random port
    let ctx = DosewatchContext::create_inmemory(config.clone(), services, sys.clone());

    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");
    let scheduler = application.scheduler();

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let sdk = DosewatchSDK::new(address.clone(), config.api_key.clone());
    let app = TestApp {
        config,
        sys,
        push,
        messaging,
        recipients,
        scheduler,
    };
    (app, sdk, address)
}
