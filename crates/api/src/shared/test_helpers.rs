use dosewatch_domain::NotificationChannel;
use dosewatch_infra::{
    Config, DosewatchContext, InMemoryNotifier, InMemoryRecipientDirectory, Notifier, Services,
    SettableSys,
};
use std::sync::Arc;

/// 2026-10-16 09:00:00 UTC
pub const NOW: i64 = 1792141200000;

pub struct TestContext {
    pub ctx: DosewatchContext,
    pub sys: Arc<SettableSys>,
    pub push: Arc<InMemoryNotifier>,
    pub messaging: Arc<InMemoryNotifier>,
    pub recipients: Arc<InMemoryRecipientDirectory>,
}

pub fn setup() -> TestContext {
    setup_with_notifiers(
        InMemoryNotifier::new(NotificationChannel::Push),
        InMemoryNotifier::new(NotificationChannel::Messaging),
    )
}

pub fn setup_with_notifiers(push: InMemoryNotifier, messaging: InMemoryNotifier) -> TestContext {
    let sys = Arc::new(SettableSys::new(NOW));
    let push = Arc::new(push);
    let messaging = Arc::new(messaging);
    let recipients = Arc::new(InMemoryRecipientDirectory::new());
    let services = Services {
        notifiers: vec![push.clone() as Arc<dyn Notifier>, messaging.clone()],
        recipients: recipients.clone(),
    };
    let ctx = DosewatchContext::create_inmemory(Config::new(), services, sys.clone());

    TestContext {
        ctx,
        sys,
        push,
        messaging,
        recipients,
    }
}
