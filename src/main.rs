mod telemetry;

use dosewatch_api::Application;
use dosewatch_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("dosewatch_server".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let app = Application::new(context).await?;
    app.start().await
}
