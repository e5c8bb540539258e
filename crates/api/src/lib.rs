mod error;
mod job_schedulers;
mod prescription;
mod reminder;
mod scheduler;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use dosewatch_infra::DosewatchContext;
pub use job_schedulers::ReminderScheduler;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    prescription::configure_routes(cfg);
    reminder::configure_routes(cfg);
    scheduler::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    scheduler: ReminderScheduler,
}

impl Application {
    pub async fn new(context: DosewatchContext) -> Result<Self, std::io::Error> {
        let scheduler = ReminderScheduler::new(context.clone());
        let (server, port) = Application::configure_server(context, scheduler.clone()).await?;
        scheduler.start();

        Ok(Self {
            server,
            port,
            scheduler,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn scheduler(&self) -> ReminderScheduler {
        self.scheduler.clone()
    }

    async fn configure_server(
        context: DosewatchContext,
        scheduler: ReminderScheduler,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let ctx = web::Data::new(context);
        let scheduler = web::Data::new(scheduler);
        let server = HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(ctx.clone())
                .app_data(scheduler.clone())
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Runs the server until it is shut down and then stops the scheduler
    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        self.scheduler.stop().await;
        res
    }
}
