mod error;
mod event;
mod job_schedulers;
mod occurrence;
mod shared;
mod status;
mod sync;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::start_heartbeat_job;
use std::net::TcpListener;
use studio_booking_infra::BookingContext;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    // The stream route goes first so that it is not shadowed by `/events/{definition_id}`
    sync::configure_routes(cfg);
    event::configure_routes(cfg);
    occurrence::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    context: BookingContext,
}

impl Application {
    pub async fn new(context: BookingContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        Application::start_job_schedulers(context.clone());

        Ok(Self {
            server,
            port,
            context,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: BookingContext) {
        start_heartbeat_job(context);
    }

    async fn configure_server(context: BookingContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Runs until the server stops. Live sync streams never end on their own,
    /// so they are closed as soon as a stop signal arrives.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let live_sync = self.context.live_sync.clone();
        actix_web::rt::spawn(async move {
            if actix_web::rt::signal::ctrl_c().await.is_ok() {
                info!("Stop signal received, closing live sync streams");
                live_sync.shutdown();
            }
        });

        let res = self.server.await;
        self.context.live_sync.shutdown();
        res
    }
}
