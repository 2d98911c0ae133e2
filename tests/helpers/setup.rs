use studio_booking_api::Application;
use studio_booking_infra::{BookingContext, Config};
use studio_booking_sdk::BookingSDK;

pub struct TestApp {
    pub config: Config,
    pub address: String,
}

impl TestApp {
    /// Another viewer of the same calendar
    pub fn new_viewer(&self) -> BookingSDK {
        BookingSDK::new(self.address.clone())
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, BookingSDK) {
    let mut ctx = BookingContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.heartbeat_interval_secs = 1;

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let sdk = BookingSDK::new(address.clone());
    (TestApp { config, address }, sdk)
}
