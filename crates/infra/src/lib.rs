mod config;
mod live_sync;
mod repos;

pub use config::Config;
pub use live_sync::{LiveSync, ViewerId, ViewerSubscription};
pub use repos::{IEventRepo, Repos};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct BookingContext {
    pub repos: Repos,
    pub config: Config,
    pub live_sync: Arc<LiveSync>,
}

impl BookingContext {
    fn new(repos: Repos) -> Self {
        Self {
            repos,
            config: Config::new(),
            live_sync: Arc::new(LiveSync::new()),
        }
    }

    pub fn create_inmemory() -> Self {
        Self::new(Repos::create_inmemory())
    }
}

/// Will setup the infrastructure context given the environment.
/// Uses postgres when `DATABASE_URL` is present and in memory storage otherwise.
pub async fn setup_context() -> BookingContext {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(connection_string) => match Repos::create_postgres(&connection_string).await {
            Ok(repos) => BookingContext::new(repos),
            Err(e) => {
                error!("Unable to use postgres: {:?}", e);
                panic!("{} must point to a reachable postgres database", PSQL_CONNECTION_STRING);
            }
        },
        Err(_) => {
            info!(
                "{} env var was not found, going to use in memory storage",
                PSQL_CONNECTION_STRING
            );
            BookingContext::create_inmemory()
        }
    }
}
