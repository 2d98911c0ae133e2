mod event;

pub use event::IEventRepo;
use event::{InMemoryEventRepo, PostgresEventRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CONNECTING ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CONNECTING ... [done]");

        info!("DB MIGRATING ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB MIGRATING ... [done]");

        Ok(Self {
            events: Arc::new(PostgresEventRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepo::default()),
        }
    }
}
