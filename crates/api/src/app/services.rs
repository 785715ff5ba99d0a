//! Repository backend selection + service construction.

use std::sync::Arc;

use agrobase_infra::{
    InMemoryProducerRepository, PostgresProducerRepository, ProducerRepository, ProducerService,
};

/// Services shared by every handler via `Extension`.
pub struct AppServices {
    pub producers: ProducerService<Arc<dyn ProducerRepository>>,
}

impl AppServices {
    pub fn with_repository(repo: Arc<dyn ProducerRepository>) -> Self {
        Self {
            producers: ProducerService::new(repo),
        }
    }

    /// Volatile in-memory backend (tests/dev).
    pub fn in_memory() -> Self {
        Self::with_repository(Arc::new(InMemoryProducerRepository::new()))
    }
}

/// Build services from the environment: Postgres when `DATABASE_URL` is
/// set, in-memory otherwise.
pub async fn build_services() -> anyhow::Result<AppServices> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let repo = PostgresProducerRepository::connect(&url).await?;
            Ok(AppServices::with_repository(Arc::new(repo)))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using volatile in-memory repository");
            Ok(AppServices::in_memory())
        }
    }
}
