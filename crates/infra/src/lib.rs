//! Infrastructure layer: persistence adapters and the producer service.

pub mod repository;
pub mod service;

pub use repository::{
    GroupCount, InMemoryProducerRepository, LandUse, PostgresProducerRepository, ProducerPage,
    ProducerRepository, RepositoryError,
};
pub use service::{
    CropFarmCount, DashboardSummary, ProducerService, ServiceError, StateFarmCount,
};
