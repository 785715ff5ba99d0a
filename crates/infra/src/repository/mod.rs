//! Producer persistence boundary.
//!
//! The service talks to storage exclusively through [`ProducerRepository`].
//! Two implementations exist: an in-memory map for tests/dev and a Postgres
//! adapter for production.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use agrobase_core::ProducerId;
use agrobase_producers::{NewProducer, Producer, ProducerFilter, ProducerPatch};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryProducerRepository;
pub use postgres::PostgresProducerRepository;

/// Repository operation error.
///
/// Storage failures are infrastructure faults; they propagate to the caller
/// unchanged and are never rewritten into domain errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// One page of a filtered listing, plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerPage {
    pub results: Vec<Producer>,
    pub total: u64,
}

/// One row of a grouped count (`GROUP BY state_code` / crop expansion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub group: String,
    pub count: u64,
}

/// Arable/vegetation sums across live records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandUse {
    pub total_arable_ha: Decimal,
    pub total_vegetation_ha: Decimal,
}

/// Storage capability consumed by the producer service.
///
/// Every read and aggregate sees **live records only** (`deleted = false`);
/// soft-deleted rows stay in storage but are invisible here, except to
/// `apply_update`, which addresses rows by id regardless of the flag.
#[async_trait]
pub trait ProducerRepository: Send + Sync {
    /// Look up a live record by normalized tax id digits.
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Producer>, RepositoryError>;

    /// Look up a live record by id.
    async fn find_by_id(&self, id: ProducerId) -> Result<Option<Producer>, RepositoryError>;

    /// Filtered, paginated listing. `total` counts all matches ignoring
    /// `limit`/`skip`. A `limit` of zero yields zero rows.
    async fn find_many(
        &self,
        filter: &ProducerFilter,
        limit: u32,
        skip: u32,
    ) -> Result<ProducerPage, RepositoryError>;

    /// Persist a new record, assigning its id and timestamps.
    async fn insert(&self, record: NewProducer) -> Result<Producer, RepositoryError>;

    /// Apply a partial update to the row with the given id. Rows that don't
    /// exist are left alone; existence checks belong to the caller.
    async fn apply_update(
        &self,
        id: ProducerId,
        patch: ProducerPatch,
    ) -> Result<(), RepositoryError>;

    /// Count of live records.
    async fn aggregate_count(&self) -> Result<u64, RepositoryError>;

    /// Sum of `total_area_ha` across live records.
    async fn aggregate_total_area(&self) -> Result<Decimal, RepositoryError>;

    /// Live-record count per distinct `state_code`, ordered by state.
    async fn aggregate_by_state(&self) -> Result<Vec<GroupCount>, RepositoryError>;

    /// Live-record count per distinct crop, expanding each record's crop set
    /// (a record with N crops contributes to N groups), ordered by crop.
    async fn aggregate_by_crop(&self) -> Result<Vec<GroupCount>, RepositoryError>;

    /// Arable/vegetation sums across live records.
    async fn aggregate_land_use(&self) -> Result<LandUse, RepositoryError>;
}

#[async_trait]
impl<R> ProducerRepository for Arc<R>
where
    R: ProducerRepository + ?Sized,
{
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Producer>, RepositoryError> {
        (**self).find_by_tax_id(tax_id).await
    }

    async fn find_by_id(&self, id: ProducerId) -> Result<Option<Producer>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_many(
        &self,
        filter: &ProducerFilter,
        limit: u32,
        skip: u32,
    ) -> Result<ProducerPage, RepositoryError> {
        (**self).find_many(filter, limit, skip).await
    }

    async fn insert(&self, record: NewProducer) -> Result<Producer, RepositoryError> {
        (**self).insert(record).await
    }

    async fn apply_update(
        &self,
        id: ProducerId,
        patch: ProducerPatch,
    ) -> Result<(), RepositoryError> {
        (**self).apply_update(id, patch).await
    }

    async fn aggregate_count(&self) -> Result<u64, RepositoryError> {
        (**self).aggregate_count().await
    }

    async fn aggregate_total_area(&self) -> Result<Decimal, RepositoryError> {
        (**self).aggregate_total_area().await
    }

    async fn aggregate_by_state(&self) -> Result<Vec<GroupCount>, RepositoryError> {
        (**self).aggregate_by_state().await
    }

    async fn aggregate_by_crop(&self) -> Result<Vec<GroupCount>, RepositoryError> {
        (**self).aggregate_by_crop().await
    }

    async fn aggregate_land_use(&self) -> Result<LandUse, RepositoryError> {
        (**self).aggregate_land_use().await
    }
}
