//! Producer service: validation, uniqueness, CRUD, soft delete, dashboard.
//!
//! The service is stateless; all state lives behind the injected
//! [`ProducerRepository`]. Uniqueness and the area invariant are
//! read-then-check-then-write and therefore race-prone under concurrent
//! writers; the Postgres adapter's partial unique index closes the
//! uniqueness race at the storage layer.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use agrobase_core::{DomainError, ProducerId};
use agrobase_producers::{
    check_areas, NewProducer, Producer, ProducerFilter, ProducerPatch, TaxId,
};

use crate::repository::{LandUse, ProducerPage, ProducerRepository, RepositoryError};

/// Service operation error: a domain rejection or a propagated storage
/// failure. Domain errors are client-fault and non-retryable; storage
/// failures pass through unchanged.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Live-record count for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateFarmCount {
    pub state_code: String,
    pub count: u64,
}

/// Live-record count for one crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CropFarmCount {
    pub crop: String,
    pub count: u64,
}

/// Aggregate statistics over live records, for the reporting dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_farm_count: u64,
    pub total_area_ha: Decimal,
    pub farms_by_state: Vec<StateFarmCount>,
    pub farms_by_crop: Vec<CropFarmCount>,
    pub land_use: LandUse,
}

/// Orchestrates producer registration, queries, partial updates, soft
/// deletes, and dashboard aggregation over an injected repository.
pub struct ProducerService<R> {
    repo: R,
}

impl<R: ProducerRepository> ProducerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a producer.
    ///
    /// Validates the document, rejects documents already registered on a
    /// live record, checks the area invariant, then persists. The stored
    /// `tax_id` is the normalized digit string.
    pub async fn create(&self, input: NewProducer) -> Result<Producer, ServiceError> {
        let tax = TaxId::parse(&input.tax_id)?;

        if self.repo.find_by_tax_id(tax.digits()).await?.is_some() {
            return Err(DomainError::duplicate_document(format!(
                "{} {} is already registered",
                tax.kind().as_str(),
                tax.formatted()
            ))
            .into());
        }

        check_areas(
            input.total_area_ha,
            input.arable_area_ha,
            input.vegetation_area_ha,
        )?;

        let record = NewProducer {
            tax_id: tax.digits().to_string(),
            ..input
        };
        let stored = self.repo.insert(record).await?;
        tracing::info!(producer_id = %stored.id, "producer registered");
        Ok(stored)
    }

    /// Filtered, paginated listing of live records. `total` ignores the
    /// pagination bounds. An explicit `limit` of zero yields zero rows.
    pub async fn find_all(
        &self,
        filter: &ProducerFilter,
        limit: u32,
        skip: u32,
    ) -> Result<ProducerPage, ServiceError> {
        Ok(self.repo.find_many(filter, limit, skip).await?)
    }

    /// Fetch one live record.
    pub async fn find_one(&self, id: ProducerId) -> Result<Producer, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("producer with id {id} not found")).into())
    }

    /// Apply a partial update.
    ///
    /// When the patch touches any area field, the invariant is re-checked
    /// against the merged post-update trio; fields absent from the patch
    /// keep their current value for that check only and are not written.
    /// A patch with no area fields never re-validates areas.
    pub async fn update(
        &self,
        id: ProducerId,
        patch: ProducerPatch,
    ) -> Result<Producer, ServiceError> {
        let current = self.find_one(id).await?;

        if patch.touches_areas() {
            check_areas(
                patch.total_area_ha.unwrap_or(current.total_area_ha),
                patch.arable_area_ha.unwrap_or(current.arable_area_ha),
                patch
                    .vegetation_area_ha
                    .unwrap_or(current.vegetation_area_ha),
            )?;
        }

        self.repo.apply_update(id, patch).await?;
        self.find_one(id).await
    }

    /// Soft-delete a record. Idempotent; unknown ids are a no-op.
    pub async fn remove(&self, id: ProducerId) -> Result<(), ServiceError> {
        self.repo.apply_update(id, ProducerPatch::soft_delete()).await?;
        tracing::info!(producer_id = %id, "producer soft-deleted");
        Ok(())
    }

    /// Dashboard statistics over live records.
    ///
    /// Five independent queries against the same store; no transaction, so
    /// the only consistency guarantee is "same snapshot of live records"
    /// under a quiet store.
    pub async fn dashboard(&self) -> Result<DashboardSummary, ServiceError> {
        let total_farm_count = self.repo.aggregate_count().await?;
        let total_area_ha = self.repo.aggregate_total_area().await?;
        let farms_by_state = self
            .repo
            .aggregate_by_state()
            .await?
            .into_iter()
            .map(|g| StateFarmCount {
                state_code: g.group,
                count: g.count,
            })
            .collect();
        let farms_by_crop = self
            .repo
            .aggregate_by_crop()
            .await?
            .into_iter()
            .map(|g| CropFarmCount {
                crop: g.group,
                count: g.count,
            })
            .collect();
        let land_use = self.repo.aggregate_land_use().await?;

        Ok(DashboardSummary {
            total_farm_count,
            total_area_ha,
            farms_by_state,
            farms_by_crop,
            land_use,
        })
    }
}
