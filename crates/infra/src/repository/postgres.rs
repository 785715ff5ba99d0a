//! Postgres-backed producer repository.
//!
//! Queries are bound at runtime (`sqlx::query` + `try_get`); the schema
//! lives in `migrations/` and is applied on connect. Uniqueness of live
//! `tax_id`s is backstopped by a partial unique index, so a racing insert
//! that slips past the service's read-then-check surfaces as a storage
//! error instead of a silent duplicate.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use agrobase_core::ProducerId;
use agrobase_producers::{Crop, NewProducer, Producer, ProducerFilter, ProducerPatch};

use super::{GroupCount, LandUse, ProducerPage, ProducerRepository, RepositoryError};

const PRODUCER_COLUMNS: &str = "id, tax_id, owner_name, city, state_code, farm_name, \
     total_area_ha, arable_area_ha, vegetation_area_ha, crops, created_at, updated_at, deleted";

pub struct PostgresProducerRepository {
    pool: PgPool,
}

impl PostgresProducerRepository {
    /// Connect a small pool and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        tracing::info!("connected to postgres and applied migrations");
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}

fn row_to_producer(row: &PgRow) -> Result<Producer, RepositoryError> {
    let crop_tokens: Vec<String> = row.try_get("crops")?;
    let crops = crop_tokens
        .iter()
        .map(|s| {
            Crop::parse(s)
                .ok_or_else(|| RepositoryError::Storage(format!("unknown crop in storage: {s}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Producer {
        id: ProducerId::from_uuid(row.try_get::<Uuid, _>("id")?),
        tax_id: row.try_get("tax_id")?,
        owner_name: row.try_get("owner_name")?,
        city: row.try_get("city")?,
        state_code: row.try_get("state_code")?,
        farm_name: row.try_get("farm_name")?,
        total_area_ha: row.try_get("total_area_ha")?,
        arable_area_ha: row.try_get("arable_area_ha")?,
        vegetation_area_ha: row.try_get("vegetation_area_ha")?,
        crops,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted: row.try_get("deleted")?,
    })
}

fn crop_tokens(crops: &[Crop]) -> Vec<String> {
    crops.iter().map(|c| c.as_str().to_string()).collect()
}

#[async_trait]
impl ProducerRepository for PostgresProducerRepository {
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Producer>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers WHERE tax_id = $1 AND NOT deleted"
        ))
        .bind(tax_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_producer).transpose()
    }

    async fn find_by_id(&self, id: ProducerId) -> Result<Option<Producer>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers WHERE id = $1 AND NOT deleted"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_producer).transpose()
    }

    async fn find_many(
        &self,
        filter: &ProducerFilter,
        limit: u32,
        skip: u32,
    ) -> Result<ProducerPage, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers \
             WHERE NOT deleted \
               AND ($1::TEXT IS NULL OR state_code = $1) \
               AND ($2::TEXT IS NULL OR city = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.state_code.as_deref())
        .bind(filter.city.as_deref())
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(&self.pool)
        .await?;

        let results = rows
            .iter()
            .map(row_to_producer)
            .collect::<Result<Vec<_>, _>>()?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM producers \
             WHERE NOT deleted \
               AND ($1::TEXT IS NULL OR state_code = $1) \
               AND ($2::TEXT IS NULL OR city = $2)",
        )
        .bind(filter.state_code.as_deref())
        .bind(filter.city.as_deref())
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        Ok(ProducerPage {
            results,
            total: total as u64,
        })
    }

    async fn insert(&self, record: NewProducer) -> Result<Producer, RepositoryError> {
        let id = ProducerId::new();
        let row = sqlx::query(&format!(
            "INSERT INTO producers \
               (id, tax_id, owner_name, city, state_code, farm_name, \
                total_area_ha, arable_area_ha, vegetation_area_ha, crops) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PRODUCER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(&record.tax_id)
        .bind(&record.owner_name)
        .bind(&record.city)
        .bind(&record.state_code)
        .bind(&record.farm_name)
        .bind(record.total_area_ha)
        .bind(record.arable_area_ha)
        .bind(record.vegetation_area_ha)
        .bind(crop_tokens(&record.crops))
        .fetch_one(&self.pool)
        .await?;

        row_to_producer(&row)
    }

    async fn apply_update(
        &self,
        id: ProducerId,
        patch: ProducerPatch,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE producers SET \
               owner_name = COALESCE($2, owner_name), \
               city = COALESCE($3, city), \
               state_code = COALESCE($4, state_code), \
               farm_name = COALESCE($5, farm_name), \
               total_area_ha = COALESCE($6, total_area_ha), \
               arable_area_ha = COALESCE($7, arable_area_ha), \
               vegetation_area_ha = COALESCE($8, vegetation_area_ha), \
               crops = COALESCE($9::TEXT[], crops), \
               deleted = COALESCE($10, deleted), \
               updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(patch.owner_name.as_deref())
        .bind(patch.city.as_deref())
        .bind(patch.state_code.as_deref())
        .bind(patch.farm_name.as_deref())
        .bind(patch.total_area_ha)
        .bind(patch.arable_area_ha)
        .bind(patch.vegetation_area_ha)
        .bind(patch.crops.as_deref().map(crop_tokens))
        .bind(patch.deleted)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn aggregate_count(&self) -> Result<u64, RepositoryError> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM producers WHERE NOT deleted")
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;
        Ok(total as u64)
    }

    async fn aggregate_total_area(&self) -> Result<Decimal, RepositoryError> {
        let total: Decimal = sqlx::query(
            "SELECT COALESCE(SUM(total_area_ha), 0) AS total FROM producers WHERE NOT deleted",
        )
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;
        Ok(total)
    }

    async fn aggregate_by_state(&self) -> Result<Vec<GroupCount>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT state_code, COUNT(*) AS farms FROM producers \
             WHERE NOT deleted GROUP BY state_code ORDER BY state_code",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(GroupCount {
                    group: row.try_get("state_code")?,
                    count: row.try_get::<i64, _>("farms")? as u64,
                })
            })
            .collect()
    }

    async fn aggregate_by_crop(&self) -> Result<Vec<GroupCount>, RepositoryError> {
        // Each record fans out into one row per declared crop.
        let rows = sqlx::query(
            "SELECT c.crop, COUNT(*) AS farms \
             FROM producers CROSS JOIN LATERAL unnest(crops) AS c(crop) \
             WHERE NOT deleted GROUP BY c.crop ORDER BY c.crop",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(GroupCount {
                    group: row.try_get("crop")?,
                    count: row.try_get::<i64, _>("farms")? as u64,
                })
            })
            .collect()
    }

    async fn aggregate_land_use(&self) -> Result<LandUse, RepositoryError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(arable_area_ha), 0) AS arable, \
                    COALESCE(SUM(vegetation_area_ha), 0) AS vegetation \
             FROM producers WHERE NOT deleted",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(LandUse {
            total_arable_ha: row.try_get("arable")?,
            total_vegetation_ha: row.try_get("vegetation")?,
        })
    }
}
