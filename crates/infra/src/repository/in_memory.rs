use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use agrobase_core::ProducerId;
use agrobase_producers::{NewProducer, Producer, ProducerFilter, ProducerPatch};

use super::{GroupCount, LandUse, ProducerPage, ProducerRepository, RepositoryError};

/// In-memory producer store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryProducerRepository {
    records: RwLock<HashMap<ProducerId, Producer>>,
}

impl InMemoryProducerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_matching(&self, filter: &ProducerFilter) -> Result<Vec<Producer>, RepositoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;

        let mut matches: Vec<Producer> = records
            .values()
            .filter(|p| !p.deleted)
            .filter(|p| {
                filter
                    .state_code
                    .as_deref()
                    .is_none_or(|s| p.state_code == s)
            })
            .filter(|p| filter.city.as_deref().is_none_or(|c| p.city == c))
            .cloned()
            .collect();

        // Newest first, matching the Postgres ORDER BY.
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(matches)
    }
}

#[async_trait]
impl ProducerRepository for InMemoryProducerRepository {
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Producer>, RepositoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;
        Ok(records
            .values()
            .find(|p| !p.deleted && p.tax_id == tax_id)
            .cloned())
    }

    async fn find_by_id(&self, id: ProducerId) -> Result<Option<Producer>, RepositoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;
        Ok(records.get(&id).filter(|p| !p.deleted).cloned())
    }

    async fn find_many(
        &self,
        filter: &ProducerFilter,
        limit: u32,
        skip: u32,
    ) -> Result<ProducerPage, RepositoryError> {
        let matches = self.live_matching(filter)?;
        let total = matches.len() as u64;
        let results = matches
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        Ok(ProducerPage { results, total })
    }

    async fn insert(&self, record: NewProducer) -> Result<Producer, RepositoryError> {
        let now = Utc::now();
        let producer = Producer {
            id: ProducerId::new(),
            tax_id: record.tax_id,
            owner_name: record.owner_name,
            city: record.city,
            state_code: record.state_code,
            farm_name: record.farm_name,
            total_area_ha: record.total_area_ha,
            arable_area_ha: record.arable_area_ha,
            vegetation_area_ha: record.vegetation_area_ha,
            crops: record.crops,
            created_at: now,
            updated_at: now,
            deleted: false,
        };

        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;
        records.insert(producer.id, producer.clone());
        Ok(producer)
    }

    async fn apply_update(
        &self,
        id: ProducerId,
        patch: ProducerPatch,
    ) -> Result<(), RepositoryError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;

        if let Some(p) = records.get_mut(&id) {
            if let Some(v) = patch.owner_name {
                p.owner_name = v;
            }
            if let Some(v) = patch.city {
                p.city = v;
            }
            if let Some(v) = patch.state_code {
                p.state_code = v;
            }
            if let Some(v) = patch.farm_name {
                p.farm_name = v;
            }
            if let Some(v) = patch.total_area_ha {
                p.total_area_ha = v;
            }
            if let Some(v) = patch.arable_area_ha {
                p.arable_area_ha = v;
            }
            if let Some(v) = patch.vegetation_area_ha {
                p.vegetation_area_ha = v;
            }
            if let Some(v) = patch.crops {
                p.crops = v;
            }
            if let Some(v) = patch.deleted {
                p.deleted = v;
            }
            p.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn aggregate_count(&self) -> Result<u64, RepositoryError> {
        Ok(self.live_matching(&ProducerFilter::default())?.len() as u64)
    }

    async fn aggregate_total_area(&self) -> Result<Decimal, RepositoryError> {
        Ok(self
            .live_matching(&ProducerFilter::default())?
            .iter()
            .map(|p| p.total_area_ha)
            .sum())
    }

    async fn aggregate_by_state(&self) -> Result<Vec<GroupCount>, RepositoryError> {
        let mut groups: BTreeMap<String, u64> = BTreeMap::new();
        for p in self.live_matching(&ProducerFilter::default())? {
            *groups.entry(p.state_code).or_default() += 1;
        }
        Ok(groups
            .into_iter()
            .map(|(group, count)| GroupCount { group, count })
            .collect())
    }

    async fn aggregate_by_crop(&self) -> Result<Vec<GroupCount>, RepositoryError> {
        let mut groups: BTreeMap<String, u64> = BTreeMap::new();
        for p in self.live_matching(&ProducerFilter::default())? {
            for crop in p.crops {
                *groups.entry(crop.as_str().to_string()).or_default() += 1;
            }
        }
        Ok(groups
            .into_iter()
            .map(|(group, count)| GroupCount { group, count })
            .collect())
    }

    async fn aggregate_land_use(&self) -> Result<LandUse, RepositoryError> {
        let live = self.live_matching(&ProducerFilter::default())?;
        Ok(LandUse {
            total_arable_ha: live.iter().map(|p| p.arable_area_ha).sum(),
            total_vegetation_ha: live.iter().map(|p| p.vegetation_area_ha).sum(),
        })
    }
}
