//! In-process cache of parsed reference datasets
//!
//! Datasets are immutable once imported, so a parsed copy is kept per id
//! for the life of the process and shared between requests.

use parking_lot::RwLock;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::estimation::{EstimationError, ReferenceDataset};

pub struct DatasetCache {
    entries: RwLock<HashMap<Uuid, Arc<ReferenceDataset>>>,
    load_timeout: Duration,
}

impl DatasetCache {
    pub fn new(load_timeout: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            load_timeout,
        }
    }

    pub fn cached(&self, id: Uuid) -> Option<Arc<ReferenceDataset>> {
        self.entries.read().get(&id).cloned()
    }

    /// Cache a parsed dataset. An entry already present wins.
    pub fn insert(&self, dataset: ReferenceDataset) -> Arc<ReferenceDataset> {
        self.entries
            .write()
            .entry(dataset.id())
            .or_insert_with(|| Arc::new(dataset))
            .clone()
    }

    /// Parsed dataset for `id`, loading it from PostgreSQL on first use.
    pub async fn get(&self, db: &PgPool, id: Uuid) -> ApiResult<Arc<ReferenceDataset>> {
        if let Some(dataset) = self.cached(id) {
            return Ok(dataset);
        }

        let load = sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT document FROM estimate_datasets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db);

        let document = tokio::time::timeout(self.load_timeout, load)
            .await
            .map_err(|_| {
                tracing::warn!(dataset_id = %id, timeout_secs = self.load_timeout.as_secs(), "Dataset load timed out");
                ApiError::Timeout("Loading the reference dataset timed out".to_string())
            })??
            .ok_or(EstimationError::MissingDataset(id))?;

        let dataset = ReferenceDataset::from_slice(id, &document)?;
        tracing::info!(
            dataset_id = %id,
            name = dataset.name(),
            tables = dataset.table_count(),
            "Reference dataset loaded"
        );
        Ok(self.insert(dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(id: Uuid, name: &str) -> ReferenceDataset {
        ReferenceDataset::from_tables(id, name, HashMap::new())
    }

    #[test]
    fn test_insert_and_lookup() {
        let cache = DatasetCache::new(Duration::from_secs(1));
        let id = Uuid::new_v4();
        assert!(cache.cached(id).is_none());

        cache.insert(dataset(id, "first"));
        assert_eq!(cache.cached(id).unwrap().name(), "first");
        assert!(cache.cached(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = DatasetCache::new(Duration::from_secs(1));
        let id = Uuid::new_v4();

        let first = cache.insert(dataset(id, "first"));
        let second = cache.insert(dataset(id, "second"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.name(), "first");
    }
}
