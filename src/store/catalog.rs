use crate::error::{EstimateError, Result};
use crate::models::{CatalogEntry, CatalogKey, PriceObservation};
use crate::service::aggregator::{compare_entries, PriceAggregator};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 价格目录快照, 键为 (名称, 单位, 地区)
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: IndexMap<CatalogKey, CatalogEntry>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn entries_for_region(&self, region: &str) -> Vec<CatalogEntry> {
        self.entries
            .values()
            .filter(|e| e.region == region)
            .cloned()
            .collect()
    }

    /// 合并: 同键条目被替换, 其余保留
    pub fn merged_with(&self, fresh: Vec<CatalogEntry>) -> Catalog {
        let mut entries = self.entries.clone();
        for entry in fresh {
            entries.insert(entry.key(), entry);
        }
        entries.sort_by(|_, a, _, b| a.region.cmp(&b.region).then_with(|| compare_entries(a, b)));
        Catalog { entries }
    }
}

/// 重建结果
#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub region: String,
    pub observations: usize,
    /// 无效或含材料的报价数
    pub skipped: usize,
    pub outliers_removed: usize,
    pub entries: usize,
    /// 所有地区的条目总数
    pub catalog_size: usize,
    pub rebuilt_at: DateTime<Utc>,
}

/// 价格目录 - 读取方持有快照, 重建时整体替换
#[derive(Debug)]
pub struct CatalogStore {
    aggregator: PriceAggregator,
    current: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(aggregator: PriceAggregator) -> Self {
        Self {
            aggregator,
            current: RwLock::new(Arc::new(Catalog::default())),
        }
    }

    pub async fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().await.clone()
    }

    pub async fn entries_for_region(&self, region: &str) -> Vec<CatalogEntry> {
        self.snapshot().await.entries_for_region(region)
    }

    /// 聚合并合并到新快照
    pub async fn rebuild(&self, observations: &[PriceObservation], region: &str) -> Result<RebuildReport> {
        let region = region.trim();
        if region.is_empty() {
            return Err(EstimateError::InvalidObservation("region must not be empty".to_string()));
        }

        // 1. 在锁外聚合
        let (fresh, stats) = self.aggregator.aggregate_with_stats(observations, region);

        // 2. 与最新快照合并并发布
        let mut current = self.current.write().await;
        let next = Arc::new(current.merged_with(fresh));
        let catalog_size = next.len();
        *current = next;
        drop(current);

        let report = RebuildReport {
            region: region.to_string(),
            observations: stats.observations,
            skipped: stats.skipped_invalid + stats.skipped_with_materials,
            outliers_removed: stats.outliers_removed,
            entries: stats.entries,
            catalog_size,
            rebuilt_at: Utc::now(),
        };
        tracing::info!(
            "catalog rebuilt for '{}': {} entries from {} observations, catalog size {}",
            report.region,
            report.entries,
            report.observations,
            report.catalog_size
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;
    use crate::service::{Classifier, NameNormalizer, Vocabulary};

    fn store() -> CatalogStore {
        let vocab = Arc::new(Vocabulary::default());
        CatalogStore::new(PriceAggregator::new(
            NameNormalizer::new(&vocab).unwrap(),
            Classifier::new(vocab.clone()),
        ))
    }

    fn obs(name: &str, price: f64) -> PriceObservation {
        PriceObservation::new(name, Unit::SquareMeter, price, "test")
    }

    #[tokio::test]
    async fn rebuild_upserts_by_key() {
        let store = store();
        store
            .rebuild(&[obs("Покраска стен", 250.0), obs("Грунтовка стен", 80.0)], "moscow")
            .await
            .unwrap();
        let before = store.snapshot().await;

        let report = store.rebuild(&[obs("Покраска стен", 300.0)], "moscow").await.unwrap();
        assert_eq!(report.entries, 1);
        assert_eq!(report.catalog_size, 2);

        let entries = store.entries_for_region("moscow").await;
        let paint = entries.iter().find(|e| e.canonical_name == "Покраска стен").unwrap();
        assert_eq!(paint.price_avg, 300.0);
        assert!(entries.iter().any(|e| e.canonical_name == "Грунтовка стен"));

        // 旧快照不受重建影响
        let old_paint = before.entries().find(|e| e.canonical_name == "Покраска стен").unwrap();
        assert_eq!(old_paint.price_avg, 250.0);
    }

    #[tokio::test]
    async fn regions_are_kept_apart() {
        let store = store();
        store.rebuild(&[obs("Покраска стен", 250.0)], "moscow").await.unwrap();
        store.rebuild(&[obs("Покраска стен", 12.0)], "tbilisi").await.unwrap();

        assert_eq!(store.snapshot().await.len(), 2);
        assert_eq!(store.entries_for_region("tbilisi").await[0].price_avg, 12.0);
        assert!(store.entries_for_region("kazan").await.is_empty());
    }

    #[tokio::test]
    async fn blank_region_is_rejected() {
        let err = store().rebuild(&[obs("Покраска стен", 250.0)], "  ").await.unwrap_err();
        assert!(matches!(err, EstimateError::InvalidObservation(_)));
    }
}
