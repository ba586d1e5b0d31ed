use crate::models::{CatalogEntry, Category, PriceObservation, Unit};
use crate::service::classifier::Classifier;
use crate::service::normalizer::{capitalize, NameNormalizer};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// 样本数少于此值时不剔除异常值
pub const MIN_SAMPLES_FOR_OUTLIERS: usize = 4;
pub const IQR_FACTOR: f64 = 1.5;

/// 聚合统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationStats {
    pub observations: usize,
    pub skipped_invalid: usize,
    pub skipped_with_materials: usize,
    pub groups: usize,
    pub outliers_removed: usize,
    pub entries: usize,
}

#[derive(Debug)]
struct PriceGroup {
    canonical_name: String,
    category: Option<Category>,
    unit: Unit,
    prices: Vec<f64>,
    sources: BTreeSet<String>,
}

/// 价格聚合器 - 原始报价 -> 目录条目
#[derive(Debug, Clone)]
pub struct PriceAggregator {
    normalizer: NameNormalizer,
    classifier: Classifier,
}

impl PriceAggregator {
    pub fn new(normalizer: NameNormalizer, classifier: Classifier) -> Self {
        Self { normalizer, classifier }
    }

    pub fn aggregate(&self, observations: &[PriceObservation], region: &str) -> Vec<CatalogEntry> {
        self.aggregate_with_stats(observations, region).0
    }

    /// 全量聚合, 相同输入得到相同输出
    pub fn aggregate_with_stats(
        &self,
        observations: &[PriceObservation],
        region: &str,
    ) -> (Vec<CatalogEntry>, AggregationStats) {
        let mut stats = AggregationStats {
            observations: observations.len(),
            ..Default::default()
        };

        // 1. 校验并剔除含材料的报价
        let usable: Vec<&PriceObservation> = observations
            .iter()
            .filter(|o| {
                if !o.price.is_finite() || o.price <= 0.0 || o.raw_name.trim().is_empty() {
                    tracing::warn!("skipping invalid observation from '{}': {:?}", o.source_id, o.raw_name);
                    stats.skipped_invalid += 1;
                    return false;
                }
                if o.includes_materials {
                    stats.skipped_with_materials += 1;
                    return false;
                }
                true
            })
            .collect();

        // 2. 并行计算标准名称（保持顺序）
        let keyed: Vec<(String, &PriceObservation)> = usable
            .par_iter()
            .map(|o| (self.normalizer.canonical_key(&o.raw_name), *o))
            .collect();

        // 3. 按 (名称, 单位) 分组
        let mut groups: IndexMap<(String, Unit), PriceGroup> = IndexMap::new();
        for (key, obs) in keyed {
            let group = groups.entry((key.clone(), obs.unit)).or_insert_with(|| PriceGroup {
                canonical_name: capitalize(&key),
                category: obs.category,
                unit: obs.unit,
                prices: Vec::new(),
                sources: BTreeSet::new(),
            });
            group.prices.push(obs.price);
            group.sources.insert(obs.source_id.clone());
        }
        stats.groups = groups.len();

        // 4. 剔除异常值, 计算 min / avg / max
        let mut entries: Vec<CatalogEntry> = Vec::with_capacity(groups.len());
        for group in groups.into_values() {
            let cleaned = remove_outliers(&group.prices);
            stats.outliers_removed += group.prices.len() - cleaned.len();
            if cleaned.is_empty() {
                continue;
            }

            let sum: f64 = cleaned.iter().sum();
            let category = group
                .category
                .unwrap_or_else(|| self.classifier.classify(&group.canonical_name));
            entries.push(CatalogEntry {
                category,
                canonical_name: group.canonical_name,
                unit: group.unit,
                price_min: cleaned[0],
                price_avg: (sum / cleaned.len() as f64).round(),
                price_max: cleaned[cleaned.len() - 1],
                region: region.to_string(),
                sample_count: cleaned.len(),
                sources: group.sources.into_iter().collect(),
            });
        }

        // 5. 排序
        entries.sort_by(compare_entries);
        stats.entries = entries.len();

        tracing::info!(
            "aggregated region '{}': {} observations -> {} groups -> {} entries ({} outliers, {} invalid, {} with materials)",
            region,
            stats.observations,
            stats.groups,
            stats.entries,
            stats.outliers_removed,
            stats.skipped_invalid,
            stats.skipped_with_materials
        );

        (entries, stats)
    }
}

/// 四分位边界 `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`, 分位点取 `floor(n/4)` 和 `floor(3n/4)`
/// 样本太少时返回 None
pub fn iqr_bounds(prices: &[f64]) -> Option<(f64, f64)> {
    if prices.len() < MIN_SAMPLES_FOR_OUTLIERS {
        return None;
    }
    let sorted = sorted(prices);
    let n = sorted.len() as f64;
    let q1 = sorted[(n * 0.25).floor() as usize];
    let q3 = sorted[(n * 0.75).floor() as usize];
    let iqr = q3 - q1;
    Some((q1 - IQR_FACTOR * iqr, q3 + IQR_FACTOR * iqr))
}

pub fn remove_outliers(prices: &[f64]) -> Vec<f64> {
    let sorted = sorted(prices);
    match iqr_bounds(prices) {
        Some((lower, upper)) => sorted.into_iter().filter(|p| *p >= lower && *p <= upper).collect(),
        None => sorted,
    }
}

fn sorted(prices: &[f64]) -> Vec<f64> {
    let mut sorted = prices.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// 类别 -> 排序键 -> 原名
pub fn compare_entries(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| collation_key(&a.canonical_name).cmp(&collation_key(&b.canonical_name)))
        .then_with(|| a.canonical_name.cmp(&b.canonical_name))
        .then_with(|| a.unit.cmp(&b.unit))
}

/// 小写, `ё` 视为 `е`
pub fn collation_key(name: &str) -> String {
    name.to_lowercase().replace('ё', "е")
}
