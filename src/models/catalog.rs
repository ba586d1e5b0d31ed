use crate::models::{Category, Unit};
use serde::{Deserialize, Serialize};

/// 单条市场报价 - 用于聚合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub raw_name: String,
    pub unit: Unit,
    pub price: f64,
    pub source_id: String,
    /// 含材料费的报价, 不参与聚合
    #[serde(default)]
    pub includes_materials: bool,
    #[serde(default)]
    pub category: Option<Category>,
}

impl PriceObservation {
    pub fn new(raw_name: impl Into<String>, unit: Unit, price: f64, source_id: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            unit,
            price,
            source_id: source_id.into(),
            includes_materials: false,
            category: None,
        }
    }
}

/// 聚合后的目录价格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: Category,
    pub canonical_name: String,
    pub unit: Unit,
    pub price_min: f64,
    pub price_avg: f64,
    pub price_max: f64,
    pub region: String,
    pub sample_count: usize,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl CatalogEntry {
    pub fn key(&self) -> CatalogKey {
        CatalogKey {
            canonical_name: self.canonical_name.clone(),
            unit: self.unit,
            region: self.region.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    pub canonical_name: String,
    pub unit: Unit,
    pub region: String,
}
