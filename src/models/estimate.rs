use crate::models::{Category, Unit, WorkItem};
use serde::{Deserialize, Serialize};

/// 报价原始货币
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Gel,
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rub => "RUB",
            Self::Gel => "GEL",
            Self::Usd => "USD",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "RUB" => Some(Self::Rub),
            "GEL" => Some(Self::Gel),
            "USD" => Some(Self::Usd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_sqm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

/// 解析后的报价单（基准货币）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedEstimate {
    pub items: Vec<WorkItem>,
    pub total: f64,
    pub metadata: EstimateMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequestItem {
    #[serde(default)]
    pub category: Option<Category>,
    pub name: String,
    #[serde(default)]
    pub unit: Option<Unit>,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    pub category: Category,
    pub name: String,
    pub unit: Unit,
    pub quantity: f64,
    pub price_per_unit: f64,
    pub labor_cost: f64,
    pub material_cost: f64,
    pub total: f64,
    /// 价格来自目录而非类别默认价
    pub from_catalog: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateSection {
    pub category: Category,
    pub items: Vec<PricedItem>,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedEstimate {
    pub sections: Vec<EstimateSection>,
    pub subtotal_labor: f64,
    pub subtotal_materials: f64,
    pub overhead: f64,
    pub total: f64,
}
