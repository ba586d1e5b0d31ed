use crate::models::{Category, Unit};
use serde::{Deserialize, Serialize};

/// 市场价的匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Substring,
    TokenOverlap,
    /// 未匹配到目录, 使用兜底价格
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Ok,
    Warning,
    Overpay,
}

/// 整体结论, 按严重程度递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Fair,
    SlightlyOverpriced,
    Overpriced,
    Ripoff,
}

/// 核验后的报价行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedItem {
    pub category: Category,
    pub name: String,
    pub unit: Unit,
    pub quantity: f64,
    pub contractor_price: f64,
    pub contractor_total: f64,
    pub market_min: f64,
    pub market_avg: f64,
    pub market_max: f64,
    pub overpay_amount: f64,
    pub overpay_percent: f64,
    pub status: ItemStatus,
    pub match_tier: MatchTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub unit: Unit,
    pub contractor_price: f64,
    pub market_avg: f64,
    pub overpay_percent: f64,
    pub overpay_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub items: Vec<VerifiedItem>,
    pub total_contractor: f64,
    pub total_market_avg: f64,
    pub total_overpay: f64,
    pub overpay_percent: f64,
    pub verdict: Verdict,
    pub recommendations: Vec<Recommendation>,
}
