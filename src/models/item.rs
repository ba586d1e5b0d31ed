use serde::{Deserialize, Serialize};
use std::fmt;

/// 工程类别
///
/// 声明顺序即目录排序顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Preparation,
    Demolition,
    Walls,
    Floors,
    Ceilings,
    Tiling,
    Electrical,
    Plumbing,
    Doors,
    Windows,
    RoughWork,
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Self::Preparation,
        Self::Demolition,
        Self::Walls,
        Self::Floors,
        Self::Ceilings,
        Self::Tiling,
        Self::Electrical,
        Self::Plumbing,
        Self::Doors,
        Self::Windows,
        Self::RoughWork,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparation => "preparation",
            Self::Demolition => "demolition",
            Self::Walls => "walls",
            Self::Floors => "floors",
            Self::Ceilings => "ceilings",
            Self::Tiling => "tiling",
            Self::Electrical => "electrical",
            Self::Plumbing => "plumbing",
            Self::Doors => "doors",
            Self::Windows => "windows",
            Self::RoughWork => "rough_work",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == v)
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 计量单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    /// м²
    #[serde(rename = "m2", alias = "м²")]
    SquareMeter,
    /// м.п.
    #[serde(rename = "lm", alias = "м.п.")]
    LinearMeter,
    /// шт
    #[serde(rename = "pcs", alias = "шт")]
    Piece,
    /// точка
    #[serde(rename = "point", alias = "точка")]
    Point,
    /// компл.
    #[serde(rename = "set", alias = "компл.")]
    Set,
    /// м³
    #[serde(rename = "m3", alias = "м³")]
    CubicMeter,
}

impl Unit {
    pub const ALL: [Unit; 6] = [
        Self::SquareMeter,
        Self::LinearMeter,
        Self::Piece,
        Self::Point,
        Self::Set,
        Self::CubicMeter,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::SquareMeter => "m2",
            Self::LinearMeter => "lm",
            Self::Piece => "pcs",
            Self::Point => "point",
            Self::Set => "set",
            Self::CubicMeter => "m3",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::SquareMeter => "м²",
            Self::LinearMeter => "м.п.",
            Self::Piece => "шт",
            Self::Point => "точка",
            Self::Set => "компл.",
            Self::CubicMeter => "м³",
        }
    }

    /// 解析编码 (`m2`) 或符号 (`м²`)
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|u| u.code() == v || u.symbol() == v)
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::SquareMeter
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 提取出的原始行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    pub name: String,
    pub unit: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub line_total: Option<f64>,
}

/// 总价与 `round(单价 * 数量)` 的允许误差
pub const TOTAL_TOLERANCE: f64 = 1.0;

/// 报价明细项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub category: Category,
    pub name: String,
    #[serde(default)]
    pub unit: Unit,
    pub quantity: f64,
    pub contractor_price: f64,
    pub contractor_total: f64,
}

impl WorkItem {
    /// 构建明细项; 总价与单价不一致时以总价为准, 重新计算单价
    pub fn new(
        category: Category,
        name: impl Into<String>,
        unit: Unit,
        quantity: f64,
        contractor_price: f64,
        contractor_total: f64,
    ) -> Self {
        let mut item = Self {
            category,
            name: name.into(),
            unit,
            quantity,
            contractor_price,
            contractor_total,
        };
        item.reconcile_total();
        item
    }

    pub fn is_consistent(&self) -> bool {
        (self.contractor_total - (self.contractor_price * self.quantity).round()).abs()
            <= TOTAL_TOLERANCE
    }

    pub fn reconcile_total(&mut self) {
        if self.quantity > 0.0 && !self.is_consistent() {
            self.contractor_price = self.contractor_total / self.quantity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_wins_over_inconsistent_price() {
        let item = WorkItem::new(Category::Walls, "Штукатурка", Unit::SquareMeter, 100.0, 501.0, 50050.0);
        assert!((item.contractor_price - 500.5).abs() < 1e-9);
        assert!(item.is_consistent());
    }

    #[test]
    fn consistent_item_is_untouched() {
        let item = WorkItem::new(Category::Walls, "Штукатурка", Unit::SquareMeter, 3.0, 333.0, 1000.0);
        assert_eq!(item.contractor_price, 333.0);
    }

    #[test]
    fn unit_parses_code_and_symbol() {
        assert_eq!(Unit::parse("м²"), Some(Unit::SquareMeter));
        assert_eq!(Unit::parse("PCS"), Some(Unit::Piece));
        assert_eq!(Unit::parse("ведро"), None);
    }

    #[test]
    fn unit_deserializes_symbol_alias() {
        let unit: Unit = serde_json::from_str("\"м.п.\"").unwrap();
        assert_eq!(unit, Unit::LinearMeter);
        assert_eq!(serde_json::to_string(&Unit::LinearMeter).unwrap(), "\"lm\"");
    }

    #[test]
    fn category_order_is_declaration_order() {
        assert!(Category::Preparation < Category::Walls);
        assert!(Category::RoughWork < Category::Other);
        assert_eq!(Category::parse("rough_work"), Some(Category::RoughWork));
    }
}
