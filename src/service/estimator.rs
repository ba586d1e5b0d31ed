use crate::config::EstimateConfig;
use crate::error::{EstimateError, Result};
use crate::models::{
    CatalogEntry, Category, EstimateRequestItem, EstimateSection, PricedEstimate, PricedItem,
};
use crate::service::classifier::Classifier;
use crate::service::matcher::CatalogMatcher;
use crate::service::vocabulary::{contains_any, Vocabulary};
use indexmap::IndexMap;
use std::sync::Arc;

/// 目录中无数据时的默认单价
pub fn default_price(category: Category) -> f64 {
    match category {
        Category::Preparation => 150.0,
        Category::Demolition => 200.0,
        Category::Walls => 400.0,
        Category::Floors => 500.0,
        Category::Ceilings => 500.0,
        Category::Tiling => 900.0,
        Category::Electrical => 800.0,
        Category::Plumbing => 2000.0,
        Category::Doors => 3000.0,
        Category::Windows => 2500.0,
        Category::RoughWork => 600.0,
        Category::Other => 500.0,
    }
}

/// 各类别的材料费占比
pub fn category_material_ratio(category: Category) -> f64 {
    match category {
        Category::Preparation => 0.1,
        Category::Demolition => 0.0,
        Category::Walls => 0.4,
        Category::Floors => 0.5,
        Category::Ceilings => 0.35,
        Category::Tiling => 0.7,
        Category::Electrical => 0.6,
        Category::Plumbing => 0.5,
        Category::Doors => 0.1,
        Category::Windows => 0.2,
        Category::RoughWork => 0.3,
        Category::Other => 0.3,
    }
}

const CONSUMABLES_RATIO: f64 = 0.15;
const MATERIAL_HEAVY_RATIO: f64 = 0.7;

/// 估价器
#[derive(Debug, Clone)]
pub struct EstimatePricer {
    vocab: Arc<Vocabulary>,
    classifier: Classifier,
    matcher: CatalogMatcher,
    overhead_ratio: f64,
}

impl EstimatePricer {
    pub fn new(vocab: Arc<Vocabulary>, config: &EstimateConfig) -> Self {
        Self {
            classifier: Classifier::new(vocab.clone()),
            vocab,
            matcher: CatalogMatcher::new(),
            overhead_ratio: config.overhead_ratio,
        }
    }

    pub fn price(&self, items: &[EstimateRequestItem], catalog: &[CatalogEntry]) -> Result<PricedEstimate> {
        let mut sections: IndexMap<Category, EstimateSection> = IndexMap::new();
        let mut from_catalog = 0usize;

        for (index, request) in items.iter().enumerate() {
            if !request.quantity.is_finite() || request.quantity <= 0.0 {
                return Err(EstimateError::invalid_item(
                    index,
                    format!("quantity must be positive, got {}", request.quantity),
                ));
            }
            let item = self.price_item(request, catalog);
            if item.from_catalog {
                from_catalog += 1;
            }

            let section = sections.entry(item.category).or_insert_with(|| EstimateSection {
                category: item.category,
                items: Vec::new(),
                subtotal: 0.0,
            });
            section.subtotal += item.total;
            section.items.push(item);
        }

        let (labor, materials) = sections
            .values()
            .flat_map(|s| s.items.iter())
            .fold((0.0, 0.0), |(l, m), i| (l + i.labor_cost, m + i.material_cost));
        let overhead = ((labor + materials) * self.overhead_ratio).round();

        tracing::info!(
            "priced {} works in {} sections ({} from catalog): labor {:.0}, materials {:.0}, overhead {:.0}",
            items.len(),
            sections.len(),
            from_catalog,
            labor,
            materials,
            overhead
        );

        Ok(PricedEstimate {
            sections: sections.into_values().collect(),
            subtotal_labor: labor,
            subtotal_materials: materials,
            overhead,
            total: labor + materials + overhead,
        })
    }

    fn price_item(&self, request: &EstimateRequestItem, catalog: &[CatalogEntry]) -> PricedItem {
        let category = request
            .category
            .unwrap_or_else(|| self.classifier.classify(&request.name));
        let unit = request
            .unit
            .unwrap_or_else(|| self.classifier.infer_unit(None, &request.name));

        let hit = self.matcher.match_name(&request.name, catalog);
        let price_per_unit = hit
            .map(|m| m.entry.price_avg)
            .unwrap_or_else(|| default_price(category));

        let labor_cost = (price_per_unit * request.quantity).round();
        let material_cost = (labor_cost * self.material_ratio(category, &request.name)).round();

        PricedItem {
            category,
            name: request.name.clone(),
            unit,
            quantity: request.quantity,
            price_per_unit,
            labor_cost,
            material_cost,
            total: labor_cost + material_cost,
            from_catalog: hit.is_some(),
        }
    }

    pub fn material_ratio(&self, category: Category, name: &str) -> f64 {
        let name = name.to_lowercase();
        let keywords = &self.vocab.materials;
        if contains_any(&name, &keywords.labor_only) {
            0.0
        } else if contains_any(&name, &keywords.consumables) {
            CONSUMABLES_RATIO
        } else if contains_any(&name, &keywords.material_heavy) {
            MATERIAL_HEAVY_RATIO
        } else {
            category_material_ratio(category)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    fn pricer() -> EstimatePricer {
        EstimatePricer::new(Arc::new(Vocabulary::default()), &EstimateConfig { overhead_ratio: 0.1 })
    }

    fn request(name: &str, quantity: f64) -> EstimateRequestItem {
        EstimateRequestItem {
            category: None,
            name: name.to_string(),
            unit: None,
            quantity,
        }
    }

    fn entry(name: &str, avg: f64) -> CatalogEntry {
        CatalogEntry {
            category: Category::Walls,
            canonical_name: name.to_string(),
            unit: Unit::SquareMeter,
            price_min: avg,
            price_avg: avg,
            price_max: avg,
            region: "moscow".to_string(),
            sample_count: 1,
            sources: Vec::new(),
        }
    }

    #[test]
    fn catalog_price_then_category_default() {
        let catalog = vec![entry("Штукатурка стен по маякам", 450.0)];
        let estimate = pricer()
            .price(&[request("Штукатурка стен по маякам", 20.0), request("Установка двери", 2.0)], &catalog)
            .unwrap();

        assert_eq!(estimate.sections.len(), 2);
        let plaster = &estimate.sections[0].items[0];
        assert!(plaster.from_catalog);
        assert_eq!(plaster.labor_cost, 9000.0);
        assert_eq!(plaster.material_cost, 1350.0);

        let door = &estimate.sections[1].items[0];
        assert_eq!(door.category, Category::Doors);
        assert_eq!(door.unit, Unit::Piece);
        assert!(!door.from_catalog);
        assert_eq!(door.price_per_unit, 3000.0);
        assert_eq!(door.material_cost, 600.0);

        assert_eq!(estimate.subtotal_labor, 15000.0);
        assert_eq!(estimate.subtotal_materials, 1950.0);
        assert_eq!(estimate.overhead, 1695.0);
        assert_eq!(estimate.total, 18645.0);
    }

    #[test]
    fn sections_keep_first_seen_order() {
        let estimate = pricer()
            .price(
                &[
                    request("Установка розетки", 10.0),
                    request("Демонтаж плитки", 5.0),
                    request("Установка выключателя", 4.0),
                ],
                &[],
            )
            .unwrap();
        let order: Vec<Category> = estimate.sections.iter().map(|s| s.category).collect();
        assert_eq!(order, vec![Category::Electrical, Category::Demolition]);
        assert_eq!(estimate.sections[0].items.len(), 2);
        assert_eq!(estimate.sections[1].items[0].material_cost, 0.0);
    }

    #[test]
    fn material_tiers() {
        let p = pricer();
        assert_eq!(p.material_ratio(Category::Floors, "Вынос мусора"), 0.0);
        assert_eq!(p.material_ratio(Category::Walls, "Грунтовка стен"), 0.15);
        assert_eq!(p.material_ratio(Category::Tiling, "Укладка плитка"), 0.7);
        assert_eq!(p.material_ratio(Category::Ceilings, "Монтаж короба"), 0.35);
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(pricer().price(&[request("Покраска стен", 0.0)], &[]).is_err());
    }
}
