use crate::config::VerificationThresholds;
use crate::error::{EstimateError, Result};
use crate::models::{
    CatalogEntry, ItemStatus, MatchTier, Recommendation, Verdict, VerificationResult,
    VerifiedItem, WorkItem,
};
use crate::service::matcher::CatalogMatcher;

pub const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct MarketPrice {
    min: f64,
    avg: f64,
    max: f64,
    tier: MatchTier,
}

/// 核验引擎
#[derive(Debug, Clone)]
pub struct Verifier {
    thresholds: VerificationThresholds,
    matcher: CatalogMatcher,
}

impl Verifier {
    pub fn new(thresholds: VerificationThresholds) -> Self {
        Self {
            thresholds,
            matcher: CatalogMatcher::new(),
        }
    }

    /// 按目录快照核验一批报价
    ///
    /// 空目录或空列表是合法输入; 数量非正或价格为负时整批失败
    pub fn verify(&self, items: &[WorkItem], catalog: &[CatalogEntry]) -> Result<VerificationResult> {
        for (index, item) in items.iter().enumerate() {
            validate(index, item)?;
        }

        // 总价为准: 外部传入的明细项需重新校正单价
        let verified: Vec<VerifiedItem> = items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                item.reconcile_total();
                self.verify_item(&item, catalog)
            })
            .collect();

        let total_contractor: f64 = verified.iter().map(|i| i.contractor_total).sum();
        let total_market_avg: f64 = verified.iter().map(|i| i.market_avg * i.quantity).sum();
        let total_overpay = (total_contractor - total_market_avg).max(0.0);
        let overpay_percent = percent_over(total_contractor, total_market_avg);
        let verdict = self.verdict(overpay_percent);
        let recommendations = recommendations(&verified);

        let matched = verified.iter().filter(|i| i.match_tier != MatchTier::None).count();
        tracing::info!(
            "verified {} items ({} matched, catalog {}): contractor {:.0}, market {:.0}, overpay {}% -> {:?}",
            verified.len(),
            matched,
            catalog.len(),
            total_contractor,
            total_market_avg,
            overpay_percent,
            verdict
        );

        Ok(VerificationResult {
            items: verified,
            total_contractor,
            total_market_avg,
            total_overpay,
            overpay_percent,
            verdict,
            recommendations,
        })
    }

    fn verify_item(&self, item: &WorkItem, catalog: &[CatalogEntry]) -> VerifiedItem {
        let market = self.market_price(item, catalog);

        let overpay_per_unit = (item.contractor_price - market.avg).max(0.0);
        let overpay_amount = (overpay_per_unit * item.quantity).round();
        let overpay_percent = percent_over(item.contractor_price, market.avg);
        let status = self.status(item.contractor_price, &market);

        if market.tier == MatchTier::None {
            tracing::debug!("no catalog match for '{}', using fallback prices", item.name);
        }

        VerifiedItem {
            category: item.category,
            name: item.name.clone(),
            unit: item.unit,
            quantity: item.quantity,
            contractor_price: item.contractor_price,
            contractor_total: item.contractor_total,
            market_min: market.min,
            market_avg: market.avg,
            market_max: market.max,
            overpay_amount,
            overpay_percent,
            status,
            match_tier: market.tier,
        }
    }

    /// 匹配到目录时用目录价, 否则以报价本身为上限
    fn market_price(&self, item: &WorkItem, catalog: &[CatalogEntry]) -> MarketPrice {
        match self.matcher.match_name(&item.name, catalog) {
            Some(hit) => MarketPrice {
                min: hit.entry.price_min,
                avg: hit.entry.price_avg,
                max: hit.entry.price_max,
                tier: hit.tier,
            },
            None => MarketPrice {
                min: item.contractor_price * self.thresholds.fallback_min_ratio,
                avg: item.contractor_price * self.thresholds.fallback_avg_ratio,
                max: item.contractor_price,
                tier: MatchTier::None,
            },
        }
    }

    fn status(&self, price: f64, market: &MarketPrice) -> ItemStatus {
        if price <= market.max * self.thresholds.ok_max_ratio {
            ItemStatus::Ok
        } else if price <= market.avg * self.thresholds.warning_avg_ratio {
            ItemStatus::Warning
        } else {
            ItemStatus::Overpay
        }
    }

    pub fn verdict(&self, overpay_percent: f64) -> Verdict {
        let t = &self.thresholds;
        if overpay_percent <= t.fair_max_percent {
            Verdict::Fair
        } else if overpay_percent <= t.slightly_overpriced_max_percent {
            Verdict::SlightlyOverpriced
        } else if overpay_percent <= t.overpriced_max_percent {
            Verdict::Overpriced
        } else {
            Verdict::Ripoff
        }
    }
}

fn validate(index: usize, item: &WorkItem) -> Result<()> {
    if !item.quantity.is_finite() || item.quantity <= 0.0 {
        return Err(EstimateError::invalid_item(
            index,
            format!("quantity must be positive, got {}", item.quantity),
        ));
    }
    if !item.contractor_price.is_finite() || item.contractor_price < 0.0 {
        return Err(EstimateError::invalid_item(
            index,
            format!("contractor_price must be non-negative, got {}", item.contractor_price),
        ));
    }
    if !item.contractor_total.is_finite() || item.contractor_total < 0.0 {
        return Err(EstimateError::invalid_item(
            index,
            format!("contractor_total must be non-negative, got {}", item.contractor_total),
        ));
    }
    Ok(())
}

fn percent_over(value: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        ((value - reference) / reference * 100.0).round().max(0.0)
    } else {
        0.0
    }
}

/// 多付项按金额降序（同额保持原顺序）
fn recommendations(items: &[VerifiedItem]) -> Vec<Recommendation> {
    let mut overpaid: Vec<&VerifiedItem> = items
        .iter()
        .filter(|i| i.status == ItemStatus::Overpay)
        .collect();
    overpaid.sort_by(|a, b| b.overpay_amount.total_cmp(&a.overpay_amount));

    overpaid
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|i| Recommendation {
            name: i.name.clone(),
            unit: i.unit,
            contractor_price: i.contractor_price,
            market_avg: i.market_avg,
            overpay_percent: i.overpay_percent,
            overpay_amount: i.overpay_amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Unit};

    fn verifier() -> Verifier {
        Verifier::new(VerificationThresholds::default())
    }

    fn entry(name: &str, min: f64, avg: f64, max: f64) -> CatalogEntry {
        CatalogEntry {
            category: Category::Walls,
            canonical_name: name.to_string(),
            unit: Unit::SquareMeter,
            price_min: min,
            price_avg: avg,
            price_max: max,
            region: "moscow".to_string(),
            sample_count: 4,
            sources: vec!["seed".to_string()],
        }
    }

    fn item(name: &str, quantity: f64, price: f64) -> WorkItem {
        WorkItem::new(
            Category::Walls,
            name,
            Unit::SquareMeter,
            quantity,
            price,
            (price * quantity).round(),
        )
    }

    #[test]
    fn double_price_is_overpay() {
        let catalog = vec![entry("Штукатурка стен", 400.0, 500.0, 600.0)];
        let result = verifier()
            .verify(&[item("Штукатурка стен", 10.0, 1000.0)], &catalog)
            .unwrap();

        let v = &result.items[0];
        assert_eq!(v.overpay_percent, 100.0);
        assert_eq!(v.overpay_amount, 5000.0);
        assert_eq!(v.status, ItemStatus::Overpay);
        assert_eq!(v.match_tier, MatchTier::Exact);
        assert_eq!(result.total_contractor, 10000.0);
        assert_eq!(result.total_market_avg, 5000.0);
        assert_eq!(result.total_overpay, 5000.0);
        assert_eq!(result.verdict, Verdict::Ripoff);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn total_overrides_inconsistent_price() {
        let catalog = vec![entry("Штукатурка стен", 300.0, 400.0, 500.0)];
        let raw = WorkItem {
            category: Category::Walls,
            name: "Штукатурка стен".to_string(),
            unit: Unit::SquareMeter,
            quantity: 10.0,
            contractor_price: 100.0,
            contractor_total: 5000.0,
        };
        let result = verifier().verify(&[raw], &catalog).unwrap();

        let v = &result.items[0];
        assert_eq!(v.contractor_price, 500.0);
        assert_eq!(v.overpay_amount, 1000.0);
        assert_eq!(v.overpay_percent, 25.0);
        assert_eq!(result.total_contractor, 5000.0);
        assert_eq!(result.total_overpay, 1000.0);
    }

    #[test]
    fn empty_catalog_uses_fallback() {
        let result = verifier().verify(&[item("Монтаж карниза", 1.0, 1000.0)], &[]).unwrap();
        let v = &result.items[0];
        assert_eq!(v.market_min, 600.0);
        assert_eq!(v.market_avg, 800.0);
        assert_eq!(v.market_max, 1000.0);
        assert_eq!(v.status, ItemStatus::Ok);
        assert_eq!(v.match_tier, MatchTier::None);
        assert_eq!(v.overpay_percent, 25.0);
        assert_eq!(result.verdict, Verdict::SlightlyOverpriced);
    }

    #[test]
    fn empty_items_are_fair() {
        let result = verifier().verify(&[], &[entry("Покраска стен", 200.0, 250.0, 300.0)]).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_contractor, 0.0);
        assert_eq!(result.total_market_avg, 0.0);
        assert_eq!(result.overpay_percent, 0.0);
        assert_eq!(result.verdict, Verdict::Fair);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn statuses_follow_thresholds() {
        let catalog = vec![entry("Покраска стен", 200.0, 250.0, 300.0)];
        let v = verifier();
        let status = |price: f64| v.verify(&[item("Покраска стен", 1.0, price)], &catalog).unwrap().items[0].status;
        assert_eq!(status(320.0), ItemStatus::Ok);
        assert_eq!(status(360.0), ItemStatus::Warning);
        assert_eq!(status(376.0), ItemStatus::Overpay);
    }

    #[test]
    fn underpay_is_not_negative() {
        let catalog = vec![entry("Покраска стен", 200.0, 250.0, 300.0)];
        let result = verifier().verify(&[item("Покраска стен", 4.0, 150.0)], &catalog).unwrap();
        assert_eq!(result.items[0].overpay_percent, 0.0);
        assert_eq!(result.items[0].overpay_amount, 0.0);
        assert_eq!(result.total_overpay, 0.0);
        assert_eq!(result.overpay_percent, 0.0);
        assert_eq!(result.verdict, Verdict::Fair);
    }

    #[test]
    fn verdict_boundaries_are_inclusive() {
        let v = verifier();
        assert_eq!(v.verdict(10.0), Verdict::Fair);
        assert_eq!(v.verdict(11.0), Verdict::SlightlyOverpriced);
        assert_eq!(v.verdict(25.0), Verdict::SlightlyOverpriced);
        assert_eq!(v.verdict(50.0), Verdict::Overpriced);
        assert_eq!(v.verdict(51.0), Verdict::Ripoff);
    }

    #[test]
    fn recommendations_keep_top_five_by_amount() {
        let catalog = vec![entry("Покраска стен", 80.0, 100.0, 120.0)];
        let items: Vec<WorkItem> = (1..=7)
            .map(|i| item("Покраска стен", i as f64, 300.0))
            .collect();
        let result = verifier().verify(&items, &catalog).unwrap();
        let amounts: Vec<f64> = result.recommendations.iter().map(|r| r.overpay_amount).collect();
        assert_eq!(amounts, vec![1400.0, 1200.0, 1000.0, 800.0, 600.0]);
    }

    #[test]
    fn contract_violations_fail_fast() {
        let mut bad = item("Покраска стен", 1.0, 100.0);
        bad.quantity = -2.0;
        let err = verifier().verify(&[item("Покраска стен", 1.0, 100.0), bad], &[]).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidWorkItem { index: 1, .. }));

        let mut nan = item("Покраска стен", 1.0, 100.0);
        nan.contractor_price = f64::NAN;
        assert!(verifier().verify(&[nan], &[]).is_err());
    }
}
