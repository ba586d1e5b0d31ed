use crate::models::{Currency, ParsedEstimate, RawLineItem, Sheet, WorkItem};
use crate::service::classifier::Classifier;
use crate::service::currency::CurrencyNormalizer;
use crate::service::extractor::TabularExtractor;
use crate::service::vocabulary::Vocabulary;
use std::sync::Arc;

/// 工作表 -> 基准货币明细项
#[derive(Debug, Clone)]
pub struct EstimateParser {
    vocab: Arc<Vocabulary>,
    extractor: TabularExtractor,
    classifier: Classifier,
    currency: CurrencyNormalizer,
}

impl EstimateParser {
    pub fn new(vocab: Arc<Vocabulary>, currency: CurrencyNormalizer) -> Self {
        Self {
            extractor: TabularExtractor::new(vocab.clone()),
            classifier: Classifier::new(vocab.clone()),
            vocab,
            currency,
        }
    }

    /// 各工作表独立提取后合并, 货币和元数据取自第一个工作表
    pub fn parse_sheets(&self, sheets: &[Sheet]) -> ParsedEstimate {
        let Some(first) = sheets.first() else {
            return ParsedEstimate::default();
        };

        // 1. 货币与元数据
        let source = self
            .currency
            .detect(&self.vocab, first)
            .unwrap_or_else(|| self.currency.default_source());
        let mut metadata = self.extractor.extract_metadata(first);
        metadata.currency = Some(source);

        // 2. 行 -> 明细项
        let items: Vec<WorkItem> = sheets
            .iter()
            .flat_map(|sheet| self.extractor.extract_sheet(sheet))
            .filter_map(|raw| self.to_work_item(raw, source))
            .collect();

        let total: f64 = items.iter().map(|i| i.contractor_total).sum();
        tracing::info!(
            "parsed {} sheets: {} items, total {:.0} {} (source {})",
            sheets.len(),
            items.len(),
            total,
            self.currency.base().code(),
            source.code()
        );

        ParsedEstimate { items, total, metadata }
    }

    fn to_work_item(&self, raw: RawLineItem, source: Currency) -> Option<WorkItem> {
        let (quantity, price, total) = match (raw.quantity, raw.unit_price, raw.line_total) {
            (Some(q), Some(p), Some(t)) => (q, p, t),
            _ => return None,
        };
        let category = self.classifier.classify(&raw.name);
        let unit = self.classifier.infer_unit(raw.unit.as_deref(), &raw.name);

        Some(WorkItem::new(
            category,
            raw.name,
            unit,
            quantity,
            self.currency.to_base(price, source),
            self.currency.to_base(total, source),
        ))
    }
}
