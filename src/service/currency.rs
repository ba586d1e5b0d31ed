use crate::config::CurrencyConfig;
use crate::models::{Currency, Sheet};
use crate::service::vocabulary::{first_hit, Vocabulary};

const CURRENCY_SCAN_ROWS: usize = 20;

/// 货币换算
#[derive(Debug, Clone)]
pub struct CurrencyNormalizer {
    config: CurrencyConfig,
}

impl CurrencyNormalizer {
    pub fn new(config: CurrencyConfig) -> Self {
        Self { config }
    }

    pub fn base(&self) -> Currency {
        self.config.base
    }

    pub fn default_source(&self) -> Currency {
        self.config.default_source
    }

    pub fn rate(&self, currency: Currency) -> f64 {
        let to_rub = |c: Currency| match c {
            Currency::Rub => self.config.rates.rub,
            Currency::Gel => self.config.rates.gel,
            Currency::Usd => self.config.rates.usd,
        };
        to_rub(currency) / to_rub(self.config.base)
    }

    /// `round(amount * rate)`
    pub fn to_base(&self, amount: f64, from: Currency) -> f64 {
        if from == self.config.base {
            return amount;
        }
        (amount * self.rate(from)).round()
    }

    /// 在前几行中查找货币标记
    pub fn detect(&self, vocab: &Vocabulary, sheet: &Sheet) -> Option<Currency> {
        sheet
            .rows
            .iter()
            .take(CURRENCY_SCAN_ROWS)
            .flat_map(|row| row.iter())
            .filter_map(|cell| cell.as_text())
            .find_map(|text| first_hit(&vocab.currency_markers, &text.to_lowercase()))
    }
}
