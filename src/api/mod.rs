pub mod handlers;

pub use handlers::*;

use crate::config::AppConfig;
use crate::error::Result;
use crate::service::{
    Classifier, CurrencyNormalizer, EstimateParser, EstimatePricer, NameNormalizer,
    PriceAggregator, Verifier, Vocabulary,
};
use crate::store::CatalogStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 共享状态: 各引擎组件与价格目录
#[derive(Clone)]
pub struct AppState {
    pub parser: Arc<EstimateParser>,
    pub verifier: Arc<Verifier>,
    pub pricer: Arc<EstimatePricer>,
    pub catalog: Arc<CatalogStore>,
    pub default_region: Arc<str>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let vocab = Arc::new(Vocabulary::default());
        let aggregator = PriceAggregator::new(NameNormalizer::new(&vocab)?, Classifier::new(vocab.clone()));

        Ok(Self {
            parser: Arc::new(EstimateParser::new(
                vocab.clone(),
                CurrencyNormalizer::new(config.currency.clone()),
            )),
            verifier: Arc::new(Verifier::new(config.verification.clone())),
            pricer: Arc::new(EstimatePricer::new(vocab, &config.estimate)),
            catalog: Arc::new(CatalogStore::new(aggregator)),
            default_region: Arc::from(config.catalog.region.as_str()),
        })
    }

    /// 未指定地区时使用默认地区
    pub fn region_or_default<'a>(&'a self, region: Option<&'a str>) -> &'a str {
        region.unwrap_or(&*self.default_region)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/extract", post(extract))
        .route("/api/extract/xlsx", post(extract_xlsx))
        .route("/api/verify", post(verify))
        .route("/api/estimate", post(estimate))
        .route("/api/catalog", get(list_catalog))
        .route("/api/catalog/rebuild", post(rebuild_catalog))
        .with_state(state)
}
