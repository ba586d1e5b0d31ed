pub mod aggregator;
pub mod classifier;
pub mod currency;
pub mod estimator;
pub mod extractor;
pub mod matcher;
pub mod normalizer;
pub mod pipeline;
pub mod verifier;
pub mod vocabulary;

pub use aggregator::{AggregationStats, PriceAggregator};
pub use classifier::Classifier;
pub use currency::CurrencyNormalizer;
pub use estimator::EstimatePricer;
pub use extractor::TabularExtractor;
pub use matcher::{CatalogMatch, CatalogMatcher};
pub use normalizer::NameNormalizer;
pub use pipeline::EstimateParser;
pub use verifier::Verifier;
pub use vocabulary::Vocabulary;
