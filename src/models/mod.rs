pub mod catalog;
pub mod cell;
pub mod estimate;
pub mod item;
pub mod verification;

pub use catalog::{CatalogEntry, CatalogKey, PriceObservation};
pub use cell::{parse_number, parse_number_text, Cell, Sheet};
pub use estimate::{
    Currency, EstimateMetadata, EstimateRequestItem, EstimateSection, ParsedEstimate,
    PricedEstimate, PricedItem,
};
pub use item::{Category, RawLineItem, Unit, WorkItem, TOTAL_TOLERANCE};
pub use verification::{
    ItemStatus, MatchTier, Recommendation, Verdict, VerificationResult, VerifiedItem,
};
