pub mod api;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
pub mod service;
pub mod store;

pub use api::{router, AppState};
pub use config::AppConfig;
pub use error::{EstimateError, Result};
pub use store::CatalogStore;
