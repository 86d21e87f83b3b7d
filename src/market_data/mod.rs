pub mod loader;
pub mod price_series;
pub mod synthetic;

// Re-export the core data types for convenient access (e.g. `use crate::market_data::Bar`).
pub use loader::{JsonFileLoader, PriceLoader};
pub use price_series::{Bar, PriceSeries};
pub use synthetic::SyntheticLoader;
