// =============================================================================
// Strategy Lab — technical-analysis core
// =============================================================================
//
// Data flows one way:
//   loader -> indicators -> signals -> (reporting surface)
// and independently:
//   trade P&L -> equity simulator
//
// Everything below `market_data::loader` is a pure function over in-memory
// series; no module keeps state between calls.
// =============================================================================

pub mod backtest;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod portfolio;
pub mod runtime_config;
pub mod signals;
pub mod strategy;
pub mod types;

pub use error::AnalysisError;
pub use market_data::{Bar, PriceSeries};
pub use types::{Signal, StrategyKind};
