// =============================================================================
// Backtest Module
// =============================================================================
//
// - Round-trip extraction from signal events
// - Equity curve simulation and summary statistics

pub mod equity;
pub mod trades;

pub use equity::{simulate, EquityReport};
pub use trades::{pnl_amounts, round_trips, RoundTrip};
