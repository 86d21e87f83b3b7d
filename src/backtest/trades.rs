// =============================================================================
// Round-trip extraction — signal events to closed long trades
// =============================================================================
//
// Life-cycle (long only, fixed quantity):
//   Flat  --Buy-->   Long   (enter at the bar's close)
//   Long  --Sell-->  Flat   (exit at the bar's close, record P&L)
//
// Buy while long, Sell while flat and Hold are ignored.  A position still
// open after the last event is not a closed trade and is not reported.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signals::SignalEvent;
use crate::types::Signal;

/// One closed long position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
}

/// Pair Buy/Sell events into round trips.  `events` must be in bar order
/// and belong to a single strategy.
pub fn round_trips(events: &[SignalEvent], quantity: f64) -> Vec<RoundTrip> {
    let mut open: Option<&SignalEvent> = None;
    let mut trades = Vec::new();

    for event in events {
        match (event.signal, open) {
            (Signal::Buy, None) => open = Some(event),
            (Signal::Sell, Some(entry)) => {
                trades.push(RoundTrip {
                    entry_index: entry.index,
                    exit_index: event.index,
                    entry_time: entry.timestamp,
                    exit_time: event.timestamp,
                    entry_price: entry.price,
                    exit_price: event.price,
                    quantity,
                    pnl: (event.price - entry.price) * quantity,
                });
                open = None;
            }
            _ => {}
        }
    }

    trades
}

/// The P&L amounts of `trips`, in order, for the equity simulator.
pub fn pnl_amounts(trips: &[RoundTrip]) -> Vec<f64> {
    trips.iter().map(|t| t.pnl).collect()
}
