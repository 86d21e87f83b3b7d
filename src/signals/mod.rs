// =============================================================================
// Signals Module
// =============================================================================
//
// Stateless rules turning indicator values into Buy / Sell / Hold:
// - Crossover of two lines (SMA golden/death cross, MACD vs signal line)
// - Threshold zones (RSI oversold/overbought, Bollinger band touches)
// - Breakout confirmation
//
// Every rule returns a `Vec<Option<Signal>>` aligned with its inputs; `None`
// means the bar is not eligible (indicator not yet defined).  Rules never
// look at other strategies: conflicting signals on the same bar are left for
// the consumer to resolve.

pub mod breakout;
pub mod crossover;
pub mod threshold;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::market_data::PriceSeries;
use crate::types::{Signal, StrategyKind};

pub use breakout::breakout_signals;
pub use crossover::{crossover_signals, crossover_state};
pub use threshold::{band_signals, rsi_signals, ThresholdMode};

/// A signal attached to a concrete bar, ready for plotting or backtesting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub strategy: StrategyKind,
    pub signal: Signal,
    /// Close of the bar; the natural anchor for a chart marker.
    pub price: f64,
}

/// Attach bar context to an aligned signal vector, dropping ineligible rows.
pub fn to_events(series: &PriceSeries, strategy: StrategyKind, signals: &[Option<Signal>]) -> Vec<SignalEvent> {
    series
        .bars()
        .iter()
        .zip(signals)
        .enumerate()
        .filter_map(|(index, (bar, signal))| {
            signal.map(|signal| SignalEvent {
                index,
                timestamp: bar.timestamp,
                strategy,
                signal,
                price: bar.close,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::series_from_closes;

    #[test]
    fn events_skip_ineligible_rows() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        let events = to_events(
            &series,
            StrategyKind::Rsi,
            &[None, Some(Signal::Hold), Some(Signal::Buy)],
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].index, 2);
        assert_eq!(events[1].signal, Signal::Buy);
        assert_eq!(events[1].price, 3.0);
        assert_eq!(events[1].timestamp, series.bars()[2].timestamp);
        assert_eq!(events[1].strategy, StrategyKind::Rsi);
    }
}
