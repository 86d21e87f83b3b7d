// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the
// strategies.  Every slice-level function returns a `Vec<Option<T>>` aligned
// index-for-index with its input: `None` marks a row that is not yet
// computable (insufficient history) or whose value would be non-finite.
// `IndicatorSeries` attaches the bar timestamps for consumers.

pub mod bollinger;
pub mod breakout;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::market_data::PriceSeries;

pub use bollinger::BollingerBand;
pub use breakout::{BreakoutParams, BreakoutPoint};
pub use macd::{MacdParams, MacdPoint};
pub use rsi::RsiZone;

/// One row of an indicator, aligned to a source bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint<T> {
    pub timestamp: DateTime<Utc>,
    pub value: Option<T>,
}

/// Indicator values aligned to the timestamps of a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSeries<T> {
    points: Vec<IndicatorPoint<T>>,
}

impl<T: Copy> IndicatorSeries<T> {
    /// Pair `values` with the timestamps of `source`.
    ///
    /// Slice-level functions always return one value per input element, so
    /// the lengths match; any surplus on either side is dropped.
    pub fn aligned(source: &PriceSeries, values: Vec<Option<T>>) -> Self {
        let points = source
            .bars()
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint {
                timestamp: bar.timestamp,
                value,
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[IndicatorPoint<T>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at `index`, `None` when out of range or undefined.
    pub fn get(&self, index: usize) -> Option<T> {
        self.points.get(index).and_then(|p| p.value)
    }

    /// The raw aligned values.
    pub fn values(&self) -> Vec<Option<T>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Only the computable rows, as `(timestamp, value)`.
    pub fn defined(&self) -> impl Iterator<Item = (DateTime<Utc>, T)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.timestamp, v)))
    }

    /// Most recent computable value.
    pub fn last_defined(&self) -> Option<T> {
        self.points.iter().rev().find_map(|p| p.value)
    }

    /// Apply `f` to every defined value, keeping alignment.
    pub fn map<U, F>(&self, mut f: F) -> IndicatorSeries<U>
    where
        F: FnMut(T) -> Option<U>,
    {
        IndicatorSeries {
            points: self
                .points
                .iter()
                .map(|p| IndicatorPoint {
                    timestamp: p.timestamp,
                    value: p.value.and_then(&mut f),
                })
                .collect(),
        }
    }
}

/// Keep finite values only.
pub(crate) fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};

    use crate::market_data::{Bar, PriceSeries};

    /// Daily bars with the given closes; high = close, volume = 1000.
    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000.0,
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    pub fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "got {a}, expected {b}");
    }
}
