use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronologically ordered bars for one instrument.
///
/// Timestamps are strictly increasing.  Gaps (weekends, holidays) are
/// expected and not checked.  An empty series is a valid value: every
/// indicator maps it to an empty output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, rejecting duplicate or out-of-order timestamps.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, AnalysisError> {
        let symbol = symbol.into();
        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(AnalysisError::UnorderedSeries {
                symbol,
                index: pos + 1,
            });
        }
        Ok(Self { symbol, bars })
    }

    /// An empty series for `symbol`.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Close of the most recent bar, if any.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// New series restricted to `start <= date < end` (UTC calendar dates).
    /// `end == None` keeps everything from `start` on.
    pub fn between(&self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        let bars = self
            .bars
            .iter()
            .filter(|b| {
                let day = b.timestamp.date_naive();
                day >= start && end.map_or(true, |e| day < e)
            })
            .copied()
            .collect();
        Self {
            symbol: self.symbol.clone(),
            bars,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn accepts_increasing_with_gaps() {
        let s = PriceSeries::new("AAPL", vec![bar(2, 1.0), bar(3, 2.0), bar(8, 3.0)]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(s.last_close(), Some(3.0));
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let err = PriceSeries::new("AAPL", vec![bar(2, 1.0), bar(3, 2.0), bar(3, 2.5)]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnorderedSeries {
                symbol: "AAPL".into(),
                index: 2
            }
        );
    }

    #[test]
    fn rejects_out_of_order() {
        assert!(PriceSeries::new("AAPL", vec![bar(5, 1.0), bar(4, 2.0)]).is_err());
    }

    #[test]
    fn empty_series_is_valid() {
        let s = PriceSeries::new("AAPL", Vec::new()).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.last_close(), None);
    }

    #[test]
    fn between_is_start_inclusive_end_exclusive() {
        let s = PriceSeries::new("X", (1..=10).map(|d| bar(d, d as f64)).collect()).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(s.between(start, Some(end)).closes(), vec![3.0, 4.0, 5.0]);
        assert_eq!(s.between(start, None).len(), 8);
    }
}
