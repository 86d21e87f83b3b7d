use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::market_data::price_series::{Bar, PriceSeries};

/// Source of historical bars for one instrument.
///
/// `start` is inclusive, `end` exclusive; `end == None` means "up to the
/// latest available bar".  Implementations return
/// [`AnalysisError::DataUnavailable`] for unknown symbols, unreadable data
/// or an empty range.
pub trait PriceLoader {
    fn load(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, AnalysisError>;

    /// Like [`load`](Self::load), but a `DataUnavailable` outcome becomes an
    /// empty series so downstream analysis still runs.  Other errors pass
    /// through.
    fn load_or_empty(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, AnalysisError> {
        match self.load(symbol, start, end) {
            Err(e @ AnalysisError::DataUnavailable { .. }) => {
                warn!(error = %e, "no data, continuing with an empty series");
                Ok(PriceSeries::empty(symbol))
            }
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON file loader
// ---------------------------------------------------------------------------

/// Reads `<dir>/<SYMBOL>.json`, a JSON array of bar objects.
///
/// Each object carries `timestamp` (RFC 3339 string, `YYYY-MM-DD` date or
/// epoch milliseconds) and `open`, `high`, `low`, `close`, `volume`.  Prices
/// may be JSON numbers or numeric strings, as most exchange exports use.
#[derive(Debug, Clone)]
pub struct JsonFileLoader {
    dir: PathBuf,
}

impl JsonFileLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.json"))
    }
}

impl PriceLoader for JsonFileLoader {
    fn load(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, AnalysisError> {
        let path = self.path_for(symbol);
        let bars = read_bars(symbol, &path)?;
        let total = bars.len();

        let series = PriceSeries::new(symbol, bars)?.between(start, end);
        debug!(symbol, path = %path.display(), total, kept = series.len(), "bars read from file");

        if series.is_empty() {
            return Err(AnalysisError::unavailable(
                symbol,
                format!("no bars between {start} and {}", describe_end(end)),
            ));
        }

        info!(symbol, bars = series.len(), "price series loaded");
        Ok(series)
    }
}

pub(crate) fn describe_end(end: Option<NaiveDate>) -> String {
    end.map_or_else(|| "latest".to_string(), |e| e.to_string())
}

fn read_bars(symbol: &str, path: &Path) -> Result<Vec<Bar>, AnalysisError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AnalysisError::unavailable(symbol, format!("cannot read {}: {e}", path.display()))
    })?;

    let root: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        AnalysisError::unavailable(symbol, format!("invalid JSON in {}: {e}", path.display()))
    })?;

    let rows = root
        .as_array()
        .ok_or_else(|| AnalysisError::unavailable(symbol, "expected a JSON array of bars"))?;

    let mut bars = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            parse_bar(row).map_err(|reason| {
                AnalysisError::unavailable(symbol, format!("bar {i}: {reason}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Exports are not always chronological; duplicates are still rejected
    // by `PriceSeries::new`.
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

fn parse_bar(row: &serde_json::Value) -> Result<Bar, String> {
    Ok(Bar {
        timestamp: parse_timestamp(&row["timestamp"])?,
        open: parse_f64(&row["open"], "open")?,
        high: parse_f64(&row["high"], "high")?,
        low: parse_f64(&row["low"], "low")?,
        close: parse_f64(&row["close"], "close")?,
        volume: parse_f64(&row["volume"], "volume")?,
    })
}

fn parse_timestamp(val: &serde_json::Value) -> Result<DateTime<Utc>, String> {
    match val {
        serde_json::Value::String(s) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Ok(ts.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| format!("unrecognised timestamp {s:?}"))
        }
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| format!("timestamp {n} is out of range")),
        serde_json::Value::Null => Err("missing field timestamp".to_string()),
        _ => Err("field timestamp has unexpected JSON type".to_string()),
    }
}

/// Numbers may arrive as JSON numbers or as numeric strings.
fn parse_f64(val: &serde_json::Value, name: &str) -> Result<f64, String> {
    match val {
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| format!("failed to parse {name} as f64: {s}")),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("field {name} is not a valid f64")),
        serde_json::Value::Null => Err(format!("missing field {name}")),
        _ => Err(format!("field {name} has unexpected JSON type")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"timestamp": "2024-01-03", "open": 101, "high": 103, "low": 100, "close": 102, "volume": 1200},
        {"timestamp": "2024-01-02T00:00:00Z", "open": "100.0", "high": "101.5", "low": "99.0", "close": "101.0", "volume": "1000"},
        {"timestamp": 1704326400000, "open": 102, "high": 104, "low": 101, "close": 103.5, "volume": 900}
    ]"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loader_with(symbol: &str, content: &str) -> (tempfile::TempDir, JsonFileLoader) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(format!("{symbol}.json")), content).unwrap();
        let loader = JsonFileLoader::new(dir.path());
        (dir, loader)
    }

    #[test]
    fn loads_and_sorts_mixed_formats() {
        let (_dir, loader) = loader_with("TCS.NS", SAMPLE);
        let series = loader.load("TCS.NS", date(2024, 1, 1), None).unwrap();
        assert_eq!(series.symbol(), "TCS.NS");
        assert_eq!(series.closes(), vec![101.0, 102.0, 103.5]);
    }

    #[test]
    fn applies_date_range() {
        let (_dir, loader) = loader_with("TCS.NS", SAMPLE);
        let series = loader
            .load("TCS.NS", date(2024, 1, 3), Some(date(2024, 1, 4)))
            .unwrap();
        assert_eq!(series.closes(), vec![102.0]);
    }

    #[test]
    fn unknown_symbol_is_unavailable() {
        let (_dir, loader) = loader_with("TCS.NS", SAMPLE);
        let err = loader.load("INFY.NS", date(2024, 1, 1), None).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable { ref symbol, .. } if symbol == "INFY.NS"));
    }

    #[test]
    fn empty_range_is_unavailable() {
        let (_dir, loader) = loader_with("TCS.NS", SAMPLE);
        let err = loader.load("TCS.NS", date(2025, 1, 1), None).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable { .. }));
    }

    #[test]
    fn malformed_bar_is_reported() {
        let (_dir, loader) = loader_with("BAD", r#"[{"timestamp": "2024-01-02", "open": 1}]"#);
        let err = loader.load("BAD", date(2024, 1, 1), None).unwrap_err();
        assert!(err.to_string().contains("missing field high"), "{err}");
    }

    #[test]
    fn duplicate_timestamps_are_rejected() {
        let (_dir, loader) = loader_with(
            "DUP",
            r#"[
                {"timestamp": "2024-01-02", "open": 1, "high": 1, "low": 1, "close": 1, "volume": 1},
                {"timestamp": "2024-01-02", "open": 2, "high": 2, "low": 2, "close": 2, "volume": 2}
            ]"#,
        );
        let err = loader.load("DUP", date(2024, 1, 1), None).unwrap_err();
        assert!(matches!(err, AnalysisError::UnorderedSeries { index: 1, .. }));
    }

    #[test]
    fn missing_data_falls_back_to_empty_series() {
        let (_dir, loader) = loader_with("TCS.NS", SAMPLE);
        let series = loader
            .load_or_empty("INFY.NS", date(2024, 1, 1), None)
            .unwrap();
        assert!(series.is_empty());
        assert_eq!(series.symbol(), "INFY.NS");

        let series = loader
            .load_or_empty("TCS.NS", date(2024, 1, 1), None)
            .unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn fallback_keeps_other_errors() {
        let (_dir, loader) = loader_with(
            "DUP",
            r#"[
                {"timestamp": "2024-01-02", "open": 1, "high": 1, "low": 1, "close": 1, "volume": 1},
                {"timestamp": "2024-01-02", "open": 2, "high": 2, "low": 2, "close": 2, "volume": 2}
            ]"#,
        );
        let err = loader
            .load_or_empty("DUP", date(2024, 1, 1), None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UnorderedSeries { .. }));
    }
}
