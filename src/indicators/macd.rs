// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(fast) - EMA(slow)          (default 12 / 26)
//   Signal    = EMA(MACD, signal)              (default 9)
//   Histogram = MACD - Signal
//
// All three EMAs use the seeded recurrence from `ema.rs`.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::ema::{calculate_ema, calculate_ema_of};
use crate::indicators::IndicatorSeries;
use crate::market_data::PriceSeries;

fn default_fast() -> usize {
    12
}

fn default_slow() -> usize {
    26
}

fn default_signal() -> usize {
    9
}

/// EMA spans for the MACD calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    #[serde(default = "default_fast")]
    pub fast: usize,
    #[serde(default = "default_slow")]
    pub slow: usize,
    #[serde(default = "default_signal")]
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: default_fast(),
            slow: default_slow(),
            signal: default_signal(),
        }
    }
}

/// MACD line, signal line and histogram at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Compute MACD for `closes`, aligned with the input.
pub fn calculate_macd(closes: &[f64], params: MacdParams) -> Vec<Option<MacdPoint>> {
    let fast = calculate_ema(closes, params.fast);
    let slow = calculate_ema(closes, params.slow);

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = calculate_ema_of(&line, params.signal);

    line.iter()
        .zip(&signal)
        .map(|(m, s)| {
            let (macd, signal) = ((*m)?, (*s)?);
            Some(MacdPoint {
                macd,
                signal,
                histogram: macd - signal,
            })
        })
        .collect()
}

/// MACD of the closes of `series`.
pub fn macd(series: &PriceSeries, params: MacdParams) -> IndicatorSeries<MacdPoint> {
    IndicatorSeries::aligned(series, calculate_macd(&series.closes(), params))
}
