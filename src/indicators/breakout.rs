// =============================================================================
// Breakout with volume confirmation
// =============================================================================
//
//   High_i   = max(high[i-L+1 ..= i])
//   VolAvg_i = mean(volume[i-L+1 ..= i])
//
//   breakout_i  <=>  close_i > High_{i-1}  AND  volume_i > m * VolAvg_{i-1}
//
// The comparison uses the rolling values of the *previous* bar: the current
// bar's own high is part of High_i, so comparing against it would peek at
// the bar being judged.  Defaults: L = 20, m = 1.5.  The first defined row is
// index L (L full prior bars).
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::sma::{rolling_max, rolling_mean};
use crate::indicators::IndicatorSeries;
use crate::market_data::{Bar, PriceSeries};

fn default_lookback() -> usize {
    20
}

fn default_volume_multiplier() -> f64 {
    1.5
}

/// Parameters for the breakout detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakoutParams {
    /// Rolling window for the high and the volume average.
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    /// Volume must exceed this multiple of the prior average.
    #[serde(default = "default_volume_multiplier")]
    pub volume_multiplier: f64,
}

impl Default for BreakoutParams {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            volume_multiplier: default_volume_multiplier(),
        }
    }
}

/// Breakout evaluation at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakoutPoint {
    /// Highest high of the `lookback` bars ending at the previous bar.
    pub prior_high: f64,
    /// Mean volume of the `lookback` bars ending at the previous bar.
    pub prior_volume_avg: f64,
    pub is_breakout: bool,
}

/// Evaluate the breakout rule for every bar, aligned with the input.
pub fn calculate_breakout(bars: &[Bar], params: BreakoutParams) -> Vec<Option<BreakoutPoint>> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let high_n = rolling_max(&highs, params.lookback);
    let vol_avg = rolling_mean(&volumes, params.lookback);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev = i.checked_sub(1)?;
            let (prior_high, prior_volume_avg) = (high_n[prev]?, vol_avg[prev]?);
            Some(BreakoutPoint {
                prior_high,
                prior_volume_avg,
                is_breakout: bar.close > prior_high
                    && bar.volume > params.volume_multiplier * prior_volume_avg,
            })
        })
        .collect()
}

/// Breakout evaluation over `series`.
pub fn breakout(series: &PriceSeries, params: BreakoutParams) -> IndicatorSeries<BreakoutPoint> {
    IndicatorSeries::aligned(series, calculate_breakout(series.bars(), params))
}
