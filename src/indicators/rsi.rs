// =============================================================================
// Relative Strength Index (RSI) — simple rolling averages
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — delta_i = close_i - close_{i-1}
//          gain_i  = max(delta_i, 0),  loss_i = max(-delta_i, 0)
// Step 2 — avg_gain / avg_loss = arithmetic mean of the last `period`
//          gains / losses (a plain rolling window, not Wilder's smoothing).
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The first defined value is at index `period` (the first close has no
// delta).  When avg_loss is zero the RSI is 100, including a perfectly flat
// window: there was no selling pressure to measure.
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSeries;
use crate::market_data::PriceSeries;

/// Value returned when the window contains no losses.
pub const RSI_NO_LOSS: f64 = 100.0;

/// Coarse reading of a single RSI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Compute the RSI series for `closes` and look-back `period`, aligned with
/// the input.
///
/// # Edge cases
/// - `period == 0` => every entry `None`
/// - `closes.len() < period + 1` => every entry `None`
/// - avg_loss == 0 => [`RSI_NO_LOSS`]
/// - A window touching a non-finite close yields `None`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || closes.len() < period + 1 {
        return vec![None; closes.len()];
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // --- One value per full window of `period` deltas ------------------------
    let period_f = period as f64;
    let mut result = vec![None; period];
    result.extend(deltas.windows(period).map(|window| {
        if !window.iter().all(|d| d.is_finite()) {
            return None;
        }
        let (sum_gain, sum_loss) = window.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });
        rsi_from_averages(sum_gain / period_f, sum_loss / period_f)
    }));

    result
}

/// RSI of the closes of `series`.
pub fn rsi(series: &PriceSeries, period: usize) -> IndicatorSeries<f64> {
    IndicatorSeries::aligned(series, calculate_rsi(&series.closes(), period))
}

/// Classify an RSI value against the given thresholds (inclusive).
pub fn classify(value: f64, oversold: f64, overbought: f64) -> RsiZone {
    if value >= overbought {
        RsiZone::Overbought
    } else if value <= oversold {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

/// Convenience function: return the most recent RSI value together with its
/// zone under the conventional 30 / 70 thresholds.
///
/// Returns `None` when there is insufficient data.
pub fn current_rsi(closes: &[f64], period: usize) -> Option<(f64, RsiZone)> {
    let value = calculate_rsi(closes, period).into_iter().rev().flatten().next()?;
    Some((value, classify(value, 30.0, 70.0)))
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        RSI_NO_LOSS
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::assert_close;

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_insufficient_data() {
        // Need period+1 closes (period deltas). 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(calculate_rsi(&closes, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_all_gains_minimal_length() {
        // Exactly period + 1 increasing closes: one defined value, avg_loss = 0.
        let closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 15);
        assert!(series[..14].iter().all(Option::is_none));
        assert_close(series[14].unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        for v in series.iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_uses_no_loss_convention() {
        let series = calculate_rsi(&[100.0; 30], 14);
        for v in series.iter().flatten() {
            assert_close(*v, RSI_NO_LOSS);
        }
    }

    #[test]
    fn rsi_simple_average_known_value() {
        // period 2: deltas +2, -1 => avg_gain 1, avg_loss 0.5, RS 2, RSI 66.67
        let series = calculate_rsi(&[10.0, 12.0, 11.0], 2);
        assert_close(series[2].unwrap(), 100.0 - 100.0 / 3.0);
    }

    #[test]
    fn rsi_window_rolls_off_old_deltas() {
        // period 2: window at index 3 is deltas [-1, -1] => RSI 0.
        let series = calculate_rsi(&[10.0, 12.0, 11.0, 10.0], 2);
        assert_close(series[3].unwrap(), 0.0);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in calculate_rsi(&closes, 14).iter().flatten() {
            assert!((0.0..=100.0).contains(v), "RSI {v} out of range");
        }
    }

    // ---- current_rsi -----------------------------------------------------

    #[test]
    fn current_rsi_overbought() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let (val, zone) = current_rsi(&closes, 14).unwrap();
        assert_close(val, 100.0);
        assert_eq!(zone, RsiZone::Overbought);
    }

    #[test]
    fn current_rsi_oversold() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let (val, zone) = current_rsi(&closes, 14).unwrap();
        assert!(val.abs() < 1e-10);
        assert_eq!(zone, RsiZone::Oversold);
    }

    #[test]
    fn current_rsi_neutral() {
        let (_, zone) = current_rsi(&[10.0, 12.0, 11.0, 12.0, 11.5], 4).unwrap();
        assert_eq!(zone, RsiZone::Neutral);
    }

    #[test]
    fn current_rsi_none_on_bad_input() {
        assert!(current_rsi(&[], 14).is_none());
    }
}
