// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula (span `s`):
//   alpha  = 2 / (s + 1)
//   EMA_0  = x_0
//   EMA_t  = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// The recurrence is seeded with the first value, not with an SMA, so every
// index is defined from the start of the series.
// =============================================================================

use crate::indicators::IndicatorSeries;
use crate::market_data::PriceSeries;

/// Compute the EMA of `values` for span `span`, aligned with the input.
///
/// # Edge cases
/// - `span == 0` => every entry `None` (alpha would exceed 1)
/// - empty input => empty vec
/// - A non-finite value ends the series: it and every later entry are `None`,
///   since the recurrence cannot recover from a broken state.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let next = match prev {
            None if result.is_empty() => Some(x),
            None => None,
            Some(p) => Some(alpha * x + (1.0 - alpha) * p),
        }
        .filter(|v| v.is_finite());
        result.push(next);
        prev = next;
    }

    result
}

/// EMA of an already-derived series whose rows may be undefined.
///
/// The recurrence is seeded at the first defined row; earlier rows stay
/// `None`.  Used for the MACD signal line.
pub fn calculate_ema_of(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let Some(first) = values.iter().position(Option::is_some) else {
        return vec![None; values.len()];
    };

    let tail: Vec<f64> = values[first..]
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    let mut out = vec![None; first];
    out.extend(calculate_ema(&tail, span));
    out
}

/// EMA of the closes of `series`.
pub fn ema(series: &PriceSeries, span: usize) -> IndicatorSeries<f64> {
    IndicatorSeries::aligned(series, calculate_ema(&series.closes(), span))
}
