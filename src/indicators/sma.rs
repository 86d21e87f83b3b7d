// =============================================================================
// Rolling statistics — Simple Moving Average, sample standard deviation, max
// =============================================================================
//
// For a window `w`, the value at index `i` is defined only when `i >= w - 1`
// and is computed over `values[i + 1 - w ..= i]`:
//
//   SMA_i = Σ x / w
//   STD_i = sqrt( Σ (x - SMA_i)² / (w - 1) )      (sample, n - 1 divisor)
//
// A window containing a non-finite value yields `None` at that index.
// =============================================================================

use crate::indicators::{finite, IndicatorSeries};
use crate::market_data::PriceSeries;

/// Rolling arithmetic mean over `window` values.
///
/// # Edge cases
/// - `window == 0` => every entry `None`
/// - `values.len() < window` => every entry `None`
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| finite(mean(w)))
}

/// Rolling sample standard deviation over `window` values.
///
/// A single observation has no sample deviation, so `window == 1` yields
/// `None` everywhere.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    rolling(values, window, |w| {
        let m = mean(w);
        let var = w.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (w.len() - 1) as f64;
        finite(var.sqrt())
    })
}

/// Rolling maximum over `window` values.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| {
        Some(w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    })
}

/// SMA of the closes of `series`.
pub fn sma(series: &PriceSeries, window: usize) -> IndicatorSeries<f64> {
    IndicatorSeries::aligned(series, rolling_mean(&series.closes(), window))
}

/// Rolling sample standard deviation of the closes of `series`.
pub fn rolling_std_dev(series: &PriceSeries, window: usize) -> IndicatorSeries<f64> {
    IndicatorSeries::aligned(series, rolling_std(&series.closes(), window))
}

// =============================================================================
// Internal helpers
// =============================================================================

fn mean(w: &[f64]) -> f64 {
    w.iter().sum::<f64>() / w.len() as f64
}

/// Apply `stat` to every full trailing window; leading rows are `None`.
fn rolling<F>(values: &[f64], window: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 || values.len() < window {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    out.extend(std::iter::repeat(None).take(window - 1));
    out.extend(values.windows(window).map(|w| {
        if w.iter().all(|x| x.is_finite()) {
            stat(w)
        } else {
            None
        }
    }));
    out
}
