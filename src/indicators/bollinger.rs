// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the rolling *sample* standard
// deviation over the same window.  The Band Width (BBW) is the normalised
// distance: BBW = (upper - lower) / middle * 100.

use serde::{Deserialize, Serialize};

use crate::indicators::sma::{rolling_mean, rolling_std};
use crate::indicators::IndicatorSeries;
use crate::market_data::PriceSeries;

/// Bands at a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBand {
    /// Bollinger Band Width in percent of the middle band.
    ///
    /// `None` when the middle band is zero.
    pub fn width(&self) -> Option<f64> {
        if self.middle == 0.0 {
            return None;
        }
        let width = (self.upper - self.lower) / self.middle * 100.0;
        width.is_finite().then_some(width)
    }
}

/// Calculate Bollinger Bands for `closes`, aligned with the input.
///
/// Each defined entry contains:
/// - `upper`  = SMA + `num_std` * σ
/// - `middle` = SMA
/// - `lower`  = SMA - `num_std` * σ
///
/// Rows are `None` wherever either the SMA or σ is undefined, i.e. the first
/// `window - 1` rows and everything when `window < 2`.
pub fn calculate_bollinger(closes: &[f64], window: usize, num_std: f64) -> Vec<Option<BollingerBand>> {
    let middle = rolling_mean(closes, window);
    let std = rolling_std(closes, window);

    middle
        .into_iter()
        .zip(std)
        .map(|(m, s)| {
            let (middle, std_dev) = (m?, s?);
            Some(BollingerBand {
                upper: middle + num_std * std_dev,
                middle,
                lower: middle - num_std * std_dev,
            })
        })
        .collect()
}

/// Bollinger Bands of the closes of `series`.
pub fn bollinger(series: &PriceSeries, window: usize, num_std: f64) -> IndicatorSeries<BollingerBand> {
    IndicatorSeries::aligned(series, calculate_bollinger(&series.closes(), window, num_std))
}
