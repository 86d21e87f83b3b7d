// =============================================================================
// Threshold signals — RSI zones and Bollinger band touches
// =============================================================================
//
// RSI:        Buy  when RSI <  oversold   (default 30, strict)
//             Sell when RSI >  overbought (default 70, strict)
// Bollinger:  Buy  when close <= lower band
//             Sell when close >= upper band
//
// `ThresholdMode::Level` fires on every bar inside a zone.  `Cross` fires
// only on the bar that enters it (the zone condition held on this bar and not
// on the previous one, an undefined previous bar counting as "not held").
//
// A zero-width band (flat window) puts the close on both bands at once; that
// bar is reported as Hold.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::BollingerBand;
use crate::types::Signal;

/// How zone conditions turn into signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdMode {
    /// Every bar inside the zone fires.
    #[default]
    Level,
    /// Only the first bar of each visit to the zone fires.
    Cross,
}

/// Zone membership at one bar: (in buy zone, in sell zone).
type Zones = Option<(bool, bool)>;

/// RSI threshold signals, aligned with `rsi`.
pub fn rsi_signals(rsi: &[Option<f64>], oversold: f64, overbought: f64, mode: ThresholdMode) -> Vec<Option<Signal>> {
    let zones: Vec<Zones> = rsi
        .iter()
        .map(|v| v.map(|v| (v < oversold, v > overbought)))
        .collect();
    zones_to_signals(&zones, mode)
}

/// Bollinger mean-reversion signals, aligned with `closes` / `bands`.
pub fn band_signals(closes: &[f64], bands: &[Option<BollingerBand>], mode: ThresholdMode) -> Vec<Option<Signal>> {
    let zones: Vec<Zones> = closes
        .iter()
        .zip(bands)
        .map(|(&close, band)| band.map(|b| (close <= b.lower, close >= b.upper)))
        .collect();
    zones_to_signals(&zones, mode)
}

fn zones_to_signals(zones: &[Zones], mode: ThresholdMode) -> Vec<Option<Signal>> {
    zones
        .iter()
        .enumerate()
        .map(|(i, zone)| {
            let (mut buy, mut sell) = (*zone)?;
            if mode == ThresholdMode::Cross {
                let (was_buy, was_sell) = i
                    .checked_sub(1)
                    .and_then(|p| zones[p])
                    .unwrap_or((false, false));
                buy &= !was_buy;
                sell &= !was_sell;
            }
            Some(match (buy, sell) {
                (true, false) => Signal::Buy,
                (false, true) => Signal::Sell,
                _ => Signal::Hold,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(lower: f64, upper: f64) -> Option<BollingerBand> {
        Some(BollingerBand {
            upper,
            middle: (upper + lower) / 2.0,
            lower,
        })
    }

    #[test]
    fn defaults_to_level_mode_and_hold() {
        assert_eq!(ThresholdMode::default(), ThresholdMode::Level);
        assert_eq!(Signal::default(), Signal::Hold);
        let mode: ThresholdMode = serde_json::from_str("\"Cross\"").unwrap();
        assert_eq!(mode, ThresholdMode::Cross);
    }

    #[test]
    fn rsi_thresholds_are_strict() {
        let rsi = [None, Some(30.0), Some(29.9), Some(70.0), Some(70.1), Some(50.0)];
        let signals = rsi_signals(&rsi, 30.0, 70.0, ThresholdMode::Level);
        assert_eq!(
            signals,
            vec![
                None,
                Some(Signal::Hold),
                Some(Signal::Buy),
                Some(Signal::Hold),
                Some(Signal::Sell),
                Some(Signal::Hold),
            ]
        );
    }

    #[test]
    fn band_edges_are_inclusive() {
        let closes = [95.0, 90.0, 110.0, 100.0];
        let bands = [band(90.0, 110.0), band(90.0, 110.0), band(90.0, 110.0), None];
        let signals = band_signals(&closes, &bands, ThresholdMode::Level);
        assert_eq!(
            signals,
            vec![Some(Signal::Hold), Some(Signal::Buy), Some(Signal::Sell), None]
        );
    }

    #[test]
    fn level_mode_fires_every_bar_in_zone() {
        let rsi = [Some(25.0), Some(20.0), Some(28.0), Some(40.0), Some(25.0)];
        let buys = rsi_signals(&rsi, 30.0, 70.0, ThresholdMode::Level)
            .into_iter()
            .filter(|s| *s == Some(Signal::Buy))
            .count();
        assert_eq!(buys, 4);
    }

    #[test]
    fn cross_mode_fires_on_zone_entry_only() {
        let rsi = [Some(25.0), Some(20.0), Some(28.0), Some(40.0), Some(25.0)];
        let signals = rsi_signals(&rsi, 30.0, 70.0, ThresholdMode::Cross);
        assert_eq!(
            signals,
            vec![
                Some(Signal::Buy), // previous bar undefined counts as outside
                Some(Signal::Hold),
                Some(Signal::Hold),
                Some(Signal::Hold),
                Some(Signal::Buy),
            ]
        );
    }

    #[test]
    fn zero_width_band_is_hold() {
        let signals = band_signals(&[100.0], &[band(100.0, 100.0)], ThresholdMode::Level);
        assert_eq!(signals, vec![Some(Signal::Hold)]);
    }

    #[test]
    fn empty_inputs() {
        assert!(rsi_signals(&[], 30.0, 70.0, ThresholdMode::Level).is_empty());
        assert!(band_signals(&[], &[], ThresholdMode::Cross).is_empty());
    }
}
