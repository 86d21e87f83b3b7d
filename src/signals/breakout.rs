use crate::indicators::BreakoutPoint;
use crate::types::Signal;

/// Buy on a confirmed breakout, Hold otherwise; `None` where the breakout
/// rule is not yet defined.  The rule is entry-only and never emits Sell.
pub fn breakout_signals(points: &[Option<BreakoutPoint>]) -> Vec<Option<Signal>> {
    points
        .iter()
        .map(|p| p.map(|p| if p.is_breakout { Signal::Buy } else { Signal::Hold }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(is_breakout: bool) -> Option<BreakoutPoint> {
        Some(BreakoutPoint {
            prior_high: 100.0,
            prior_volume_avg: 1_000.0,
            is_breakout,
        })
    }

    #[test]
    fn maps_breakouts_to_buy() {
        let signals = breakout_signals(&[None, point(false), point(true)]);
        assert_eq!(signals, vec![None, Some(Signal::Hold), Some(Signal::Buy)]);
    }
}
