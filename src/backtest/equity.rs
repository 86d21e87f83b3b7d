// =============================================================================
// Equity Simulator — cumulative P&L curve and summary statistics
// =============================================================================
//
//   equity_i     = initial_balance + Σ trades[0 ..= i]
//   total_profit = Σ trades
//   win_rate     = count(trade > 0) / count(trades) * 100     (0 when empty)
//   max_drawdown = max_i ( max(equity[0 ..= i]) - equity_i )  (0 when empty)
//
// The drawdown is tracked causally with a running peak, the same way the
// risk breakers track peak equity.  The initial balance itself is not a
// point on the curve, so a losing first trade is not a drawdown.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of replaying a list of trade outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityReport {
    pub initial_balance: f64,
    /// Portfolio value after each trade.
    pub curve: Vec<f64>,
    pub total_profit: f64,
    /// Percentage of trades with strictly positive P&L.
    pub win_rate: f64,
    pub wins: usize,
    pub losses: usize,
    /// Largest peak-to-trough decline in currency units.
    pub max_drawdown: f64,
    /// `max_drawdown` relative to the peak it was measured from, in percent.
    pub max_drawdown_pct: f64,
}

impl EquityReport {
    pub fn trade_count(&self) -> usize {
        self.curve.len()
    }

    /// Equity after the last trade, or the initial balance when there were none.
    pub fn final_equity(&self) -> f64 {
        self.curve.last().copied().unwrap_or(self.initial_balance)
    }
}

/// Replay `trades` (signed P&L per round trip) on top of `initial_balance`.
pub fn simulate(initial_balance: f64, trades: &[f64]) -> EquityReport {
    let curve: Vec<f64> = trades
        .iter()
        .scan(initial_balance, |equity, &pnl| {
            *equity += pnl;
            Some(*equity)
        })
        .collect();

    let total_profit: f64 = trades.iter().sum();
    let wins = trades.iter().filter(|&&t| t > 0.0).count();
    let losses = trades.iter().filter(|&&t| t < 0.0).count();
    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64 * 100.0
    };

    let (max_drawdown, max_drawdown_pct) = max_drawdown(&curve);

    debug!(
        trades = trades.len(),
        total_profit,
        win_rate,
        max_drawdown,
        "equity curve simulated"
    );

    EquityReport {
        initial_balance,
        curve,
        total_profit,
        win_rate,
        wins,
        losses,
        max_drawdown,
        max_drawdown_pct,
    }
}

/// Largest decline from a running peak, absolute and as a percentage of
/// that peak.
fn max_drawdown(curve: &[f64]) -> (f64, f64) {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    let mut worst_pct = 0.0_f64;

    for &equity in curve {
        peak = peak.max(equity);
        let drawdown = peak - equity;
        if drawdown > worst {
            worst = drawdown;
            worst_pct = if peak > 0.0 { drawdown / peak * 100.0 } else { 0.0 };
        }
    }

    (worst, worst_pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRADES: [f64; 7] = [100.0, -50.0, 200.0, -100.0, 300.0, -150.0, 250.0];

    #[test]
    fn reference_trade_list() {
        let r = simulate(100_000.0, &TRADES);
        assert_eq!(
            r.curve,
            vec![100_100.0, 100_050.0, 100_250.0, 100_150.0, 100_450.0, 100_300.0, 100_550.0]
        );
        assert_eq!(r.total_profit, 550.0);
        assert!((r.win_rate - 400.0 / 7.0).abs() < 1e-9);
        assert_eq!(format!("{:.2}", r.win_rate), "57.14");
        assert_eq!(r.max_drawdown, 150.0);
        assert_eq!(r.wins, 4);
        assert_eq!(r.losses, 3);
        assert_eq!(r.trade_count(), 7);
        assert_eq!(r.final_equity(), 100_550.0);
    }

    #[test]
    fn drawdown_pct_is_relative_to_its_peak() {
        let r = simulate(100_000.0, &TRADES);
        // 100_250 -> 100_150 is only 100; the worst decline is 100_450 -> 100_300.
        let peak_at = r.curve.iter().position(|&e| e == 100_450.0).unwrap();
        assert_eq!(peak_at, 4);
        assert_eq!(r.curve[peak_at] - r.curve[peak_at + 1], r.max_drawdown);
        assert!((r.max_drawdown_pct - 150.0 / 100_450.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn empty_trade_list_is_not_an_error() {
        let r = simulate(100_000.0, &[]);
        assert!(r.curve.is_empty());
        assert_eq!(r.win_rate, 0.0);
        assert_eq!(r.total_profit, 0.0);
        assert_eq!(r.max_drawdown, 0.0);
        assert_eq!(r.final_equity(), 100_000.0);
    }

    #[test]
    fn losing_first_trade_is_not_a_drawdown() {
        let r = simulate(1_000.0, &[-100.0]);
        assert_eq!(r.max_drawdown, 0.0);
        assert_eq!(r.win_rate, 0.0);
    }

    #[test]
    fn drawdown_spans_several_trades() {
        let r = simulate(0.0, &[50.0, -20.0, -30.0, 10.0]);
        assert_eq!(r.max_drawdown, 50.0);
    }

    #[test]
    fn breakeven_trade_is_neither_win_nor_loss() {
        let r = simulate(0.0, &[0.0, 10.0]);
        assert_eq!(r.wins, 1);
        assert_eq!(r.losses, 0);
        assert_eq!(r.win_rate, 50.0);
    }
}
