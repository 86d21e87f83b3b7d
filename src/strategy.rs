// =============================================================================
// Strategy Engine — indicators, signals and backtest for one series
// =============================================================================
//
// Pipeline per run:
//   1. Compute the indicators the enabled strategies need (each once)
//   2. Turn them into aligned Buy / Sell / Hold signals per strategy
//   3. Attach bar context (timestamp, close) to every eligible signal
//   4. Pair each strategy's Buy/Sell events into long round trips
//   5. Replay the round-trip P&L through the equity simulator
//   6. Output an AnalysisReport for the reporting surface
//
// Strategies never see each other's signals.  An empty series produces a
// valid report with empty series, no events and zero-trade backtests.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backtest::{pnl_amounts, round_trips, simulate, EquityReport, RoundTrip};
use crate::error::AnalysisError;
use crate::indicators::bollinger::bollinger;
use crate::indicators::breakout::breakout;
use crate::indicators::macd::macd;
use crate::indicators::rsi::{classify, rsi};
use crate::indicators::sma::sma;
use crate::indicators::{BollingerBand, BreakoutPoint, IndicatorSeries, MacdPoint, RsiZone};
use crate::market_data::PriceSeries;
use crate::runtime_config::{BacktestParams, RuntimeConfig, StrategyParams};
use crate::signals::{
    band_signals, breakout_signals, crossover_signals, rsi_signals, to_events, SignalEvent,
};
use crate::types::{Signal, StrategyKind};

// =============================================================================
// Report types
// =============================================================================

/// Indicator series computed for a run.  Only those needed by the enabled
/// strategies are present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_fast: Option<IndicatorSeries<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_slow: Option<IndicatorSeries<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<IndicatorSeries<BollingerBand>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<IndicatorSeries<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<IndicatorSeries<MacdPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakout: Option<IndicatorSeries<BreakoutPoint>>,
}

/// Everything one strategy produced.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
    pub strategy: StrategyKind,
    /// One event per eligible bar, Hold included.
    pub events: Vec<SignalEvent>,
    pub buys: usize,
    pub sells: usize,
    pub trades: Vec<RoundTrip>,
    pub equity: EquityReport,
}

impl StrategyOutcome {
    /// Buy and Sell events only.
    pub fn actionable(&self) -> impl Iterator<Item = &SignalEvent> {
        self.events.iter().filter(|e| e.signal.is_actionable())
    }
}

/// Latest RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RsiReading {
    pub value: f64,
    pub zone: RsiZone,
}

/// Full output of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub symbol: String,
    pub bars: usize,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub last_close: Option<f64>,
    pub latest_rsi: Option<RsiReading>,
    pub indicators: IndicatorSet,
    pub strategies: Vec<StrategyOutcome>,
}

impl AnalysisReport {
    pub fn outcome(&self, strategy: StrategyKind) -> Option<&StrategyOutcome> {
        self.strategies.iter().find(|o| o.strategy == strategy)
    }
}

// =============================================================================
// Strategy Engine
// =============================================================================

/// Runs the enabled strategies over a price series.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    params: StrategyParams,
    strategies: Vec<StrategyKind>,
    backtest: BacktestParams,
}

impl StrategyEngine {
    /// Build an engine, rejecting invalid parameters up front.
    ///
    /// Duplicate strategies are collapsed; order is preserved.
    pub fn new(
        params: StrategyParams,
        strategies: &[StrategyKind],
        backtest: BacktestParams,
    ) -> Result<Self, AnalysisError> {
        params.validate()?;
        let mut unique: Vec<StrategyKind> = Vec::with_capacity(strategies.len());
        for s in strategies {
            if !unique.contains(s) {
                unique.push(*s);
            }
        }
        Ok(Self {
            params,
            strategies: unique,
            backtest,
        })
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<Self, AnalysisError> {
        Self::new(
            config.strategy_params.clone(),
            &config.strategies,
            config.backtest.clone(),
        )
    }

    pub fn strategies(&self) -> &[StrategyKind] {
        &self.strategies
    }

    /// Analyse `series` with every enabled strategy.
    pub fn run(&self, series: &PriceSeries) -> AnalysisReport {
        let p = &self.params;
        let enabled = |k: StrategyKind| self.strategies.contains(&k);

        // ── 1. Indicators ────────────────────────────────────────────────
        let mut indicators = IndicatorSet::default();
        if enabled(StrategyKind::SmaCrossover) {
            indicators.sma_fast = Some(sma(series, p.sma_fast));
            indicators.sma_slow = Some(sma(series, p.sma_slow));
        }
        if enabled(StrategyKind::BollingerReversion) {
            indicators.bollinger = Some(bollinger(series, p.bollinger_window, p.bollinger_num_std));
        }
        // RSI also feeds the latest-reading summary.
        let rsi_series = rsi(series, p.rsi_period);
        let latest_rsi = rsi_series.last_defined().map(|value| RsiReading {
            value,
            zone: classify(value, p.rsi_oversold, p.rsi_overbought),
        });
        if enabled(StrategyKind::Rsi) {
            indicators.rsi = Some(rsi_series);
        }
        if enabled(StrategyKind::MacdCrossover) {
            indicators.macd = Some(macd(series, p.macd));
        }
        if enabled(StrategyKind::Breakout) {
            indicators.breakout = Some(breakout(series, p.breakout));
        }

        // ── 2-5. Signals, events, round trips, equity ────────────────────
        let strategies = self
            .strategies
            .iter()
            .map(|&kind| self.outcome(kind, series, &indicators))
            .collect::<Vec<_>>();

        for o in &strategies {
            debug!(
                strategy = %o.strategy,
                buys = o.buys,
                sells = o.sells,
                trades = o.trades.len(),
                total_profit = o.equity.total_profit,
                "strategy evaluated"
            );
        }

        let report = AnalysisReport {
            run_id: Uuid::new_v4(),
            symbol: series.symbol().to_string(),
            bars: series.len(),
            first_timestamp: series.bars().first().map(|b| b.timestamp),
            last_timestamp: series.bars().last().map(|b| b.timestamp),
            last_close: series.last_close(),
            latest_rsi,
            indicators,
            strategies,
        };

        info!(
            run_id = %report.run_id,
            symbol = %report.symbol,
            bars = report.bars,
            strategies = report.strategies.len(),
            "analysis complete"
        );

        report
    }

    fn outcome(&self, kind: StrategyKind, series: &PriceSeries, ind: &IndicatorSet) -> StrategyOutcome {
        let signals = self.signals_for(kind, series, ind);
        let events = to_events(series, kind, &signals);

        let buys = events.iter().filter(|e| e.signal == Signal::Buy).count();
        let sells = events.iter().filter(|e| e.signal == Signal::Sell).count();
        let trades = round_trips(&events, self.backtest.quantity);
        let equity = simulate(self.backtest.initial_balance, &pnl_amounts(&trades));

        StrategyOutcome {
            strategy: kind,
            events,
            buys,
            sells,
            trades,
            equity,
        }
    }

    fn signals_for(&self, kind: StrategyKind, series: &PriceSeries, ind: &IndicatorSet) -> Vec<Option<Signal>> {
        let values = |s: &Option<IndicatorSeries<f64>>| s.as_ref().map(IndicatorSeries::values).unwrap_or_default();
        let mode = self.params.threshold_mode;

        match kind {
            StrategyKind::SmaCrossover => crossover_signals(&values(&ind.sma_fast), &values(&ind.sma_slow)),
            StrategyKind::BollingerReversion => {
                let bands = ind.bollinger.as_ref().map(IndicatorSeries::values).unwrap_or_default();
                band_signals(&series.closes(), &bands, mode)
            }
            StrategyKind::Rsi => rsi_signals(
                &values(&ind.rsi),
                self.params.rsi_oversold,
                self.params.rsi_overbought,
                mode,
            ),
            StrategyKind::MacdCrossover => {
                let points = ind.macd.as_ref().map(IndicatorSeries::values).unwrap_or_default();
                let line: Vec<Option<f64>> = points.iter().map(|p| p.map(|p| p.macd)).collect();
                let signal: Vec<Option<f64>> = points.iter().map(|p| p.map(|p| p.signal)).collect();
                crossover_signals(&line, &signal)
            }
            StrategyKind::Breakout => {
                let points = ind.breakout.as_ref().map(IndicatorSeries::values).unwrap_or_default();
                breakout_signals(&points)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::series_from_closes;
    use crate::market_data::{PriceLoader, SyntheticLoader};
    use crate::runtime_config::SyntheticParams;
    use crate::signals::ThresholdMode;
    use chrono::NaiveDate;

    fn small_params() -> StrategyParams {
        StrategyParams {
            sma_fast: 3,
            sma_slow: 6,
            bollinger_window: 5,
            rsi_period: 5,
            ..StrategyParams::default()
        }
    }

    fn engine(strategies: &[StrategyKind]) -> StrategyEngine {
        StrategyEngine::new(small_params(), strategies, BacktestParams::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_params() {
        let params = StrategyParams {
            sma_fast: 0,
            ..StrategyParams::default()
        };
        assert!(StrategyEngine::new(params, &StrategyKind::ALL, BacktestParams::default()).is_err());
    }

    #[test]
    fn duplicate_strategies_collapse() {
        let e = engine(&[StrategyKind::Rsi, StrategyKind::Rsi, StrategyKind::Breakout]);
        assert_eq!(e.strategies(), &[StrategyKind::Rsi, StrategyKind::Breakout]);
    }

    #[test]
    fn empty_series_gives_empty_report() {
        let report = engine(&StrategyKind::ALL).run(&series_from_closes(&[]));
        assert_eq!(report.bars, 0);
        assert_eq!(report.last_close, None);
        assert_eq!(report.latest_rsi, None);
        assert_eq!(report.strategies.len(), 5);
        for o in &report.strategies {
            assert!(o.events.is_empty());
            assert!(o.trades.is_empty());
            assert_eq!(o.equity.win_rate, 0.0);
        }
        assert!(report.indicators.sma_fast.as_ref().unwrap().is_empty());
    }

    #[test]
    fn only_needed_indicators_are_computed() {
        let report = engine(&[StrategyKind::Rsi]).run(&series_from_closes(&[1.0, 2.0, 3.0]));
        assert!(report.indicators.rsi.is_some());
        assert!(report.indicators.sma_fast.is_none());
        assert!(report.indicators.macd.is_none());
        assert!(report.outcome(StrategyKind::Breakout).is_none());
    }

    #[test]
    fn sma_cross_round_trip_feeds_equity() {
        // Down, up (golden cross), down (death cross).
        let mut closes: Vec<f64> = (0..10).map(|i| 50.0 - i as f64).collect();
        closes.extend((0..10).map(|i| 42.0 + 3.0 * i as f64));
        closes.extend((0..10).map(|i| 66.0 - 4.0 * i as f64));
        let series = series_from_closes(&closes);

        let report = engine(&[StrategyKind::SmaCrossover]).run(&series);
        let o = report.outcome(StrategyKind::SmaCrossover).unwrap();
        assert_eq!(o.buys, 1);
        assert_eq!(o.sells, 1);
        assert_eq!(o.trades.len(), 1);

        let trade = o.trades[0];
        assert!(trade.entry_index < trade.exit_index);
        assert_eq!(trade.entry_price, closes[trade.entry_index]);
        assert_eq!(o.equity.curve, vec![100_000.0 + trade.pnl]);
        // Events start once the slow SMA and its predecessor are defined.
        assert_eq!(o.events.first().unwrap().index, 6);
        assert_eq!(o.actionable().count(), 2);
    }

    #[test]
    fn rsi_strategy_uses_configured_thresholds() {
        let closes: Vec<f64> = (1..=12).rev().map(|x| x as f64).collect();
        let report = engine(&[StrategyKind::Rsi]).run(&series_from_closes(&closes));
        let o = report.outcome(StrategyKind::Rsi).unwrap();
        // Every defined RSI is 0 => Buy on each bar from index 5.
        assert_eq!(o.events.len(), 7);
        assert!(o.events.iter().all(|e| e.signal == Signal::Buy));
        assert_eq!(report.latest_rsi.unwrap().zone, RsiZone::Oversold);
    }

    #[test]
    fn cross_mode_reduces_threshold_events() {
        let closes: Vec<f64> = (1..=12).rev().map(|x| x as f64).collect();
        let params = StrategyParams {
            threshold_mode: ThresholdMode::Cross,
            ..small_params()
        };
        let e = StrategyEngine::new(params, &[StrategyKind::Rsi], BacktestParams::default()).unwrap();
        let report = e.run(&series_from_closes(&closes));
        assert_eq!(report.outcome(StrategyKind::Rsi).unwrap().buys, 1);
    }

    #[test]
    fn default_config_on_synthetic_data() {
        let series = SyntheticLoader::new(SyntheticParams::default())
            .load("SYNTH", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), None)
            .unwrap();
        let engine = StrategyEngine::from_config(&RuntimeConfig::default()).unwrap();
        let report = engine.run(&series);

        assert_eq!(report.bars, 700);
        for o in &report.strategies {
            // Signals are aligned to bars and in bar order.
            assert!(o.events.windows(2).all(|w| w[0].index < w[1].index));
            assert!(o.events.iter().all(|e| e.index < 700));
            assert_eq!(o.equity.trade_count(), o.trades.len());
        }
        let sma_events = &report.outcome(StrategyKind::SmaCrossover).unwrap().events;
        assert_eq!(sma_events.first().map(|e| e.index), Some(200));
        let brk = &report.outcome(StrategyKind::Breakout).unwrap();
        assert_eq!(brk.sells, 0);
        assert!(brk.events.iter().all(|e| e.index >= 20));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["symbol"], "SYNTH");
        assert!(json["indicators"]["macd"].is_array());
    }
}
