// =============================================================================
// Runtime Configuration — analysis settings with atomic save
// =============================================================================
//
// Every tunable of the pipeline lives here: which instrument and date range
// to analyse, where the bars come from, which strategies run and with which
// windows and thresholds, the backtest balance, and the tracked portfolio.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AnalysisError;
use crate::indicators::{BreakoutParams, MacdParams};
use crate::portfolio::Holding;
use crate::signals::ThresholdMode;
use crate::types::StrategyKind;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbol() -> String {
    "TCS.NS".to_string()
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_strategies() -> Vec<StrategyKind> {
    StrategyKind::ALL.to_vec()
}

fn default_sma_fast() -> usize {
    50
}

fn default_sma_slow() -> usize {
    200
}

fn default_bollinger_window() -> usize {
    20
}

fn default_bollinger_num_std() -> f64 {
    2.0
}

fn default_rsi_period() -> usize {
    14
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_initial_balance() -> f64 {
    100_000.0
}

fn default_quantity() -> f64 {
    1.0
}

fn default_seed() -> u64 {
    42
}

fn default_initial_price() -> f64 {
    100.0
}

fn default_drift() -> f64 {
    0.0002
}

fn default_volatility() -> f64 {
    0.015
}

fn default_synthetic_bars() -> usize {
    700
}

fn default_portfolio() -> Vec<Holding> {
    vec![
        Holding::new("Bitcoin", "bitcoin", 0.5, 40.0),
        Holding::new("Ethereum", "ethereum", 1.2, 60.0),
        Holding::new("Cardano", "cardano", 100.0, 75.0),
    ]
}

// =============================================================================
// DataSource
// =============================================================================

/// Where the analysed bars come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// `<data_dir>/<SYMBOL>.json`
    #[default]
    Json,
    /// Seeded random walk, see [`SyntheticParams`].
    Synthetic,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "Json"),
            Self::Synthetic => write!(f, "Synthetic"),
        }
    }
}

// =============================================================================
// StrategyParams
// =============================================================================

/// Windows, multipliers and thresholds for every strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Fast SMA window for the golden/death cross.
    #[serde(default = "default_sma_fast")]
    pub sma_fast: usize,

    /// Slow SMA window for the golden/death cross.
    #[serde(default = "default_sma_slow")]
    pub sma_slow: usize,

    #[serde(default = "default_bollinger_window")]
    pub bollinger_window: usize,

    /// Band distance in sample standard deviations.
    #[serde(default = "default_bollinger_num_std")]
    pub bollinger_num_std: f64,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// RSI strictly below this is a Buy.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// RSI strictly above this is a Sell.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    #[serde(default)]
    pub macd: MacdParams,

    #[serde(default)]
    pub breakout: BreakoutParams,

    /// Level (every bar in zone) or Cross (zone entry only) for RSI and
    /// Bollinger signals.
    #[serde(default)]
    pub threshold_mode: ThresholdMode,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            sma_fast: default_sma_fast(),
            sma_slow: default_sma_slow(),
            bollinger_window: default_bollinger_window(),
            bollinger_num_std: default_bollinger_num_std(),
            rsi_period: default_rsi_period(),
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
            macd: MacdParams::default(),
            breakout: BreakoutParams::default(),
            threshold_mode: ThresholdMode::default(),
        }
    }
}

impl StrategyParams {
    /// Reject parameters that would make every indicator undefined or the
    /// thresholds meaningless.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let windows = [
            ("sma_fast", self.sma_fast),
            ("sma_slow", self.sma_slow),
            ("rsi_period", self.rsi_period),
            ("macd.fast", self.macd.fast),
            ("macd.slow", self.macd.slow),
            ("macd.signal", self.macd.signal),
            ("breakout.lookback", self.breakout.lookback),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(AnalysisError::InvalidParameter(format!("{name} must be at least 1")));
        }
        if self.bollinger_window < 2 {
            return Err(AnalysisError::InvalidParameter(
                "bollinger_window must be at least 2 (sample deviation)".into(),
            ));
        }
        if !(self.bollinger_num_std.is_finite() && self.bollinger_num_std > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "bollinger_num_std must be positive, got {}",
                self.bollinger_num_std
            )));
        }
        if !(self.breakout.volume_multiplier.is_finite() && self.breakout.volume_multiplier > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "breakout.volume_multiplier must be positive, got {}",
                self.breakout.volume_multiplier
            )));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(AnalysisError::InvalidParameter(format!(
                "RSI thresholds must satisfy 0 <= oversold < overbought <= 100, got {} / {}",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        Ok(())
    }
}

// =============================================================================
// BacktestParams / SyntheticParams
// =============================================================================

/// Equity simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestParams {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,

    /// Units bought on every entry.
    #[serde(default = "default_quantity")]
    pub quantity: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            quantity: default_quantity(),
        }
    }
}

/// Random-walk settings for the synthetic data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticParams {
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_initial_price")]
    pub initial_price: f64,

    /// Mean daily return.
    #[serde(default = "default_drift")]
    pub drift: f64,

    /// Standard deviation of daily returns.
    #[serde(default = "default_volatility")]
    pub volatility: f64,

    /// Number of business days generated when no end date is set.
    #[serde(default = "default_synthetic_bars")]
    pub bars: usize,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            initial_price: default_initial_price(),
            drift: default_drift(),
            volatility: default_volatility(),
            bars: default_synthetic_bars(),
        }
    }
}

impl SyntheticParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.initial_price.is_nan() || self.initial_price <= 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "synthetic.initial_price must be positive, got {}",
                self.initial_price
            )));
        }
        if !self.drift.is_finite() {
            return Err(AnalysisError::InvalidParameter(format!(
                "synthetic.drift must be finite, got {}",
                self.drift
            )));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "synthetic.volatility must be finite and non-negative, got {}",
                self.volatility
            )));
        }
        Ok(())
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for an analysis run.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Instrument & range -------------------------------------------------

    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// First calendar day included.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// First calendar day excluded; `None` runs to the latest bar.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    // --- Data source --------------------------------------------------------

    #[serde(default)]
    pub data_source: DataSource,

    /// Directory holding `<SYMBOL>.json` files for [`DataSource::Json`].
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub synthetic: SyntheticParams,

    // --- Strategies ---------------------------------------------------------

    /// Strategies to run.  Defaults to all of them.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,

    #[serde(default)]
    pub strategy_params: StrategyParams,

    #[serde(default)]
    pub backtest: BacktestParams,

    // --- Portfolio ----------------------------------------------------------

    /// Holdings valued by the `portfolio` command.
    #[serde(default = "default_portfolio")]
    pub portfolio: Vec<Holding>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            start_date: default_start_date(),
            end_date: None,
            data_source: DataSource::default(),
            data_dir: default_data_dir(),
            synthetic: SyntheticParams::default(),
            strategies: default_strategies(),
            strategy_params: StrategyParams::default(),
            backtest: BacktestParams::default(),
            portfolio: default_portfolio(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = %config.symbol,
            data_source = %config.data_source,
            strategies = config.strategies.len(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Check the whole configuration before a run.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.symbol.trim().is_empty() {
            return Err(AnalysisError::InvalidParameter("symbol must not be empty".into()));
        }
        if let Some(end) = self.end_date {
            if end <= self.start_date {
                return Err(AnalysisError::InvalidParameter(format!(
                    "end_date {end} must be after start_date {}",
                    self.start_date
                )));
            }
        }
        if !(self.backtest.quantity.is_finite() && self.backtest.quantity > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "backtest.quantity must be positive, got {}",
                self.backtest.quantity
            )));
        }
        if !self.backtest.initial_balance.is_finite() {
            return Err(AnalysisError::InvalidParameter(
                "backtest.initial_balance must be finite".into(),
            ));
        }
        if self.data_source == DataSource::Synthetic {
            self.synthetic.validate()?;
        }
        self.strategy_params.validate()
    }
}
