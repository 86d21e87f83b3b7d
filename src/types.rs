// =============================================================================
// Shared types used across the analysis pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// Discrete trading decision attached to one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// `true` for Buy and Sell.
    pub fn is_actionable(self) -> bool {
        !matches!(self, Self::Hold)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Hold => write!(f, "Hold"),
        }
    }
}

/// The strategies the engine knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Golden cross / death cross of a fast and slow SMA.
    SmaCrossover,
    /// Close touching the Bollinger bands.
    BollingerReversion,
    /// RSI oversold / overbought.
    Rsi,
    /// New high on above-average volume.
    Breakout,
    /// MACD line crossing its signal line.
    MacdCrossover,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::SmaCrossover,
        Self::BollingerReversion,
        Self::Rsi,
        Self::Breakout,
        Self::MacdCrossover,
    ];
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmaCrossover => write!(f, "SmaCrossover"),
            Self::BollingerReversion => write!(f, "BollingerReversion"),
            Self::Rsi => write!(f, "Rsi"),
            Self::Breakout => write!(f, "Breakout"),
            Self::MacdCrossover => write!(f, "MacdCrossover"),
        }
    }
}
