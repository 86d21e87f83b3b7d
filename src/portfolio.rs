// =============================================================================
// Portfolio valuation — holdings × quotes, allocation, weighted ESG score
// =============================================================================
//
//   value_i        = amount_i * price_i
//   total          = Σ value_i
//   allocation_i   = value_i / total * 100
//   weighted_esg   = Σ value_i * esg_i / total
//
// When the total is zero there is nothing to weight by: allocations are 0
// and the weighted score is `None`.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnalysisError;

/// One position in the tracked portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Display name, e.g. "Bitcoin".
    pub name: String,
    /// Quote identifier, e.g. "bitcoin".
    pub symbol: String,
    pub amount: f64,
    /// ESG score on a 0-100 scale.
    pub esg: f64,
}

impl Holding {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, amount: f64, esg: f64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            amount,
            esg,
        }
    }
}

/// USD prices keyed by quote identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteBook {
    prices: HashMap<String, f64>,
}

impl QuoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, price: f64) {
        self.prices.insert(symbol.into(), price);
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Parse either a simple-price payload (`{"bitcoin": {"usd": 65000}}`)
    /// or a flat map (`{"bitcoin": 65000}`).
    pub fn from_json(text: &str) -> Result<Self, AnalysisError> {
        let root: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| AnalysisError::unavailable("quotes", format!("invalid JSON: {e}")))?;
        let obj = root
            .as_object()
            .ok_or_else(|| AnalysisError::unavailable("quotes", "expected a JSON object"))?;

        let mut book = Self::new();
        for (symbol, val) in obj {
            let price = val
                .as_f64()
                .or_else(|| val.get("usd").and_then(serde_json::Value::as_f64))
                .ok_or_else(|| AnalysisError::unavailable(symbol.as_str(), "no usd price in quote"))?;
            book.insert(symbol.clone(), price);
        }
        debug!(quotes = book.len(), "quote book parsed");
        Ok(book)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::unavailable("quotes", format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }
}

/// Valuation of a single holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub name: String,
    pub symbol: String,
    pub amount: f64,
    pub price: f64,
    pub value: f64,
    pub esg: f64,
    pub allocation_pct: f64,
}

/// Valuation of the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub holdings: Vec<HoldingValuation>,
    pub total_value: f64,
    /// Value-weighted ESG score; `None` when the portfolio is worth nothing.
    pub weighted_esg: Option<f64>,
}

/// Price every holding and compute allocation and weighted ESG score.
///
/// Fails with [`AnalysisError::DataUnavailable`] when a holding has no quote.
pub fn value_portfolio(holdings: &[Holding], quotes: &QuoteBook) -> Result<PortfolioValuation, AnalysisError> {
    let priced = holdings
        .iter()
        .map(|h| {
            let price = quotes
                .price(&h.symbol)
                .ok_or_else(|| AnalysisError::unavailable(h.symbol.as_str(), "no quote for holding"))?;
            Ok((h, price, h.amount * price))
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    let total_value: f64 = priced.iter().map(|(_, _, v)| v).sum();
    let has_value = total_value != 0.0 && total_value.is_finite();

    let weighted_esg = has_value
        .then(|| priced.iter().map(|(h, _, v)| v * h.esg).sum::<f64>() / total_value)
        .filter(|s| s.is_finite());

    let holdings = priced
        .into_iter()
        .map(|(h, price, value)| HoldingValuation {
            name: h.name.clone(),
            symbol: h.symbol.clone(),
            amount: h.amount,
            price,
            value,
            esg: h.esg,
            allocation_pct: if has_value { value / total_value * 100.0 } else { 0.0 },
        })
        .collect();

    info!(total_value, weighted_esg = ?weighted_esg, "portfolio valued");

    Ok(PortfolioValuation {
        holdings,
        total_value,
        weighted_esg,
    })
}
