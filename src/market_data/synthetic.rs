// =============================================================================
// Synthetic price series — seeded geometric random walk on business days
// =============================================================================
//
//   r_t     ~ Normal(drift, volatility)
//   close_t = close_{t-1} * (1 + r_t),   close_{-1} = initial_price
//
// Open is the previous close; high/low add a small uniform wick; volume is
// uniform.  The same seed always produces the same series, so the output is
// usable as a test fixture and as an offline stand-in for a data provider.
// =============================================================================

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::error::AnalysisError;
use crate::market_data::loader::{describe_end, PriceLoader};
use crate::market_data::price_series::{Bar, PriceSeries};
use crate::runtime_config::SyntheticParams;

/// Maximum wick size as a fraction of the bar body's extreme.
const MAX_WICK_PCT: f64 = 0.005;

/// [`PriceLoader`] that fabricates bars instead of reading them.
#[derive(Debug, Clone)]
pub struct SyntheticLoader {
    params: SyntheticParams,
}

impl SyntheticLoader {
    pub fn new(params: SyntheticParams) -> Self {
        Self { params }
    }
}

impl PriceLoader for SyntheticLoader {
    fn load(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, AnalysisError> {
        let p = &self.params;
        p.validate()?;
        let returns = Normal::new(p.drift, p.volatility).map_err(|e| {
            AnalysisError::InvalidParameter(format!("synthetic return distribution: {e}"))
        })?;

        let days = business_days(start, end, p.bars);
        if days.is_empty() {
            return Err(AnalysisError::unavailable(
                symbol,
                format!("no business days between {start} and {}", describe_end(end)),
            ));
        }

        let mut rng = StdRng::seed_from_u64(p.seed);
        let mut prev_close = p.initial_price;
        let mut bars = Vec::with_capacity(days.len());

        for day in days {
            let ret = returns.sample(&mut rng);
            let open = prev_close;
            let close = prev_close * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen::<f64>() * MAX_WICK_PCT);
            let low = open.min(close) * (1.0 - rng.gen::<f64>() * MAX_WICK_PCT);
            let volume = rng.gen_range(100_000.0..1_000_000.0);

            let Some(midnight) = day.and_hms_opt(0, 0, 0) else {
                continue;
            };
            bars.push(Bar {
                timestamp: midnight.and_utc(),
                open,
                high,
                low,
                close,
                volume,
            });
            prev_close = close;
        }

        info!(symbol, bars = bars.len(), seed = p.seed, "synthetic price series generated");
        PriceSeries::new(symbol, bars)
    }
}

/// Weekdays from `start` (inclusive).  Stops before `end` when given,
/// otherwise after `count` days.
fn business_days(start: NaiveDate, end: Option<NaiveDate>, count: usize) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut day = start;
    loop {
        match end {
            Some(e) if day >= e => break,
            None if out.len() >= count => break,
            _ => {}
        }
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        day += Duration::days(1);
    }
    out
}
