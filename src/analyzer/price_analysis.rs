use crate::analyzer::ema::compute_all;
use crate::analyzer::signal::{positions, tally};
use crate::model::{DEFAULT_EMA_PERIODS, PriceSeries, SignalReport, ValidationError};

/// Trait defining the interface for a price-series analyzer.
pub trait Analyzer {
    /// Builds the EMA signal report for the latest point of `series`.
    fn analyze(&self, coin_id: &str, series: &PriceSeries) -> Result<SignalReport, ValidationError>;
}

/// EMA-based analyzer over a fixed set of periods.
#[derive(Debug, Clone)]
pub struct AnalyzerImpl {
    periods: Vec<usize>,
}

impl AnalyzerImpl {
    pub fn new(periods: Vec<usize>) -> Self {
        Self { periods }
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new(DEFAULT_EMA_PERIODS.to_vec())
    }
}

impl Analyzer for AnalyzerImpl {
    /// The current price is the last price in the series; every EMA is
    /// computed over the full series, including that point.
    fn analyze(
        &self,
        coin_id: &str,
        series: &PriceSeries,
    ) -> Result<SignalReport, ValidationError> {
        let latest = *series.latest().ok_or(ValidationError::EmptySeries)?;
        let prices = series.prices();

        let emas = compute_all(&prices, &self.periods);
        let positions = positions(latest.price, &emas);
        let tally = tally(latest.price, &emas);

        Ok(SignalReport {
            coin_id: coin_id.to_string(),
            as_of: latest.time(),
            current_price: latest.price,
            emas,
            positions,
            tally,
        })
    }
}
