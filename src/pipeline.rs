use crate::analyzer::{Analyzer, AnalyzerImpl};
use crate::fetcher::{ResilientFetcher, RetryPolicy, Transport};
use crate::market::{MarketChartRequest, Timeframe};
use crate::model::{SignalError, SignalReport};
use crate::normalizer::normalize_series;
use crate::parser::{MarketChartParser, Parser};
use tracing::debug;

/// Fetch → parse → normalize → analyze for one coin.
///
/// Every call works on its own locals; the pipeline itself is read-only and
/// can be shared across overlapping refresh cycles.
pub struct SignalPipeline<T> {
    fetcher: ResilientFetcher<T>,
    parser: MarketChartParser,
    analyzer: AnalyzerImpl,
    api_base_url: String,
    vs_currency: String,
    timeframe: Timeframe,
}

impl<T: Transport> SignalPipeline<T> {
    pub fn new(
        fetcher: ResilientFetcher<T>,
        analyzer: AnalyzerImpl,
        api_base_url: impl Into<String>,
        vs_currency: impl Into<String>,
        timeframe: Timeframe,
    ) -> Self {
        Self {
            fetcher,
            parser: MarketChartParser::new(),
            analyzer,
            api_base_url: api_base_url.into(),
            vs_currency: vs_currency.into(),
            timeframe,
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.fetcher.policy()
    }

    pub async fn run(&self, coin_id: &str) -> Result<SignalReport, SignalError> {
        let request = MarketChartRequest {
            coin_id,
            vs_currency: &self.vs_currency,
            timeframe: self.timeframe,
        };
        let url = request.url(&self.api_base_url)?;
        debug!(coin_id, %url, "fetching market chart");

        let body = self.fetcher.fetch(url.as_str()).await?;
        let series = self.parser.parse(&body)?;
        let series = normalize_series(coin_id, series);
        debug!(coin_id, points = series.len(), "price series ready");

        Ok(self.analyzer.analyze(coin_id, &series)?)
    }
}
