// Parser module: turns market-data JSON bodies into price series.

pub mod market_chart;

pub use market_chart::{MarketChartParser, Parser};
