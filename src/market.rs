// Market-chart request: which coin, against which currency, over which window.
use reqwest::Url;
use serde::Deserialize;

use crate::model::FetchError;

/// Lookback window and sampling interval of a price history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl Timeframe {
    pub fn days(&self) -> u32 {
        match self {
            Timeframe::Day => 1,
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Quarter => 90,
            Timeframe::Year => 365,
        }
    }

    /// `None` leaves the granularity to the API (5-minute points for one day).
    pub fn interval(&self) -> Option<&'static str> {
        match self {
            Timeframe::Day => None,
            Timeframe::Week | Timeframe::Month => Some("hourly"),
            Timeframe::Quarter | Timeframe::Year => Some("daily"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "24h",
            Timeframe::Week => "7d",
            Timeframe::Month => "30d",
            Timeframe::Quarter => "90d",
            Timeframe::Year => "1y",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketChartRequest<'a> {
    pub coin_id: &'a str,
    pub vs_currency: &'a str,
    pub timeframe: Timeframe,
}

impl MarketChartRequest<'_> {
    /// `{base}/coins/{id}/market_chart?vs_currency=..&days=..[&interval=..]`
    pub fn url(&self, base_url: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(format!("{base_url}: cannot be a base")))?
            .extend(["coins", self.coin_id, "market_chart"]);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("vs_currency", self.vs_currency)
                .append_pair("days", &self.timeframe.days().to_string());
            if let Some(interval) = self.timeframe.interval() {
                query.append_pair("interval", interval);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(timeframe: Timeframe) -> MarketChartRequest<'static> {
        MarketChartRequest {
            coin_id: "bitcoin",
            vs_currency: "usd",
            timeframe,
        }
    }

    #[test]
    fn builds_coingecko_url() {
        let url = request(Timeframe::Month).url("https://api.coingecko.com/api/v3").unwrap();
        assert_eq!(
            url.as_str(),
            concat!(
                "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart",
                "?vs_currency=usd&days=30&interval=hourly"
            )
        );
    }

    #[test]
    fn day_leaves_interval_to_api() {
        let url = request(Timeframe::Day).url("https://api.coingecko.com/api/v3/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days=1"
        );
    }

    #[test]
    fn coin_id_is_escaped() {
        let req = MarketChartRequest {
            coin_id: "weird/coin id",
            vs_currency: "usd",
            timeframe: Timeframe::Year,
        };
        let url = req.url("http://localhost:9000").unwrap();
        assert_eq!(url.path(), "/coins/weird%2Fcoin%20id/market_chart");
        assert!(url.as_str().ends_with("days=365&interval=daily"));
    }

    #[test]
    fn rejects_garbage_base() {
        assert!(matches!(
            request(Timeframe::Week).url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(request(Timeframe::Week).url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn timeframe_labels() {
        assert_eq!(Timeframe::Quarter.as_str(), "90d");
        assert_eq!(Timeframe::Quarter.days(), 90);
        assert_eq!(Timeframe::default(), Timeframe::Month);
    }
}
