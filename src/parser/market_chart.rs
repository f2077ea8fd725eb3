// CoinGecko `market_chart` body parsing: { "prices": [[timestampMillis, price], ...] }
use crate::model::{PricePoint, PriceSeries, ValidationError};
use serde_json::Value;

pub trait Parser {
    fn parse(&self, body: &Value) -> Result<PriceSeries, ValidationError>;
}

pub struct MarketChartParser;

impl MarketChartParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_point(index: usize, entry: &Value) -> Result<PricePoint, ValidationError> {
        let malformed = || ValidationError::MalformedPoint { index };

        let pair = entry.as_array().filter(|a| a.len() >= 2).ok_or_else(malformed)?;
        // Timestamps sometimes arrive as floats (e.g. 1700000000000.0).
        let timestamp = pair[0]
            .as_i64()
            .or_else(|| pair[0].as_f64().map(|t| t as i64))
            .ok_or_else(malformed)?;
        let price = pair[1].as_f64().ok_or_else(malformed)?;

        Ok(PricePoint::new(timestamp, price))
    }
}

impl Default for MarketChartParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for MarketChartParser {
    fn parse(&self, body: &Value) -> Result<PriceSeries, ValidationError> {
        let raw = body
            .get("prices")
            .filter(|v| !v.is_null())
            .ok_or(ValidationError::MissingPrices)?
            .as_array()
            .ok_or(ValidationError::MalformedPrices)?;

        if raw.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        let points = raw
            .iter()
            .enumerate()
            .map(|(i, entry)| Self::parse_point(i, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PriceSeries::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<PriceSeries, ValidationError> {
        MarketChartParser::new().parse(&body)
    }

    #[test]
    fn parses_price_pairs() {
        let series = parse(json!({
            "prices": [[1700000000000_i64, 37000.5], [1700003600000.0, 37100]],
            "market_caps": [],
            "total_volumes": []
        }))
        .unwrap();

        assert_eq!(
            series.points(),
            &[
                PricePoint::new(1_700_000_000_000, 37000.5),
                PricePoint::new(1_700_003_600_000, 37100.0),
            ]
        );
    }

    #[test]
    fn missing_prices() {
        let not_found = json!({ "error": "coin not found" });
        assert_eq!(parse(not_found), Err(ValidationError::MissingPrices));
        assert_eq!(parse(json!({ "prices": null })), Err(ValidationError::MissingPrices));
    }

    #[test]
    fn prices_not_an_array() {
        assert_eq!(parse(json!({ "prices": "n/a" })), Err(ValidationError::MalformedPrices));
    }

    #[test]
    fn empty_prices() {
        assert_eq!(parse(json!({ "prices": [] })), Err(ValidationError::EmptySeries));
    }

    #[test]
    fn malformed_point_reports_index() {
        let body = json!({ "prices": [[1, 2.0], [2], [3, 4.0]] });
        assert_eq!(parse(body), Err(ValidationError::MalformedPoint { index: 1 }));

        let body = json!({ "prices": [[1, "2.0"]] });
        assert_eq!(parse(body), Err(ValidationError::MalformedPoint { index: 0 }));
    }
}
