// Core structs: PriceSeries, EmaResult, SignalTally, SignalReport and the error taxonomy
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::utils::millis_to_datetime;

/// EMA periods used when the configuration does not list any.
pub const DEFAULT_EMA_PERIODS: [usize; 7] = [7, 9, 20, 25, 50, 100, 200];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.timestamp)
    }
}

/// Ordered price history of one coin, ascending by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    #[cfg(test)]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}

/// EMA value per period; `None` when the series was shorter than the period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmaResult(BTreeMap<usize, Option<f64>>);

impl EmaResult {
    pub fn insert(&mut self, period: usize, value: Option<f64>) {
        self.0.insert(period, value);
    }

    /// Outer `None`: period was never computed. Inner `None`: too few points.
    pub fn get(&self, period: usize) -> Option<Option<f64>> {
        self.0.get(&period).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<f64>)> + '_ {
        self.0.iter().map(|(&period, &value)| (period, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PricePosition {
    Above,
    Below,
    Equal,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SignalLabel::Bullish => "Bullish",
            SignalLabel::Bearish => "Bearish",
            SignalLabel::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalTally {
    pub bullish: usize,
    pub bearish: usize,
    pub bullish_percentage: f64,
    pub label: SignalLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalReport {
    pub coin_id: String,
    pub as_of: Option<DateTime<Utc>>,
    pub current_price: f64,
    pub emas: EmaResult,
    pub positions: Vec<(usize, PricePosition)>,
    pub tally: SignalTally,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} {status_text}")]
    Http { status: u16, status_text: String },
    #[error("network error: {cause}")]
    Network { cause: String },
    #[error("response body is not valid JSON: {0}")]
    Decode(String),
    #[error("invalid URL {0}")]
    InvalidUrl(String),
    #[error("invalid retry policy: {0}")]
    InvalidPolicy(&'static str),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("response has no `prices` field")]
    MissingPrices,
    #[error("`prices` is not an array")]
    MalformedPrices,
    #[error("price point #{index} is not a [timestamp, price] pair")]
    MalformedPoint { index: usize },
    #[error("price series is empty")]
    EmptySeries,
}

#[derive(Debug, Error)]
pub enum SignalError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
