use crate::model::{PricePoint, PriceSeries};
use tracing::warn;

/// Drops points the EMA engine cannot use (non-finite or non-positive prices)
/// and restores ascending timestamp order. Points sharing a timestamp keep
/// their original relative order.
pub fn normalize_series(coin_id: &str, series: PriceSeries) -> PriceSeries {
    let total = series.len();
    let mut points: Vec<PricePoint> = series
        .into_points()
        .into_iter()
        .filter(is_usable)
        .collect();

    let dropped = total - points.len();
    if dropped > 0 {
        warn!(coin_id, dropped, "dropped unusable price points");
    }

    if !points.is_sorted_by_key(|p| p.timestamp) {
        points.sort_by_key(|p| p.timestamp);
    }

    PriceSeries::new(points)
}

fn is_usable(point: &PricePoint) -> bool {
    point.price.is_finite() && point.price > 0.0
}
