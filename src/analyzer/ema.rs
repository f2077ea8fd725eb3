// Exponential Moving Average
//
//   k     = 2 / (period + 1)
//   EMA_t = price_t * k + EMA_{t-1} * (1 - k)
//
// Seeded with the simple average of the first `period` prices.

use crate::model::EmaResult;

/// Smoothing constant for `period`.
pub fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// One smoothing step: folds `price` into the previous EMA value.
pub fn ema_step(prev: f64, price: f64, period: usize) -> f64 {
    let k = smoothing(period);
    price * k + prev * (1.0 - k)
}

/// Final EMA of `prices` for `period`.
///
/// Returns `None` when there are fewer prices than the period, and for
/// period 0. Prices are expected to be finite; NaN or infinity propagate
/// through the arithmetic unchanged.
pub fn ema_of(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let seed = prices[..period].iter().sum::<f64>() / period as f64;

    Some(
        prices[period..]
            .iter()
            .fold(seed, |ema, &price| ema_step(ema, price, period)),
    )
}

/// EMA of every period in `periods`, each computed on its own.
/// Repeated periods collapse into one entry.
pub fn compute_all(prices: &[f64], periods: &[usize]) -> EmaResult {
    let mut result = EmaResult::default();
    for &period in periods {
        result.insert(period, ema_of(prices, period));
    }
    result
}
