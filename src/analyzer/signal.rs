use crate::model::{EmaResult, PricePosition, SignalLabel, SignalTally};

/// Above this bullish share the market reads as Bullish.
const BULLISH_THRESHOLD: f64 = 60.0;
/// Below this bullish share the market reads as Bearish.
const BEARISH_THRESHOLD: f64 = 40.0;

pub fn classify_position(current_price: f64, ema: Option<f64>) -> PricePosition {
    match ema {
        None => PricePosition::Unknown,
        Some(ema) if current_price > ema => PricePosition::Above,
        Some(ema) if current_price < ema => PricePosition::Below,
        Some(_) => PricePosition::Equal,
    }
}

/// Position of `current_price` against every period of `emas`, in period order.
pub fn positions(current_price: f64, emas: &EmaResult) -> Vec<(usize, PricePosition)> {
    emas.iter()
        .map(|(period, value)| (period, classify_position(current_price, value)))
        .collect()
}

/// Bullish/bearish count over all EMAs. `Equal` and `Unknown` positions are
/// left out of both the counts and the percentage denominator. With nothing
/// counted the percentage is 0 and the label Neutral.
pub fn tally(current_price: f64, emas: &EmaResult) -> SignalTally {
    let (bullish, bearish) = emas
        .iter()
        .map(|(_, value)| classify_position(current_price, value))
        .fold((0usize, 0usize), |(up, down), position| match position {
            PricePosition::Above => (up + 1, down),
            PricePosition::Below => (up, down + 1),
            PricePosition::Equal | PricePosition::Unknown => (up, down),
        });

    let counted = bullish + bearish;
    let (bullish_percentage, label) = if counted == 0 {
        (0.0, SignalLabel::Neutral)
    } else {
        let percentage = bullish as f64 / counted as f64 * 100.0;
        (percentage, label_for(percentage))
    };

    SignalTally {
        bullish,
        bearish,
        bullish_percentage,
        label,
    }
}

pub fn label_for(bullish_percentage: f64) -> SignalLabel {
    if bullish_percentage > BULLISH_THRESHOLD {
        SignalLabel::Bullish
    } else if bullish_percentage < BEARISH_THRESHOLD {
        SignalLabel::Bearish
    } else {
        SignalLabel::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ema::compute_all;

    fn emas(values: &[(usize, Option<f64>)]) -> EmaResult {
        let mut result = EmaResult::default();
        for &(period, value) in values {
            result.insert(period, value);
        }
        result
    }

    // ---- classify_position ------------------------------------------------

    #[test]
    fn classify_against_present_and_absent_ema() {
        assert_eq!(classify_position(105.0, Some(100.0)), PricePosition::Above);
        assert_eq!(classify_position(95.0, Some(100.0)), PricePosition::Below);
        assert_eq!(classify_position(100.0, Some(100.0)), PricePosition::Equal);
        assert_eq!(classify_position(100.0, None), PricePosition::Unknown);
    }

    // ---- tally ------------------------------------------------------------

    #[test]
    fn four_above_one_below_is_bullish() {
        let result = emas(&[
            (7, Some(90.0)),
            (9, Some(91.0)),
            (20, Some(92.0)),
            (25, Some(93.0)),
            (50, Some(110.0)),
        ]);
        let t = tally(100.0, &result);
        assert_eq!((t.bullish, t.bearish), (4, 1));
        assert!((t.bullish_percentage - 80.0).abs() < 1e-12);
        assert_eq!(t.label, SignalLabel::Bullish);
    }

    #[test]
    fn all_absent_is_neutral_zero() {
        let result = emas(&[(7, None), (9, None), (200, None)]);
        let t = tally(100.0, &result);
        assert_eq!((t.bullish, t.bearish), (0, 0));
        assert_eq!(t.bullish_percentage, 0.0);
        assert_eq!(t.label, SignalLabel::Neutral);
    }

    #[test]
    fn all_equal_is_neutral_zero() {
        let result = emas(&[(7, Some(100.0)), (9, Some(100.0))]);
        let t = tally(100.0, &result);
        assert_eq!((t.bullish, t.bearish), (0, 0));
        assert_eq!(t.bullish_percentage, 0.0);
        assert_eq!(t.label, SignalLabel::Neutral);
    }

    #[test]
    fn equal_and_unknown_are_not_counted() {
        let result = emas(&[(7, Some(100.0)), (9, None), (20, Some(120.0))]);
        let t = tally(100.0, &result);
        assert_eq!((t.bullish, t.bearish), (0, 1));
        assert_eq!(t.bullish_percentage, 0.0);
        assert_eq!(t.label, SignalLabel::Bearish);
        assert!(t.bullish + t.bearish < result.len());
    }

    #[test]
    fn count_equals_periods_when_all_decided() {
        let prices: Vec<f64> = (1..=250).map(|i| i as f64).collect();
        let result = compute_all(&prices, &[7, 9, 20, 25, 50, 100, 200]);
        let t = tally(*prices.last().unwrap(), &result);
        assert_eq!(t.bullish + t.bearish, result.len());
        assert_eq!(t.label, SignalLabel::Bullish);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(label_for(60.0), SignalLabel::Neutral);
        assert_eq!(label_for(40.0), SignalLabel::Neutral);
        assert_eq!(label_for(60.01), SignalLabel::Bullish);
        assert_eq!(label_for(39.99), SignalLabel::Bearish);
    }

    #[test]
    fn split_decision_is_neutral() {
        let result = emas(&[(7, Some(90.0)), (9, Some(110.0))]);
        let t = tally(100.0, &result);
        assert_eq!(t.bullish_percentage, 50.0);
        assert_eq!(t.label, SignalLabel::Neutral);
    }

    #[test]
    fn positions_follow_period_order() {
        let result = emas(&[(20, Some(50.0)), (7, None), (9, Some(150.0))]);
        assert_eq!(
            positions(100.0, &result),
            vec![
                (7, PricePosition::Unknown),
                (9, PricePosition::Below),
                (20, PricePosition::Above),
            ]
        );
    }
}
