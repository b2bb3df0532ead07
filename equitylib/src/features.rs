use crate::errors::{ForecastError, ForecastResult};
use crate::store::PriceObservation;

pub const VOLATILITY_WINDOW: usize = 5;
pub const FORWARD_HORIZON: usize = 5;

/// A trading day with every derived column defined.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub observation: PriceObservation,
    pub daily_return: f64,
    pub volatility_5d: f64,
    pub future_return_5d: f64,
    pub market_cap_billions: f64,
}

/// Derived columns aligned index-for-index with a date-sorted close series.
/// `None` marks positions without enough history (or future) to compute the value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedColumns {
    pub daily_return: Vec<Option<f64>>,
    pub volatility_5d: Vec<Option<f64>>,
    pub future_return_5d: Vec<Option<f64>>,
}

// Stable, so rows sharing a date keep their source order.
pub fn sort_chronologically(mut rows: Vec<PriceObservation>) -> Vec<PriceObservation> {
    rows.sort_by_key(|row| row.date);
    rows
}

pub fn derive_columns(closes: &[f64]) -> DerivedColumns {
    let n = closes.len();

    let daily_return: Vec<Option<f64>> = (0..n)
        .map(|i| if i == 0 { None } else { fractional_change(closes[i - 1], closes[i]) })
        .collect();

    let volatility_5d: Vec<Option<f64>> = (0..n)
        .map(|i| {
            if i + 1 < VOLATILITY_WINDOW {
                return None;
            }
            let window: Option<Vec<f64>> = daily_return[i + 1 - VOLATILITY_WINDOW..=i].iter().copied().collect();
            window.map(|returns| sample_std_dev(&returns)).filter(|value| value.is_finite())
        })
        .collect();

    let future_return_5d: Vec<Option<f64>> = (0..n)
        .map(|i| {
            closes
                .get(i + FORWARD_HORIZON)
                .and_then(|&future| fractional_change(closes[i], future))
        })
        .collect();

    DerivedColumns {
        daily_return,
        volatility_5d,
        future_return_5d,
    }
}

/// Sorts the rows, derives returns and volatility, and keeps only the rows where
/// every derived column is defined. Short series produce an empty table.
pub fn build_features(rows: Vec<PriceObservation>, market_cap_billions: f64) -> Vec<FeatureRow> {
    let rows = sort_chronologically(rows);
    let closes: Vec<f64> = rows.iter().map(|row| row.close).collect();
    let columns = derive_columns(&closes);

    rows.into_iter()
        .enumerate()
        .filter_map(|(i, observation)| {
            Some(FeatureRow {
                daily_return: columns.daily_return[i]?,
                volatility_5d: columns.volatility_5d[i]?,
                future_return_5d: columns.future_return_5d[i]?,
                market_cap_billions,
                observation,
            })
        })
        .collect()
}

/// Same as [`build_features`], for callers that cannot proceed with an empty table.
pub fn build_required_features(
    rows: Vec<PriceObservation>,
    market_cap_billions: f64,
) -> ForecastResult<Vec<FeatureRow>> {
    let observed = rows.len();
    let features = build_features(rows, market_cap_billions);
    if features.is_empty() {
        return Err(ForecastError::DataSufficiency(format!(
            "{} price observations yield no complete feature rows",
            observed
        )));
    }
    Ok(features)
}

fn fractional_change(from: f64, to: f64) -> Option<f64> {
    let change = to / from - 1.0;
    change.is_finite().then_some(change)
}

fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};

    fn observation(day: i64, close: f64) -> PriceObservation {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day);
        PriceObservation {
            company_name: "Apple Inc.".to_string(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0 + day as f64,
        }
    }

    fn series(closes: &[f64]) -> Vec<PriceObservation> {
        closes.iter().enumerate().map(|(i, &close)| observation(i as i64, close)).collect()
    }

    const CLOSES: [f64; 12] = [100.0, 102.0, 101.0, 105.0, 107.0, 104.0, 108.0, 110.0, 109.0, 111.0, 115.0, 114.0];

    #[test]
    fn daily_returns_match_close_ratios() {
        let columns = derive_columns(&[100.0, 102.0, 101.0, 105.0, 107.0, 104.0]);
        let expected = [0.02, -0.0098, 0.0396, 0.0190, -0.0280];

        assert_eq!(columns.daily_return[0], None);
        for (actual, expected) in columns.daily_return[1..].iter().zip(expected) {
            assert_abs_diff_eq!(actual.unwrap(), expected, epsilon = 5e-5);
        }
    }

    #[test]
    fn volatility_needs_five_defined_returns() {
        let columns = derive_columns(&CLOSES);

        assert!(columns.volatility_5d[..5].iter().all(Option::is_none));
        assert!(columns.volatility_5d[5..].iter().all(Option::is_some));

        let returns: Vec<f64> = columns.daily_return[1..=5].iter().map(|r| r.unwrap()).collect();
        let mean = returns.iter().sum::<f64>() / 5.0;
        let expected = (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 4.0).sqrt();
        assert_abs_diff_eq!(columns.volatility_5d[5].unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn future_return_looks_five_days_ahead() {
        let columns = derive_columns(&CLOSES);

        for i in 0..CLOSES.len() - 5 {
            assert_abs_diff_eq!(
                columns.future_return_5d[i].unwrap(),
                CLOSES[i + 5] / CLOSES[i] - 1.0,
                epsilon = 1e-12
            );
        }
        assert!(columns.future_return_5d[CLOSES.len() - 5..].iter().all(Option::is_none));
    }

    #[test]
    fn keeps_only_fully_defined_rows_in_date_order() {
        let mut rows = series(&CLOSES);
        rows.reverse();

        let features = build_features(rows, 2900.0);

        // Positions 5 and 6 are the only ones with both history and a 5-day future.
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].observation.close, 104.0);
        assert_eq!(features[1].observation.close, 108.0);
        assert!(features.windows(2).all(|pair| pair[0].observation.date <= pair[1].observation.date));
        assert!(features.iter().all(|row| row.market_cap_billions == 2900.0));
    }

    #[test]
    fn same_date_rows_keep_source_order() {
        let mut rows = series(&[10.0, 11.0, 12.0]);
        rows[2].date = rows[1].date;
        let sorted = sort_chronologically(vec![rows[2].clone(), rows[0].clone(), rows[1].clone()]);

        let closes: Vec<f64> = sorted.iter().map(|row| row.close).collect();
        assert_eq!(closes, vec![10.0, 12.0, 11.0]);
    }

    #[test]
    fn missing_close_breaks_the_windows_around_it() {
        let mut closes = CLOSES.to_vec();
        closes.extend([116.0, 118.0, 117.0]);
        closes[3] = f64::NAN;

        let columns = derive_columns(&closes);
        assert_eq!(columns.daily_return[3], None);
        assert_eq!(columns.daily_return[4], None);
        assert!(columns.volatility_5d[..9].iter().all(Option::is_none));
        assert!(columns.volatility_5d[9].is_some());
    }

    #[test]
    fn short_series_yield_no_rows() {
        assert!(build_features(series(&CLOSES[..6]), 1.0).is_empty());
        assert!(build_features(Vec::new(), 1.0).is_empty());
        assert!(matches!(
            build_required_features(series(&CLOSES[..10]), 1.0),
            Err(ForecastError::DataSufficiency(_))
        ));
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let first = build_features(series(&CLOSES), 3.0);
        let second = build_features(series(&CLOSES), 3.0);
        assert_eq!(first, second);
    }
}
