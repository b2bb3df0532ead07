//! Descriptive statistics over price or feature tables.
//!
//! None of these fail: malformed input degrades to `0.0` or an empty table and
//! the cause is logged at `warn`.

use serde_json::Value;

use crate::errors::{ForecastError, ForecastResult};
use crate::features::FeatureRow;
use crate::store::PriceObservation;

/// Read access to the columns the strategies look at. `None` is a missing cell.
pub trait PriceFields {
    fn close(&self) -> Option<f64>;
    fn volume(&self) -> Option<f64>;
}

impl PriceFields for PriceObservation {
    fn close(&self) -> Option<f64> {
        Some(self.close).filter(|v| v.is_finite())
    }

    fn volume(&self) -> Option<f64> {
        Some(self.volume).filter(|v| v.is_finite())
    }
}

impl PriceFields for FeatureRow {
    fn close(&self) -> Option<f64> {
        self.observation.close()
    }

    fn volume(&self) -> Option<f64> {
        self.observation.volume()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    AverageClose,
    FilterHighVolume { threshold: f64 },
    SortByClose { descending: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate<R> {
    Scalar(f64),
    Rows(Vec<R>),
}

impl Strategy {
    // Strategies are selected by name; `args` carries their parameters.
    fn from_config(name: &str, args: &Value) -> ForecastResult<Self> {
        match name {
            "average_close" => Ok(Strategy::AverageClose),
            "filter_high_volume" => {
                let threshold = args["threshold"].as_f64().ok_or_else(|| {
                    ForecastError::Validation(
                        "filter_high_volume needs a numeric \"threshold\"".to_string(),
                    )
                })?;
                Ok(Strategy::FilterHighVolume { threshold })
            }
            "sort_by_close" => {
                let descending = match &args["descending"] {
                    Value::Null => true,
                    Value::Bool(descending) => *descending,
                    other => {
                        return Err(ForecastError::Validation(format!(
                            "sort_by_close \"descending\" must be a bool, got {}",
                            other
                        )))
                    }
                };
                Ok(Strategy::SortByClose { descending })
            }
            _ => Err(ForecastError::Validation(format!("Unknown strategy: {}", name))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::AverageClose => "average_close",
            Strategy::FilterHighVolume { .. } => "filter_high_volume",
            Strategy::SortByClose { .. } => "sort_by_close",
        }
    }

    pub fn apply<R: PriceFields + Clone>(&self, rows: &[R]) -> Aggregate<R> {
        match self {
            Strategy::AverageClose => Aggregate::Scalar(average_close(rows)),
            Strategy::FilterHighVolume { threshold } => {
                Aggregate::Rows(filter_high_volume(rows, *threshold))
            }
            Strategy::SortByClose { descending } => Aggregate::Rows(sort_by_close(rows, *descending)),
        }
    }
}

/// Runs the strategy called `name` with `args`. A selection that cannot be
/// parsed logs the cause and yields what that strategy returns for unusable
/// input: `0.0` for `average_close`, no rows otherwise.
pub fn apply<R: PriceFields + Clone>(name: &str, args: &Value, rows: &[R]) -> Aggregate<R> {
    match Strategy::from_config(name, args) {
        Ok(strategy) => {
            log::debug!("Applying {} to {} rows", strategy.name(), rows.len());
            strategy.apply(rows)
        }
        Err(e) => {
            log::warn!("{}: {}", name, e);
            match name {
                "average_close" => Aggregate::Scalar(0.0),
                _ => Aggregate::Rows(Vec::new()),
            }
        }
    }
}

pub fn average_close<R: PriceFields>(rows: &[R]) -> f64 {
    let closes: Vec<f64> = rows.iter().filter_map(PriceFields::close).collect();
    if closes.is_empty() {
        log::warn!("average_close: no close values among {} rows, returning 0", rows.len());
        return 0.0;
    }
    closes.iter().sum::<f64>() / closes.len() as f64
}

pub fn filter_high_volume<R: PriceFields + Clone>(rows: &[R], threshold: f64) -> Vec<R> {
    if threshold.is_nan() {
        log::warn!("filter_high_volume: threshold is NaN, returning no rows");
        return Vec::new();
    }
    if !rows.is_empty() && rows.iter().all(|row| row.volume().is_none()) {
        log::warn!("filter_high_volume: no volume values among {} rows", rows.len());
        return Vec::new();
    }

    rows.iter()
        .filter(|row| row.volume().map_or(false, |volume| volume > threshold))
        .cloned()
        .collect()
}

// Stable in both directions; rows without a close go last in source order.
pub fn sort_by_close<R: PriceFields + Clone>(rows: &[R], descending: bool) -> Vec<R> {
    let (mut priced, unpriced): (Vec<&R>, Vec<&R>) = rows.iter().partition(|row| row.close().is_some());
    if priced.is_empty() {
        if !rows.is_empty() {
            log::warn!("sort_by_close: no close values among {} rows", rows.len());
        }
        return Vec::new();
    }

    priced.sort_by(|a, b| {
        let (a, b) = (a.close().unwrap_or_default(), b.close().unwrap_or_default());
        if descending {
            b.total_cmp(&a)
        } else {
            a.total_cmp(&b)
        }
    });

    priced.into_iter().chain(unpriced).cloned().collect()
}
