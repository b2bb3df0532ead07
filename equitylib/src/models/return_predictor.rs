use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::errors::{ForecastError, ForecastResult};
use crate::features::FeatureRow;
use crate::models::LinearRegression;

pub const TEST_FRACTION: f64 = 0.2;
pub const SPLIT_SEED: u64 = 42;
pub const FEATURE_NAMES: [&str; 3] = ["daily_return", "volatility_5d", "market_cap_billions"];

/// Anything that can be projected onto the model's input columns.
pub trait FeatureVector {
    fn feature_vector(&self) -> [f64; 3];

    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

impl FeatureVector for FeatureRow {
    fn feature_vector(&self) -> [f64; 3] {
        [self.daily_return, self.volatility_5d, self.market_cap_billions]
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.observation.date)
    }
}

impl FeatureVector for [f64; 3] {
    fn feature_vector(&self) -> [f64; 3] {
        *self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub mse: f64,
    pub rmse: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub intercept: f64,
    pub coefficients: [f64; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub row: usize,
    pub date: Option<NaiveDate>,
    pub predicted_future_return: f64,
}

#[derive(Debug, Clone)]
pub enum ModelState {
    Untrained,
    Trained(LinearRegression),
}

// Predicts the 5-day forward return from [daily_return, volatility_5d, market_cap_billions].
#[derive(Debug, Clone)]
pub struct ReturnPredictor {
    state: ModelState,
}

impl Default for ReturnPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReturnPredictor {
    pub fn new() -> Self {
        ReturnPredictor {
            state: ModelState::Untrained,
        }
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, ModelState::Trained(_))
    }

    /// Fits on a seeded 80/20 split and scores the held-out fifth.
    /// A failed call leaves any previously trained model in place.
    pub fn train(&mut self, features: &[FeatureRow]) -> ForecastResult<TrainingReport> {
        let (train_idx, test_idx) = train_test_split(features.len())?;
        log::debug!(
            "Training on {} rows, holding out {} rows",
            train_idx.len(),
            test_idx.len()
        );

        let (x_train, y_train) = design_matrix(features, &train_idx);
        let (x_test, y_test) = design_matrix(features, &test_idx);

        let model = LinearRegression::fit(&x_train, &y_train)?;
        let mse = mean_squared_error(&y_test, &model.predict(&x_test));
        let rmse = mse.sqrt();
        log::info!("Held-out MSE: {:.6}, RMSE: {:.6}", mse, rmse);

        let report = TrainingReport {
            mse,
            rmse,
            n_train: train_idx.len(),
            n_test: test_idx.len(),
            intercept: model.intercept,
            coefficients: [model.coefficients[0], model.coefficients[1], model.coefficients[2]],
        };
        self.state = ModelState::Trained(model);
        Ok(report)
    }

    /// One prediction per input row, in input order.
    pub fn predict<R: FeatureVector>(&self, rows: &[R]) -> ForecastResult<Vec<Prediction>> {
        let model = match &self.state {
            ModelState::Trained(model) => model,
            ModelState::Untrained => {
                return Err(ForecastError::State("predict called before train".to_string()))
            }
        };

        let x = Array2::from_shape_fn((rows.len(), FEATURE_NAMES.len()), |(i, j)| {
            rows[i].feature_vector()[j]
        });
        let predicted = model.predict(&x);

        Ok(rows
            .iter()
            .zip(predicted.iter())
            .enumerate()
            .map(|(row, (input, &value))| Prediction {
                row,
                date: input.date(),
                predicted_future_return: value,
            })
            .collect())
    }
}

// Shuffled indices; the first ceil(20%) are held out.
fn train_test_split(n: usize) -> ForecastResult<(Vec<usize>, Vec<usize>)> {
    if n == 0 {
        return Err(ForecastError::DataSufficiency("no feature rows to train on".to_string()));
    }

    let n_test = (n as f64 * TEST_FRACTION).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ForecastError::DataSufficiency(format!(
            "{} feature rows cannot be split into training and held-out sets",
            n
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

fn design_matrix(features: &[FeatureRow], indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((indices.len(), FEATURE_NAMES.len()), |(i, j)| {
        features[indices[i]].feature_vector()[j]
    });
    let y = indices.iter().map(|&i| features[i].future_return_5d).collect();
    (x, y)
}

fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    (y_true - y_pred).mapv(|e| e * e).mean().unwrap_or(0.0)
}
