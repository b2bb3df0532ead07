//! Ordinary least squares with an intercept.
//!
//! Features and target are centered before solving the normal equations, so the
//! intercept falls out as `mean(y) - beta . mean(x)`. A feature with no variance
//! (market cap within one company, for instance) gets a zero coefficient instead
//! of making the system singular.

use ndarray::{Array1, Array2, Axis};

use crate::errors::{ForecastError, ForecastResult};

const PIVOT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl LinearRegression {
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> ForecastResult<Self> {
        if x.nrows() != y.len() {
            return Err(ForecastError::Validation(format!(
                "{} feature rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ForecastError::DataSufficiency("cannot fit on zero rows".to_string()))?;
        let y_mean = y
            .mean()
            .ok_or_else(|| ForecastError::DataSufficiency("cannot fit on zero rows".to_string()))?;

        let x_centered = x - &x_mean;
        let y_centered = y - y_mean;

        let xtx = x_centered.t().dot(&x_centered);
        let xty = x_centered.t().dot(&y_centered);
        let coefficients = solve_symmetric(xtx, xty);
        let intercept = y_mean - coefficients.dot(&x_mean);

        Ok(LinearRegression {
            coefficients,
            intercept,
        })
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.coefficients) + self.intercept
    }
}

// Gaussian elimination with partial pivoting. Columns whose best pivot is
// negligible are treated as free and pinned to zero.
fn solve_symmetric(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let scale = a.diag().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = if scale > 0.0 { scale * PIVOT_TOLERANCE } else { f64::MIN_POSITIVE };

    let mut pivots: Vec<(usize, usize)> = Vec::with_capacity(n);
    let mut row = 0;
    for col in 0..n {
        if row == n {
            break;
        }

        let (best, magnitude) = (row..n)
            .map(|r| (r, a[[r, col]].abs()))
            .fold((row, -1.0), |best, candidate| if candidate.1 > best.1 { candidate } else { best });
        if magnitude <= tolerance {
            continue;
        }

        if best != row {
            for c in 0..n {
                a.swap([best, c], [row, c]);
            }
            b.swap(best, row);
        }

        for r in (row + 1)..n {
            let factor = a[[r, col]] / a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[[r, c]] -= factor * a[[row, c]];
            }
            b[r] -= factor * b[row];
        }

        pivots.push((row, col));
        row += 1;
    }

    let mut solution = Array1::<f64>::zeros(n);
    for &(row, col) in pivots.iter().rev() {
        let mut sum = b[row];
        for c in (col + 1)..n {
            sum -= a[[row, c]] * solution[c];
        }
        solution[col] = sum / a[[row, col]];
    }
    solution
}
