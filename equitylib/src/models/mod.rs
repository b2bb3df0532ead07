pub mod linear_regression;
pub mod return_predictor;

pub use linear_regression::*;
pub use return_predictor::*;
