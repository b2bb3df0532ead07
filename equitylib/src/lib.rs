pub mod aggregation;
pub mod errors;
pub mod features;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod symbol;
pub mod util;

pub use errors::{ForecastError, ForecastResult};
