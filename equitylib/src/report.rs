use std::fs::File;
use std::path::{Path, PathBuf};

use crate::errors::{ForecastError, ForecastResult};
use crate::models::{Prediction, TrainingReport};

pub fn save_predictions(
    output: &Path,
    predictions: &[Prediction],
    report: &TrainingReport,
) -> ForecastResult<()> {
    let name = output.display().to_string();
    let io_error = |e: csv::Error| ForecastError::io(&name, e);

    ensure_parent_exists(output).map_err(|e| ForecastError::io(&name, e))?;
    let file = File::create(output).map_err(|e| ForecastError::io(&name, e))?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(["row", "date", "predicted_future_return"])
        .map_err(io_error)?;
    for prediction in predictions {
        let date = prediction.date.map(|date| date.to_string()).unwrap_or_default();
        writer
            .write_record([
                prediction.row.to_string(),
                date,
                prediction.predicted_future_return.to_string(),
            ])
            .map_err(io_error)?;
    }
    writer.flush().map_err(|e| ForecastError::io(&name, e))?;

    let metrics_file = metrics_path(output);
    let metrics_name = metrics_file.display().to_string();
    let mut writer = csv::Writer::from_path(&metrics_file).map_err(|e| ForecastError::io(&metrics_name, e))?;
    for record in [
        ["metric".to_string(), "value".to_string()],
        ["mse".to_string(), report.mse.to_string()],
        ["rmse".to_string(), report.rmse.to_string()],
    ] {
        writer
            .write_record(&record)
            .map_err(|e| ForecastError::io(&metrics_name, e))?;
    }
    writer.flush().map_err(|e| ForecastError::io(&metrics_name, e))?;

    log::info!("Saved {} predictions to {}", predictions.len(), name);
    Ok(())
}

fn ensure_parent_exists(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

// predictions.csv -> predictions_metrics.csv, next to the report.
pub fn metrics_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "predictions".to_string());
    output.with_file_name(format!("{}_metrics.csv", stem))
}
