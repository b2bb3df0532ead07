use anyhow::{anyhow, Context};
use equitylib::aggregation::{self, Aggregate};
use equitylib::logging;
use equitylib::models::ReturnPredictor;
use equitylib::pipeline;
use equitylib::store::{TableSources, TabularStore};
use equitylib::util::{read_settings, DEFAULT_SETTINGS_PATH};
use serde_json::json;
use std::env;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <symbol> [settings.json]", args[0]);
        std::process::exit(1);
    }

    let symbol = args[1].trim().to_uppercase();
    let settings_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_SETTINGS_PATH);
    let settings = read_settings(settings_path)
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("Failed to read settings from {}", settings_path))?;

    logging::configure_logger(&settings.log_file)
        .map_err(|e| anyhow!("{}", e))
        .context("Failed to configure logger")?;

    let store = TabularStore::new(TableSources::from(&settings));
    let (company, features) = pipeline::load_and_prepare_data(&store, &symbol)?;

    if let Aggregate::Scalar(average) = aggregation::apply("average_close", &json!({}), &features) {
        log::info!("[{}][SUMMARY] Average close over {} rows: {:.2}", company.symbol, features.len(), average);
    }

    // Days above the mean volume, and the highest close on record.
    let mean_volume = features.iter().map(|row| row.observation.volume).sum::<f64>() / features.len() as f64;
    for (name, strategy_args) in [
        ("filter_high_volume", json!({ "threshold": mean_volume })),
        ("sort_by_close", json!({ "descending": true })),
    ] {
        if let Aggregate::Rows(rows) = aggregation::apply(name, &strategy_args, &features) {
            log::info!("[{}][SUMMARY] {}: {} rows", company.symbol, name, rows.len());
            if let Some(first) = rows.first() {
                log::info!("[{}][SUMMARY] {} first: {}", company.symbol, name, first.observation.summary());
            }
        }
    }

    let mut predictor = ReturnPredictor::new();
    let report = predictor.train(&features)?;
    log::info!(
        "[{}][MODEL] MSE: {:.6} RMSE: {:.6} ({} train / {} held out)",
        company.symbol,
        report.mse,
        report.rmse,
        report.n_train,
        report.n_test
    );

    let window = pipeline::prediction_window(&features, settings.prediction_rows);
    let predictions = predictor.predict(window)?;

    println!();
    println!("Sample Predictions for {}:", company);
    for prediction in &predictions {
        let date = prediction.date.map(|date| date.to_string()).unwrap_or_default();
        println!(
            "Day {} ({}): Predicted 5D Future Return = {:.4}",
            prediction.row + 1,
            date,
            prediction.predicted_future_return
        );
    }

    if let Some(path) = &settings.report_path {
        equitylib::report::save_predictions(path, &predictions, &report)?;
    }

    Ok(())
}
