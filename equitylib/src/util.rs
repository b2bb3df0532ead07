use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";
pub const COMPANY_CSV_ENV: &str = "COMPANY_INFO_CSV_PATH";
pub const PRICE_CSV_ENV: &str = "STOCK_CSV_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub company_csv: PathBuf,
    pub price_csv: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_prediction_rows")]
    pub prediction_rows: usize,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

fn default_log_file() -> String {
    "logs/forecast.log".to_string()
}

fn default_prediction_rows() -> usize {
    5
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Settings, Box<dyn std::error::Error>> {
        serde_json::from_str(json).map_err(|e| e.into())
    }

    // The table paths can be pointed elsewhere without touching the settings file.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(COMPANY_CSV_ENV) {
            self.company_csv = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var(PRICE_CSV_ENV) {
            self.price_csv = PathBuf::from(path);
        }
        self
    }
}

pub fn read_settings(path: impl AsRef<Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    let settings = std::fs::read_to_string(path)?;
    Ok(Settings::from_json(&settings)?.apply_env_overrides())
}
