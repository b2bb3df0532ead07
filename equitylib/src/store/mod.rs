pub mod helpers;
pub mod objects;

pub use objects::*;

use std::fs::File;
use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;

use crate::errors::{ForecastError, ForecastResult};
use crate::symbol;
use crate::util::Settings;

#[derive(Debug, Clone)]
pub struct TableSources {
    pub company_csv: PathBuf,
    pub price_csv: PathBuf,
}

impl From<&Settings> for TableSources {
    fn from(settings: &Settings) -> Self {
        TableSources {
            company_csv: settings.company_csv.clone(),
            price_csv: settings.price_csv.clone(),
        }
    }
}

// Each table is read from disk on first access and served from memory afterwards.
// The cache is never invalidated, so edits to the files after the first access
// are not seen until a new store is built.
pub struct TabularStore {
    sources: TableSources,
    companies: OnceCell<Vec<CompanyRecord>>,
    prices: OnceCell<Vec<PriceObservation>>,
}

impl TabularStore {
    pub fn new(sources: TableSources) -> Self {
        TabularStore {
            sources,
            companies: OnceCell::new(),
            prices: OnceCell::new(),
        }
    }

    /// Builds a store over tables that are already in memory.
    pub fn from_tables(companies: Vec<CompanyRecord>, prices: Vec<PriceObservation>) -> Self {
        let store = TabularStore::new(TableSources {
            company_csv: PathBuf::new(),
            price_csv: PathBuf::new(),
        });
        let _ = store.companies.set(companies);
        let _ = store.prices.set(prices);
        store
    }

    pub fn companies(&self) -> ForecastResult<&[CompanyRecord]> {
        self.companies
            .get_or_try_init(|| read_table(&self.sources.company_csv))
            .map(Vec::as_slice)
    }

    pub fn prices(&self) -> ForecastResult<&[PriceObservation]> {
        self.prices
            .get_or_try_init(|| read_table(&self.sources.price_csv))
            .map(Vec::as_slice)
    }

    pub fn get_company_by_symbol(&self, symbol: &str) -> ForecastResult<&CompanyRecord> {
        if !symbol::is_valid(symbol) {
            return Err(ForecastError::Validation(format!("Invalid symbol: {:?}", symbol)));
        }

        self.companies()?
            .iter()
            .find(|company| company.symbol == symbol)
            .ok_or_else(|| ForecastError::Lookup(format!("No company with symbol {}", symbol)))
    }

    /// All price rows for `name` in source order. No match yields an empty vector.
    pub fn get_prices_by_company_name(&self, name: &str) -> ForecastResult<Vec<PriceObservation>> {
        Ok(self
            .prices()?
            .iter()
            .filter(|row| row.company_name == name)
            .cloned()
            .collect())
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> ForecastResult<Vec<T>> {
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|e| ForecastError::io(&source_name, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|e| ForecastError::io(&source_name, e))?;
        rows.push(row);
    }

    log::info!("Loaded {} rows from {}", rows.len(), source_name);
    Ok(rows)
}
