use crate::errors::{ForecastError, ForecastResult};
use crate::features::{self, FeatureRow};
use crate::store::{CompanyRecord, TabularStore};

/// Resolves `symbol` to its company and builds that company's feature table.
pub fn load_and_prepare_data(
    store: &TabularStore,
    symbol: &str,
) -> ForecastResult<(CompanyRecord, Vec<FeatureRow>)> {
    let company = store.get_company_by_symbol(symbol)?.clone();
    log::info!("Resolved {} to {}", symbol, company);

    let prices = store.get_prices_by_company_name(&company.name)?;
    if prices.is_empty() {
        return Err(ForecastError::Lookup(format!(
            "No price history for {}",
            company.name
        )));
    }

    let market_cap = company.market_cap_billions.ok_or_else(|| {
        ForecastError::DataSufficiency(format!("{} has no usable market cap", company.symbol))
    })?;

    let observed = prices.len();
    let features = features::build_required_features(prices, market_cap)?;
    log::info!(
        "Built {} feature rows from {} observations of {}",
        features.len(),
        observed,
        company.symbol
    );

    Ok((company, features))
}

/// The most recent `n` rows, or all of them when fewer remain.
pub fn prediction_window(features: &[FeatureRow], n: usize) -> &[FeatureRow] {
    &features[features.len().saturating_sub(n)..]
}
