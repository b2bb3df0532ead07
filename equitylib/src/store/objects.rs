use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::store::helpers::{
    deserialize_date_from_string, deserialize_f64_from_string, deserialize_market_cap,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,

    #[serde(rename = "Company Name")]
    pub name: String,

    #[serde(rename = "Industry")]
    pub industry: String,

    #[serde(rename = "Market Cap")]
    #[serde(deserialize_with = "deserialize_market_cap")]
    pub market_cap_billions: Option<f64>,
}

impl fmt::Display for CompanyRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}) - {}, ", self.name, self.symbol, self.industry)?;
        match self.market_cap_billions {
            Some(cap) if cap >= 1000.0 => write!(f, "${:.2}T", cap / 1000.0),
            Some(cap) if cap >= 1.0 => write!(f, "${:.2}B", cap),
            Some(cap) => write!(f, "${:.2}M", cap * 1000.0),
            None => write!(f, "n/a"),
        }
    }
}

// Missing numeric cells load as NaN.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceObservation {
    #[serde(rename = "Company Name")]
    pub company_name: String,

    #[serde(rename = "Date")]
    #[serde(deserialize_with = "deserialize_date_from_string")]
    pub date: NaiveDate,

    #[serde(rename = "Open")]
    #[serde(deserialize_with = "deserialize_f64_from_string")]
    pub open: f64,

    #[serde(rename = "High")]
    #[serde(deserialize_with = "deserialize_f64_from_string")]
    pub high: f64,

    #[serde(rename = "Low")]
    #[serde(deserialize_with = "deserialize_f64_from_string")]
    pub low: f64,

    #[serde(rename = "Close")]
    #[serde(deserialize_with = "deserialize_f64_from_string")]
    pub close: f64,

    #[serde(rename = "Volume")]
    #[serde(deserialize_with = "deserialize_f64_from_string")]
    pub volume: f64,
}

impl PriceObservation {
    pub fn summary(&self) -> String {
        format!(
            "{}: open {:.2}, close {:.2}, volume {}",
            self.date, self.open, self.close, self.volume
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(cap: Option<f64>) -> CompanyRecord {
        CompanyRecord {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            industry: "Technology".to_string(),
            market_cap_billions: cap,
        }
    }

    #[test]
    fn company_display_picks_a_readable_suffix() {
        assert_eq!(company(Some(2500.0)).to_string(), "Apple Inc. (AAPL) - Technology, $2.50T");
        assert_eq!(company(Some(845.3)).to_string(), "Apple Inc. (AAPL) - Technology, $845.30B");
        assert_eq!(company(Some(0.95)).to_string(), "Apple Inc. (AAPL) - Technology, $950.00M");
        assert_eq!(company(None).to_string(), "Apple Inc. (AAPL) - Technology, n/a");
    }

    #[test]
    fn summary_shows_one_trading_day() {
        let row = PriceObservation {
            company_name: "Apple Inc.".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 102.0,
            low: 99.5,
            close: 101.0,
            volume: 1_000_000.0,
        };
        assert_eq!(row.summary(), "2024-01-02: open 100.00, close 101.00, volume 1000000");
    }
}
