use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// Market caps arrive as "2.5T", "845.3B", "950M" or a bare number of billions.
pub fn normalize_market_cap(value: &str) -> Option<f64> {
    let cleaned = value.replace(',', "");
    let cleaned = cleaned.trim().trim_start_matches('$');

    let (number, scale) = if let Some(number) = cleaned.strip_suffix('T') {
        (number, 1000.0)
    } else if let Some(number) = cleaned.strip_suffix('B') {
        (number, 1.0)
    } else if let Some(number) = cleaned.strip_suffix('M') {
        (number, 1.0 / 1000.0)
    } else {
        (cleaned, 1.0)
    };

    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value * scale)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
}

pub fn deserialize_market_cap<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(normalize_market_cap(&s))
}

pub fn deserialize_date_from_string<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).ok_or_else(|| serde::de::Error::custom(format!("Failed to parse date: {:?}", s)))
}

// An empty cell is a missing value (NaN); anything else must parse.
pub fn deserialize_f64_from_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let cleaned = s.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(f64::NAN);
    }
    cleaned.parse::<f64>().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn market_cap_suffixes_scale_to_billions() {
        assert_relative_eq!(normalize_market_cap("2.5T").unwrap(), 2500.0);
        assert_relative_eq!(normalize_market_cap("845.3B").unwrap(), 845.3);
        assert_relative_eq!(normalize_market_cap("950M").unwrap(), 0.95);
        assert_relative_eq!(normalize_market_cap("1,200B").unwrap(), 1200.0);
        assert_relative_eq!(normalize_market_cap(" $3T ").unwrap(), 3000.0);
        assert_relative_eq!(normalize_market_cap("42").unwrap(), 42.0);
    }

    #[test]
    fn unparseable_market_cap_is_missing() {
        assert_eq!(normalize_market_cap(""), None);
        assert_eq!(normalize_market_cap("n/a"), None);
        assert_eq!(normalize_market_cap("T"), None);
        assert_eq!(normalize_market_cap("12X"), None);
        assert_eq!(normalize_market_cap("nan"), None);
    }

    #[test]
    fn dates_accept_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_date("2024-03-07"), Some(expected));
        assert_eq!(parse_date("03/07/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-07 00:00:00"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }
}
