use once_cell::sync::Lazy;
use regex::Regex;

// 1-5 uppercase ASCII letters, anchored on both ends.
static SYMBOL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{1,5}$").expect("symbol pattern is a valid regex"));

pub fn is_valid(symbol: &str) -> bool {
    SYMBOL_PATTERN.is_match(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_uppercase_tickers() {
        for symbol in ["A", "GE", "AAPL", "GOOGL"] {
            assert!(is_valid(symbol), "{symbol} should be valid");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for symbol in ["", "aapl", "Aapl", "TOOLONG", "AA1", "BRK.B", " AAPL", "AAPL\n", "ÄPPL"] {
            assert!(!is_valid(symbol), "{symbol:?} should be invalid");
        }
    }
}
