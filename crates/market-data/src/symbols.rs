//! Exchange code to upstream symbol mapping.
//!
//! Holdings carry bare NSE codes ("HDFCBANK"). Each upstream wants its own
//! notation: Yahoo uses the `.NS` suffix, Alpha Vantage the `.BSE` suffix and
//! Google Finance a `CODE:EXCHANGE` pair.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Suffix appended to bare codes for Yahoo Finance.
pub const YAHOO_SUFFIX: &str = ".NS";

/// Suffix appended to bare codes for Alpha Vantage.
pub const ALPHA_VANTAGE_SUFFIX: &str = ".BSE";

/// Google Finance exchanges tried in order.
pub const GOOGLE_EXCHANGES: [&str; 2] = ["NSE", "BOM"];

/// Codes that do not follow the plain suffix rule.
struct SymbolOverride {
    yahoo: &'static str,
    alpha_vantage: &'static str,
}

lazy_static! {
    static ref OVERRIDES: HashMap<&'static str, SymbolOverride> = {
        let mut m = HashMap::new();
        m.insert(
            "NIFTY50",
            SymbolOverride {
                yahoo: "^NSEI",
                alpha_vantage: "NIFTY50.BSE",
            },
        );
        m.insert(
            "SENSEX",
            SymbolOverride {
                yahoo: "^BSESN",
                alpha_vantage: "SENSEX.BSE",
            },
        );
        m.insert(
            "BAJAJ_AUTO",
            SymbolOverride {
                yahoo: "BAJAJ-AUTO.NS",
                alpha_vantage: "BAJAJ-AUTO.BSE",
            },
        );
        m
    };
}

/// Normalize a user-entered code: trimmed and upper-cased.
pub fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// True when the symbol already carries an exchange suffix or is an index.
fn is_qualified(symbol: &str) -> bool {
    symbol.contains('.') || symbol.starts_with('^')
}

/// Yahoo Finance notation (`HDFCBANK` -> `HDFCBANK.NS`).
pub fn yahoo_symbol(symbol: &str) -> String {
    let code = normalize(symbol);
    if let Some(o) = OVERRIDES.get(code.as_str()) {
        return o.yahoo.to_string();
    }
    if is_qualified(&code) {
        code
    } else {
        format!("{}{}", code, YAHOO_SUFFIX)
    }
}

/// Alpha Vantage notation (`HDFCBANK` -> `HDFCBANK.BSE`).
pub fn alpha_vantage_symbol(symbol: &str) -> String {
    let code = normalize(symbol);
    if let Some(o) = OVERRIDES.get(code.as_str()) {
        return o.alpha_vantage.to_string();
    }
    if is_qualified(&code) {
        code
    } else {
        format!("{}{}", code, ALPHA_VANTAGE_SUFFIX)
    }
}

/// Google Finance quote paths, one per exchange, in lookup order.
///
/// Suffixed symbols are reduced to their base code first.
pub fn google_symbols(symbol: &str) -> Vec<String> {
    let code = normalize(symbol);
    let base = code.split('.').next().unwrap_or(&code).to_string();
    GOOGLE_EXCHANGES
        .iter()
        .map(|exchange| format!("{}:{}", base, exchange))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_codes_get_suffixes() {
        assert_eq!(yahoo_symbol("HDFCBANK"), "HDFCBANK.NS");
        assert_eq!(alpha_vantage_symbol("HDFCBANK"), "HDFCBANK.BSE");
    }

    #[test]
    fn test_suffixed_codes_pass_through() {
        assert_eq!(yahoo_symbol("RELIANCE.BO"), "RELIANCE.BO");
        assert_eq!(alpha_vantage_symbol("TCS.NS"), "TCS.NS");
    }

    #[test]
    fn test_overrides() {
        assert_eq!(yahoo_symbol("nifty50"), "^NSEI");
        assert_eq!(yahoo_symbol("BAJAJ_AUTO"), "BAJAJ-AUTO.NS");
        assert_eq!(alpha_vantage_symbol("SENSEX"), "SENSEX.BSE");
    }

    #[test]
    fn test_normalize_trims_and_uppercases() {
        assert_eq!(normalize("  infy "), "INFY");
        assert_eq!(yahoo_symbol(" infy"), "INFY.NS");
    }

    #[test]
    fn test_google_symbols_in_exchange_order() {
        assert_eq!(google_symbols("TCS"), vec!["TCS:NSE", "TCS:BOM"]);
        assert_eq!(google_symbols("TCS.NS"), vec!["TCS:NSE", "TCS:BOM"]);
    }
}
