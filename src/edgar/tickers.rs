use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(ticker: impl Into<String>) -> Result<Self> {
        let uppercase_ticker = ticker.into().to_uppercase();
        if uppercase_ticker.is_empty() {
            return Err(anyhow!("Ticker cannot be empty"));
        }
        if !uppercase_ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(anyhow!(
                "Ticker must contain only alphanumeric characters or hyphens: {}",
                uppercase_ticker
            ));
        }
        Ok(Ticker(uppercase_ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Symbol directory parsed from the SEC's bulk `company_tickers.json`.
///
/// The file is an object keyed by an arbitrary running index; only the
/// entry bodies (`ticker`, `cik_str`, `title`) matter.
#[derive(Debug, Clone, Default)]
pub struct TickerDirectory {
    by_symbol: HashMap<String, (String, String)>, // TICKER -> (CIK, company name)
}

impl TickerDirectory {
    pub fn parse(json_string: &str) -> Result<Self> {
        let json: HashMap<String, Value> = serde_json::from_str(json_string)?;
        log::debug!("Parsed {} ticker directory entries", json.len());

        let mut by_symbol = HashMap::new();
        for entry in json.values() {
            let symbol = match entry["ticker"].as_str() {
                Some(s) => s.trim().to_uppercase(),
                None => continue,
            };
            let cik = match entry["cik_str"].as_u64() {
                Some(c) => c.to_string(),
                None => continue,
            };
            let name = entry["title"].as_str().unwrap_or(&symbol).to_string();
            by_symbol.insert(symbol, (cik, name));
        }

        Ok(TickerDirectory { by_symbol })
    }

    /// CIK for a ticker symbol, case-insensitive. Absent means the symbol is
    /// not listed in the directory, which callers treat as "no data".
    pub fn cik(&self, ticker: &Ticker) -> Option<String> {
        self.by_symbol
            .get(ticker.as_str())
            .map(|(cik, _)| cik.clone())
    }

    /// Display name for a ticker, falling back to the symbol itself.
    pub fn company_name(&self, ticker: &Ticker) -> String {
        self.by_symbol
            .get(ticker.as_str())
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| ticker.to_string())
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}
