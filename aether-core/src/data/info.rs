//! Static company reference data keyed by base symbol.

use super::ticker::base_symbol;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "INR")]
    Inr,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Inr => "₹",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockInfo {
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub currency: Currency,
}

const KNOWN: &[(&str, &str, &str, &str, Currency)] = &[
    ("AAPL", "Apple Inc.", "Technology", "Consumer Electronics", Currency::Usd),
    ("MSFT", "Microsoft Corporation", "Technology", "Software", Currency::Usd),
    ("BLK", "BlackRock, Inc.", "Financial Services", "Asset Management", Currency::Usd),
    ("GS", "Goldman Sachs Group, Inc.", "Financial Services", "Capital Markets", Currency::Usd),
    ("STT", "State Street Corporation", "Financial Services", "Asset Management", Currency::Usd),
    ("GOOGL", "Alphabet Inc.", "Technology", "Internet Services", Currency::Usd),
    ("AMZN", "Amazon.com, Inc.", "Consumer Cyclical", "Internet Retail", Currency::Usd),
    ("META", "Meta Platforms, Inc.", "Communication Services", "Social Media", Currency::Usd),
    ("TSLA", "Tesla, Inc.", "Consumer Cyclical", "Auto Manufacturers", Currency::Usd),
    ("NVDA", "NVIDIA Corporation", "Technology", "Semiconductors", Currency::Usd),
    ("JPM", "JPMorgan Chase & Co.", "Financial Services", "Banks - Diversified", Currency::Usd),
    ("V", "Visa Inc.", "Financial Services", "Credit Services", Currency::Usd),
    ("WMT", "Walmart Inc.", "Consumer Defensive", "Discount Stores", Currency::Usd),
    ("RELIANCE", "Reliance Industries Limited", "Energy", "Oil & Gas", Currency::Inr),
    ("TCS", "Tata Consultancy Services", "Technology", "IT Services", Currency::Inr),
    (
        "PARAS",
        "Paras Defence and Space Technologies Ltd.",
        "Industrials",
        "Defense & Aerospace",
        Currency::Inr,
    ),
    ("INFY", "Infosys Limited", "Technology", "IT Services", Currency::Inr),
    ("HDFCBANK", "HDFC Bank Limited", "Financial Services", "Banking", Currency::Inr),
    ("ICICIBANK", "ICICI Bank Limited", "Financial Services", "Banking", Currency::Inr),
    (
        "HINDUNILVR",
        "Hindustan Unilever Limited",
        "Consumer Defensive",
        "Household & Personal Products",
        Currency::Inr,
    ),
    (
        "BHARTIARTL",
        "Bharti Airtel Limited",
        "Communication Services",
        "Telecom Services",
        Currency::Inr,
    ),
    ("SBIN", "State Bank of India", "Financial Services", "Banking", Currency::Inr),
    ("ITC", "ITC Limited", "Consumer Defensive", "Tobacco & FMCG", Currency::Inr),
    ("KOTAKBANK", "Kotak Mahindra Bank Limited", "Financial Services", "Banking", Currency::Inr),
];

/// Reference info for `ticker`. Unknown symbols get the ticker as name,
/// "Unknown" sector/industry and USD.
pub fn stock_info(ticker: &str) -> StockInfo {
    let base = base_symbol(ticker);
    match KNOWN.iter().find(|(symbol, ..)| *symbol == base) {
        Some(&(_, name, sector, industry, currency)) => StockInfo {
            name: name.to_string(),
            sector: sector.to_string(),
            industry: industry.to_string(),
            currency,
        },
        None => StockInfo {
            name: ticker.trim().to_string(),
            sector: "Unknown".to_string(),
            industry: "Unknown".to_string(),
            currency: Currency::Usd,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_regional_symbol_is_inr() {
        let info = stock_info("INFY.NSE");
        assert_eq!(info.name, "Infosys Limited");
        assert_eq!(info.currency, Currency::Inr);
        assert_eq!(info.currency.symbol(), "₹");
    }

    #[test]
    fn unknown_symbol_defaults() {
        let info = stock_info("ZZZZ");
        assert_eq!(info.name, "ZZZZ");
        assert_eq!(info.sector, "Unknown");
        assert_eq!(info.currency, Currency::Usd);
    }
}
