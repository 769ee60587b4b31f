//! Provider-specific ticker mapping.
//!
//! Users type market-agnostic tickers: plain symbols for US listings
//! (`AAPL`) and a `.NSE` marker for Indian listings (`RELIANCE.NSE`).
//! Each provider spells regional listings differently; this module is the
//! only place that knows how.
//!
//! Mapping is idempotent per provider: a provider's own regional suffix is
//! recognized as regional, so mapping an already-mapped ticker is a no-op.

use crate::domain::ProviderId;

/// Market-agnostic marker for Indian-exchange listings.
pub const REGIONAL_MARKER: &str = "NSE";

/// Regional suffix each provider expects (`None` = no regional convention).
fn native_regional_suffix(provider: ProviderId) -> Option<&'static str> {
    match provider {
        ProviderId::Yahoo => Some("NS"),
        ProviderId::AlphaVantage => Some("BSE"),
        ProviderId::Polygon => None,
    }
}

/// Upper-cased symbol before the first `.`.
pub fn base_symbol(ticker: &str) -> String {
    ticker
        .trim()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

/// Suffix after the first `.`, if any.
fn suffix(ticker: &str) -> Option<&str> {
    ticker.trim().split_once('.').map(|(_, s)| s)
}

/// True if the ticker carries the market-agnostic regional marker.
pub fn is_regional(ticker: &str) -> bool {
    suffix(ticker).is_some_and(|s| s.eq_ignore_ascii_case(REGIONAL_MARKER))
}

/// Translate `ticker` into the symbol format `provider` expects.
///
/// Never fails; unknown suffixes are dropped for the keyed-suffix providers
/// and left alone for the tertiary one.
pub fn map_ticker(ticker: &str, provider: ProviderId) -> String {
    let base = base_symbol(ticker);
    match native_regional_suffix(provider) {
        Some(native) => {
            let regional = suffix(ticker).is_some_and(|s| {
                s.eq_ignore_ascii_case(REGIONAL_MARKER) || s.eq_ignore_ascii_case(native)
            });
            if regional {
                format!("{base}.{native}")
            } else {
                base
            }
        }
        None => {
            if is_regional(ticker) {
                tracing::warn!(
                    ticker,
                    provider = provider.key(),
                    "regional tickers have limited support on this provider"
                );
            }
            ticker.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yahoo_maps_regional_marker() {
        assert_eq!(map_ticker("RELIANCE.NSE", ProviderId::Yahoo), "RELIANCE.NS");
        assert_eq!(map_ticker("tcs.nse", ProviderId::Yahoo), "TCS.NS");
    }

    #[test]
    fn alpha_vantage_maps_regional_marker() {
        assert_eq!(map_ticker("INFY.NSE", ProviderId::AlphaVantage), "INFY.BSE");
    }

    #[test]
    fn plain_symbols_are_upper_cased_base() {
        assert_eq!(map_ticker("aapl", ProviderId::Yahoo), "AAPL");
        assert_eq!(map_ticker("BRK.B", ProviderId::AlphaVantage), "BRK");
    }

    #[test]
    fn polygon_passes_tickers_through() {
        assert_eq!(map_ticker("RELIANCE.NSE", ProviderId::Polygon), "RELIANCE.NSE");
        assert_eq!(map_ticker("AAPL", ProviderId::Polygon), "AAPL");
    }

    #[test]
    fn mapping_is_idempotent_for_regional_tickers() {
        for provider in ProviderId::PRIORITY {
            let once = map_ticker("HDFCBANK.NSE", provider);
            assert_eq!(map_ticker(&once, provider), once, "{provider}");
        }
    }

    #[test]
    fn detects_regional_marker() {
        assert!(is_regional("SBIN.NSE"));
        assert!(!is_regional("SBIN.NS"));
        assert!(!is_regional("AAPL"));
        assert_eq!(base_symbol(" wipro.nse "), "WIPRO");
    }
}
