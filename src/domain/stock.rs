//! Stocks and their recorded prices.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::error::FolioError;

pub const MAX_SYMBOL_LEN: usize = 10;
pub const PRICE_SCALE: u32 = 4;
pub const MIN_PRICE: Decimal = dec!(0.0001);
pub const MAX_PRICE: Decimal = dec!(999999.9999);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Stock {
    pub id: i64,
    pub symbol: String,
}

/// A price as stored: one per (stock, date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockPrice {
    pub stock_id: i64,
    pub date: NaiveDate,
    pub price: Decimal,
}

/// A price keyed by symbol, as it arrives from an import file.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Trims and upper-cases a symbol, rejecting empty or over-long input.
pub fn normalize_symbol(input: &str) -> Result<String, FolioError> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(FolioError::InvalidSymbol {
            symbol,
            reason: "symbol must not be empty".into(),
        });
    }
    if symbol.chars().count() > MAX_SYMBOL_LEN {
        return Err(FolioError::InvalidSymbol {
            symbol,
            reason: format!("symbol must be at most {MAX_SYMBOL_LEN} characters"),
        });
    }
    Ok(symbol)
}

/// Checks a price against the stored range and precision.
///
/// Prices with more than four fractional digits are rejected rather than
/// rounded, so whatever is stored is exactly what was entered.
pub fn validate_price(price: Decimal) -> Result<Decimal, FolioError> {
    let normalized = price.normalize();
    if normalized.scale() > PRICE_SCALE {
        return Err(FolioError::InvalidPrice {
            price: price.to_string(),
            reason: format!("at most {PRICE_SCALE} decimal places are allowed"),
        });
    }
    if normalized < MIN_PRICE || normalized > MAX_PRICE {
        return Err(FolioError::InvalidPrice {
            price: price.to_string(),
            reason: format!("price must be between {MIN_PRICE} and {MAX_PRICE}"),
        });
    }
    Ok(normalized)
}

pub fn parse_price(input: &str) -> Result<Decimal, FolioError> {
    let price: Decimal = input.trim().parse().map_err(|_| FolioError::InvalidPrice {
        price: input.to_string(),
        reason: "not a decimal number".into(),
    })?;
    validate_price(price)
}
