//! Historical price lookup.
//!
//! Lookups are by exact date. Every stock is assumed to have a price for
//! every date that is not in the future; a gap is reported, never filled.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use crate::domain::error::FolioError;
use crate::domain::stock::Stock;
use crate::ports::data_port::DataPort;

pub fn price(
    port: &dyn DataPort,
    stock: &Stock,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<Decimal, FolioError> {
    if date > today {
        return Err(FolioError::FuturePrice {
            symbol: stock.symbol.clone(),
            date,
            today,
        });
    }

    match port.get_price(stock.id, date)? {
        Some(price) => {
            debug!("price {} on {} = {}", stock.symbol, date, price);
            Ok(price)
        }
        None => Err(FolioError::MissingPrice {
            symbol: stock.symbol.clone(),
            date,
        }),
    }
}

/// Looks up a stock by symbol first, for callers that only have the symbol.
pub fn price_by_symbol(
    port: &dyn DataPort,
    symbol: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<Decimal, FolioError> {
    let stock = port
        .get_stock(symbol)?
        .ok_or_else(|| FolioError::NotFound {
            entity: "stock",
            key: symbol.to_string(),
        })?;
    price(port, &stock, date, today)
}
