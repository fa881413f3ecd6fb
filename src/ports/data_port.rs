//! Read access to portfolios, stocks, holdings and prices.

use crate::domain::error::FolioError;
use crate::domain::holding::{Holding, Portfolio};
use crate::domain::stock::Stock;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub trait DataPort {
    fn get_stock(&self, symbol: &str) -> Result<Option<Stock>, FolioError>;

    fn get_portfolio(&self, id: i64) -> Result<Option<Portfolio>, FolioError>;

    fn list_portfolios(&self) -> Result<Vec<Portfolio>, FolioError>;

    /// Holdings of a portfolio, ordered by symbol.
    fn get_holdings(&self, portfolio_id: i64) -> Result<Vec<Holding>, FolioError>;

    /// The price recorded for exactly `date`, if any.
    fn get_price(&self, stock_id: i64, date: NaiveDate) -> Result<Option<Decimal>, FolioError>;
}
