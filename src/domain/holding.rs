//! Portfolios and the holdings that tie them to stocks.

use rust_decimal::Decimal;
use serde::Serialize;

use super::stock::Stock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
}

/// Current ownership of a stock by a portfolio. There is no trade history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub portfolio_id: i64,
    pub stock: Stock,
    pub quantity: u32,
}

impl Holding {
    pub fn new(portfolio_id: i64, stock: Stock, quantity: u32) -> Self {
        Holding {
            portfolio_id,
            stock,
            quantity,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.stock.symbol
    }

    pub fn market_value(&self, price: Decimal) -> Decimal {
        Decimal::from(self.quantity) * price
    }
}
