//! Portfolio valuation at a single date.

use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::error::FolioError;
use crate::domain::holding::Portfolio;
use crate::domain::pricing::price;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValue {
    pub symbol: String,
    pub quantity: u32,
    pub price: Decimal,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValue {
    pub portfolio: Portfolio,
    pub date: NaiveDate,
    pub value: Decimal,
    pub holdings: Vec<HoldingValue>,
}

pub fn load_portfolio(port: &dyn DataPort, portfolio_id: i64) -> Result<Portfolio, FolioError> {
    port.get_portfolio(portfolio_id)?
        .ok_or_else(|| FolioError::NotFound {
            entity: "portfolio",
            key: portfolio_id.to_string(),
        })
}

/// Values every holding at `date`. Any missing price fails the whole valuation.
pub fn value_on(
    port: &dyn DataPort,
    portfolio_id: i64,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<PortfolioValue, FolioError> {
    let portfolio = load_portfolio(port, portfolio_id)?;
    let holdings = port.get_holdings(portfolio_id)?;

    let mut lines = Vec::with_capacity(holdings.len());
    let mut total = Decimal::ZERO;
    for holding in &holdings {
        let unit_price = price(port, &holding.stock, date, today)?;
        let value = holding.market_value(unit_price);
        total += value;
        lines.push(HoldingValue {
            symbol: holding.symbol().to_string(),
            quantity: holding.quantity,
            price: unit_price,
            value,
        });
    }

    info!(
        "portfolio {} valued at {} on {} ({} holdings)",
        portfolio.id,
        total,
        date,
        lines.len()
    );

    Ok(PortfolioValue {
        portfolio,
        date,
        value: total,
        holdings: lines,
    })
}

/// Current value: holdings priced as of `today`.
pub fn value(
    port: &dyn DataPort,
    portfolio_id: i64,
    today: NaiveDate,
) -> Result<PortfolioValue, FolioError> {
    value_on(port, portfolio_id, today, today)
}
