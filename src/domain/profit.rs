//! Profit and annualized return of a portfolio over a date range.

use chrono::NaiveDate;
use log::info;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::date_range::DateRange;
use crate::domain::error::FolioError;
use crate::domain::holding::Holding;
use crate::domain::pricing::price;
use crate::domain::valuation::load_portfolio;
use crate::ports::data_port::DataPort;

pub const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingProfit {
    pub symbol: String,
    pub quantity: u32,
    pub initial_price: Decimal,
    pub final_price: Decimal,
    pub profit: Decimal,
}

impl HoldingProfit {
    pub fn new(holding: &Holding, initial_price: Decimal, final_price: Decimal) -> Self {
        HoldingProfit {
            symbol: holding.symbol().to_string(),
            quantity: holding.quantity,
            initial_price,
            final_price,
            profit: Decimal::from(holding.quantity) * (final_price - initial_price),
        }
    }

    pub fn initial_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.initial_price
    }

    pub fn final_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.final_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_value: Decimal,
    pub final_value: Decimal,
    pub profit: Decimal,
    pub days_held: i64,
    pub annualized_return: f64,
    pub holdings: Vec<HoldingProfit>,
}

impl ProfitResult {
    /// Aggregates already-priced holdings. Touches no store.
    pub fn compute(range: DateRange, holdings: Vec<HoldingProfit>) -> Result<Self, FolioError> {
        let initial_value: Decimal = holdings.iter().map(HoldingProfit::initial_value).sum();
        let final_value: Decimal = holdings.iter().map(HoldingProfit::final_value).sum();
        let days_held = range.days_held();
        let annualized_return = annualized_return(initial_value, final_value, days_held)?;

        Ok(ProfitResult {
            start_date: range.start(),
            end_date: range.end(),
            initial_value,
            final_value,
            profit: final_value - initial_value,
            days_held,
            annualized_return,
            holdings,
        })
    }
}

/// `(final / initial) ^ (365 / days) - 1`.
///
/// The value ratio is taken exactly in decimal; only the power is done in
/// floating point.
pub fn annualized_return(
    initial_value: Decimal,
    final_value: Decimal,
    days_held: i64,
) -> Result<f64, FolioError> {
    let undefined = || FolioError::UndefinedReturn {
        initial_value,
        final_value,
    };

    if initial_value.is_zero() || days_held <= 0 {
        return Err(undefined());
    }

    let ratio = (final_value / initial_value).to_f64().ok_or_else(undefined)?;
    let result = ratio.powf(DAYS_PER_YEAR / days_held as f64) - 1.0;
    if !result.is_finite() {
        return Err(undefined());
    }
    Ok(result)
}

/// Prices every holding of the portfolio at both ends of `range` and
/// aggregates the result.
pub fn calculate_profit(
    port: &dyn DataPort,
    portfolio_id: i64,
    range: DateRange,
    today: NaiveDate,
) -> Result<ProfitResult, FolioError> {
    range.ensure_not_future(today)?;
    let portfolio = load_portfolio(port, portfolio_id)?;
    let holdings = port.get_holdings(portfolio.id)?;

    let mut lines = Vec::with_capacity(holdings.len());
    for holding in &holdings {
        let initial_price = price(port, &holding.stock, range.start(), today)?;
        let final_price = price(port, &holding.stock, range.end(), today)?;
        lines.push(HoldingProfit::new(holding, initial_price, final_price));
    }

    let result = ProfitResult::compute(range, lines)?;
    info!(
        "portfolio {} profit {} over {} days ({} to {})",
        portfolio.id, result.profit, result.days_held, result.start_date, result.end_date
    );
    Ok(result)
}
