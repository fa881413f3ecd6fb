#![allow(dead_code)]

use chrono::NaiveDate;
use folio::domain::error::FolioError;
use folio::domain::holding::{Holding, Portfolio};
use folio::domain::stock::Stock;
use folio::ports::data_port::DataPort;
use rust_decimal::Decimal;
use std::cell::Cell;
use std::collections::HashMap;

/// In-memory store. Counts price reads so tests can check that lookups
/// short-circuit before reaching the store.
pub struct MockDataPort {
    pub portfolios: Vec<Portfolio>,
    pub stocks: Vec<Stock>,
    pub holdings: Vec<Holding>,
    pub prices: HashMap<(i64, NaiveDate), Decimal>,
    pub price_reads: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            portfolios: Vec::new(),
            stocks: Vec::new(),
            holdings: Vec::new(),
            prices: HashMap::new(),
            price_reads: Cell::new(0),
        }
    }

    pub fn with_portfolio(mut self, id: i64, name: &str) -> Self {
        self.portfolios.push(Portfolio {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_stock(mut self, id: i64, symbol: &str) -> Self {
        self.stocks.push(Stock {
            id,
            symbol: symbol.to_string(),
        });
        self
    }

    pub fn with_price(mut self, stock_id: i64, date: NaiveDate, price: Decimal) -> Self {
        self.prices.insert((stock_id, date), price);
        self
    }

    pub fn with_holding(mut self, portfolio_id: i64, stock_id: i64, quantity: u32) -> Self {
        let stock = self.stock(stock_id);
        self.holdings.push(Holding::new(portfolio_id, stock, quantity));
        self
    }

    pub fn stock(&self, id: i64) -> Stock {
        self.stocks
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .expect("stock registered before use")
    }
}

impl DataPort for MockDataPort {
    fn get_stock(&self, symbol: &str) -> Result<Option<Stock>, FolioError> {
        Ok(self.stocks.iter().find(|s| s.symbol == symbol).cloned())
    }

    fn get_portfolio(&self, id: i64) -> Result<Option<Portfolio>, FolioError> {
        Ok(self.portfolios.iter().find(|p| p.id == id).cloned())
    }

    fn list_portfolios(&self) -> Result<Vec<Portfolio>, FolioError> {
        Ok(self.portfolios.clone())
    }

    fn get_holdings(&self, portfolio_id: i64) -> Result<Vec<Holding>, FolioError> {
        let mut holdings: Vec<Holding> = self
            .holdings
            .iter()
            .filter(|h| h.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        holdings.sort_by(|a, b| a.stock.symbol.cmp(&b.stock.symbol));
        Ok(holdings)
    }

    fn get_price(&self, stock_id: i64, date: NaiveDate) -> Result<Option<Decimal>, FolioError> {
        self.price_reads.set(self.price_reads.get() + 1);
        Ok(self.prices.get(&(stock_id, date)).copied())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The JUEMES portfolio: 10 shares, 100 on 2016-09-18 and 120 on 2016-09-20.
pub fn juemes_port() -> MockDataPort {
    MockDataPort::new()
        .with_portfolio(1, "Samy's Portfolio")
        .with_stock(1, "JUEMES")
        .with_price(1, date(2016, 9, 18), Decimal::from(100))
        .with_price(1, date(2016, 9, 20), Decimal::from(120))
        .with_holding(1, 1, 10)
}

/// A portfolio of six stocks whose prices rise by a fixed step per day
/// from 2016-09-01 to 2016-09-30.
pub fn six_stock_port() -> MockDataPort {
    let holdings = [
        ("JUEMS", 10u32),
        ("FNTLST", 20),
        ("MERYL", 30),
        ("GEORG", 40),
        ("BRAD", 50),
        ("CHUCK", 60),
    ];
    let mut port = MockDataPort::new().with_portfolio(1, "Samy's Portfolio");
    for (i, (symbol, quantity)) in holdings.iter().enumerate() {
        let id = i as i64 + 1;
        port = port.with_stock(id, symbol);
        for day in 1..=30u32 {
            let price = Decimal::new(1000 * id + day as i64 * 25, 2);
            port = port.with_price(id, date(2016, 9, day), price);
        }
        port = port.with_holding(1, id, *quantity);
    }
    port
}
