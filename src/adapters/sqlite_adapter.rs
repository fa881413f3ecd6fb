//! SQLite data adapter.
//!
//! Prices are stored as decimal text so they read back exactly as written.

use crate::domain::config_validation::pool_size;
use crate::domain::date_range::DATE_FORMAT;
use crate::domain::error::FolioError;
use crate::domain::holding::{Holding, Portfolio};
use crate::domain::stock::{normalize_symbol, validate_price, PriceRecord, Stock, StockPrice};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::{debug, info};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub stocks_created: usize,
    pub prices_inserted: usize,
}

fn pool_error(e: r2d2::Error) -> FolioError {
    FolioError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> FolioError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            FolioError::Constraint {
                reason: e.to_string(),
            }
        }
        _ => FolioError::DatabaseQuery {
            reason: e.to_string(),
        },
    }
}

fn price_column(value: String) -> rusqlite::Result<Decimal> {
    value.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            value.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FolioError> {
        let db_path =
            config
                .get_string("database", "path")
                .ok_or_else(|| FolioError::ConfigMissing {
                    section: "database".into(),
                    key: "path".into(),
                })?;

        let max_size = pool_size(config)?;

        let manager = SqliteConnectionManager::file(&db_path)
            .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(pool_error)?;

        debug!("opened sqlite store at {db_path} (pool size {max_size})");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, FolioError> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, FolioError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), FolioError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS portfolios (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS stocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL UNIQUE CHECK (symbol <> '' AND length(symbol) <= 10)
            );
            CREATE TABLE IF NOT EXISTS stock_prices (
                stock_id INTEGER NOT NULL REFERENCES stocks(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                price TEXT NOT NULL CHECK (CAST(price AS REAL) > 0),
                PRIMARY KEY (stock_id, date)
            );
            CREATE TABLE IF NOT EXISTS holdings (
                portfolio_id INTEGER NOT NULL REFERENCES portfolios(id) ON DELETE CASCADE,
                stock_id INTEGER NOT NULL REFERENCES stocks(id) ON DELETE RESTRICT,
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                PRIMARY KEY (portfolio_id, stock_id)
            );
            CREATE INDEX IF NOT EXISTS idx_holdings_stock ON holdings(stock_id);",
        )
        .map_err(query_error)?;

        Ok(())
    }

    pub fn create_portfolio(&self, name: &str) -> Result<Portfolio, FolioError> {
        let conn = self.conn()?;
        conn.execute("INSERT INTO portfolios (name) VALUES (?1)", params![name])
            .map_err(query_error)?;
        let id = conn.last_insert_rowid();
        info!("created portfolio {id} ({name})");
        Ok(Portfolio {
            id,
            name: name.to_string(),
        })
    }

    pub fn delete_portfolio(&self, id: i64) -> Result<(), FolioError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM portfolios WHERE id = ?1", params![id])
            .map_err(query_error)?;
        if deleted == 0 {
            return Err(FolioError::NotFound {
                entity: "portfolio",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn insert_stock(&self, symbol: &str) -> Result<Stock, FolioError> {
        let symbol = normalize_symbol(symbol)?;
        let conn = self.conn()?;
        conn.execute("INSERT INTO stocks (symbol) VALUES (?1)", params![symbol])
            .map_err(query_error)?;
        Ok(Stock {
            id: conn.last_insert_rowid(),
            symbol,
        })
    }

    /// Removes a stock and its prices. Refused while any portfolio holds it.
    pub fn delete_stock(&self, id: i64) -> Result<(), FolioError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM stocks WHERE id = ?1", params![id])
            .map_err(query_error)?;
        if deleted == 0 {
            return Err(FolioError::NotFound {
                entity: "stock",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn get_stock_by_id(&self, id: i64) -> Result<Option<Stock>, FolioError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, symbol FROM stocks WHERE id = ?1",
            params![id],
            |row| {
                Ok(Stock {
                    id: row.get(0)?,
                    symbol: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(query_error)
    }

    pub fn list_stocks(&self) -> Result<Vec<Stock>, FolioError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, symbol FROM stocks ORDER BY symbol")
            .map_err(query_error)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Stock {
                    id: row.get(0)?,
                    symbol: row.get(1)?,
                })
            })
            .map_err(query_error)?;

        let mut stocks = Vec::new();
        for row in rows {
            stocks.push(row.map_err(query_error)?);
        }
        Ok(stocks)
    }

    pub fn insert_price(
        &self,
        stock_id: i64,
        date: NaiveDate,
        price: Decimal,
    ) -> Result<StockPrice, FolioError> {
        let price = validate_price(price)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO stock_prices (stock_id, date, price) VALUES (?1, ?2, ?3)",
            params![stock_id, format_date(date), price.to_string()],
        )
        .map_err(query_error)?;
        Ok(StockPrice {
            stock_id,
            date,
            price,
        })
    }

    /// Inserts a batch of prices in one transaction, creating unknown stocks.
    ///
    /// Nothing is written if any record is invalid or collides with an
    /// existing (stock, date) price.
    pub fn import_prices(&self, records: &[PriceRecord]) -> Result<ImportSummary, FolioError> {
        let mut validated = Vec::with_capacity(records.len());
        for record in records {
            validated.push((
                normalize_symbol(&record.symbol)?,
                record.date,
                validate_price(record.price)?,
            ));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        let mut summary = ImportSummary::default();

        for (symbol, date, price) in &validated {
            summary.stocks_created += tx
                .execute(
                    "INSERT OR IGNORE INTO stocks (symbol) VALUES (?1)",
                    params![symbol],
                )
                .map_err(query_error)?;

            let stock_id: i64 = tx
                .query_row(
                    "SELECT id FROM stocks WHERE symbol = ?1",
                    params![symbol],
                    |row| row.get(0),
                )
                .map_err(query_error)?;

            tx.execute(
                "INSERT INTO stock_prices (stock_id, date, price) VALUES (?1, ?2, ?3)",
                params![stock_id, format_date(*date), price.to_string()],
            )
            .map_err(query_error)?;
            summary.prices_inserted += 1;
        }

        tx.commit().map_err(query_error)?;

        info!(
            "imported {} prices ({} new stocks)",
            summary.prices_inserted, summary.stocks_created
        );
        Ok(summary)
    }

    pub fn insert_holding(
        &self,
        portfolio_id: i64,
        stock_id: i64,
        quantity: u32,
    ) -> Result<Holding, FolioError> {
        if self.get_portfolio(portfolio_id)?.is_none() {
            return Err(FolioError::NotFound {
                entity: "portfolio",
                key: portfolio_id.to_string(),
            });
        }
        let stock = self
            .get_stock_by_id(stock_id)?
            .ok_or_else(|| FolioError::NotFound {
                entity: "stock",
                key: stock_id.to_string(),
            })?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO holdings (portfolio_id, stock_id, quantity) VALUES (?1, ?2, ?3)",
            params![portfolio_id, stock_id, quantity],
        )
        .map_err(query_error)?;

        Ok(Holding::new(portfolio_id, stock, quantity))
    }
}

impl DataPort for SqliteAdapter {
    fn get_stock(&self, symbol: &str) -> Result<Option<Stock>, FolioError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, symbol FROM stocks WHERE symbol = ?1",
            params![symbol.trim().to_uppercase()],
            |row| {
                Ok(Stock {
                    id: row.get(0)?,
                    symbol: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(query_error)
    }

    fn get_portfolio(&self, id: i64) -> Result<Option<Portfolio>, FolioError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name FROM portfolios WHERE id = ?1",
            params![id],
            |row| {
                Ok(Portfolio {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(query_error)
    }

    fn list_portfolios(&self) -> Result<Vec<Portfolio>, FolioError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, name FROM portfolios ORDER BY id")
            .map_err(query_error)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Portfolio {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(query_error)?;

        let mut portfolios = Vec::new();
        for row in rows {
            portfolios.push(row.map_err(query_error)?);
        }
        Ok(portfolios)
    }

    fn get_holdings(&self, portfolio_id: i64) -> Result<Vec<Holding>, FolioError> {
        let conn = self.conn()?;
        let query = "SELECT h.portfolio_id, s.id, s.symbol, h.quantity
                     FROM holdings h
                     JOIN stocks s ON s.id = h.stock_id
                     WHERE h.portfolio_id = ?1
                     ORDER BY s.symbol ASC";

        let mut stmt = conn.prepare(query).map_err(query_error)?;

        let rows = stmt
            .query_map(params![portfolio_id], |row| {
                Ok(Holding {
                    portfolio_id: row.get(0)?,
                    stock: Stock {
                        id: row.get(1)?,
                        symbol: row.get(2)?,
                    },
                    quantity: row.get(3)?,
                })
            })
            .map_err(query_error)?;

        let mut holdings = Vec::new();
        for row in rows {
            holdings.push(row.map_err(query_error)?);
        }
        Ok(holdings)
    }

    fn get_price(&self, stock_id: i64, date: NaiveDate) -> Result<Option<Decimal>, FolioError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT price FROM stock_prices WHERE stock_id = ?1 AND date = ?2",
            params![stock_id, format_date(date)],
            |row| price_column(row.get(0)?),
        )
        .optional()
        .map_err(query_error)
    }
}
