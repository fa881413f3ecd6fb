//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceReader;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::domain::config_validation::{resolve_today, validate_config};
use crate::domain::date_range::{parse_date, DateRange};
use crate::domain::error::FolioError;
use crate::domain::pricing::price_by_symbol;
use crate::domain::profit::{calculate_profit, ProfitResult};
use crate::domain::stock::{normalize_symbol, parse_price, Stock};
use crate::domain::valuation::{value, value_on, PortfolioValue};
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Portfolio profit and annualized return calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database schema
    Init {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Register a stock symbol
    AddStock {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// List registered stock symbols
    Stocks {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Remove a stock and its prices
    RemoveStock {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Record the price of a stock on a date
    AddPrice {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        price: String,
    },
    /// Import prices from a symbol,date,price CSV file
    ImportPrices {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Create an empty portfolio
    CreatePortfolio {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        name: String,
    },
    /// Remove a portfolio and its holdings
    RemovePortfolio {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        portfolio: i64,
    },
    /// Add a holding of a stock to a portfolio
    AddHolding {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        portfolio: i64,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        quantity: u32,
    },
    /// List portfolios with their current value
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the price of a stock on a date
    Price {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        date: String,
    },
    /// Value a portfolio today or on a past date
    Value {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        portfolio: i64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Profit and annualized return of a portfolio between two dates
    Profit {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        portfolio: i64,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Init { config } => with_store(&config, |_, _| {
            eprintln!("Schema ready");
            Ok(())
        }),
        Command::AddStock { config, symbol } => with_store(&config, |store, _| {
            let stock = store.insert_stock(&symbol)?;
            println!("{}", stock.symbol);
            Ok(())
        }),
        Command::Stocks { config } => with_store(&config, |store, _| {
            for stock in store.list_stocks()? {
                println!("{}", stock.symbol);
            }
            Ok(())
        }),
        Command::RemoveStock { config, symbol } => with_store(&config, |store, _| {
            let stock = find_stock(store, &symbol)?;
            store.delete_stock(stock.id)?;
            eprintln!("Removed {}", stock.symbol);
            Ok(())
        }),
        Command::AddPrice {
            config,
            symbol,
            date,
            price,
        } => with_store(&config, |store, _| {
            let stock = find_stock(store, &symbol)?;
            let date = parse_date(Some(date.as_str()), "date")?;
            let price = parse_price(&price)?;
            let recorded = store.insert_price(stock.id, date, price)?;
            println!("{} {} {}", stock.symbol, recorded.date, recorded.price);
            Ok(())
        }),
        Command::ImportPrices { config, file } => with_store(&config, |store, _| {
            eprintln!("Reading prices from {}", file.display());
            let records = CsvPriceReader::new(&file).read()?;
            let summary = store.import_prices(&records)?;
            eprintln!(
                "Imported {} prices, {} new stocks",
                summary.prices_inserted, summary.stocks_created
            );
            Ok(())
        }),
        Command::CreatePortfolio { config, name } => with_store(&config, |store, _| {
            let portfolio = store.create_portfolio(&name)?;
            println!("{}", portfolio.id);
            Ok(())
        }),
        Command::RemovePortfolio { config, portfolio } => with_store(&config, |store, _| {
            store.delete_portfolio(portfolio)?;
            eprintln!("Removed portfolio {portfolio}");
            Ok(())
        }),
        Command::AddHolding {
            config,
            portfolio,
            symbol,
            quantity,
        } => with_store(&config, |store, _| {
            let stock = find_stock(store, &symbol)?;
            let holding = store.insert_holding(portfolio, stock.id, quantity)?;
            println!(
                "{} {} x{}",
                holding.portfolio_id,
                holding.symbol(),
                holding.quantity
            );
            Ok(())
        }),
        Command::List { config } => with_store(&config, |store, today| {
            print!("{}", list_report(store, today)?);
            Ok(())
        }),
        Command::Price {
            config,
            symbol,
            date,
        } => with_store(&config, |store, today| {
            print!("{}", price_report(store, &symbol, &date, today)?);
            Ok(())
        }),
        Command::Value {
            config,
            portfolio,
            date,
            json,
        } => with_store(&config, |store, today| {
            print!(
                "{}",
                value_report(store, portfolio, date.as_deref(), today, json)?
            );
            Ok(())
        }),
        Command::Profit {
            config,
            portfolio,
            start,
            end,
            json,
        } => with_store(&config, |store, today| {
            print!(
                "{}",
                profit_report(
                    store,
                    portfolio,
                    start.as_deref(),
                    end.as_deref(),
                    today,
                    json
                )?
            );
            Ok(())
        }),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Loads and validates the config, opens the store with its schema in place,
/// resolves "today" and runs `f`. Errors are reported on stderr.
fn with_store<F>(config_path: &PathBuf, f: F) -> ExitCode
where
    F: FnOnce(&SqliteAdapter, NaiveDate) -> Result<(), FolioError>,
{
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let result = validate_config(&config)
        .and_then(|()| resolve_today(&config))
        .and_then(|today| {
            let store = SqliteAdapter::from_config(&config)?;
            store.initialize_schema()?;
            f(&store, today)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn find_stock(port: &dyn DataPort, symbol: &str) -> Result<Stock, FolioError> {
    let symbol = normalize_symbol(symbol)?;
    port.get_stock(&symbol)?.ok_or_else(|| FolioError::NotFound {
        entity: "stock",
        key: symbol,
    })
}

fn money(value: Decimal) -> String {
    format!("{value:.4}")
}

pub fn price_report(
    port: &dyn DataPort,
    symbol: &str,
    date: &str,
    today: NaiveDate,
) -> Result<String, FolioError> {
    let symbol = normalize_symbol(symbol)?;
    let date = parse_date(Some(date), "date")?;
    let price = price_by_symbol(port, &symbol, date, today)?;
    Ok(format!("{symbol} {date} {}\n", money(price)))
}

/// One line per portfolio; a portfolio that cannot be valued shows the reason.
pub fn list_report(port: &dyn DataPort, today: NaiveDate) -> Result<String, FolioError> {
    let portfolios = port.list_portfolios()?;
    let mut out = String::new();
    if portfolios.is_empty() {
        out.push_str("No portfolios\n");
        return Ok(out);
    }
    for portfolio in &portfolios {
        let current = match value(port, portfolio.id, today) {
            Ok(v) => money(v.value),
            Err(e) => format!("n/a ({e})"),
        };
        let _ = writeln!(out, "{:>4}  {:<30}  {}", portfolio.id, portfolio.name, current);
    }
    Ok(out)
}

pub fn value_report(
    port: &dyn DataPort,
    portfolio_id: i64,
    date: Option<&str>,
    today: NaiveDate,
    json: bool,
) -> Result<String, FolioError> {
    let valuation = match date {
        Some(d) => value_on(port, portfolio_id, parse_date(Some(d), "date")?, today)?,
        None => value(port, portfolio_id, today)?,
    };
    if json {
        return to_json(&valuation);
    }
    Ok(render_value(&valuation))
}

pub fn profit_report(
    port: &dyn DataPort,
    portfolio_id: i64,
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
    json: bool,
) -> Result<String, FolioError> {
    let range = DateRange::parse(start, end)?;
    let result = calculate_profit(port, portfolio_id, range, today)?;
    if json {
        return to_json(&result);
    }
    Ok(render_profit(&result))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, FolioError> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| FolioError::Io(std::io::Error::other(e)))
}

pub fn render_value(valuation: &PortfolioValue) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Portfolio {}: {}",
        valuation.portfolio.id, valuation.portfolio.name
    );
    let _ = writeln!(out, "Date:   {}", valuation.date);
    let _ = writeln!(out, "Value:  {}", money(valuation.value));
    if !valuation.holdings.is_empty() {
        let _ = writeln!(
            out,
            "\n{:<10} {:>10} {:>14} {:>16}",
            "Symbol", "Quantity", "Price", "Value"
        );
        for line in &valuation.holdings {
            let _ = writeln!(
                out,
                "{:<10} {:>10} {:>14} {:>16}",
                line.symbol,
                line.quantity,
                money(line.price),
                money(line.value)
            );
        }
    }
    out
}

pub fn render_profit(result: &ProfitResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Period:            {} to {} ({} days)",
        result.start_date, result.end_date, result.days_held
    );
    let _ = writeln!(out, "Initial value:     {}", money(result.initial_value));
    let _ = writeln!(out, "Final value:       {}", money(result.final_value));
    let _ = writeln!(out, "Profit:            {}", money(result.profit));
    let _ = writeln!(
        out,
        "Annualized return: {:.2}%",
        result.annualized_return * 100.0
    );

    if !result.holdings.is_empty() {
        let _ = writeln!(
            out,
            "\n{:<10} {:>10} {:>14} {:>14} {:>16}",
            "Symbol", "Quantity", "Initial", "Final", "Profit"
        );
        for line in &result.holdings {
            let _ = writeln!(
                out,
                "{:<10} {:>10} {:>14} {:>14} {:>16}",
                line.symbol,
                line.quantity,
                money(line.initial_price),
                money(line.final_price),
                money(line.profit)
            );
        }
    }
    out
}
