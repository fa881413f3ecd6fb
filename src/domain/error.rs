//! Domain error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Top-level error type for folio.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    #[error("cannot get the price of {symbol} for {date}: date is after {today}")]
    FuturePrice {
        symbol: String,
        date: NaiveDate,
        today: NaiveDate,
    },

    #[error("no price recorded for {symbol} on {date}")]
    MissingPrice { symbol: String, date: NaiveDate },

    #[error("invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    #[error(
        "annualized return is undefined (initial value {initial_value}, final value {final_value})"
    )]
    UndefinedReturn {
        initial_value: Decimal,
        final_value: Decimal,
    },

    #[error("invalid symbol {symbol:?}: {reason}")]
    InvalidSymbol { symbol: String, reason: String },

    #[error("invalid price {price}: {reason}")]
    InvalidPrice { price: String, reason: String },

    #[error("constraint violation: {reason}")]
    Constraint { reason: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("import error in {file}: {reason}")]
    Import { file: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FolioError {
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        FolioError::InvalidDateRange {
            reason: reason.into(),
        }
    }
}

impl From<&FolioError> for std::process::ExitCode {
    fn from(err: &FolioError) -> Self {
        let code: u8 = match err {
            FolioError::Io(_) => 1,
            FolioError::ConfigParse { .. }
            | FolioError::ConfigMissing { .. }
            | FolioError::ConfigInvalid { .. } => 2,
            FolioError::Database { .. } | FolioError::DatabaseQuery { .. } => 3,
            FolioError::InvalidDateRange { .. }
            | FolioError::InvalidSymbol { .. }
            | FolioError::InvalidPrice { .. }
            | FolioError::Constraint { .. }
            | FolioError::NotFound { .. }
            | FolioError::Import { .. } => 4,
            FolioError::FuturePrice { .. }
            | FolioError::MissingPrice { .. }
            | FolioError::UndefinedReturn { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
