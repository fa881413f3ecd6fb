//! CSV price file reader.
//!
//! Expects a `symbol,date,price` header row followed by records in that
//! column order.

use crate::domain::date_range::DATE_FORMAT;
use crate::domain::error::FolioError;
use crate::domain::stock::{normalize_symbol, parse_price, PriceRecord};
use chrono::NaiveDate;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: [&str; 3] = ["symbol", "date", "price"];

pub struct CsvPriceReader {
    path: PathBuf,
}

impl CsvPriceReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn import_error(&self, line: u64, reason: impl std::fmt::Display) -> FolioError {
        FolioError::Import {
            file: self.path.display().to_string(),
            reason: format!("line {line}: {reason}"),
        }
    }

    pub fn read(&self) -> Result<Vec<PriceRecord>, FolioError> {
        let content = fs::read_to_string(&self.path).map_err(|e| FolioError::Import {
            file: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<Vec<PriceRecord>, FolioError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());
        let header = rdr.headers().map_err(|e| FolioError::Import {
            file: self.path.display().to_string(),
            reason: format!("CSV parse error: {e}"),
        })?;
        if !header
            .iter()
            .map(str::to_ascii_lowercase)
            .eq(HEADER.iter().map(|h| h.to_string()))
        {
            return Err(self.import_error(1, "expected header symbol,date,price"));
        }

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| FolioError::Import {
                file: self.path.display().to_string(),
                reason: format!("CSV parse error: {e}"),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let symbol = record
                .get(0)
                .ok_or_else(|| self.import_error(line, "missing symbol column"))?;
            let symbol = normalize_symbol(symbol).map_err(|e| self.import_error(line, e))?;

            let date_str = record
                .get(1)
                .ok_or_else(|| self.import_error(line, "missing date column"))?;
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
                .map_err(|e| self.import_error(line, format!("invalid date format: {e}")))?;

            let price_str = record
                .get(2)
                .ok_or_else(|| self.import_error(line, "missing price column"))?;
            let price = parse_price(price_str).map_err(|e| self.import_error(line, e))?;

            records.push(PriceRecord {
                symbol,
                date,
                price,
            });
        }

        debug!("read {} price records from {}", records.len(), self.path.display());
        Ok(records)
    }
}
