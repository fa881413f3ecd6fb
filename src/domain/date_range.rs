//! Date range parsing and validation for profit requests.

use chrono::NaiveDate;

use super::error::FolioError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated range with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FolioError> {
        if start >= end {
            return Err(FolioError::invalid_range(
                "the start date must be before the end date",
            ));
        }
        Ok(DateRange { start, end })
    }

    /// Builds a range from raw request parameters in `YYYY-MM-DD` form.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, FolioError> {
        let start = parse_date(start, "start_date")?;
        let end = parse_date(end, "end_date")?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whole days between start and end; at least 1.
    pub fn days_held(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn ensure_not_future(&self, today: NaiveDate) -> Result<(), FolioError> {
        if self.end > today {
            return Err(FolioError::invalid_range(
                "received dates must not be in the future",
            ));
        }
        Ok(())
    }
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, FolioError> {
    let raw = value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FolioError::invalid_range(format!("{field} is required")))?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        FolioError::invalid_range(format!(
            "{field} has invalid format {raw:?} (expected YYYY-MM-DD)"
        ))
    })
}
