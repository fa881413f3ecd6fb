//! Core domain types and logic.

pub mod config_validation;
pub mod date_range;
pub mod error;
pub mod holding;
pub mod pricing;
pub mod profit;
pub mod stock;
pub mod valuation;
