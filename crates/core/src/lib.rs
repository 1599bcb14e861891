//! `tourledger-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod period;
pub mod totals;
pub mod versioned;

pub use error::{DomainError, DomainResult};
pub use period::Period;
pub use totals::{PeriodTotals, sanitize_amount};
pub use versioned::Versioned;
