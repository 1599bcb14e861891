//! Source records consumed from the show ledger and cost store.
//!
//! These are flat external records; the snapshot path reads them and produces
//! derived values of its own. Identifiers are opaque strings owned by the
//! ledger (not minted here), so rebuilds stay bit-identical.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tourledger_core::Period;

/// Booking status of a scheduled show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Pending,
    Overdue,
    Canceled,
}

impl EventStatus {
    /// Whether the full fee counts as outstanding (payable).
    pub fn is_payable(self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }
}

/// One scheduled show as stored in the event ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub date: NaiveDate,
    pub city: Option<String>,
    pub venue: Option<String>,
    /// Base fee for the show.
    pub fee: f64,
    /// Negotiated override; takes precedence over the base fee when set.
    pub fee_override: Option<f64>,
    pub status: EventStatus,
}

impl EventRecord {
    /// Minimal record constructor used in wiring and tests.
    pub fn new(id: impl Into<String>, date: NaiveDate, fee: f64, status: EventStatus) -> Self {
        Self {
            id: id.into(),
            date,
            city: None,
            venue: None,
            fee,
            fee_override: None,
            status,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_fee_override(mut self, fee: f64) -> Self {
        self.fee_override = Some(fee);
        self
    }

    /// Whether this show counts toward the given period: inside the month
    /// and not canceled.
    pub fn in_scope(&self, period: Period) -> bool {
        self.status != EventStatus::Canceled && period.contains(self.date)
    }
}

/// One ad-hoc cost attached to a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    /// Free-form cost kind ("venue", "travel", ...), owned by the cost store.
    pub kind: String,
    pub amount: f64,
    pub desc: Option<String>,
}

impl CostEntry {
    pub fn new(kind: impl Into<String>, amount: f64) -> Self {
        Self {
            kind: kind.into(),
            amount,
            desc: None,
        }
    }
}
