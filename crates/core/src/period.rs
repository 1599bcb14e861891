//! Calendar month periods.
//!
//! Every aggregate in the snapshot path is scoped to a `Period` (one calendar
//! month). Forecast series and chart groupings use the `"YYYY-MM"` key form.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One calendar month (the reporting granularity of the snapshot path).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    /// 1-based month (1 = January).
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month must be 1..=12");
        Self { year, month }
    }

    /// Period containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Shift by a signed number of months.
    pub fn shift(self, months: i32) -> Self {
        // Work in 0-based absolute months to keep the year rollover branchless.
        let absolute = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        Self {
            year: absolute.div_euclid(12) as i32,
            month: (absolute.rem_euclid(12) + 1) as u32,
        }
    }

    /// The previous calendar month.
    pub fn prev(self) -> Self {
        self.shift(-1)
    }

    /// `"YYYY-MM"` key, zero-padded. Lexicographic order equals chronological order.
    pub fn key(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Whether the date falls inside this month.
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
