//! Expense anomaly flagging.
//!
//! Deterministic relative-threshold rule: an expense row disproportionately
//! large against the period's income is flagged for review. `IncomeDrop`
//! exists in the taxonomy but no detector populates it yet; it is a reserved
//! extension point, not a bug.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::snapshot::{EntryKind, FinanceExpense};

/// An expense is flagged once it exceeds this share of period income.
pub const SPIKE_RATIO: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyKind {
    ExpenseSpike,
    IncomeDrop,
}

/// One flagged outlier entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceAnomaly {
    /// Id of the originating expense row.
    pub id: String,
    pub kind: AnomalyKind,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Option<String>,
    pub note: Option<String>,
}

/// Flag expense-kind rows whose amount exceeds `SPIKE_RATIO` of period income.
///
/// Income rows are never flagged, whatever their size.
pub fn detect_expense_spikes(
    expenses: &[FinanceExpense],
    period_income: f64,
) -> Vec<FinanceAnomaly> {
    let threshold = SPIKE_RATIO * period_income;

    expenses
        .iter()
        .filter(|e| e.kind == EntryKind::Expense && e.amount > threshold)
        .map(|e| FinanceAnomaly {
            id: e.id.clone(),
            kind: AnomalyKind::ExpenseSpike,
            date: e.date,
            amount: e.amount,
            category: Some(e.category.clone()),
            note: Some(format!(
                "expense of {:.2} exceeds {:.0}% of period income ({:.2})",
                e.amount,
                SPIKE_RATIO * 100.0,
                period_income
            )),
        })
        .collect()
}
