//! The snapshot read model.
//!
//! A [`FinanceSnapshot`] is one immutable, fully-computed financial picture
//! for a reference month. It is replaced, never mutated; the realtime path
//! produces successor snapshots by cloning and swapping `kpis.net`, so the
//! heavyweight collections are shared behind `Arc` and stay pointer-identical
//! across ticks (cheap re-render skipping for chart consumers).

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tourledger_core::Period;

use crate::anomaly::FinanceAnomaly;
use crate::forecast::ForecastScenario;

/// Whether a derived row is money in or money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

/// One income or expense line derived from a show.
///
/// Ids are stable composites (`"{show_id}:{index}"`), so rebuilds from the
/// same source data produce identical rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceExpense {
    pub id: String,
    pub show_id: Option<String>,
    pub category: String,
    pub kind: EntryKind,
    /// Always >= 0; direction is carried by `kind`.
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Per-show finance result inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceShowSummary {
    pub id: String,
    pub date: NaiveDate,
    pub city: Option<String>,
    pub venue: Option<String>,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub payable: f64,
    /// `round(100 * net / income)`, 0 when income is 0.
    pub margin_pct: f64,
}

/// Period aggregate KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub payable: f64,
    pub margin_pct: f64,
    /// Net of the previous month, for trend arrows.
    pub previous_net: Option<f64>,
}

/// The aggregate root: one reconciled financial picture for `period`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceSnapshot {
    pub generated_at: DateTime<Utc>,
    pub period: Period,
    pub kpis: KpiSet,
    pub shows: Arc<Vec<FinanceShowSummary>>,
    pub expenses: Arc<Vec<FinanceExpense>>,
    pub forecasts: Arc<Vec<ForecastScenario>>,
    pub anomalies: Vec<FinanceAnomaly>,
    pub selected_scenario_id: Option<String>,
}

impl FinanceSnapshot {
    /// Successor snapshot with only the net KPI replaced.
    ///
    /// Shares `shows`/`expenses`/`forecasts` with `self` (copy-on-write).
    pub fn with_net(&self, net: f64) -> Self {
        let mut next = self.clone();
        next.kpis.net = net;
        next
    }

    /// Successor snapshot with a different selected scenario.
    pub fn with_selected_scenario(&self, id: Option<String>) -> Self {
        let mut next = self.clone();
        next.selected_scenario_id = id;
        next
    }
}
