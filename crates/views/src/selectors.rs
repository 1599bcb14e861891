//! Pure derived views over a snapshot.
//!
//! Each `compute_*` function is a pure function of the snapshot; the cached
//! entry points live on [`crate::SelectorCache`].

use serde::{Deserialize, Serialize};
use tourledger_finance::{FinanceSnapshot, ForecastScenario};

/// Absolute amount total for one expense category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// One month of the income-vs-expenses chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub revenue: f64,
    pub expenses: f64,
    /// `(revenue - expenses) / revenue * 100`, 2 decimals, 0 on zero revenue.
    pub margin: f64,
}

/// One month of the profitability timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitPoint {
    pub month: String,
    pub net: f64,
    pub income: f64,
    /// `net / income * 100`, 2 decimals, 0 on zero income.
    pub margin_pct: f64,
}

/// Anomaly counts per kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total: usize,
    pub expense_spikes: usize,
    /// Reserved kind; always 0 until an income-drop detector is wired.
    pub income_drops: usize,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Category totals over all derived rows (absolute amounts), sorted
/// descending by total. Ties keep first-occurrence order.
pub fn compute_expense_by_category(snapshot: &FinanceSnapshot) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for row in snapshot.expenses.iter() {
        match totals.iter_mut().find(|t| t.category == row.category) {
            Some(t) => t.total += row.amount.abs(),
            None => totals.push(CategoryTotal {
                category: row.category.clone(),
                total: row.amount.abs(),
            }),
        }
    }

    // Stable sort keeps insertion order for equal totals.
    totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(core::cmp::Ordering::Equal));
    totals
}

/// Shows grouped by month: revenue, expenses and margin per month,
/// first-occurrence order.
pub fn compute_monthly_series(snapshot: &FinanceSnapshot) -> Vec<MonthlyPoint> {
    let mut points: Vec<MonthlyPoint> = Vec::new();

    for show in snapshot.shows.iter() {
        let month = show.date.format("%Y-%m").to_string();
        match points.iter_mut().find(|p| p.month == month) {
            Some(p) => {
                p.revenue += show.income;
                p.expenses += show.expenses;
            }
            None => points.push(MonthlyPoint {
                month,
                revenue: show.income,
                expenses: show.expenses,
                margin: 0.0,
            }),
        }
    }

    for p in &mut points {
        p.margin = if p.revenue == 0.0 {
            0.0
        } else {
            round2((p.revenue - p.expenses) / p.revenue * 100.0)
        };
    }

    points
}

/// Shows grouped by month: net, income and margin, ascending by month.
pub fn compute_profitability_timeline(snapshot: &FinanceSnapshot) -> Vec<ProfitPoint> {
    let mut points: Vec<ProfitPoint> = Vec::new();

    for show in snapshot.shows.iter() {
        let month = show.date.format("%Y-%m").to_string();
        match points.iter_mut().find(|p| p.month == month) {
            Some(p) => {
                p.net += show.net;
                p.income += show.income;
            }
            None => points.push(ProfitPoint {
                month,
                net: show.net,
                income: show.income,
                margin_pct: 0.0,
            }),
        }
    }

    for p in &mut points {
        p.margin_pct = if p.income == 0.0 {
            0.0
        } else {
            round2(p.net / p.income * 100.0)
        };
    }

    points.sort_by(|a, b| a.month.cmp(&b.month));
    points
}

/// Scenario matching `selected_scenario_id`, falling back to the first
/// forecast. `None` only when the snapshot carries no forecasts at all.
pub fn compute_active_scenario(snapshot: &FinanceSnapshot) -> Option<&ForecastScenario> {
    snapshot
        .selected_scenario_id
        .as_deref()
        .and_then(|id| snapshot.forecasts.iter().find(|s| s.id == id))
        .or_else(|| snapshot.forecasts.first())
}

/// Count anomalies overall and per kind.
pub fn compute_anomaly_summary(snapshot: &FinanceSnapshot) -> AnomalySummary {
    let mut summary = AnomalySummary {
        total: snapshot.anomalies.len(),
        ..AnomalySummary::default()
    };

    for anomaly in &snapshot.anomalies {
        match anomaly.kind {
            tourledger_finance::AnomalyKind::ExpenseSpike => summary.expense_spikes += 1,
            tourledger_finance::AnomalyKind::IncomeDrop => summary.income_drops += 1,
        }
    }

    summary
}
