//! Snapshot consistency check.

use serde::{Deserialize, Serialize};
use tourledger_finance::FinanceSnapshot;

/// Tolerance for floating-point drift between the KPI layer and the
/// per-show sums.
pub const NET_EPSILON: f64 = 0.01;

/// Diagnostic output of [`validate_snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub expected_net: f64,
    pub kpi_net: f64,
}

/// Recompute `total_revenue - total_expenses` from the show summaries and
/// compare against the KPI net within [`NET_EPSILON`].
///
/// This is the primary reconciliation check a test suite should run against
/// every snapshot the builder produces. It is deliberately uncached: a
/// diagnostic should never read a stale value.
///
/// Note: the per-show calculator floors net at zero, so a show whose costs
/// exceed its fee makes the recomputed net drop below the KPI net and the
/// report fail — that discrepancy is exactly what this check exists to
/// surface.
pub fn validate_snapshot(snapshot: &FinanceSnapshot) -> ValidationReport {
    let total_revenue: f64 = snapshot.shows.iter().map(|s| s.income).sum();
    let total_expenses: f64 = snapshot.shows.iter().map(|s| s.expenses).sum();
    let expected_net = total_revenue - total_expenses;
    let kpi_net = snapshot.kpis.net;
    let pass = (expected_net - kpi_net).abs() <= NET_EPSILON;

    if !pass {
        tracing::warn!(
            expected_net,
            kpi_net,
            period = %snapshot.period,
            "snapshot reconciliation failed"
        );
    }

    ValidationReport {
        pass,
        total_revenue,
        total_expenses,
        expected_net,
        kpi_net,
    }
}
