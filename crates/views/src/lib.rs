//! `tourledger-views` — memoized derived views over a finance snapshot.
//!
//! Selectors are pure functions of a snapshot. Caching keys on the snapshot
//! generation (see [`tourledger_core::Versioned`]): a refresh or realtime tick
//! produces a new generation, which implicitly invalidates every cached view —
//! no explicit invalidation calls anywhere. Within one generation, repeated
//! calls return the same `Arc`, so chart consumers get pointer-identical
//! results for free.

pub mod selectors;
pub mod validate;

use std::collections::HashMap;
use std::sync::Arc;

use tourledger_core::Versioned;
use tourledger_finance::{FinanceSnapshot, ForecastScenario};

pub use selectors::{
    AnomalySummary, CategoryTotal, MonthlyPoint, ProfitPoint, compute_active_scenario,
    compute_anomaly_summary, compute_expense_by_category, compute_monthly_series,
    compute_profitability_timeline,
};
pub use validate::{NET_EPSILON, ValidationReport, validate_snapshot};

#[derive(Debug, Clone)]
enum CachedView {
    Categories(Arc<Vec<CategoryTotal>>),
    Monthly(Arc<Vec<MonthlyPoint>>),
    Timeline(Arc<Vec<ProfitPoint>>),
    ActiveScenario(Option<Arc<ForecastScenario>>),
    Anomalies(AnomalySummary),
}

/// Generation-keyed cache of derived views.
///
/// One instance per snapshot owner (the facade). Not thread-safe by itself;
/// wrap it together with the snapshot it mirrors.
#[derive(Debug, Default)]
pub struct SelectorCache {
    generation: Option<u64>,
    entries: HashMap<&'static str, CachedView>,
}

impl SelectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry computed for an older snapshot generation.
    fn sync(&mut self, snapshot: &Versioned<FinanceSnapshot>) {
        if self.generation != Some(snapshot.generation) {
            self.entries.clear();
            self.generation = Some(snapshot.generation);
        }
    }

    pub fn expense_by_category(
        &mut self,
        snapshot: &Versioned<FinanceSnapshot>,
    ) -> Arc<Vec<CategoryTotal>> {
        self.sync(snapshot);
        if let Some(CachedView::Categories(v)) = self.entries.get("expense_by_category") {
            return Arc::clone(v);
        }
        let v = Arc::new(compute_expense_by_category(&snapshot.value));
        self.entries
            .insert("expense_by_category", CachedView::Categories(Arc::clone(&v)));
        v
    }

    pub fn monthly_series(
        &mut self,
        snapshot: &Versioned<FinanceSnapshot>,
    ) -> Arc<Vec<MonthlyPoint>> {
        self.sync(snapshot);
        if let Some(CachedView::Monthly(v)) = self.entries.get("monthly_series") {
            return Arc::clone(v);
        }
        let v = Arc::new(compute_monthly_series(&snapshot.value));
        self.entries
            .insert("monthly_series", CachedView::Monthly(Arc::clone(&v)));
        v
    }

    pub fn profitability_timeline(
        &mut self,
        snapshot: &Versioned<FinanceSnapshot>,
    ) -> Arc<Vec<ProfitPoint>> {
        self.sync(snapshot);
        if let Some(CachedView::Timeline(v)) = self.entries.get("profitability_timeline") {
            return Arc::clone(v);
        }
        let v = Arc::new(compute_profitability_timeline(&snapshot.value));
        self.entries
            .insert("profitability_timeline", CachedView::Timeline(Arc::clone(&v)));
        v
    }

    pub fn active_scenario(
        &mut self,
        snapshot: &Versioned<FinanceSnapshot>,
    ) -> Option<Arc<ForecastScenario>> {
        self.sync(snapshot);
        if let Some(CachedView::ActiveScenario(v)) = self.entries.get("active_scenario") {
            return v.clone();
        }
        let v = compute_active_scenario(&snapshot.value)
            .cloned()
            .map(Arc::new);
        self.entries
            .insert("active_scenario", CachedView::ActiveScenario(v.clone()));
        v
    }

    pub fn anomaly_summary(&mut self, snapshot: &Versioned<FinanceSnapshot>) -> AnomalySummary {
        self.sync(snapshot);
        if let Some(CachedView::Anomalies(v)) = self.entries.get("anomaly_summary") {
            return *v;
        }
        let v = compute_anomaly_summary(&snapshot.value);
        self.entries.insert("anomaly_summary", CachedView::Anomalies(v));
        v
    }
}
