//! `tourledger-facade` — composition root for the finance core.
//!
//! [`FinanceCore`] owns the current snapshot, its generation counter and the
//! selector cache, and is constructed once and passed by reference to
//! consumers. No process-wide singletons: independent cores (e.g. in tests)
//! never interfere.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tourledger_core::{DomainError, DomainResult, Period, Versioned};
use tourledger_finance::{
    CostStore, EventLedger, FinanceShowSummary, FinanceSnapshot, SnapshotBuilder, aggregate_period,
};
use tourledger_views::{
    AnomalySummary, CategoryTotal, MonthlyPoint, ProfitPoint, SelectorCache, ValidationReport,
    validate_snapshot,
};

/// Chart consumers usually ask for a year: 11 months back plus the current one.
pub const DEFAULT_MONTHS_BACK: usize = 11;

/// `{id, label}` pair for scenario pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRef {
    pub id: String,
    pub label: String,
}

/// One month of the long-window chart series (see [`FinanceCore::month_series`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSeriesPoint {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

/// The finance core API surface.
pub struct FinanceCore {
    ledger: Arc<dyn EventLedger>,
    costs: Arc<dyn CostStore>,
    builder: SnapshotBuilder,
    snapshot: Option<Versioned<FinanceSnapshot>>,
    cache: SelectorCache,
}

impl FinanceCore {
    pub fn new(ledger: Arc<dyn EventLedger>, costs: Arc<dyn CostStore>) -> Self {
        Self {
            builder: SnapshotBuilder::new(Arc::clone(&ledger), Arc::clone(&costs)),
            ledger,
            costs,
            snapshot: None,
            cache: SelectorCache::new(),
        }
    }

    /// Rebuild the snapshot for the month containing `reference`.
    ///
    /// A previously selected scenario is re-applied when its id still exists
    /// in the new forecasts; otherwise the new build's default (baseline)
    /// stands.
    pub fn refresh(&mut self, reference: NaiveDate) -> &Versioned<FinanceSnapshot> {
        let mut snapshot = self.builder.build(reference);

        if let Some(previous) = &self.snapshot
            && let Some(selected) = &previous.value.selected_scenario_id
            && snapshot.forecasts.iter().any(|s| &s.id == selected)
        {
            snapshot.selected_scenario_id = Some(selected.clone());
        }

        let generation = self
            .snapshot
            .as_ref()
            .map(|s| s.generation + 1)
            .unwrap_or(0);

        tracing::info!(
            generation,
            period = %snapshot.period,
            shows = snapshot.shows.len(),
            "finance core refreshed"
        );

        self.snapshot.insert(Versioned::new(generation, snapshot))
    }

    /// The current snapshot, if any refresh has happened yet.
    pub fn snapshot(&self) -> Option<&Versioned<FinanceSnapshot>> {
        self.snapshot.as_ref()
    }

    /// Linear scan of the current snapshot's shows.
    pub fn get_show(&self, id: &str) -> Option<&FinanceShowSummary> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.value.shows.iter().find(|show| show.id == id))
    }

    /// Income/expense/net per month over a longer window than one snapshot's
    /// period, oldest first (`months_back` trailing months plus the reference
    /// month).
    ///
    /// This deliberately re-invokes the period aggregator instead of the
    /// cached selector path: chart consumers need a window wider than the
    /// snapshot covers.
    pub fn month_series(&self, reference: NaiveDate, months_back: usize) -> Vec<MonthSeriesPoint> {
        let events = self.ledger.load_events();
        let current = Period::from_date(reference);

        (0..=months_back as i32)
            .rev()
            .map(|back| {
                let period = current.shift(-back);
                let totals = aggregate_period(&events, self.costs.as_ref(), period);
                MonthSeriesPoint {
                    month: period.key(),
                    income: totals.income,
                    expenses: totals.expenses,
                    net: totals.net,
                }
            })
            .collect()
    }

    /// Select a forecast scenario on the current snapshot.
    ///
    /// Calling this before any [`refresh`](Self::refresh) is a wiring bug and
    /// returns an invariant violation; an unknown id returns `NotFound`.
    pub fn set_scenario(&mut self, id: &str) -> DomainResult<()> {
        let Some(current) = &self.snapshot else {
            return Err(DomainError::invariant("set_scenario called before refresh"));
        };

        if !current.value.forecasts.iter().any(|s| s.id == id) {
            return Err(DomainError::not_found(format!("scenario '{id}'")));
        }

        let next = current.next(current.value.with_selected_scenario(Some(id.to_string())));
        self.snapshot = Some(next);
        Ok(())
    }

    /// `{id, label}` pairs of the current snapshot's forecasts.
    pub fn list_scenarios(&self) -> Vec<ScenarioRef> {
        self.snapshot
            .as_ref()
            .map(|s| {
                s.value
                    .forecasts
                    .iter()
                    .map(|f| ScenarioRef {
                        id: f.id.clone(),
                        label: f.label.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    // Cached selector delegates. All return `None` before the first refresh.

    pub fn expense_by_category(&mut self) -> Option<Arc<Vec<CategoryTotal>>> {
        let snapshot = self.snapshot.as_ref()?;
        Some(self.cache.expense_by_category(snapshot))
    }

    pub fn monthly_series(&mut self) -> Option<Arc<Vec<MonthlyPoint>>> {
        let snapshot = self.snapshot.as_ref()?;
        Some(self.cache.monthly_series(snapshot))
    }

    pub fn profitability_timeline(&mut self) -> Option<Arc<Vec<ProfitPoint>>> {
        let snapshot = self.snapshot.as_ref()?;
        Some(self.cache.profitability_timeline(snapshot))
    }

    pub fn active_scenario(&mut self) -> Option<Arc<tourledger_finance::ForecastScenario>> {
        let snapshot = self.snapshot.as_ref()?;
        self.cache.active_scenario(snapshot)
    }

    pub fn anomaly_summary(&mut self) -> Option<AnomalySummary> {
        let snapshot = self.snapshot.as_ref()?;
        Some(self.cache.anomaly_summary(snapshot))
    }

    /// Reconciliation check of the current snapshot (uncached diagnostic).
    pub fn validate(&self) -> Option<ValidationReport> {
        self.snapshot.as_ref().map(|s| validate_snapshot(&s.value))
    }
}
