//! `tourledger-finance` — per-period financial aggregation for the tour dashboard.
//!
//! Turns scheduled show records plus their cost entries into one immutable
//! [`FinanceSnapshot`]: reconciled KPI totals, per-show summaries, flattened
//! income/expense rows, forward forecast scenarios and flagged anomalies.
//!
//! Everything here is synchronous, pure and deterministic (except the
//! `generated_at` stamp): the snapshot is rebuilt from source records on each
//! refresh and never persisted.

pub mod aggregate;
pub mod anomaly;
pub mod builder;
pub mod calculator;
pub mod forecast;
pub mod records;
pub mod snapshot;
pub mod sources;

pub use aggregate::{aggregate_period, trailing_history};
pub use anomaly::{AnomalyKind, FinanceAnomaly, SPIKE_RATIO, detect_expense_spikes};
pub use builder::SnapshotBuilder;
pub use calculator::{ShowFinance, calculate};
pub use forecast::{
    DEFAULT_MONTHS_FORWARD, ForecastPoint, ForecastScenario, ScenarioKind, generate_scenarios,
    noise,
};
pub use records::{CostEntry, EventRecord, EventStatus};
pub use snapshot::{EntryKind, FinanceExpense, FinanceShowSummary, FinanceSnapshot, KpiSet};
pub use sources::{CostStore, EventLedger, InMemoryLedger};
