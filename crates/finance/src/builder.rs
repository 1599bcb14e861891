//! Snapshot construction.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tourledger_core::Period;

use crate::aggregate::{aggregate_period, trailing_history};
use crate::anomaly::detect_expense_spikes;
use crate::calculator;
use crate::forecast::{DEFAULT_MONTHS_FORWARD, generate_scenarios};
use crate::records::EventRecord;
use crate::snapshot::{EntryKind, FinanceExpense, FinanceShowSummary, FinanceSnapshot, KpiSet};
use crate::sources::{CostStore, EventLedger};

/// Trailing window the forecasting engine derives trend/volatility from.
const HISTORY_MONTHS: usize = 6;

/// Orchestrates calculator, aggregator, forecasting and anomaly detection
/// into one immutable [`FinanceSnapshot`].
///
/// Building is pure and synchronous: for fixed source records and a fixed
/// reference date, every field except `generated_at` is identical across
/// rebuilds.
pub struct SnapshotBuilder {
    ledger: Arc<dyn EventLedger>,
    costs: Arc<dyn CostStore>,
    months_forward: usize,
}

impl SnapshotBuilder {
    pub fn new(ledger: Arc<dyn EventLedger>, costs: Arc<dyn CostStore>) -> Self {
        Self {
            ledger,
            costs,
            months_forward: DEFAULT_MONTHS_FORWARD,
        }
    }

    pub fn with_months_forward(mut self, months_forward: usize) -> Self {
        self.months_forward = months_forward;
        self
    }

    /// Build the snapshot for the month containing `reference`.
    pub fn build(&self, reference: NaiveDate) -> FinanceSnapshot {
        let period = Period::from_date(reference);
        let events = self.ledger.load_events();

        let shows = self.build_shows(&events, period);
        let expenses = self.flatten_expenses(&events, period);

        let current = aggregate_period(&events, self.costs.as_ref(), period);
        let previous = aggregate_period(&events, self.costs.as_ref(), period.prev());
        let kpis = KpiSet {
            income: current.income,
            expenses: current.expenses,
            net: current.net,
            payable: current.payable,
            margin_pct: margin_pct(current.net, current.income),
            previous_net: Some(previous.net),
        };

        let history = trailing_history(&events, self.costs.as_ref(), period, HISTORY_MONTHS);
        let forecasts = generate_scenarios(&history, period, self.months_forward);
        let anomalies = detect_expense_spikes(&expenses, current.income);
        let selected_scenario_id = forecasts.first().map(|s| s.id.clone());

        tracing::debug!(
            period = %period,
            shows = shows.len(),
            expenses = expenses.len(),
            anomalies = anomalies.len(),
            "snapshot built"
        );

        FinanceSnapshot {
            generated_at: Utc::now(),
            period,
            kpis,
            shows: Arc::new(shows),
            expenses: Arc::new(expenses),
            forecasts: Arc::new(forecasts),
            anomalies,
            selected_scenario_id,
        }
    }

    fn build_shows(&self, events: &[EventRecord], period: Period) -> Vec<FinanceShowSummary> {
        events
            .iter()
            .filter(|e| e.in_scope(period))
            .map(|event| {
                let f = calculator::calculate(event, &self.costs.costs_for(&event.id));
                FinanceShowSummary {
                    id: event.id.clone(),
                    date: event.date,
                    city: event.city.clone(),
                    venue: event.venue.clone(),
                    income: f.income,
                    expenses: f.expenses,
                    net: f.net,
                    payable: f.payable,
                    margin_pct: margin_pct(f.net, f.income),
                }
            })
            .collect()
    }

    /// Flatten each show into synthetic rows: one income row for the fee,
    /// one expense row per cost entry. Row ids are `"{show_id}:{index}"`
    /// with the income row at index 0.
    fn flatten_expenses(&self, events: &[EventRecord], period: Period) -> Vec<FinanceExpense> {
        let mut rows = Vec::new();

        for event in events.iter().filter(|e| e.in_scope(period)) {
            let f = calculator::calculate(event, &self.costs.costs_for(&event.id));

            rows.push(FinanceExpense {
                id: format!("{}:0", event.id),
                show_id: Some(event.id.clone()),
                category: "Income".to_string(),
                kind: EntryKind::Income,
                amount: f.income,
                date: event.date,
                description: Some("show fee".to_string()),
            });

            for (index, cost) in self.costs.costs_for(&event.id).iter().enumerate() {
                rows.push(FinanceExpense {
                    id: format!("{}:{}", event.id, index + 1),
                    show_id: Some(event.id.clone()),
                    category: "Expense".to_string(),
                    kind: EntryKind::Expense,
                    amount: tourledger_core::sanitize_amount(cost.amount),
                    date: event.date,
                    description: cost.desc.clone().or_else(|| Some(cost.kind.clone())),
                });
            }
        }

        rows
    }
}

fn margin_pct(net: f64, income: f64) -> f64 {
    if income == 0.0 {
        0.0
    } else {
        (100.0 * net / income).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CostEntry, EventRecord, EventStatus};
    use crate::sources::InMemoryLedger;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn one_show_ledger() -> Arc<InMemoryLedger> {
        Arc::new(InMemoryLedger::new().with_event(
            EventRecord::new("s1", date(2025, 3, 15), 4500.0, EventStatus::Confirmed),
            vec![CostEntry::new("venue", 1200.0)],
        ))
    }

    fn builder(ledger: Arc<InMemoryLedger>) -> SnapshotBuilder {
        SnapshotBuilder::new(ledger.clone(), ledger)
    }

    #[test]
    fn concrete_single_show_snapshot() {
        let snapshot = builder(one_show_ledger()).build(date(2025, 3, 20));

        let show = &snapshot.shows[0];
        assert_eq!(show.income, 4500.0);
        assert_eq!(show.expenses, 1200.0);
        assert_eq!(show.net, 3300.0);
        assert_eq!(show.margin_pct, 73.0);

        assert_eq!(snapshot.expenses.len(), 2);
        let income_row = &snapshot.expenses[0];
        assert_eq!(income_row.id, "s1:0");
        assert_eq!(income_row.category, "Income");
        assert_eq!(income_row.amount, 4500.0);
        let expense_row = &snapshot.expenses[1];
        assert_eq!(expense_row.id, "s1:1");
        assert_eq!(expense_row.category, "Expense");
        assert_eq!(expense_row.amount, 1200.0);
    }

    #[test]
    fn default_build_selects_baseline_and_three_forecasts() {
        let snapshot = builder(one_show_ledger()).build(date(2025, 3, 20));

        assert_eq!(snapshot.forecasts.len(), 3);
        assert_eq!(snapshot.selected_scenario_id.as_deref(), Some("baseline"));
        for scenario in snapshot.forecasts.iter() {
            assert_eq!(scenario.series.len(), DEFAULT_MONTHS_FORWARD);
        }
    }

    #[test]
    fn kpis_carry_previous_month_net() {
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_event(
                    EventRecord::new("feb", date(2025, 2, 10), 2000.0, EventStatus::Confirmed),
                    vec![],
                )
                .with_event(
                    EventRecord::new("mar", date(2025, 3, 10), 3000.0, EventStatus::Confirmed),
                    vec![CostEntry::new("travel", 500.0)],
                ),
        );
        let snapshot = builder(ledger).build(date(2025, 3, 20));

        assert_eq!(snapshot.kpis.net, 2500.0);
        assert_eq!(snapshot.kpis.previous_net, Some(2000.0));
        assert_eq!(snapshot.kpis.margin_pct, 83.0);
    }

    #[test]
    fn events_outside_reference_month_are_excluded() {
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_event(
                    EventRecord::new("mar", date(2025, 3, 10), 3000.0, EventStatus::Confirmed),
                    vec![],
                )
                .with_event(
                    EventRecord::new("apr", date(2025, 4, 1), 9999.0, EventStatus::Confirmed),
                    vec![],
                ),
        );
        let snapshot = builder(ledger).build(date(2025, 3, 20));

        assert_eq!(snapshot.shows.len(), 1);
        assert_eq!(snapshot.shows[0].id, "mar");
        assert_eq!(snapshot.kpis.income, 3000.0);
    }

    #[test]
    fn canceled_shows_are_dropped_from_the_snapshot() {
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_event(
                    EventRecord::new("mar", date(2025, 3, 10), 3000.0, EventStatus::Confirmed),
                    vec![],
                )
                .with_event(
                    EventRecord::new("gone", date(2025, 3, 12), 8000.0, EventStatus::Canceled),
                    vec![CostEntry::new("venue", 1000.0)],
                ),
        );
        let snapshot = builder(ledger).build(date(2025, 3, 20));

        assert_eq!(snapshot.shows.len(), 1);
        assert_eq!(snapshot.kpis.income, 3000.0);
        assert_eq!(snapshot.kpis.expenses, 0.0);
        assert!(snapshot.expenses.iter().all(|row| row.show_id.as_deref() != Some("gone")));
    }

    #[test]
    fn big_cost_entry_is_flagged_as_expense_spike() {
        let ledger = Arc::new(InMemoryLedger::new().with_event(
            EventRecord::new("s1", date(2025, 3, 15), 10_000.0, EventStatus::Confirmed),
            vec![
                CostEntry::new("production", 3500.0),
                CostEntry::new("travel", 2900.0),
            ],
        ));
        let snapshot = builder(ledger).build(date(2025, 3, 20));

        assert_eq!(snapshot.anomalies.len(), 1);
        assert_eq!(snapshot.anomalies[0].amount, 3500.0);
        assert_eq!(snapshot.anomalies[0].id, "s1:1");
    }

    #[test]
    fn rebuild_is_deterministic_except_generated_at() {
        let ledger = one_show_ledger();
        let b = builder(ledger);
        let first = b.build(date(2025, 3, 20));
        let second = b.build(date(2025, 3, 20));

        assert_eq!(first.period, second.period);
        assert_eq!(first.kpis, second.kpis);
        assert_eq!(first.shows, second.shows);
        assert_eq!(first.expenses, second.expenses);
        assert_eq!(first.forecasts, second.forecasts);
        assert_eq!(first.anomalies, second.anomalies);
        assert_eq!(first.selected_scenario_id, second.selected_scenario_id);
    }

    #[test]
    fn empty_ledger_builds_an_empty_but_complete_snapshot() {
        let ledger = Arc::new(InMemoryLedger::new());
        let snapshot = SnapshotBuilder::new(ledger.clone(), ledger).build(date(2025, 3, 20));

        assert!(snapshot.shows.is_empty());
        assert!(snapshot.expenses.is_empty());
        assert!(snapshot.anomalies.is_empty());
        assert_eq!(snapshot.kpis.net, 0.0);
        assert_eq!(snapshot.kpis.margin_pct, 0.0);
        // Forecasts still generate (sine-seeded) and baseline stays selected.
        assert_eq!(snapshot.forecasts.len(), 3);
        assert_eq!(snapshot.selected_scenario_id.as_deref(), Some("baseline"));
    }
}
