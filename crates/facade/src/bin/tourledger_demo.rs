//! End-to-end walkthrough: seed a ledger, build a snapshot, switch the
//! forecast scenario and run a few deterministic realtime ticks.
//!
//! Output is reproducible (fixed reference date, seeded jitter).

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;

use tourledger_facade::{DEFAULT_MONTHS_BACK, FinanceCore};
use tourledger_finance::{CostEntry, EventRecord, EventStatus, InMemoryLedger};
use tourledger_realtime::{RealtimeSimulator, SeededJitter};

fn seed_ledger() -> Arc<InMemoryLedger> {
    let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).expect("valid demo date");

    Arc::new(
        InMemoryLedger::new()
            .with_event(
                EventRecord::new("berlin-0312", date(3, 12), 4500.0, EventStatus::Confirmed)
                    .with_city("Berlin")
                    .with_venue("Astra"),
                vec![
                    CostEntry::new("venue", 1200.0),
                    CostEntry::new("travel", 480.0),
                ],
            )
            .with_event(
                EventRecord::new("hamburg-0321", date(3, 21), 3800.0, EventStatus::Pending)
                    .with_city("Hamburg")
                    .with_venue("Knust"),
                vec![CostEntry::new("crew", 650.0)],
            )
            .with_event(
                EventRecord::new("koeln-0204", date(2, 4), 3100.0, EventStatus::Confirmed)
                    .with_city("Köln"),
                vec![CostEntry::new("venue", 900.0)],
            )
            .with_event(
                EventRecord::new("leipzig-0118", date(1, 18), 2600.0, EventStatus::Confirmed)
                    .with_city("Leipzig"),
                vec![CostEntry::new("travel", 340.0)],
            ),
    )
}

fn main() -> anyhow::Result<()> {
    tourledger_observability::init();

    let ledger = seed_ledger();
    let mut core = FinanceCore::new(ledger.clone(), ledger);
    let reference = NaiveDate::from_ymd_opt(2025, 3, 25).context("valid reference date")?;

    core.refresh(reference);
    let snapshot = core
        .snapshot()
        .context("snapshot missing after refresh")?
        .clone();

    println!("== KPIs ({}) ==", snapshot.value.period);
    println!("{}", serde_json::to_string_pretty(&snapshot.value.kpis)?);

    println!("\n== Scenarios ==");
    for scenario in core.list_scenarios() {
        println!("  {} ({})", scenario.label, scenario.id);
    }
    core.set_scenario("optimistic")?;
    let active = core.active_scenario().context("no active scenario")?;
    println!(
        "active: {} — next 6 months: {:?}",
        active.label,
        active.series.iter().map(|p| p.value).collect::<Vec<_>>()
    );

    println!("\n== Expenses by category ==");
    for total in core
        .expense_by_category()
        .context("selectors unavailable")?
        .iter()
    {
        println!("  {:<10} {:>10.2}", total.category, total.total);
    }

    println!("\n== Trailing year ==");
    for point in core.month_series(reference, DEFAULT_MONTHS_BACK) {
        if point.income > 0.0 || point.expenses > 0.0 {
            println!(
                "  {}  income {:>8.2}  expenses {:>8.2}  net {:>8.2}",
                point.month, point.income, point.expenses, point.net
            );
        }
    }

    let report = core.validate().context("no snapshot to validate")?;
    println!("\nreconciliation pass: {}", report.pass);

    println!("\n== Realtime ticks (seeded) ==");
    let snapshot = core
        .snapshot()
        .context("snapshot missing after scenario change")?
        .clone();
    let simulator = RealtimeSimulator::new(snapshot, Box::new(SeededJitter::new(2025)));
    simulator.on_snapshot(|s| {
        println!("  net -> {:.2}", s.kpis.net);
        Ok(())
    });
    for _ in 0..5 {
        simulator.tick_once();
    }

    Ok(())
}
