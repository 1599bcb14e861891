//! Month-level aggregation of per-show results.

use tourledger_core::{Period, PeriodTotals};

use crate::calculator;
use crate::records::EventRecord;
use crate::sources::CostStore;

/// Sum per-show finance results for every event inside `period`.
///
/// Canceled shows are out of scope for the whole snapshot path: they carry
/// neither income nor costs here.
pub fn aggregate_period(
    events: &[EventRecord],
    costs: &dyn CostStore,
    period: Period,
) -> PeriodTotals {
    let mut totals = PeriodTotals::default();

    for event in events.iter().filter(|e| e.in_scope(period)) {
        let f = calculator::calculate(event, &costs.costs_for(&event.id));
        totals.income += f.income;
        totals.expenses += f.expenses;
        totals.net += f.net;
        totals.payable += f.payable;
    }

    totals
}

/// Trailing month aggregates, oldest first.
///
/// For `months = 6` this yields the aggregates for 6 months back through
/// 1 month back relative to `reference` — the history window the forecasting
/// engine derives trend and volatility from.
pub fn trailing_history(
    events: &[EventRecord],
    costs: &dyn CostStore,
    reference: Period,
    months: usize,
) -> Vec<PeriodTotals> {
    (1..=months as i32)
        .rev()
        .map(|back| aggregate_period(events, costs, reference.shift(-back)))
        .collect()
}
