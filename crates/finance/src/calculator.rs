//! Per-show finance calculation.

use tourledger_core::sanitize_amount;

use crate::records::{CostEntry, EventRecord};

/// Income/expense/net/payable for a single show.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct ShowFinance {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub payable: f64,
}

/// Compute the snapshot-path finance result for one show.
///
/// - income: fee override when present, else base fee
/// - expenses: sum of cost amounts, clamped to >= 0
/// - net: floored at zero (the richer per-show ledger elsewhere allows
///   negative net after commissions/withholding; the dashboard KPI path
///   deliberately does not)
/// - payable: full income while the fee is pending or overdue
///
/// Malformed numeric fields collapse to zero; there are no error paths.
pub fn calculate(event: &EventRecord, costs: &[CostEntry]) -> ShowFinance {
    let income = sanitize_amount(event.fee_override.unwrap_or(event.fee));
    let expenses: f64 = costs.iter().map(|c| sanitize_amount(c.amount)).sum();
    let net = (income - expenses).max(0.0);
    let payable = if event.status.is_payable() { income } else { 0.0 };

    ShowFinance {
        income,
        expenses,
        net,
        payable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::EventStatus;
    use chrono::NaiveDate;

    fn show(fee: f64, status: EventStatus) -> EventRecord {
        EventRecord::new(
            "s1",
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            fee,
            status,
        )
    }

    #[test]
    fn fee_minus_costs() {
        let f = calculate(
            &show(4500.0, EventStatus::Confirmed),
            &[CostEntry::new("venue", 1200.0)],
        );
        assert_eq!(f.income, 4500.0);
        assert_eq!(f.expenses, 1200.0);
        assert_eq!(f.net, 3300.0);
        assert_eq!(f.payable, 0.0);
    }

    #[test]
    fn override_takes_precedence_over_base_fee() {
        let event = show(4500.0, EventStatus::Confirmed).with_fee_override(5000.0);
        assert_eq!(calculate(&event, &[]).income, 5000.0);
    }

    #[test]
    fn net_is_floored_at_zero() {
        let f = calculate(
            &show(1000.0, EventStatus::Confirmed),
            &[CostEntry::new("production", 2500.0)],
        );
        assert_eq!(f.net, 0.0);
        assert_eq!(f.expenses, 2500.0);
    }

    #[test]
    fn pending_and_overdue_fees_are_payable() {
        assert_eq!(calculate(&show(800.0, EventStatus::Pending), &[]).payable, 800.0);
        assert_eq!(calculate(&show(800.0, EventStatus::Overdue), &[]).payable, 800.0);
        assert_eq!(calculate(&show(800.0, EventStatus::Confirmed), &[]).payable, 0.0);
    }

    #[test]
    fn malformed_amounts_default_to_zero() {
        let mut event = show(f64::NAN, EventStatus::Confirmed);
        let f = calculate(&event, &[CostEntry::new("travel", f64::NAN)]);
        assert_eq!(f.income, 0.0);
        assert_eq!(f.expenses, 0.0);

        event.fee = -300.0;
        assert_eq!(calculate(&event, &[]).income, 0.0);
    }
}
