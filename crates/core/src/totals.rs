//! Scalar period aggregates and the malformed-amount policy.

use serde::{Deserialize, Serialize};

/// Income/expense/net/payable totals for one period.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub payable: f64,
}

/// Collapse malformed monetary input to zero.
///
/// Source records come from external stores and may carry NaN/infinite or
/// negative amounts; the snapshot path recovers locally instead of erroring.
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
