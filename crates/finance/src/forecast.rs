//! Multi-scenario net forecasting.
//!
//! Derives trend and volatility from trailing month aggregates and projects
//! N forward months per scenario. The projection is an intentionally simple
//! deterministic heuristic: same history in, same series out. Reproducibility
//! matters more here than statistical rigor, so the "noise" term is a named
//! sine oscillation, never an RNG.

use serde::{Deserialize, Serialize};
use tourledger_core::{Period, PeriodTotals};

/// Forward window used by a default snapshot build.
pub const DEFAULT_MONTHS_FORWARD: usize = 6;

/// Scenario taxonomy. `Custom` is reserved for user-defined projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Baseline,
    Optimistic,
    Pessimistic,
    Custom,
}

/// One projected future month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// `"YYYY-MM"` month key; series are sorted ascending by this field.
    pub month: String,
    /// Projected net, rounded to the nearest whole currency unit.
    pub value: f64,
}

/// A named projection path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastScenario {
    pub id: String,
    pub label: String,
    pub kind: ScenarioKind,
    /// Descriptive weight in 0..=1; not computed from projection error.
    pub confidence: f64,
    pub assumptions: Vec<String>,
    pub series: Vec<ForecastPoint>,
}

/// Deterministic pseudo-oscillation scaled by historical volatility.
///
/// `i` is the zero-based forward month index. The 1.73 step keeps successive
/// samples away from the sine period so the series does not visibly repeat
/// inside a 6-month window.
pub fn noise(i: usize, volatility: f64, variance: f64) -> f64 {
    ((i + 1) as f64 * 1.73).sin() * volatility * variance
}

struct ScenarioDef {
    id: &'static str,
    label: &'static str,
    kind: ScenarioKind,
    growth_offset: f64,
    variance: f64,
    confidence: f64,
    assumption: &'static str,
}

const SCENARIO_DEFS: [ScenarioDef; 3] = [
    ScenarioDef {
        id: "baseline",
        label: "Baseline",
        kind: ScenarioKind::Baseline,
        growth_offset: 0.0,
        variance: 0.15,
        confidence: 0.6,
        assumption: "booking pace continues at the trailing 6-month average",
    },
    ScenarioDef {
        id: "optimistic",
        label: "Optimistic",
        kind: ScenarioKind::Optimistic,
        growth_offset: 0.12,
        variance: 0.20,
        confidence: 0.2,
        assumption: "additional bookings lift monthly growth by 12 points",
    },
    ScenarioDef {
        id: "pessimistic",
        label: "Pessimistic",
        kind: ScenarioKind::Pessimistic,
        growth_offset: -0.15,
        variance: 0.25,
        confidence: 0.2,
        assumption: "cancellations drag monthly growth down by 15 points",
    },
];

/// Generate the default scenario set from trailing history.
///
/// `history` is oldest-first (see [`crate::aggregate::trailing_history`]);
/// `reference` is the snapshot month, so the first projected point is
/// `reference + 1`.
///
/// Degenerate history (zero or one month) falls back to volatility 1.0 and
/// zero growth; scenarios still produce a full series seeded only by the
/// sine term.
pub fn generate_scenarios(
    history: &[PeriodTotals],
    reference: Period,
    months_forward: usize,
) -> Vec<ForecastScenario> {
    let nets: Vec<f64> = history.iter().map(|t| t.net).collect();

    let avg_net = mean(&nets);
    let volatility = if nets.len() < 2 {
        1.0
    } else {
        stddev_population(&nets, avg_net)
    };

    let last_net = nets.last().copied().unwrap_or(0.0);
    let base_growth = if last_net == 0.0 {
        0.0
    } else {
        avg_net / last_net - 1.0
    };

    SCENARIO_DEFS
        .iter()
        .map(|def| {
            let growth = base_growth + def.growth_offset;
            let mut series = Vec::with_capacity(months_forward);
            let mut last = last_net;

            for i in 0..months_forward {
                let next = last * (1.0 + growth) + noise(i, volatility, def.variance);
                series.push(ForecastPoint {
                    month: reference.shift(i as i32 + 1).key(),
                    value: next.round(),
                });
                last = next;
            }

            ForecastScenario {
                id: def.id.to_string(),
                label: def.label.to_string(),
                kind: def.kind,
                confidence: def.confidence,
                assumptions: vec![
                    def.assumption.to_string(),
                    format!("noise dampened to {:.0}% of volatility", def.variance * 100.0),
                ],
                series,
            }
        })
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Population standard deviation (n), deterministic.
fn stddev_population(xs: &[f64], mean: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / (xs.len() as f64);
    var.sqrt()
}
