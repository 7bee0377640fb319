//! Sensitizing run rules for individual measurements.
//!
//! Eight pattern tests applied in a single left-to-right pass. At each index
//! every rule whose window fits is tested independently; each firing yields
//! one [`Violation`] whose span is the rule's trailing window.
//!
//! | Rule | Window | Fires when                                         | Data     |
//! |------|--------|----------------------------------------------------|----------|
//! | 1    | 1      | `|z| >= 3`                                         | z-scores |
//! | 2    | 3      | ≥2 with `z >= 2`, or ≥2 with `z <= -2`             | z-scores |
//! | 3    | 5      | ≥4 with `z >= 1`, or ≥4 with `z <= -1`             | z-scores |
//! | 4    | 8      | all `z > 0`, or all `z < 0`                        | z-scores |
//! | 5    | 6      | strictly increasing or strictly decreasing         | raw      |
//! | 6    | 15     | all `|z| < 1`                                      | z-scores |
//! | 7    | 14     | 13 non-zero differences alternating in sign        | raw      |
//! | 8    | 8      | all `|z| >= 1`, at least one above and one below 0 | z-scores |
//!
//! # References
//!
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use super::chart::{RuleId, Violation, CONTROL_LIMIT_Z, ONE_SIGMA_Z, TWO_SIGMA_Z};

/// Trait for applying a battery of run rules to a normalized sequence.
pub trait RunRule {
    /// Evaluate `values` and their parallel `zscores`.
    ///
    /// Violations are returned index-major, rule-minor. Both slices must have
    /// the same length; only the common prefix is scanned otherwise.
    fn evaluate(&self, values: &[f64], zscores: &[f64]) -> Evaluation;
}

/// The fixed eight-rule sensitizing battery.
///
/// Rules are always evaluated in order 1 through 8 and never short-circuit
/// each other: several rules may fire at the same index.
///
/// # Examples
///
/// ```
/// use spc_sensitize::spc::{normalize, RunRule, SensitizingRules};
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let z = normalize(&values).unwrap().zscores;
/// let eval = SensitizingRules.evaluate(&values, &z);
/// assert_eq!(eval.flagged_indices(), vec![0, 1, 2, 3, 4, 5]);
/// assert_eq!(
///     eval.messages(),
///     vec!["[Rule 5] 6 points steadily increasing between 0 and 5"]
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SensitizingRules;

/// Accumulated outcome of a rule scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    /// Every firing, in firing order.
    pub violations: Vec<Violation>,
    /// Union of all fired spans.
    pub flagged: BTreeSet<usize>,
}

impl Evaluation {
    /// Messages in firing order.
    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.message.as_str()).collect()
    }

    /// Flagged indices in ascending order.
    pub fn flagged_indices(&self) -> Vec<usize> {
        self.flagged.iter().copied().collect()
    }

    /// `true` when no rule fired.
    pub fn is_in_control(&self) -> bool {
        self.violations.is_empty()
    }

    fn record(&mut self, violation: Violation) {
        self.flagged.extend(violation.span.indices());
        self.violations.push(violation);
    }
}

// ---------------------------------------------------------------------------
// Rule checks
// ---------------------------------------------------------------------------

/// Signature shared by all rule checks: `(values, zscores, index)`.
type RuleCheck = fn(&[f64], &[f64], usize) -> Option<Violation>;

/// Checks in evaluation order.
const CHECKS: [RuleCheck; 8] = [
    check_rule1,
    check_rule2,
    check_rule3,
    check_rule4,
    check_rule5,
    check_rule6,
    check_rule7,
    check_rule8,
];

fn violation(rule: RuleId, index: usize, detail: String) -> Option<Violation> {
    let span = rule.span_at(index)?;
    Some(Violation {
        rule,
        index,
        span,
        message: format!("[Rule {}] {detail}", rule.number()),
    })
}

/// Rule 1: one point at or beyond the 3σ control limits.
fn check_rule1(_values: &[f64], z: &[f64], i: usize) -> Option<Violation> {
    let zi = z[i];
    if zi.abs() >= CONTROL_LIMIT_Z {
        violation(
            RuleId::BeyondLimits,
            i,
            format!("Point {i} outside control limits: z={zi:.2}"),
        )
    } else {
        None
    }
}

/// Rule 2: 2 of 3 consecutive points at or beyond 2σ.
///
/// The upper and lower tallies are independent within the window.
fn check_rule2(_values: &[f64], z: &[f64], i: usize) -> Option<Violation> {
    let span = RuleId::TwoOfThreeBeyond2Sigma.span_at(i)?;
    let window = &z[span.lo..=span.hi];
    let above = window.iter().filter(|&&v| v >= TWO_SIGMA_Z).count();
    let below = window.iter().filter(|&&v| v <= -TWO_SIGMA_Z).count();
    if above >= 2 || below >= 2 {
        violation(
            RuleId::TwoOfThreeBeyond2Sigma,
            i,
            format!("2 of 3 outside +/-2 between {} and {i}", span.lo),
        )
    } else {
        None
    }
}

/// Rule 3: 4 of 5 consecutive points at or beyond 1σ on one side.
fn check_rule3(_values: &[f64], z: &[f64], i: usize) -> Option<Violation> {
    let span = RuleId::FourOfFiveBeyond1Sigma.span_at(i)?;
    let window = &z[span.lo..=span.hi];
    let above = window.iter().filter(|&&v| v >= ONE_SIGMA_Z).count();
    let below = window.iter().filter(|&&v| v <= -ONE_SIGMA_Z).count();
    if above >= 4 || below >= 4 {
        violation(
            RuleId::FourOfFiveBeyond1Sigma,
            i,
            format!("4 of 5 beyond +/-1 between {} and {i}", span.lo),
        )
    } else {
        None
    }
}

/// Rule 4: 8 consecutive points strictly on one side of the center line.
///
/// A point exactly on the center line belongs to neither side.
fn check_rule4(_values: &[f64], z: &[f64], i: usize) -> Option<Violation> {
    let span = RuleId::EightOneSide.span_at(i)?;
    let window = &z[span.lo..=span.hi];
    let all_above = window.iter().all(|&v| v > 0.0);
    let all_below = window.iter().all(|&v| v < 0.0);
    if all_above || all_below {
        violation(
            RuleId::EightOneSide,
            i,
            format!("8 points on one side between {} and {i}", span.lo),
        )
    } else {
        None
    }
}

/// Rule 5: 6 raw values steadily increasing or decreasing.
///
/// Equal neighbours break the trend in both directions.
fn check_rule5(values: &[f64], _z: &[f64], i: usize) -> Option<Violation> {
    let span = RuleId::SixTrend.span_at(i)?;
    let window = &values[span.lo..=span.hi];
    let increasing = window.windows(2).all(|w| w[0] < w[1]);
    let decreasing = window.windows(2).all(|w| w[0] > w[1]);
    if increasing || decreasing {
        let direction = if increasing { "increasing" } else { "decreasing" };
        violation(
            RuleId::SixTrend,
            i,
            format!("6 points steadily {direction} between {} and {i}", span.lo),
        )
    } else {
        None
    }
}

/// Rule 6: 15 consecutive points strictly within ±1σ.
fn check_rule6(_values: &[f64], z: &[f64], i: usize) -> Option<Violation> {
    let span = RuleId::FifteenWithin1Sigma.span_at(i)?;
    let window = &z[span.lo..=span.hi];
    if window.iter().all(|v| v.abs() < ONE_SIGMA_Z) {
        violation(
            RuleId::FifteenWithin1Sigma,
            i,
            format!("15 points within +/-1 between {} and {i}", span.lo),
        )
    } else {
        None
    }
}

/// Rule 7: 14 raw values alternating up and down.
///
/// All 13 consecutive differences must be non-zero and each must have the
/// opposite sign of its predecessor.
fn check_rule7(values: &[f64], _z: &[f64], i: usize) -> Option<Violation> {
    let span = RuleId::FourteenAlternating.span_at(i)?;
    let diffs: Vec<f64> = values[span.lo..=span.hi]
        .windows(2)
        .map(|w| w[1] - w[0])
        .collect();
    if diffs.iter().any(|&d| d == 0.0) {
        return None;
    }
    let alternating = diffs.windows(2).all(|d| (d[0] > 0.0) != (d[1] > 0.0));
    if alternating {
        violation(
            RuleId::FourteenAlternating,
            i,
            format!("14 points alternating up/down between {} and {i}", span.lo),
        )
    } else {
        None
    }
}

/// Rule 8: 8 consecutive points at or beyond 1σ, spanning both sides.
fn check_rule8(_values: &[f64], z: &[f64], i: usize) -> Option<Violation> {
    let span = RuleId::EightBeyond1SigmaBothSides.span_at(i)?;
    let window = &z[span.lo..=span.hi];
    let all_outside = window.iter().all(|v| v.abs() >= ONE_SIGMA_Z);
    let any_above = window.iter().any(|&v| v > 0.0);
    let any_below = window.iter().any(|&v| v < 0.0);
    if all_outside && any_above && any_below {
        violation(
            RuleId::EightBeyond1SigmaBothSides,
            i,
            format!(
                "8 points outside +/-1 on both sides between {} and {i}",
                span.lo
            ),
        )
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// RunRule implementation
// ---------------------------------------------------------------------------

impl RunRule for SensitizingRules {
    fn evaluate(&self, values: &[f64], zscores: &[f64]) -> Evaluation {
        debug_assert_eq!(values.len(), zscores.len());
        let n = values.len().min(zscores.len());
        let (values, zscores) = (&values[..n], &zscores[..n]);

        let mut eval = Evaluation::default();
        for i in 0..n {
            for check in CHECKS {
                if let Some(v) = check(values, zscores, i) {
                    eval.record(v);
                }
            }
        }

        debug!(
            n,
            violations = eval.violations.len(),
            flagged = eval.flagged.len(),
            "sensitizing rules evaluated"
        );
        eval
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::spc::normalize;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn flagged_is_union_of_spans_within_bounds(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=80)
        ) {
            if let Ok(norm) = normalize(&data) {
                let eval = SensitizingRules.evaluate(&data, &norm.zscores);
                let union: BTreeSet<usize> = eval
                    .violations
                    .iter()
                    .flat_map(|v| v.span.indices())
                    .collect();
                prop_assert_eq!(&eval.flagged, &union);
                if let Some(&max) = eval.flagged.iter().next_back() {
                    prop_assert!(max < data.len(), "flagged {max} >= n {}", data.len());
                }
            }
        }

        #[test]
        fn firing_order_is_index_major(
            data in proptest::collection::vec(-50_f64..50.0, 2..=60)
        ) {
            if let Ok(norm) = normalize(&data) {
                let eval = SensitizingRules.evaluate(&data, &norm.zscores);
                for pair in eval.violations.windows(2) {
                    prop_assert!(
                        (pair[0].index, pair[0].rule) < (pair[1].index, pair[1].rule),
                        "out of order: {:?} then {:?}", pair[0].rule, pair[1].rule
                    );
                }
                for v in &eval.violations {
                    prop_assert_eq!(v.span.hi, v.index);
                    prop_assert_eq!(v.span.len(), v.rule.window());
                }
            }
        }
    }
}
