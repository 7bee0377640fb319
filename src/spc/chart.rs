//! Core sensitizing-rule types.
//!
//! Defines the rule identifiers, the inclusive index spans a rule implicates
//! when it fires, and the violation records accumulated by the evaluator.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

use serde::Serialize;

/// Control limit in z units (Rule 1).
pub const CONTROL_LIMIT_Z: f64 = 3.0;

/// Warning zone boundary in z units (Rule 2).
pub const TWO_SIGMA_Z: f64 = 2.0;

/// Inner zone boundary in z units (Rules 3, 6, 8).
pub const ONE_SIGMA_Z: f64 = 1.0;

/// The eight sensitizing rules, in evaluation order.
///
/// Rules 5 and 7 look at raw measurements; all others look at z-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Rule 1: one point at or beyond ±3σ.
    BeyondLimits,

    /// Rule 2: 2 of 3 consecutive points at or beyond 2σ on one side.
    TwoOfThreeBeyond2Sigma,

    /// Rule 3: 4 of 5 consecutive points at or beyond 1σ on one side.
    FourOfFiveBeyond1Sigma,

    /// Rule 4: 8 consecutive points strictly on one side of the center line.
    ///
    /// Indicates a sustained shift in the process mean.
    EightOneSide,

    /// Rule 5: 6 raw values strictly increasing or strictly decreasing.
    SixTrend,

    /// Rule 6: 15 consecutive points strictly within ±1σ.
    ///
    /// Indicates stratification: reduced variation suggesting mixed streams.
    FifteenWithin1Sigma,

    /// Rule 7: 14 raw values alternating up and down.
    FourteenAlternating,

    /// Rule 8: 8 consecutive points at or beyond 1σ, touching both sides.
    ///
    /// Indicates a mixture pattern: points avoid the center zone.
    EightBeyond1SigmaBothSides,
}

impl RuleId {
    /// All rules in the fixed evaluation order.
    pub const ALL: [RuleId; 8] = [
        RuleId::BeyondLimits,
        RuleId::TwoOfThreeBeyond2Sigma,
        RuleId::FourOfFiveBeyond1Sigma,
        RuleId::EightOneSide,
        RuleId::SixTrend,
        RuleId::FifteenWithin1Sigma,
        RuleId::FourteenAlternating,
        RuleId::EightBeyond1SigmaBothSides,
    ];

    /// 1-based rule number used in messages.
    pub fn number(self) -> u8 {
        match self {
            RuleId::BeyondLimits => 1,
            RuleId::TwoOfThreeBeyond2Sigma => 2,
            RuleId::FourOfFiveBeyond1Sigma => 3,
            RuleId::EightOneSide => 4,
            RuleId::SixTrend => 5,
            RuleId::FifteenWithin1Sigma => 6,
            RuleId::FourteenAlternating => 7,
            RuleId::EightBeyond1SigmaBothSides => 8,
        }
    }

    /// Number of trailing points the rule inspects, current point included.
    pub fn window(self) -> usize {
        match self {
            RuleId::BeyondLimits => 1,
            RuleId::TwoOfThreeBeyond2Sigma => 3,
            RuleId::FourOfFiveBeyond1Sigma => 5,
            RuleId::EightOneSide => 8,
            RuleId::SixTrend => 6,
            RuleId::FifteenWithin1Sigma => 15,
            RuleId::FourteenAlternating => 14,
            RuleId::EightBeyond1SigmaBothSides => 8,
        }
    }

    /// Whether the rule reads raw measurements instead of z-scores.
    pub fn uses_raw_values(self) -> bool {
        matches!(self, RuleId::SixTrend | RuleId::FourteenAlternating)
    }

    /// Trailing window ending at `index`, or `None` while history is too short.
    pub fn span_at(self, index: usize) -> Option<Span> {
        let w = self.window();
        (index + 1 >= w).then(|| Span::new(index + 1 - w, index))
    }
}

/// Inclusive index range `[lo, hi]` implicated by a firing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

impl Span {
    /// Creates a span. `lo` must not exceed `hi`.
    pub fn new(lo: usize, hi: usize) -> Self {
        debug_assert!(lo <= hi, "span lo {lo} > hi {hi}");
        Self { lo, hi }
    }

    /// Number of indices covered.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.hi - self.lo + 1
    }

    /// Iterates the covered indices in ascending order.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.lo..=self.hi
    }
}

/// One rule firing at one index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Which rule fired.
    pub rule: RuleId,
    /// Index at which the rule fired (the last point of the window).
    pub index: usize,
    /// Points implicated by the firing.
    pub span: Span,
    /// Human-readable description, e.g. `[Rule 4] 8 points on one side between 0 and 7`.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_numbers_follow_order() {
        for (i, rule) in RuleId::ALL.iter().enumerate() {
            assert_eq!(rule.number() as usize, i + 1);
        }
    }

    #[test]
    fn test_windows() {
        let windows: Vec<usize> = RuleId::ALL.iter().map(|r| r.window()).collect();
        assert_eq!(windows, vec![1, 3, 5, 8, 6, 15, 14, 8]);
    }

    #[test]
    fn test_raw_value_rules() {
        let raw: Vec<u8> = RuleId::ALL
            .iter()
            .filter(|r| r.uses_raw_values())
            .map(|r| r.number())
            .collect();
        assert_eq!(raw, vec![5, 7]);
    }

    #[test]
    fn test_span_at_requires_history() {
        assert_eq!(RuleId::SixTrend.span_at(4), None);
        assert_eq!(RuleId::SixTrend.span_at(5), Some(Span::new(0, 5)));
        assert_eq!(RuleId::BeyondLimits.span_at(0), Some(Span::new(0, 0)));
        assert_eq!(RuleId::FifteenWithin1Sigma.span_at(20), Some(Span::new(6, 20)));
    }

    #[test]
    fn test_span_indices() {
        let span = Span::new(3, 6);
        assert_eq!(span.len(), 4);
        assert_eq!(span.indices().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_violation_serializes_rule_name() {
        let v = Violation {
            rule: RuleId::SixTrend,
            index: 5,
            span: Span::new(0, 5),
            message: "[Rule 5] 6 points steadily increasing between 0 and 5".into(),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["rule"], "six_trend");
        assert_eq!(json["span"]["lo"], 0);
        assert_eq!(json["span"]["hi"], 5);
    }
}
