//! Analysis pipeline and result assembly.
//!
//! [`analyze`] runs normalization and the rule scan over a cleaned sequence.
//! [`control_sensitizing_graph`] is the whole boundary: CSV bytes and a
//! column name in, an [`AnalysisReport`] out. It never fails; validation
//! failures become `ok = false` reports.
//!
//! # Examples
//!
//! ```
//! use spc_sensitize::analysis::control_sensitizing_graph;
//!
//! let csv = b"trial,width\n1,1\n2,2\n3,3\n4,4\n5,5\n6,6\n";
//! let report = control_sensitizing_graph(csv, "width");
//! assert!(report.is_ok());
//!
//! let json = serde_json::to_value(&report).unwrap();
//! assert_eq!(json["ok"], true);
//! assert_eq!(json["n"], 6);
//! assert_eq!(json["flagged_indices"], serde_json::json!([0, 1, 2, 3, 4, 5]));
//! ```

use serde::Serialize;
use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::{Result, SpcError};
use crate::render::SvgChart;
use crate::spc::{normalize, Evaluation, RunRule, SensitizingRules, Violation};

/// Outcome of normalizing and scanning one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Number of observations.
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation (n-1).
    pub std: f64,
    /// Parallel z-score sequence.
    pub zscores: Vec<f64>,
    /// Rule firings and flagged indices.
    pub evaluation: Evaluation,
}

impl Analysis {
    /// Flagged indices in ascending order.
    pub fn flagged_indices(&self) -> Vec<usize> {
        self.evaluation.flagged_indices()
    }

    /// Violation messages in firing order.
    pub fn messages(&self) -> Vec<&str> {
        self.evaluation.messages()
    }
}

/// Normalizes `values` and applies the sensitizing rules.
///
/// # Errors
///
/// Propagates [`SpcError::InsufficientData`] and
/// [`SpcError::DegenerateVariance`] from normalization; no rule runs then.
pub fn analyze(values: &[f64]) -> Result<Analysis> {
    let norm = normalize(values)?;
    let evaluation = SensitizingRules.evaluate(values, &norm.zscores);
    info!(
        n = values.len(),
        mean = norm.mean,
        std = norm.std,
        violations = evaluation.violations.len(),
        flagged = evaluation.flagged.len(),
        "analysis complete"
    );
    Ok(Analysis {
        n: values.len(),
        mean: norm.mean,
        std: norm.std,
        zscores: norm.zscores,
        evaluation,
    })
}

/// Report for a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessReport {
    ok: bool,
    pub n: usize,
    pub mean: f64,
    pub std: f64,
    /// Flagged indices, ascending.
    pub flagged_indices: Vec<usize>,
    /// Violation messages in firing order.
    pub messages: Vec<String>,
    /// Structured form of `messages`.
    pub violations: Vec<Violation>,
    /// Rendered chart, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_svg: Option<String>,
}

/// Report for a failed analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    ok: bool,
    pub error: String,
}

/// Either outcome, serialized flat with an `ok` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Success(SuccessReport),
    Failure(FailureReport),
}

impl AnalysisReport {
    /// Build a success report without a chart.
    pub fn success(analysis: &Analysis) -> Self {
        AnalysisReport::Success(SuccessReport {
            ok: true,
            n: analysis.n,
            mean: analysis.mean,
            std: analysis.std,
            flagged_indices: analysis.flagged_indices(),
            messages: analysis
                .evaluation
                .violations
                .iter()
                .map(|v| v.message.clone())
                .collect(),
            violations: analysis.evaluation.violations.clone(),
            chart_svg: None,
        })
    }

    /// Render the z-score chart of `analysis` under `title` and attach it.
    ///
    /// Failure reports are returned unchanged.
    pub fn with_chart(mut self, analysis: &Analysis, title: &str) -> Self {
        if let AnalysisReport::Success(s) = &mut self {
            s.chart_svg = Some(SvgChart::default().render(
                title,
                &analysis.zscores,
                &analysis.evaluation.flagged,
            ));
        }
        self
    }

    /// Build a failure report from a validation error.
    pub fn failure(err: &SpcError) -> Self {
        AnalysisReport::Failure(FailureReport {
            ok: false,
            error: err.to_string(),
        })
    }

    /// `true` for a successful analysis.
    pub fn is_ok(&self) -> bool {
        matches!(self, AnalysisReport::Success(_))
    }

    /// The rendered chart, if any.
    pub fn chart_svg(&self) -> Option<&str> {
        match self {
            AnalysisReport::Success(s) => s.chart_svg.as_deref(),
            AnalysisReport::Failure(_) => None,
        }
    }

    /// Drop the embedded chart, returning it.
    pub fn take_chart(&mut self) -> Option<String> {
        match self {
            AnalysisReport::Success(s) => s.chart_svg.take(),
            AnalysisReport::Failure(_) => None,
        }
    }

    /// Human-readable summary
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        match self {
            AnalysisReport::Success(s) => {
                out.push_str(&format!(
                    "n = {}, mean = {:.4}, std = {:.4}\n",
                    s.n, s.mean, s.std
                ));
                if s.messages.is_empty() {
                    out.push_str("No sensitizing rule violations.\n");
                } else {
                    out.push_str(&format!(
                        "{} violation(s), {} flagged point(s): {:?}\n",
                        s.messages.len(),
                        s.flagged_indices.len(),
                        s.flagged_indices
                    ));
                    for msg in &s.messages {
                        out.push_str(msg);
                        out.push('\n');
                    }
                }
            }
            AnalysisReport::Failure(f) => {
                out.push_str(&format!("error: {}\n", f.error));
            }
        }
        out
    }
}

/// Runs the full pipeline on one column of CSV data.
pub fn control_sensitizing_graph(csv: &[u8], column: &str) -> AnalysisReport {
    let result = Dataset::from_csv_bytes(csv)
        .and_then(|data| data.cleaned_column(column))
        .and_then(|values| analyze(&values));

    match result {
        Ok(analysis) => AnalysisReport::success(&analysis)
            .with_chart(&analysis, &SvgChart::title_for(column)),
        Err(err) => {
            warn!(column, error = %err, "analysis rejected");
            AnalysisReport::failure(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_trend() {
        let a = analyze(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(a.n, 6);
        assert!((a.mean - 3.5).abs() < 1e-12);
        assert!((a.std - 3.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!(a.flagged_indices(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(a.messages().len(), 1);
    }

    #[test]
    fn test_analyze_rejects_short_input() {
        assert_eq!(
            analyze(&[1.0]).unwrap_err(),
            SpcError::InsufficientData { found: 1 }
        );
    }

    #[test]
    fn test_failure_report_shape() {
        let report = AnalysisReport::failure(&SpcError::InsufficientData { found: 0 });
        assert!(!report.is_ok());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], false);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Need at least 2 non-missing values"));
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_success_report_without_chart() {
        let a = analyze(&[1.0, 3.0, 2.0]).unwrap();
        let report = AnalysisReport::success(&a);
        assert!(report.chart_svg().is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("chart_svg").is_none());
        assert_eq!(json["messages"], serde_json::json!([]));
    }

    #[test]
    fn test_success_report_keys() {
        let report = control_sensitizing_graph(b"v\n1\n2\n3\n4\n5\n6\n", "v");
        let json = serde_json::to_value(&report).unwrap();
        let mut keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "chart_svg",
                "flagged_indices",
                "mean",
                "messages",
                "n",
                "ok",
                "std",
                "violations"
            ]
        );
        assert_eq!(json["flagged_indices"], serde_json::json!([0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_ok_flag_follows_variant() {
        let a = analyze(&[1.0, 3.0, 2.0]).unwrap();
        match AnalysisReport::success(&a) {
            AnalysisReport::Success(s) => assert!(s.ok),
            AnalysisReport::Failure(_) => panic!("expected success"),
        }
        match AnalysisReport::failure(&SpcError::EmptyInput) {
            AnalysisReport::Failure(f) => assert!(!f.ok),
            AnalysisReport::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_with_chart_is_explicit() {
        let a = analyze(&[1.0, 3.0, 2.0]).unwrap();
        assert!(AnalysisReport::success(&a).chart_svg().is_none());

        let charted = AnalysisReport::success(&a).with_chart(&a, "t");
        assert!(charted.chart_svg().unwrap().starts_with("<svg"));

        let failed = AnalysisReport::failure(&SpcError::EmptyInput).with_chart(&a, "t");
        assert_eq!(failed, AnalysisReport::failure(&SpcError::EmptyInput));
    }

    #[test]
    fn test_pipeline_missing_column() {
        let report = control_sensitizing_graph(b"a,b\n1,2\n", "c");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(
            json["error"],
            r#"Column 'c' not found. Available columns: ["a", "b"]"#
        );
    }

    #[test]
    fn test_pipeline_drops_missing_before_validation() {
        let report = control_sensitizing_graph(b"v\n1\nNA\n\n", "v");
        assert_eq!(
            report,
            AnalysisReport::failure(&SpcError::InsufficientData { found: 1 })
        );
    }

    #[test]
    fn test_pipeline_constant_column() {
        let report = control_sensitizing_graph(b"v\n5\n5\n5\n", "v");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().contains("Standard deviation is 0/NaN"));
    }

    #[test]
    fn test_pipeline_embeds_chart() {
        let mut report = control_sensitizing_graph(b"v\n1\n2\n4\n3\n", "v");
        assert!(report.chart_svg().unwrap().contains("Std Deviations from Mean for"));
        assert!(report.take_chart().is_some());
        assert!(report.chart_svg().is_none());
    }

    #[test]
    fn test_text_summary() {
        let a = analyze(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let text = AnalysisReport::success(&a).to_text();
        assert!(text.starts_with("n = 6, mean = 3.5000"));
        assert!(text.contains("[Rule 5] 6 points steadily increasing between 0 and 5"));

        let text = AnalysisReport::failure(&SpcError::EmptyInput).to_text();
        assert_eq!(text, "error: Input contains no header row\n");
    }
}
