//! Statistical Process Control (SPC) sensitizing rules for individual measurements.
//!
//! A cleaned measurement sequence is normalized against its own sample mean
//! and Bessel-corrected standard deviation, then scanned once with the
//! eight Western Electric / Nelson sensitizing rules.
//!
//! # Components
//!
//! - [`normalize`] — mean, standard deviation and z-scores
//! - [`SensitizingRules`] — the eight-rule battery, via [`RunRule`]
//! - [`Violation`] / [`Span`] / [`RuleId`] — what fired, where
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.

mod chart;
mod normalize;
mod rules;

pub use chart::{RuleId, Span, Violation, CONTROL_LIMIT_Z, ONE_SIGMA_Z, TWO_SIGMA_Z};
pub use normalize::{normalize, Normalized};
pub use rules::{Evaluation, RunRule, SensitizingRules};
