//! # spc-sensitize
//!
//! Sensitizing run-rule analysis for a single measurement column.
//!
//! A cleaned sequence of individual measurements is standardized against
//! its own sample mean and standard deviation, then scanned once with the
//! eight Western Electric / Nelson sensitizing rules. The result lists every
//! rule firing, the set of implicated points, and an SVG chart of the
//! z-scores.
//!
//! ## Modules
//!
//! - [`spc`] — Normalization and the eight sensitizing rules
//! - [`dataset`] — CSV ingestion and column selection
//! - [`render`] — SVG z-score chart
//! - [`analysis`] — Pipeline and JSON-serializable reports
//! - [`error`] — Validation error taxonomy
//!
//! ## Example
//!
//! ```
//! use spc_sensitize::analysis::analyze;
//!
//! let a = analyze(&[5.0, 4.0, 6.0, 3.0, 7.0, 2.0, 8.0, 1.0, 9.0, 0.0, 10.0, -1.0, 11.0, -2.0])
//!     .unwrap();
//! assert_eq!(a.messages(), vec!["[Rule 7] 14 points alternating up/down between 0 and 13"]);
//! ```

pub mod analysis;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod render;
pub mod spc;

pub use error::{Result, SpcError};
