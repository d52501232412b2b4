//! Output formatting module
//!
//! Provides various output formats for benchmark results.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter, SingleShotReport, ThroughputReport};
