//! Benchmarking and performance metrics module
//!
//! Provides single-shot latency measurement, concurrent load testing and
//! batch statistics for the two endpoints.

mod load;
mod metrics;
mod single;

#[cfg(test)]
pub(crate) mod test_support;

pub use load::{LoadTestOrchestrator, PairMode, DEFAULT_BATCH_SIZE};
pub use metrics::LatencyStats;
pub use single::{SingleShotBenchmarker, SingleShotOutcome, SingleTarget};
