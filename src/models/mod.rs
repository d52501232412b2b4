//! Data models for endpoint benchmarking
//!
//! This module contains all data structures used throughout the application.

mod endpoint;
mod result;

pub use endpoint::{Document, Endpoint, EndpointId, EndpointPair};
pub use result::{
    round_to, ComparisonKind, ComparisonOutcome, ProcessResponse, ProcessingResult,
    ProcessingStatus, ThroughputResult,
};
