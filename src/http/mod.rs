//! HTTP client module for endpoint benchmarking
//!
//! Provides the single-request client every benchmark is built on.

mod client;

pub use client::{CallError, EndpointClient, Processor, DEFAULT_TIMEOUT_SECS};
