//! Error types for benchmark orchestration

use thiserror::Error;

use crate::models::EndpointId;
use crate::state::RunKind;

/// Errors surfaced by benchmark runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("No document text supplied; a load test needs a non-empty payload")]
    EmptyInput,

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("All {attempted} requests to endpoint {endpoint} failed")]
    AllRequestsFailed { endpoint: EndpointId, attempted: usize },

    #[error("A {0} run is already in progress")]
    RunInProgress(RunKind),

    #[error("Client setup failed: {0}")]
    Client(String),
}
