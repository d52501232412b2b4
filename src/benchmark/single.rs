//! Single-shot latency benchmarks
//!
//! One request per endpoint, either for one endpoint or for both at once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::http::Processor;
use crate::models::{Document, Endpoint, EndpointId, EndpointPair, ProcessingResult};

/// Which endpoints a single-shot run touches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingleTarget {
    One(EndpointId),
    Both,
}

impl SingleTarget {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "both" | "all" => Some(SingleTarget::Both),
            other => EndpointId::from_str(other).map(SingleTarget::One),
        }
    }

    /// Endpoints touched by this target
    pub fn endpoints(&self) -> Vec<EndpointId> {
        match self {
            SingleTarget::One(id) => vec![*id],
            SingleTarget::Both => EndpointId::all().to_vec(),
        }
    }
}

impl fmt::Display for SingleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingleTarget::One(id) => write!(f, "{id}"),
            SingleTarget::Both => write!(f, "both"),
        }
    }
}

/// Results of one single-shot run; `None` marks a failed call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SingleShotOutcome {
    pub results: Vec<(EndpointId, Option<ProcessingResult>)>,
}

#[cfg(test)]
impl SingleShotOutcome {
    pub fn get(&self, id: EndpointId) -> Option<&ProcessingResult> {
        self.results
            .iter()
            .find(|(endpoint, _)| *endpoint == id)
            .and_then(|(_, result)| result.as_ref())
    }

    pub fn touched(&self, id: EndpointId) -> bool {
        self.results.iter().any(|(endpoint, _)| *endpoint == id)
    }
}

/// Runs single-shot latency measurements
#[derive(Clone)]
pub struct SingleShotBenchmarker {
    processor: Arc<dyn Processor>,
    endpoints: EndpointPair<Endpoint>,
}

impl SingleShotBenchmarker {
    pub fn new(processor: Arc<dyn Processor>, endpoints: EndpointPair<Endpoint>) -> Self {
        Self {
            processor,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &EndpointPair<Endpoint> {
        &self.endpoints
    }

    /// Dispatch according to `target`
    pub async fn run(&self, target: SingleTarget, document: &Document) -> SingleShotOutcome {
        match target {
            SingleTarget::One(id) => self.run_one(id, document).await,
            SingleTarget::Both => self.run_both(document).await,
        }
    }

    /// Benchmark a single endpoint
    pub async fn run_one(&self, id: EndpointId, document: &Document) -> SingleShotOutcome {
        let endpoint = self.endpoints.get(id);
        info!("Single-shot benchmark of {}", endpoint);

        let result = self.processor.call(endpoint, document).await;
        SingleShotOutcome {
            results: vec![(id, result)],
        }
    }

    /// Benchmark both endpoints concurrently; returns once both settled
    pub async fn run_both(&self, document: &Document) -> SingleShotOutcome {
        info!(
            "Single-shot benchmark of {} and {}",
            self.endpoints.a, self.endpoints.b
        );

        let (a, b) = tokio::join!(
            self.processor.call(&self.endpoints.a, document),
            self.processor.call(&self.endpoints.b, document)
        );

        SingleShotOutcome {
            results: vec![(EndpointId::A, a), (EndpointId::B, b)],
        }
    }
}
