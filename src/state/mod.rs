//! Benchmark session state
//!
//! Holds the latest results per endpoint and per run kind, the verdict
//! derived from them, and the phase of each run kind. Verdicts are derived
//! explicitly after every completed run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::benchmark::{
    LoadTestOrchestrator, PairMode, SingleShotBenchmarker, SingleShotOutcome, SingleTarget,
    DEFAULT_BATCH_SIZE,
};
use crate::compare::Comparator;
use crate::error::BattleError;
use crate::http::Processor;
use crate::models::{
    ComparisonOutcome, Document, Endpoint, EndpointId, EndpointPair, ProcessingResult,
    ThroughputResult,
};

/// Kind of benchmark run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    SingleShot,
    Throughput,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::SingleShot => write!(f, "single-shot"),
            RunKind::Throughput => write!(f, "throughput"),
        }
    }
}

/// Lifecycle of one run kind: idle -> running -> complete -> compared
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    /// Results written, no verdict possible
    Complete,
    /// Results written and a verdict derived
    Compared,
}

/// Latest results, verdicts and phases
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    latest: EndpointPair<Option<ProcessingResult>>,
    throughput: Vec<ThroughputResult>,
    latency_verdict: Option<ComparisonOutcome>,
    throughput_verdict: Option<ComparisonOutcome>,
    single_shot_phase: RunPhase,
    throughput_phase: RunPhase,
}

impl BattleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self, kind: RunKind) -> RunPhase {
        match kind {
            RunKind::SingleShot => self.single_shot_phase,
            RunKind::Throughput => self.throughput_phase,
        }
    }

    pub fn is_running(&self, kind: RunKind) -> bool {
        self.phase(kind) == RunPhase::Running
    }

    /// Latest single-shot result for an endpoint
    pub fn result(&self, id: EndpointId) -> Option<&ProcessingResult> {
        self.latest.get(id).as_ref()
    }

    pub fn throughput_results(&self) -> &[ThroughputResult] {
        &self.throughput
    }

    pub fn verdict(&self, kind: RunKind) -> Option<&ComparisonOutcome> {
        match kind {
            RunKind::SingleShot => self.latency_verdict.as_ref(),
            RunKind::Throughput => self.throughput_verdict.as_ref(),
        }
    }

    /// Mark a run as started.
    ///
    /// Refuses a second overlapping run of the same kind. The verdict of
    /// that kind is cleared; prior results stay until the run completes.
    pub fn begin(&mut self, kind: RunKind) -> Result<(), BattleError> {
        if self.is_running(kind) {
            return Err(BattleError::RunInProgress(kind));
        }

        *self.phase_mut(kind) = RunPhase::Running;
        *self.verdict_mut(kind) = None;
        Ok(())
    }

    /// Write the slots touched by a single-shot run and derive the verdict
    pub fn finish_single(&mut self, outcome: &SingleShotOutcome) {
        for (id, result) in &outcome.results {
            *self.latest.get_mut(*id) = result.clone();
        }
        self.derive(RunKind::SingleShot);
    }

    /// Replace the throughput list and derive the verdict.
    ///
    /// A run that produced no results at all leaves the prior list in place.
    pub fn finish_throughput(&mut self, mut results: Vec<ThroughputResult>) {
        if results.is_empty() {
            warn!("Throughput run produced no results; keeping previous results");
        } else {
            results.sort_by_key(|r| r.endpoint);
            self.throughput = results;
        }
        self.derive(RunKind::Throughput);
    }

    fn derive(&mut self, kind: RunKind) {
        let verdict = match kind {
            RunKind::SingleShot => Comparator::compare_latency(
                self.latest.a.as_ref(),
                self.latest.b.as_ref(),
            ),
            RunKind::Throughput => Comparator::compare_throughput(&self.throughput),
        };

        *self.phase_mut(kind) = if verdict.is_some() {
            RunPhase::Compared
        } else {
            RunPhase::Complete
        };
        *self.verdict_mut(kind) = verdict;
    }

    fn phase_mut(&mut self, kind: RunKind) -> &mut RunPhase {
        match kind {
            RunKind::SingleShot => &mut self.single_shot_phase,
            RunKind::Throughput => &mut self.throughput_phase,
        }
    }

    fn verdict_mut(&mut self, kind: RunKind) -> &mut Option<ComparisonOutcome> {
        match kind {
            RunKind::SingleShot => &mut self.latency_verdict,
            RunKind::Throughput => &mut self.throughput_verdict,
        }
    }
}

/// Outcome of a throughput run over both endpoints
#[derive(Clone, Debug, PartialEq)]
pub struct ThroughputRun {
    pub results: Vec<ThroughputResult>,
    /// Batches that produced no result
    pub failures: Vec<BattleError>,
}

/// Benchmarkers plus the state they write into
pub struct BattleSession {
    single: SingleShotBenchmarker,
    load: LoadTestOrchestrator,
    batch_size: usize,
    pair_mode: PairMode,
    state: Mutex<BattleState>,
}

impl BattleSession {
    pub fn new(processor: Arc<dyn Processor>, endpoints: EndpointPair<Endpoint>) -> Self {
        Self {
            single: SingleShotBenchmarker::new(processor.clone(), endpoints),
            load: LoadTestOrchestrator::new(processor),
            batch_size: DEFAULT_BATCH_SIZE,
            pair_mode: PairMode::default(),
            state: Mutex::new(BattleState::new()),
        }
    }

    /// Set requests per load-test batch
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set how the two load-test batches are scheduled
    pub fn with_pair_mode(mut self, mode: PairMode) -> Self {
        self.pair_mode = mode;
        self
    }

    pub fn endpoints(&self) -> &EndpointPair<Endpoint> {
        self.single.endpoints()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run a single-shot benchmark and record its results
    pub async fn run_single(
        &self,
        target: SingleTarget,
        document: &Document,
    ) -> Result<SingleShotOutcome, BattleError> {
        self.state.lock().await.begin(RunKind::SingleShot)?;

        let outcome = self.single.run(target, document).await;

        let mut state = self.state.lock().await;
        state.finish_single(&outcome);
        if let Some(verdict) = state.verdict(RunKind::SingleShot) {
            info!(
                "Latency verdict: {} wins by {}",
                verdict.winner,
                verdict.speedup_display()
            );
        }

        Ok(outcome)
    }

    /// Run one load-test batch per endpoint and record the results
    pub async fn run_throughput(&self, document: &Document) -> Result<ThroughputRun, BattleError> {
        if document.is_empty() {
            return Err(BattleError::EmptyInput);
        }
        if self.batch_size == 0 {
            return Err(BattleError::InvalidBatchSize);
        }

        self.state.lock().await.begin(RunKind::Throughput)?;

        let EndpointPair { a, b } = self
            .load
            .run_pair(self.endpoints(), document, self.batch_size, self.pair_mode)
            .await;

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for outcome in [a, b] {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Load test failed: {}", e);
                    failures.push(e);
                }
            }
        }

        let mut state = self.state.lock().await;
        state.finish_throughput(results.clone());
        if let Some(verdict) = state.verdict(RunKind::Throughput) {
            info!(
                "Throughput verdict: {} wins by {}",
                verdict.winner,
                verdict.speedup_display()
            );
        }

        Ok(ThroughputRun { results, failures })
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> BattleState {
        self.state.lock().await.clone()
    }
}
