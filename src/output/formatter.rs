//! Output formatters for benchmark results
//!
//! Provides table, JSON, CSV and summary output formats.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::benchmark::SingleTarget;
use crate::error::BattleError;
use crate::models::{
    ComparisonOutcome, Endpoint, EndpointId, EndpointPair, ProcessingResult, ProcessingStatus,
    ThroughputResult,
};
use crate::state::{BattleState, RunKind};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// One endpoint's single-shot line in a report
#[derive(Clone, Debug, Serialize)]
pub struct SingleShotEntry {
    pub endpoint: Endpoint,
    /// `None` when the call failed
    pub result: Option<ProcessingResult>,
}

/// Single-shot run as presented to the user
#[derive(Clone, Debug, Serialize)]
pub struct SingleShotReport {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<SingleShotEntry>,
    pub verdict: Option<ComparisonOutcome>,
}

impl SingleShotReport {
    /// Report the slots `target` touched, as currently held in `state`
    pub fn from_state(
        state: &BattleState,
        endpoints: &EndpointPair<Endpoint>,
        target: SingleTarget,
    ) -> Self {
        let entries = target
            .endpoints()
            .into_iter()
            .map(|id| SingleShotEntry {
                endpoint: endpoints.get(id).clone(),
                result: state.result(id).cloned(),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            entries,
            verdict: state.verdict(RunKind::SingleShot).cloned(),
        }
    }
}

/// Throughput run as presented to the user
#[derive(Clone, Debug, Serialize)]
pub struct ThroughputReport {
    pub generated_at: DateTime<Utc>,
    pub batch_size: usize,
    pub results: Vec<ThroughputResult>,
    pub failures: Vec<String>,
    pub verdict: Option<ComparisonOutcome>,
}

impl ThroughputReport {
    /// Report the throughput list held in `state` plus the batches that failed
    pub fn from_state(state: &BattleState, batch_size: usize, failures: &[BattleError]) -> Self {
        Self {
            generated_at: Utc::now(),
            batch_size,
            results: state.throughput_results().to_vec(),
            failures: failures.iter().map(|e| e.to_string()).collect(),
            verdict: state.verdict(RunKind::Throughput).cloned(),
        }
    }
}

/// Configured label for `id`, or the bare id when none is known
fn label_of(labels: &[(EndpointId, &str)], id: EndpointId) -> String {
    labels
        .iter()
        .find(|(e, _)| *e == id)
        .map(|(_, l)| l.to_string())
        .unwrap_or_else(|| id.to_string())
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a single-shot report
    pub fn format_single(&self, report: &SingleShotReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_single_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Csv => {
                single_csv(report).unwrap_or_else(|e| format!("Failed to write CSV: {e}"))
            }
            OutputFormat::Summary => self.format_single_summary(report),
        }
    }

    /// Format a throughput report
    pub fn format_throughput(&self, report: &ThroughputReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_throughput_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Csv => {
                throughput_csv(report).unwrap_or_else(|e| format!("Failed to write CSV: {e}"))
            }
            OutputFormat::Summary => self.format_throughput_summary(report),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn winner_mark(&self, id: EndpointId, verdict: Option<&ComparisonOutcome>) -> String {
        match verdict {
            Some(v) if v.winner == id => self.paint("🏆 WINNER", "32"),
            _ => String::new(),
        }
    }

    fn verdict_line(
        &self,
        verdict: Option<&ComparisonOutcome>,
        labels: &[(EndpointId, &str)],
    ) -> String {
        match verdict {
            Some(v) if v.is_tie() => format!(
                "Tie on {} ({} listed first, taken as winner)",
                v.kind,
                label_of(labels, v.winner)
            ),
            Some(v) => format!(
                "{} wins on {}: {} faster than {}",
                label_of(labels, v.winner),
                v.kind,
                v.speedup_display(),
                label_of(labels, v.loser)
            ),
            None => "No verdict: both endpoints need a result".to_string(),
        }
    }

    fn format_single_table(&self, report: &SingleShotReport) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════════════╗\n");
        output.push_str("║  Single-Shot Latency                                                 ║\n");
        output.push_str("╠══════════════════════════════════════════════════════════════════════╣\n");

        for entry in &report.entries {
            match &entry.result {
                Some(result) => {
                    let status = match result.status {
                        ProcessingStatus::Success => self.paint("✓ success", "32"),
                        ProcessingStatus::Failure => self.paint("✗ failure", "31"),
                    };
                    output.push_str(&format!(
                        "  {:20} {:>10.2} ms  {}  {}\n",
                        entry.endpoint.label,
                        result.processing_time_ms,
                        status,
                        self.winner_mark(entry.endpoint.id, report.verdict.as_ref())
                    ));
                    output.push_str(&format!(
                        "  {:20} complexity={} hash={} by={}\n",
                        "", result.complexity_score, result.document_hash, result.processed_by
                    ));
                }
                None => {
                    output.push_str(&format!(
                        "  {:20} {}\n",
                        entry.endpoint.label,
                        self.paint("! no result (request failed)", "31")
                    ));
                }
            }
        }

        output.push_str("╠══════════════════════════════════════════════════════════════════════╣\n");
        output.push_str(&format!(
            "  {}\n",
            self.verdict_line(report.verdict.as_ref(), &single_labels(report))
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════════════╝\n");

        output
    }

    fn format_single_summary(&self, report: &SingleShotReport) -> String {
        let parts: Vec<String> = report
            .entries
            .iter()
            .map(|e| match &e.result {
                Some(r) => format!("{}={:.2}ms", e.endpoint.label, r.processing_time_ms),
                None => format!("{}=error", e.endpoint.label),
            })
            .collect();

        match &report.verdict {
            Some(v) => format!(
                "{} | winner: {} ({})",
                parts.join(" "),
                label_of(&single_labels(report), v.winner),
                v.speedup_display()
            ),
            None => parts.join(" "),
        }
    }

    fn format_throughput_table(&self, report: &ThroughputReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n┌────────────────────────┬────────────┬────────────┬──────────┬──────────┬──────────┐\n\
             │ Endpoint ({:>5} req)   │      req/s │    avg(ms) │  p95(ms) │ total ms │ failures │\n\
             ├────────────────────────┼────────────┼────────────┼──────────┼──────────┼──────────┤\n",
            report.batch_size
        ));

        for result in &report.results {
            output.push_str(&format!(
                "│ {:22} │ {:>10.2} │ {:>10.2} │ {:>8.2} │ {:>8} │ {:>8} │ {}\n",
                result.endpoint_label,
                result.requests_per_second,
                result.average_latency_ms,
                result.latency.percentiles.p95,
                result.total_elapsed_ms,
                result.failed,
                self.winner_mark(result.endpoint, report.verdict.as_ref())
            ));
        }

        output.push_str(
            "└────────────────────────┴────────────┴────────────┴──────────┴──────────┴──────────┘\n",
        );

        for result in &report.results {
            output.push_str(&format!(
                "  {}: {:.1}% succeeded, {}\n",
                result.endpoint_label,
                result.success_rate() * 100.0,
                result.latency.format_summary()
            ));
        }

        for failure in &report.failures {
            output.push_str(&format!("{}\n", self.paint(&format!("✗ {failure}"), "31")));
        }

        output.push_str(&self.verdict_line(report.verdict.as_ref(), &throughput_labels(report)));
        output.push('\n');

        output
    }

    fn format_throughput_summary(&self, report: &ThroughputReport) -> String {
        let parts: Vec<String> = report
            .results
            .iter()
            .map(|r| format!("{}={:.2}req/s", r.endpoint_label, r.requests_per_second))
            .collect();

        let mut line = parts.join(" ");
        if !report.failures.is_empty() {
            line.push_str(&format!(" | {} batch(es) failed", report.failures.len()));
        }
        if let Some(v) = &report.verdict {
            line.push_str(&format!(
                " | winner: {} ({})",
                label_of(&throughput_labels(report), v.winner),
                v.speedup_display()
            ));
        }
        line
    }
}

fn single_labels(report: &SingleShotReport) -> Vec<(EndpointId, &str)> {
    report
        .entries
        .iter()
        .map(|e| (e.endpoint.id, e.endpoint.label.as_str()))
        .collect()
}

fn throughput_labels(report: &ThroughputReport) -> Vec<(EndpointId, &str)> {
    report
        .results
        .iter()
        .map(|r| (r.endpoint, r.endpoint_label.as_str()))
        .collect()
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> csv::Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn single_csv(report: &SingleShotReport) -> csv::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "endpoint",
        "label",
        "status",
        "processing_time_ms",
        "complexity_score",
        "document_hash",
        "processed_by",
        "winner",
    ])?;

    for entry in &report.entries {
        let winner = report
            .verdict
            .as_ref()
            .map(|v| v.winner == entry.endpoint.id)
            .unwrap_or(false);
        let record = match &entry.result {
            Some(r) => vec![
                entry.endpoint.id.name().to_string(),
                entry.endpoint.label.clone(),
                r.status.to_string(),
                format!("{:.2}", r.processing_time_ms),
                r.complexity_score.clone(),
                r.document_hash.clone(),
                r.processed_by.clone(),
                winner.to_string(),
            ],
            None => vec![
                entry.endpoint.id.name().to_string(),
                entry.endpoint.label.clone(),
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                winner.to_string(),
            ],
        };
        writer.write_record(&record)?;
    }

    finish_csv(writer)
}

fn throughput_csv(report: &ThroughputReport) -> csv::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "endpoint",
        "label",
        "requests_per_second",
        "average_latency_ms",
        "total_elapsed_ms",
        "batch_size",
        "successful",
        "failed",
        "winner",
    ])?;

    for r in &report.results {
        let winner = report
            .verdict
            .as_ref()
            .map(|v| v.winner == r.endpoint)
            .unwrap_or(false);
        writer.write_record([
            r.endpoint.name().to_string(),
            r.endpoint_label.clone(),
            format!("{:.2}", r.requests_per_second),
            format!("{:.2}", r.average_latency_ms),
            r.total_elapsed_ms.to_string(),
            r.batch_size.to_string(),
            r.successful.to_string(),
            r.failed.to_string(),
            winner.to_string(),
        ])?;
    }

    finish_csv(writer)
}
