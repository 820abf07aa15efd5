//! Step reporting service
//!
//! This module separates step reporting from the request logic, so the CLI
//! can print JSON lines while tests capture reports in memory.

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

/// Steps of the upload → lookup → process workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStep {
    /// Uploading the source image
    Upload,
    /// Fetching the caller's image list
    Info,
    /// Scanning the list for the uploaded name
    Lookup,
    /// Submitting the mask
    Process,
}

impl WorkflowStep {
    /// Get a human-readable description of the step
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            WorkflowStep::Upload => "Uploading image",
            WorkflowStep::Info => "Fetching image list",
            WorkflowStep::Lookup => "Looking up uploaded image",
            WorkflowStep::Process => "Submitting mask",
        }
    }

    /// Action name used in JSON reports
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            WorkflowStep::Upload => "upload",
            WorkflowStep::Info | WorkflowStep::Lookup => "info",
            WorkflowStep::Process => "process",
        }
    }
}

/// Outcome of one finished step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: WorkflowStep,
    /// HTTP status for network steps
    pub status: Option<u16>,
    /// Extra payload, e.g. the matched record for the lookup step
    pub data: Option<Value>,
    pub elapsed_ms: u64,
}

impl StepReport {
    #[must_use]
    pub fn new(step: WorkflowStep, start_time: Instant) -> Self {
        Self {
            step,
            status: None,
            data: None,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// One-line JSON form printed by the CLI
    ///
    /// The upload step reports `status_code`, the others `status`, and the
    /// lookup step reports its payload under `data` with `"type": "log"`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut line = json!({ "action": self.step.action() });
        match self.step {
            WorkflowStep::Upload => line["status_code"] = json!(self.status),
            WorkflowStep::Lookup => {
                line["type"] = json!("log");
                line["data"] = self.data.clone().unwrap_or(Value::Null);
            },
            _ => {
                if let Some(status) = self.status {
                    line["status"] = json!(status);
                }
                if let Some(data) = &self.data {
                    line["data"] = data.clone();
                }
            },
        }
        line
    }
}

/// Trait for reporting step outcomes during the workflow
pub trait StepReporter: Send + Sync {
    /// A step is about to start
    fn report_started(&self, step: WorkflowStep);

    /// A step finished
    fn report_step(&self, report: &StepReport);

    /// A step failed
    fn report_error(&self, step: WorkflowStep, error: &str);
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStepReporter;

impl StepReporter for NoOpStepReporter {
    fn report_started(&self, _step: WorkflowStep) {}

    fn report_step(&self, _report: &StepReport) {}

    fn report_error(&self, _step: WorkflowStep, _error: &str) {}
}

/// Reporter that writes one JSON object per finished step to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesReporter;

impl StepReporter for JsonLinesReporter {
    fn report_started(&self, step: WorkflowStep) {
        tracing::debug!(step = ?step, "{}", step.description());
    }

    fn report_step(&self, report: &StepReport) {
        println!("{}", report.to_json());
        tracing::debug!(step = ?report.step, elapsed_ms = report.elapsed_ms, "Step finished");
    }

    fn report_error(&self, step: WorkflowStep, error: &str) {
        tracing::error!(step = ?step, "❌ {} failed: {}", step.description(), error);
    }
}

/// Tracker that times steps and forwards them to a reporter
pub struct StepTracker {
    reporter: Box<dyn StepReporter>,
    step_started: Instant,
    current_step: Option<WorkflowStep>,
}

impl StepTracker {
    #[must_use]
    pub fn new(reporter: Box<dyn StepReporter>) -> Self {
        Self {
            reporter,
            step_started: Instant::now(),
            current_step: None,
        }
    }

    pub fn start(&mut self, step: WorkflowStep) {
        self.current_step = Some(step);
        self.step_started = Instant::now();
        self.reporter.report_started(step);
    }

    /// Finish the current step with a status and optional payload
    ///
    /// Returns `None`, reporting nothing, when no step was started.
    pub fn finish(&mut self, status: Option<u16>, data: Option<Value>) -> Option<StepReport> {
        let Some(step) = self.current_step.take() else {
            tracing::debug!("finish called with no step in progress");
            return None;
        };
        let mut report = StepReport::new(step, self.step_started);
        report.status = status;
        report.data = data;
        self.reporter.report_step(&report);
        Some(report)
    }

    /// Report an error against the step in progress
    ///
    /// Errors raised outside a step are left to the caller to surface.
    pub fn fail(&mut self, error: &str) {
        match self.current_step.take() {
            Some(step) => self.reporter.report_error(step, error),
            None => tracing::debug!(error, "failure reported with no step in progress"),
        }
    }

    #[must_use]
    pub fn current_step(&self) -> Option<WorkflowStep> {
        self.current_step
    }
}
