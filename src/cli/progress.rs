//! Spinner-backed step reporter for the CLI
//!
//! JSON step lines still go to stdout; the spinner is suspended while each
//! line is printed so the two never interleave.

use crate::services::{JsonLinesReporter, StepReport, StepReporter, WorkflowStep};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress indicator that is either a live spinner or nothing
#[derive(Debug)]
pub enum ProgressIndicator {
    Spinner(ProgressBar),
    NoOp,
}

impl ProgressIndicator {
    fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        Self::Spinner(pb)
    }

    fn set_message(&self, msg: &'static str) {
        match self {
            Self::Spinner(pb) => pb.set_message(msg),
            Self::NoOp => {},
        }
    }

    /// Run `print` with the spinner hidden
    fn suspend<F: FnOnce()>(&self, print: F) {
        match self {
            Self::Spinner(pb) => pb.suspend(print),
            Self::NoOp => print(),
        }
    }
}

/// Prints one JSON object per finished step, with an optional spinner
#[derive(Debug)]
pub struct CliStepReporter {
    indicator: ProgressIndicator,
    lines: JsonLinesReporter,
}

impl CliStepReporter {
    pub fn new(show_spinner: bool) -> Self {
        let indicator = if show_spinner {
            ProgressIndicator::spinner()
        } else {
            ProgressIndicator::NoOp
        };
        Self {
            indicator,
            lines: JsonLinesReporter,
        }
    }
}

impl StepReporter for CliStepReporter {
    fn report_started(&self, step: WorkflowStep) {
        self.indicator.set_message(step.description());
        self.lines.report_started(step);
    }

    fn report_step(&self, report: &StepReport) {
        self.indicator.suspend(|| self.lines.report_step(report));
    }

    fn report_error(&self, step: WorkflowStep, message: &str) {
        self.indicator.suspend(|| self.lines.report_error(step, message));
    }
}

impl Drop for CliStepReporter {
    fn drop(&mut self) {
        if let ProgressIndicator::Spinner(pb) = &self.indicator {
            pb.finish_and_clear();
        }
    }
}
