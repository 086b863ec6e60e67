//! Ordered chains of git invocations.
//!
//! Each [`Step`] declares what happens when its command fails:
//!
//! - [`OnFailure::Abort`] stops the pipeline and returns the error,
//! - [`OnFailure::Warn`] logs a warning and moves on,
//! - [`OnFailure::Ignore`] logs at debug level and moves on.

use super::repository::GitRepo;
use crate::error::CliError;
use crate::logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    Warn,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct Step {
    label: String,
    args: Vec<String>,
    on_failure: OnFailure,
}

impl Step {
    /// A git step that aborts the pipeline on failure.
    pub fn git<I, S>(label: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Step {
            label: label.into(),
            args: args.into_iter().map(Into::into).collect(),
            on_failure: OnFailure::Abort,
        }
    }

    pub fn warn_on_failure(mut self) -> Self {
        self.on_failure = OnFailure::Warn;
        self
    }

    pub fn ignore_failure(mut self) -> Self {
        self.on_failure = OnFailure::Ignore;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn on_failure(&self) -> OnFailure {
        self.on_failure
    }
}

/// What a finished pipeline did with its non-aborting failures.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub completed: Vec<String>,
    pub warnings: Vec<String>,
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline { steps: Vec::new() }
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn extend(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn run(&self, repo: &GitRepo) -> Result<PipelineReport, CliError> {
        let mut report = PipelineReport::default();

        for step in &self.steps {
            logger::progress(&step.label);
            match repo.run(&step.args) {
                Ok(_) => report.completed.push(step.label.clone()),
                Err(e) => match step.on_failure {
                    OnFailure::Abort => {
                        logger::error(&format!("{} failed", step.label));
                        return Err(e);
                    }
                    OnFailure::Warn => {
                        logger::warning(&format!("{}: {}", step.label, e));
                        report.warnings.push(step.label.clone());
                    }
                    OnFailure::Ignore => {
                        log::debug!("Ignoring failure of '{}': {}", step.label, e);
                        report.ignored.push(step.label.clone());
                    }
                },
            }
        }

        Ok(report)
    }
}
