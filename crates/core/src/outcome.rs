use std::fmt;

use serde::Serialize;

use crate::models::{Conclusion, IncludeJobs, Job};

/// Overall status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn color(self) -> Color {
        match self {
            Self::Success => Color::Good,
            Self::Cancelled => Color::Warning,
            Self::Failed => Color::Danger,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::Success => "Success:",
            Self::Cancelled => "Cancelled:",
            Self::Failed => "Failed:",
        }
    }
}

/// Attachment sidebar color, using Slack's named colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Good,
    Warning,
    Danger,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: RunStatus,
    /// No per-job fields are rendered when set.
    pub suppress_job_fields: bool,
}

impl Outcome {
    pub fn color(&self) -> Color { self.status.color() }

    pub fn headline(&self) -> &'static str { self.status.headline() }
}

/// Classify a run from the conclusions of its completed jobs.
///
/// Callers must only pass completed jobs. A run without any completed jobs is
/// classified as a success.
pub fn resolve_outcome(completed_jobs: &[&Job], include_jobs: IncludeJobs) -> Outcome {
    let status = if completed_jobs
        .iter()
        .all(|job| matches!(job.conclusion, Some(Conclusion::Success | Conclusion::Skipped)))
    {
        RunStatus::Success
    } else if completed_jobs.iter().any(|job| job.conclusion == Some(Conclusion::Cancelled)) {
        RunStatus::Cancelled
    } else {
        RunStatus::Failed
    };
    let suppress_job_fields = match include_jobs {
        IncludeJobs::True => false,
        IncludeJobs::False => true,
        IncludeJobs::OnFailure => status != RunStatus::Failed,
    };
    Outcome { status, suppress_job_fields }
}
