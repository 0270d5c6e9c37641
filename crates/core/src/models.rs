use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// A single workflow run, as returned by `GET /repos/{owner}/{repo}/actions/runs/{run_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub event: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub html_url: String,
    pub run_number: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub head_branch: String,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
    pub repository: RunRepository,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pull_requests: Vec<PullRequestRef>,
}

impl WorkflowRun {
    /// Pull requests whose base repository is the run's own repository.
    /// Pull requests targeting other repositories (forks) are excluded.
    pub fn internal_pull_requests(&self) -> impl Iterator<Item = &PullRequestRef> {
        self.pull_requests.iter().filter(|pr| pr.base.repo.url == self.repository.url)
    }

    pub fn head_commit_message(&self) -> Option<&str> {
        self.head_commit.as_ref().map(|c| c.message.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeadCommit {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunRepository {
    pub full_name: String,
    pub html_url: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    pub head: PullRequestHead,
    pub base: PullRequestBase,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestHead {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestBase {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub repo: PullRequestRepo,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestRepo {
    pub url: String,
}

/// Response of `GET /repos/{owner}/{repo}/actions/runs/{run_id}/jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobList {
    #[serde(default)]
    pub total_count: u64,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Job {
    pub fn is_completed(&self) -> bool { self.status == JobStatus::Completed }
}

/// Only keeps jobs that reached the `completed` status.
pub fn completed_jobs(jobs: &[Job]) -> Vec<&Job> { jobs.iter().filter(|j| j.is_completed()).collect() }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    #[serde(other)]
    Other,
}

/// Terminal outcome of a completed job.
///
/// Values GitHub may add in the future are kept in [`Conclusion::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    Neutral,
    TimedOut,
    ActionRequired,
    Stale,
    Unknown(String),
}

impl Conclusion {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::Neutral => "neutral",
            Self::TimedOut => "timed_out",
            Self::ActionRequired => "action_required",
            Self::Stale => "stale",
            Self::Unknown(value) => value,
        }
    }
}

impl From<&str> for Conclusion {
    fn from(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            "skipped" => Self::Skipped,
            "neutral" => Self::Neutral,
            "timed_out" => Self::TimedOut,
            "action_required" => Self::ActionRequired,
            "stale" => Self::Stale,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl<'de> Deserialize<'de> for Conclusion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// Which jobs are listed as fields in the notification.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Default)]
pub enum IncludeJobs {
    #[default]
    #[serde(rename = "true")]
    True,
    #[serde(rename = "false")]
    False,
    #[serde(rename = "on-failure")]
    OnFailure,
}

impl IncludeJobs {
    pub const fn variants() -> &'static [Self] { &[Self::True, Self::False, Self::OnFailure] }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::OnFailure => "on-failure",
        }
    }
}

impl FromStr for IncludeJobs {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self::True),
            "false" => Ok(Self::False),
            "on-failure" => Ok(Self::OnFailure),
            _ => Err(()),
        }
    }
}

impl fmt::Display for IncludeJobs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
