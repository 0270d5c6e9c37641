use workflow_notify_core::{
    config::{Config, RunContext},
    models::{Conclusion, IncludeJobs, Job, WorkflowRun, completed_jobs},
    outcome::{Outcome, resolve_outcome},
    util::compute_duration,
};

use crate::{Attachment, Field, Payload};

pub const FOOTER_ICON: &str = "https://github.githubassets.com/favicon.ico";

pub const SUCCESS_ICON: &str = "✓";
pub const SKIPPED_ICON: &str = "⃠";
pub const FAILURE_ICON: &str = "✗";

/// User-facing switches and cosmetics for the notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOptions {
    pub include_jobs: IncludeJobs,
    pub include_commit_message: bool,
    pub pretext: Option<String>,
    pub username: Option<String>,
    pub channel: Option<String>,
    pub icon_emoji: Option<String>,
    pub icon_url: Option<String>,
}

impl From<&Config> for MessageOptions {
    fn from(config: &Config) -> Self {
        Self {
            include_jobs: config.notify.include_jobs,
            include_commit_message: config.notify.include_commit_message,
            pretext: config.slack.pretext.clone(),
            username: config.slack.username.clone(),
            channel: config.slack.channel.clone(),
            icon_emoji: config.slack.icon_emoji.clone(),
            icon_url: config.slack.icon_url.clone(),
        }
    }
}

/// Slack mrkdwn link.
fn link(url: &str, text: &str) -> String { format!("<{url}|{text}>") }

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

pub fn job_status_icon(conclusion: Option<&Conclusion>) -> &'static str {
    match conclusion {
        Some(Conclusion::Success) => SUCCESS_ICON,
        Some(Conclusion::Cancelled | Conclusion::Skipped) => SKIPPED_ICON,
        Some(
            Conclusion::Failure
            | Conclusion::Neutral
            | Conclusion::TimedOut
            | Conclusion::ActionRequired
            | Conclusion::Stale
            | Conclusion::Unknown(_),
        )
        | None => FAILURE_ICON,
    }
}

/// `<icon> <url|name> (<duration>)` for a completed job.
pub fn job_line(job: &Job) -> String {
    let duration = match job.completed_at {
        Some(completed_at) => compute_duration(job.started_at, completed_at),
        None => {
            tracing::warn!("Job {} is completed but has no completion time", job.name);
            String::new()
        }
    };
    format!(
        "{} {} ({})",
        job_status_icon(job.conclusion.as_ref()),
        link(job.html_url.as_deref().unwrap_or_default(), &job.name),
        duration
    )
}

pub fn job_fields(completed_jobs: &[&Job], outcome: &Outcome) -> Vec<Field> {
    if outcome.suppress_job_fields {
        return vec![];
    }
    completed_jobs
        .iter()
        .map(|job| Field { title: String::new(), short: true, value: job_line(job) })
        .collect()
}

fn status_line(run: &WorkflowRun, context: &RunContext, outcome: &Outcome) -> String {
    let repo_url = &run.repository.html_url;
    let pull_requests = run
        .internal_pull_requests()
        .map(|pr| {
            format!(
                "{} from `{}` to `{}`",
                link(&format!("{repo_url}/pull/{}", pr.number), &format!("#{}", pr.number)),
                pr.head.ref_name,
                pr.base.ref_name
            )
        })
        .collect::<Vec<_>>();
    if pull_requests.is_empty() {
        let branch = &run.head_branch;
        let branch_link = link(&format!("{repo_url}/tree/{branch}"), &format!("*{branch}*"));
        format!(
            "{} {}'s `{}` on `{}`",
            outcome.headline(),
            context.actor,
            context.event_name,
            branch_link
        )
    } else {
        format!("{} {}'s `pull_request` {}", outcome.headline(), context.actor, pull_requests.join(", "))
    }
}

fn details_line(run: &WorkflowRun, context: &RunContext) -> String {
    let duration = compute_duration(run.created_at, run.updated_at);
    format!(
        "Workflow: {} {} completed in `{}`",
        context.workflow,
        link(&run.html_url, &format!("#{}", run.run_number)),
        duration
    )
}

/// Build the notification for a run from its job list.
///
/// Jobs that have not completed are ignored.
pub fn compose_payload(
    run: &WorkflowRun,
    jobs: &[Job],
    context: &RunContext,
    options: &MessageOptions,
) -> Payload {
    let completed = completed_jobs(jobs);
    let outcome = resolve_outcome(&completed, options.include_jobs);
    tracing::info!(
        "Workflow run #{}: {} ({} of {} jobs completed)",
        run.run_number,
        outcome.headline().trim_end_matches(':'),
        completed.len(),
        jobs.len()
    );

    let mut lines = vec![status_line(run, context, &outcome), details_line(run, context)];
    if options.include_commit_message {
        match run.head_commit_message() {
            Some(message) => lines.push(format!("Commit: {message}")),
            None => tracing::warn!("Workflow run #{} has no head commit", run.run_number),
        }
    }

    let attachment = Attachment {
        mrkdwn_in: vec!["text"],
        color: outcome.color(),
        text: lines.join("\n"),
        footer: link(&run.repository.html_url, &format!("*{}*", run.repository.full_name)),
        footer_icon: FOOTER_ICON.to_string(),
        fields: job_fields(&completed, &outcome),
        pretext: options.pretext.clone().unwrap_or_default(),
    };
    Payload {
        attachments: vec![attachment],
        username: non_empty(&options.username),
        channel: non_empty(&options.channel),
        icon_emoji: non_empty(&options.icon_emoji),
        icon_url: non_empty(&options.icon_url),
    }
}
