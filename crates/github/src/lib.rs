use anyhow::{Context, Result, anyhow};
use http::StatusCode;
use octocrab::{GitHubError, Octocrab};
use workflow_notify_core::{
    config::{GitHubConfig, RunContext},
    models::{JobList, WorkflowRun},
};

#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
}

#[derive(serde::Serialize)]
struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    per_page: Option<u8>,
}

impl GitHub {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let client = Octocrab::builder()
            .base_uri(config.api_url.as_str())
            .context("Invalid GitHub API URL")?
            .personal_token(config.token.clone())
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { client })
    }

    pub async fn get_workflow_run(&self, context: &RunContext) -> Result<WorkflowRun> {
        let route = run_route(context);
        let run: WorkflowRun = self
            .client
            .get(&route, None::<&()>)
            .await
            .map_err(|e| not_found(e, context))
            .with_context(|| format!("Failed to fetch workflow run {}", context.run_id))?;
        tracing::info!(
            "Fetched workflow run #{} for {}/{} ({} pull requests)",
            run.run_number,
            context.owner,
            context.repo,
            run.pull_requests.len()
        );
        Ok(run)
    }

    /// Fetch the first page of jobs for the run. No further pages are requested.
    pub async fn list_jobs(&self, context: &RunContext, per_page: u8) -> Result<JobList> {
        let route = format!("{}/jobs", run_route(context));
        let list: JobList = self
            .client
            .get(&route, Some(&PageParams { per_page: Some(per_page) }))
            .await
            .map_err(|e| not_found(e, context))
            .with_context(|| format!("Failed to fetch jobs for workflow run {}", context.run_id))?;
        if list.total_count > list.jobs.len() as u64 {
            tracing::warn!(
                "Workflow run {} has {} jobs, only the first {} are included",
                context.run_id,
                list.total_count,
                list.jobs.len()
            );
        }
        Ok(list)
    }
}

fn run_route(context: &RunContext) -> String {
    format!("/repos/{}/{}/actions/runs/{}", context.owner, context.repo, context.run_id)
}

fn not_found(e: octocrab::Error, context: &RunContext) -> anyhow::Error {
    match e {
        octocrab::Error::GitHub { source, .. }
            if matches!(*source, GitHubError { status_code: StatusCode::NOT_FOUND, .. }) =>
        {
            anyhow!(
                "Workflow run {} not found in {}/{} (check that the token can read Actions)",
                context.run_id,
                context.owner,
                context.repo
            )
        }
        e => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use workflow_notify_core::config::RunContext;

    use super::run_route;

    #[test]
    fn test_run_route() {
        let context = RunContext {
            owner: "octo".to_string(),
            repo: "app".to_string(),
            run_id: 1234,
            actor: "octocat".to_string(),
            event_name: "push".to_string(),
            workflow: "CI".to_string(),
        };
        assert_eq!(run_route(&context), "/repos/octo/app/actions/runs/1234");
    }
}
