use std::path::PathBuf;

use anyhow::{Context, Result};
use argp::FromArgs;
use workflow_notify_core::{config::Config, models::completed_jobs};
use workflow_notify_github::GitHub;
use workflow_notify_slack::{
    Webhook,
    message::{MessageOptions, compose_payload},
};

use crate::{actions, util::native_path};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Post a Slack summary of a finished GitHub Actions workflow run.
pub struct Args {
    #[argp(option, short = 'c', from_str_fn(native_path))]
    /// read configuration from a YAML file instead of the Actions environment
    config: Option<PathBuf>,
    #[argp(switch)]
    /// print the payload instead of sending it
    dry_run: bool,
}

pub async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => {
            let config = Config::from_env()?;
            for secret in config.secrets() {
                actions::add_mask(secret);
            }
            config
        }
    };
    let context = &config.context;

    let github = GitHub::new(&config.github)?;
    let run = github.get_workflow_run(context).await?;
    let jobs = github.list_jobs(context, config.github.jobs_to_fetch).await?.jobs;
    tracing::debug!(
        "Completed jobs: {:?}",
        completed_jobs(&jobs)
            .iter()
            .map(|job| format!("{} ({})", job.name, job.conclusion.as_ref().map_or("null", |c| c.as_str())))
            .collect::<Vec<_>>()
    );

    let payload = compose_payload(&run, &jobs, context, &MessageOptions::from(&config));
    if args.dry_run {
        let json = serde_json::to_string_pretty(&payload).context("Failed to serialize payload")?;
        println!("{json}");
        return Ok(());
    }

    let webhook = Webhook::new(config.slack.webhook_url.clone());
    webhook.send(&payload).await?;
    tracing::info!("Sent Slack notification for workflow run #{}", run.run_number);
    Ok(())
}
