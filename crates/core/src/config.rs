use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::IncludeJobs;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_JOBS_TO_FETCH: u8 = 30;
/// GitHub caps `per_page` at 100.
pub const MAX_JOBS_TO_FETCH: u8 = 100;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub github: GitHubConfig,
    pub slack: SlackConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    pub context: RunContext,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    #[serde(default = "default_jobs_to_fetch")]
    pub jobs_to_fetch: u8,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlackConfig {
    pub webhook_url: Url,
    /// `webhook_url` as supplied, before URL normalization.
    #[serde(skip)]
    pub webhook_url_input: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub icon_emoji: Option<String>,
    #[serde(default)]
    pub pretext: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub include_jobs: IncludeJobs,
    #[serde(default)]
    pub include_commit_message: bool,
}

/// The workflow run being reported on, as exposed by the Actions runner.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunContext {
    pub owner: String,
    pub repo: String,
    pub run_id: u64,
    pub actor: String,
    pub event_name: String,
    pub workflow: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),
    #[error("Environment variable not set: {0}")]
    MissingEnv(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
    #[error("Failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config")]
    Parse(#[from] serde_yaml::Error),
}

fn default_api_url() -> Url { Url::parse(DEFAULT_API_URL).expect("valid default API URL") }

fn default_jobs_to_fetch() -> u8 { DEFAULT_JOBS_TO_FETCH }

impl Config {
    /// Load the configuration from the Actions runner environment.
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    /// Load the configuration from action inputs (`INPUT_<NAME>`) and the
    /// default `GITHUB_*` variables, resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&str) -> Option<String> {
        let inputs = Inputs { lookup: &lookup };

        let webhook_url_input = inputs.required("slack_webhook_url")?;
        let webhook_url = parse_url("slack_webhook_url", &webhook_url_input)?;
        let token = inputs.required("repo_token")?;
        let jobs_to_fetch = parse_jobs_to_fetch(&inputs.required("jobs_to_fetch")?)?;
        let include_jobs = inputs.required("include_jobs")?;
        let include_jobs = include_jobs.parse::<IncludeJobs>().map_err(|()| ConfigError::InvalidValue {
            name: "include_jobs",
            reason: format!("expected one of true, false, on-failure, got {include_jobs:?}"),
        })?;
        let include_commit_message = inputs.required("include_commit_message")? == "true";

        let api_url = match env_var(&lookup, "GITHUB_API_URL") {
            Some(value) => parse_url("GITHUB_API_URL", &value)?,
            None => default_api_url(),
        };
        let repository = require_env(&lookup, "GITHUB_REPOSITORY")?;
        let Some((owner, repo)) = repository.split_once('/') else {
            return Err(ConfigError::InvalidValue {
                name: "GITHUB_REPOSITORY",
                reason: format!("expected owner/repo, got {repository:?}"),
            });
        };
        let run_id = require_env(&lookup, "GITHUB_RUN_ID")?;
        let run_id = run_id.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
            name: "GITHUB_RUN_ID",
            reason: format!("{e} ({run_id:?})"),
        })?;

        Ok(Self {
            github: GitHubConfig { token, api_url, jobs_to_fetch },
            slack: SlackConfig {
                webhook_url,
                webhook_url_input,
                channel: inputs.optional("channel"),
                username: inputs.optional("name"),
                icon_url: inputs.optional("icon_url"),
                icon_emoji: inputs.optional("icon_emoji"),
                pretext: inputs.optional("pretext"),
            },
            notify: NotifyConfig { include_jobs, include_commit_message },
            context: RunContext {
                owner: owner.to_string(),
                repo: repo.to_string(),
                run_id,
                actor: require_env(&lookup, "GITHUB_ACTOR")?,
                event_name: require_env(&lookup, "GITHUB_EVENT_NAME")?,
                workflow: require_env(&lookup, "GITHUB_WORKFLOW")?,
            },
        })
    }

    /// Load the configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(contents)?;
        config.normalize()?;
        Ok(config)
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        if !(1..=MAX_JOBS_TO_FETCH).contains(&self.github.jobs_to_fetch) {
            return Err(ConfigError::InvalidValue {
                name: "jobs_to_fetch",
                reason: format!("must be between 1 and {MAX_JOBS_TO_FETCH}"),
            });
        }
        let slack = &mut self.slack;
        if slack.webhook_url_input.is_empty() {
            slack.webhook_url_input = slack.webhook_url.to_string();
        }
        for value in
            [&mut slack.channel, &mut slack.username, &mut slack.icon_url, &mut slack.icon_emoji, &mut slack.pretext]
        {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
        Ok(())
    }

    /// Values that must never appear in logs. The webhook URL is listed both
    /// as supplied and in normalized form when they differ.
    pub fn secrets(&self) -> Vec<&str> {
        let mut secrets = vec![self.github.token.as_str(), self.slack.webhook_url_input.as_str()];
        if self.slack.webhook_url.as_str() != self.slack.webhook_url_input {
            secrets.push(self.slack.webhook_url.as_str());
        }
        secrets
    }
}

struct Inputs<'a, F> {
    lookup: &'a F,
}

impl<F> Inputs<'_, F>
where F: Fn(&str) -> Option<String>
{
    /// Same naming rules as the Actions toolkit: `INPUT_` + upper-cased name
    /// with spaces replaced by underscores. Values are trimmed and empty
    /// values are treated as unset.
    fn optional(&self, name: &str) -> Option<String> {
        let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        (self.lookup)(&key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::MissingInput(name))
    }
}

fn env_var<F>(lookup: &F, key: &str) -> Option<String>
where F: Fn(&str) -> Option<String> {
    lookup(key).filter(|v| !v.is_empty())
}

fn require_env<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where F: Fn(&str) -> Option<String> {
    env_var(lookup, key).ok_or(ConfigError::MissingEnv(key))
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidValue { name, reason: e.to_string() })
}

fn parse_jobs_to_fetch(value: &str) -> Result<u8, ConfigError> {
    match value.parse::<u8>() {
        Ok(n) if (1..=MAX_JOBS_TO_FETCH).contains(&n) => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            name: "jobs_to_fetch",
            reason: format!("expected a number between 1 and {MAX_JOBS_TO_FETCH}, got {value:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(overrides: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars = [
            ("INPUT_SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T0/B0/XYZ"),
            ("INPUT_REPO_TOKEN", "ghp_secret"),
            ("INPUT_JOBS_TO_FETCH", "30"),
            ("INPUT_INCLUDE_JOBS", "true"),
            ("INPUT_INCLUDE_COMMIT_MESSAGE", "false"),
            ("GITHUB_REPOSITORY", "octo/app"),
            ("GITHUB_RUN_ID", "1234"),
            ("GITHUB_ACTOR", "octocat"),
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_WORKFLOW", "CI"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<HashMap<_, _>>();
        for (k, v) in overrides {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    fn load(vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_from_env_minimal() {
        let config = load(&env(&[])).unwrap();
        assert_eq!(config.github.token, "ghp_secret");
        assert_eq!(config.github.api_url.as_str(), "https://api.github.com/");
        assert_eq!(config.github.jobs_to_fetch, 30);
        assert_eq!(config.notify.include_jobs, IncludeJobs::True);
        assert!(!config.notify.include_commit_message);
        assert_eq!(config.slack.channel, None);
        assert_eq!(config.context.owner, "octo");
        assert_eq!(config.context.repo, "app");
        assert_eq!(config.context.run_id, 1234);
        assert_eq!(config.secrets(), ["ghp_secret", "https://hooks.slack.com/services/T0/B0/XYZ"]);
    }

    #[test]
    fn test_from_env_inputs() {
        let config = load(&env(&[
            ("INPUT_JOBS_TO_FETCH", "50"),
            ("INPUT_INCLUDE_JOBS", "on-failure"),
            ("INPUT_INCLUDE_COMMIT_MESSAGE", "true"),
            ("INPUT_CHANNEL", "#builds"),
            ("INPUT_NAME", "  CI Bot  "),
            ("INPUT_ICON_EMOJI", ""),
            ("GITHUB_API_URL", "https://github.example.com/api/v3"),
        ]))
        .unwrap();
        assert_eq!(config.github.jobs_to_fetch, 50);
        assert_eq!(config.notify.include_jobs, IncludeJobs::OnFailure);
        assert!(config.notify.include_commit_message);
        assert_eq!(config.slack.channel.as_deref(), Some("#builds"));
        assert_eq!(config.slack.username.as_deref(), Some("CI Bot"));
        assert_eq!(config.slack.icon_emoji, None);
        assert_eq!(config.github.api_url.host_str(), Some("github.example.com"));
    }

    #[test]
    fn test_missing_required_input() {
        let mut vars = env(&[]);
        vars.remove("INPUT_SLACK_WEBHOOK_URL");
        let err = load(&vars).unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: slack_webhook_url");

        let err = load(&env(&[("INPUT_REPO_TOKEN", "   ")])).unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: repo_token");

        for (key, name) in [
            ("INPUT_JOBS_TO_FETCH", "jobs_to_fetch"),
            ("INPUT_INCLUDE_JOBS", "include_jobs"),
            ("INPUT_INCLUDE_COMMIT_MESSAGE", "include_commit_message"),
        ] {
            let mut vars = env(&[]);
            vars.remove(key);
            match load(&vars) {
                Err(ConfigError::MissingInput(missing)) => assert_eq!(missing, name),
                other => panic!("expected missing {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_secrets_include_supplied_webhook_url() {
        let config =
            load(&env(&[("INPUT_SLACK_WEBHOOK_URL", "https://HOOKS.slack.com/services/T0/B0/XYZ")])).unwrap();
        assert_eq!(
            config.secrets(),
            [
                "ghp_secret",
                "https://HOOKS.slack.com/services/T0/B0/XYZ",
                "https://hooks.slack.com/services/T0/B0/XYZ",
            ]
        );

        let config = load(&env(&[("INPUT_SLACK_WEBHOOK_URL", "https://hooks.slack.com")])).unwrap();
        assert_eq!(config.secrets(), ["ghp_secret", "https://hooks.slack.com", "https://hooks.slack.com/"]);
    }

    #[test]
    fn test_invalid_values() {
        let cases: &[(&str, &str, &str)] = &[
            ("INPUT_JOBS_TO_FETCH", "0", "jobs_to_fetch"),
            ("INPUT_JOBS_TO_FETCH", "101", "jobs_to_fetch"),
            ("INPUT_JOBS_TO_FETCH", "many", "jobs_to_fetch"),
            ("INPUT_INCLUDE_JOBS", "sometimes", "include_jobs"),
            ("INPUT_SLACK_WEBHOOK_URL", "not a url", "slack_webhook_url"),
            ("GITHUB_REPOSITORY", "octo", "GITHUB_REPOSITORY"),
            ("GITHUB_RUN_ID", "abc", "GITHUB_RUN_ID"),
        ];
        for &(key, value, expected) in cases {
            match load(&env(&[(key, value)])) {
                Err(ConfigError::InvalidValue { name, .. }) => assert_eq!(name, expected, "{key}={value}"),
                other => panic!("expected invalid value for {key}={value}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(
            r##"
github:
  token: ghp_secret
  jobs_to_fetch: 10
slack:
  webhook_url: https://hooks.slack.com/services/T0/B0/XYZ
  channel: "#builds"
  pretext: ""
notify:
  include_jobs: "false"
context:
  owner: octo
  repo: app
  run_id: 99
  actor: octocat
  event_name: pull_request
  workflow: CI
"##,
        )
        .unwrap();
        assert_eq!(config.github.jobs_to_fetch, 10);
        assert_eq!(config.github.api_url.as_str(), "https://api.github.com/");
        assert_eq!(config.slack.channel.as_deref(), Some("#builds"));
        assert_eq!(config.slack.pretext, None);
        assert_eq!(config.slack.webhook_url_input, "https://hooks.slack.com/services/T0/B0/XYZ");
        assert_eq!(config.notify.include_jobs, IncludeJobs::False);
        assert_eq!(config.context.run_id, 99);
    }

    #[test]
    fn test_from_yaml_rejects_jobs_to_fetch() {
        let err = Config::from_yaml(
            r#"
github: { token: t, jobs_to_fetch: 0 }
slack: { webhook_url: "https://hooks.slack.com/services/x" }
context: { owner: o, repo: r, run_id: 1, actor: a, event_name: push, workflow: w }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "jobs_to_fetch", .. }));
    }

    #[test]
    fn test_from_file_errors() {
        let err = Config::from_file(Path::new("/nonexistent/workflow-notify.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().starts_with("Failed to read config file /nonexistent/"));

        let err = Config::from_yaml("github: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
