use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{LinkError, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const SUPPORTED_ACTIONS: &[&str] = &["opened", "reopened", "synchronize", "edited"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
  PullRequest,
  PullRequestTarget,
  Other(String),
}

impl EventKind {
  pub fn parse(name: &str) -> Self {
    match name {
      "pull_request" => EventKind::PullRequest,
      "pull_request_target" => EventKind::PullRequestTarget,
      other => EventKind::Other(other.to_string()),
    }
  }
}

impl std::fmt::Display for EventKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      EventKind::PullRequest => write!(f, "pull_request"),
      EventKind::PullRequestTarget => write!(f, "pull_request_target"),
      EventKind::Other(name) => write!(f, "{name}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
  pub owner: String,
  pub name: String,
}

impl RepoRef {
  pub fn parse(full_name: &str) -> Result<Self> {
    match full_name.split_once('/') {
      Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
        Ok(Self {
          owner: owner.to_string(),
          name: name.to_string(),
        })
      }
      _ => Err(LinkError::Context(format!(
        "repository must be in owner/repo format: {full_name}"
      ))),
    }
  }
}

impl std::fmt::Display for RepoRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// What invoked this run. Built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
  pub event: EventKind,
  pub action: Option<String>,
  pub repo: RepoRef,
  pub pull_number: Option<u64>,
  pub api_url: String,
}

#[derive(Deserialize)]
struct EventPayload {
  action: Option<String>,
  pull_request: Option<PayloadPullRequest>,
  number: Option<u64>,
}

#[derive(Deserialize)]
struct PayloadPullRequest {
  number: u64,
}

impl TriggerContext {
  /// Reads `GITHUB_EVENT_NAME`, `GITHUB_REPOSITORY`, `GITHUB_EVENT_PATH` and
  /// `GITHUB_API_URL`.
  pub fn from_env() -> Result<Self> {
    let event_name = std::env::var("GITHUB_EVENT_NAME")
      .map_err(|_| LinkError::Context("GITHUB_EVENT_NAME not set".into()))?;
    let repository = std::env::var("GITHUB_REPOSITORY")
      .map_err(|_| LinkError::Context("GITHUB_REPOSITORY not set".into()))?;
    let payload = match std::env::var("GITHUB_EVENT_PATH") {
      Ok(path) if !path.is_empty() => Some(std::fs::read_to_string(Path::new(&path))?),
      _ => None,
    };
    let api_url = std::env::var("GITHUB_API_URL")
      .ok()
      .filter(|url| !url.is_empty())
      .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    Self::from_parts(&event_name, &repository, payload.as_deref(), &api_url)
  }

  pub fn from_parts(
    event_name: &str,
    repository: &str,
    payload: Option<&str>,
    api_url: &str,
  ) -> Result<Self> {
    let event = EventKind::parse(event_name);
    let repo = RepoRef::parse(repository)?;

    let (action, pull_number) = match payload {
      Some(raw) => {
        let payload: EventPayload = serde_json::from_str(raw)?;
        let number = payload
          .pull_request
          .map(|pr| pr.number)
          .or(payload.number);
        (payload.action, number)
      }
      None => (None, None),
    };
    debug!("trigger: event={event} action={action:?} repo={repo} pull={pull_number:?}");

    Ok(Self {
      event,
      action,
      repo,
      pull_number,
      api_url: api_url.trim_end_matches('/').to_string(),
    })
  }

  /// The pull request number when this run was triggered by an
  /// opened/updated pull request, `None` otherwise.
  pub fn supported_pull_request(&self) -> Option<u64> {
    if !matches!(self.event, EventKind::PullRequest | EventKind::PullRequestTarget) {
      return None;
    }
    if let Some(action) = &self.action {
      if !SUPPORTED_ACTIONS.contains(&action.as_str()) {
        return None;
      }
    }
    self.pull_number
  }
}
