use serde::Deserialize;

use crate::error::Result;
use crate::github::event::RepoRef;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  #[serde(default)]
  pub body: Option<String>,
  #[serde(rename = "html_url")]
  pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
  pub sha: String,
  pub url: String,
  pub message: String,
}

/// The tracker operations a run needs. `GitHubClient` talks to the REST API;
/// tests substitute an in-memory tracker.
#[allow(async_fn_in_trait)]
pub trait IssueTracker {
  async fn get_pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequest>;

  async fn list_commits(&self, repo: &RepoRef, number: u64) -> Result<Vec<Commit>>;

  async fn update_pull_request(&self, repo: &RepoRef, number: u64, body: &str) -> Result<()>;
}

impl std::fmt::Display for PullRequest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}: {}", self.number, self.title)
  }
}
