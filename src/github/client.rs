use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{LinkError, Result};
use crate::github::event::RepoRef;
use crate::github::pull_request::{Commit, IssueTracker, PullRequest};

const PER_PAGE: usize = 100;
const ERROR_BODY_LIMIT: usize = 800;

#[derive(Deserialize)]
struct CommitItem {
  sha: String,
  html_url: String,
  commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
  message: String,
}

pub struct GitHubClient {
  http: reqwest::Client,
  api_base: String,
}

impl GitHubClient {
  pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("pr-issue-links"));
    headers.insert(
      ACCEPT,
      HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
    let auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
      .map_err(|_| LinkError::Config("github token contains invalid characters".into()))?;
    headers.insert(AUTHORIZATION, auth);

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(timeout)
      .build()?;

    Ok(Self {
      http,
      api_base: api_base.trim_end_matches('/').to_string(),
    })
  }

  fn pull_url(&self, repo: &RepoRef, number: u64) -> String {
    format!(
      "{}/repos/{}/{}/pulls/{number}",
      self.api_base, repo.owner, repo.name
    )
  }

  async fn send_json<T: DeserializeOwned>(
    &self,
    operation: &str,
    request: reqwest::RequestBuilder,
  ) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(LinkError::Api {
        operation: operation.to_string(),
        status: status.as_u16(),
        body: truncate(&body, ERROR_BODY_LIMIT),
      });
    }
    Ok(response.json::<T>().await?)
  }
}

impl IssueTracker for GitHubClient {
  async fn get_pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequest> {
    info!("fetching pull request {repo}#{number}");
    self
      .send_json("get pull request", self.http.get(self.pull_url(repo, number)))
      .await
  }

  async fn list_commits(&self, repo: &RepoRef, number: u64) -> Result<Vec<Commit>> {
    info!("listing commits of {repo}#{number}");

    let url = format!("{}/commits", self.pull_url(repo, number));
    let per_page = PER_PAGE.to_string();
    let mut page = 1_u32;
    let mut commits = Vec::new();
    loop {
      let page_value = page.to_string();
      let request = self.http.get(&url).query(&[
        ("per_page", per_page.as_str()),
        ("page", page_value.as_str()),
      ]);
      let chunk: Vec<CommitItem> = self.send_json("list commits", request).await?;
      let chunk_len = chunk.len();
      debug!("commit page {page}: {chunk_len} item(s)");

      commits.extend(chunk.into_iter().map(|item| Commit {
        sha: item.sha,
        url: item.html_url,
        message: item.commit.message,
      }));
      if chunk_len < PER_PAGE {
        break;
      }
      page = page.saturating_add(1);
    }

    info!("found {} commit(s)", commits.len());
    Ok(commits)
  }

  async fn update_pull_request(&self, repo: &RepoRef, number: u64, body: &str) -> Result<()> {
    info!("updating body of {repo}#{number}");
    let request = self
      .http
      .patch(self.pull_url(repo, number))
      .json(&json!({ "body": body }));
    let _: serde_json::Value = self.send_json("update pull request", request).await?;
    Ok(())
  }
}

fn truncate(text: &str, limit: usize) -> String {
  match text.char_indices().nth(limit) {
    Some((idx, _)) => format!("{}...", &text[..idx]),
    None => text.to_string(),
  }
}
