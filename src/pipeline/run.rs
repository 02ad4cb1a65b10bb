use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::action;
use crate::annotation;
use crate::config::{Config, Settings};
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::event::TriggerContext;
use crate::github::pull_request::IssueTracker;
use crate::links::extract::KeywordMatcher;
use crate::links::merge::{self, Source};
use crate::links::reference::{IssueReference, ReferenceSet};

#[derive(Debug)]
pub enum RunOutcome {
  /// Not an opened/updated pull request; nothing was fetched or written.
  Unsupported,
  Done {
    links: ReferenceSet,
    output: String,
    body: String,
  },
}

impl RunOutcome {
  pub fn output(&self) -> &str {
    match self {
      RunOutcome::Unsupported => "",
      RunOutcome::Done { output, .. } => output,
    }
  }
}

/// Entry point of the step: checks the trigger, connects to GitHub and
/// processes the pull request.
pub async fn execute(ctx: &TriggerContext, config: &Config) -> Result<RunOutcome> {
  let Some(number) = ctx.supported_pull_request() else {
    info!(
      "event {} (action {:?}) is not a supported pull request event, skipping",
      ctx.event, ctx.action
    );
    return Ok(RunOutcome::Unsupported);
  };

  let client = GitHubClient::new(
    &ctx.api_url,
    config.require_token()?,
    config.settings.request_timeout(),
  )?;
  process(ctx, number, &config.settings, &client, Utc::now()).await
}

/// Fetch, extract, merge, render and persist for one pull request. The body
/// is written back even when no links were found so stale blocks go away.
pub async fn process<T: IssueTracker>(
  ctx: &TriggerContext,
  number: u64,
  settings: &Settings,
  tracker: &T,
  now: DateTime<Utc>,
) -> Result<RunOutcome> {
  let matcher = KeywordMatcher::new(settings.keywords.as_slice())?;

  let pr = tracker.get_pull_request(&ctx.repo, number).await?;
  info!("processing {} ({})", pr, pr.url);

  let mut sources: Vec<(Source, Vec<IssueReference>)> = Vec::new();

  if settings.use_commit_message {
    for commit in tracker.list_commits(&ctx.repo, number).await? {
      debug!("scanning commit {} ({})", commit.sha, commit.url);
      let references = matcher.extract(&commit.message);
      sources.push((Source::CommitMessage { sha: commit.sha }, references));
    }
  } else {
    info!("commit messages disabled, not listing commits");
  }

  if settings.use_pr_title {
    sources.push((Source::Title, matcher.extract(&pr.title)));
  } else {
    info!("pull request title disabled");
  }

  let links = merge::merge(&sources);
  let rendered = annotation::render(&links, pr.body.as_deref().unwrap_or_default(), now);

  tracker
    .update_pull_request(&ctx.repo, number, &rendered.body)
    .await?;

  if links.is_empty() {
    info!("no linked issues found for {}#{number}", ctx.repo);
  } else {
    info!(
      "linked {} issue(s) to {}#{number}: {}",
      links.len(),
      ctx.repo,
      rendered.output
    );
  }

  Ok(RunOutcome::Done {
    links,
    output: rendered.output,
    body: rendered.body,
  })
}

/// Writes the step output for a finished run.
pub fn publish(outcome: &RunOutcome, settings: &Settings) -> Result<()> {
  action::set_output(&settings.output_name, outcome.output())
}
