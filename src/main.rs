mod action;
mod annotation;
mod config;
mod error;
mod github;
mod links;
mod pipeline;

use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use crate::config::{parse_keywords, Config, Inputs};
use crate::error::Result;
use crate::github::event::TriggerContext;
use crate::links::extract::KeywordMatcher;
use crate::links::reference::ReferenceSet;
use crate::pipeline::run::{self, RunOutcome};

#[derive(Parser)]
#[command(
  name = "pr-issue-links",
  about = "Collects issue-closing keywords from a pull request and annotates its description"
)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Path to an optional YAML settings file
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run as a GitHub Actions step for the current trigger
  Run(StepInputs),
  /// Print the issue references found in TEXT (or stdin)
  Extract {
    /// Text to scan; stdin is read when omitted
    text: Option<String>,
    /// Comma-delimited keywords replacing the defaults
    #[arg(long)]
    keywords: Option<String>,
  },
}

#[derive(Args)]
struct StepInputs {
  /// Token used to read and update the pull request
  #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
  github_token: Option<String>,

  /// `false` disables scanning commit messages
  #[arg(long, env = "INPUT_USE-COMMIT-MESSAGE")]
  use_commit_message: Option<String>,

  /// `false` disables scanning the pull request title
  #[arg(long, env = "INPUT_USE-PR-TITLE")]
  use_pr_title: Option<String>,

  /// Comma-delimited keywords replacing the defaults
  #[arg(long, env = "INPUT_KEYWORDS")]
  keywords: Option<String>,
}

impl StepInputs {
  fn into_inputs(self) -> Inputs {
    let github_token = self
      .github_token
      .filter(|t| !t.trim().is_empty())
      .or_else(|| std::env::var("GITHUB_TOKEN").ok());
    Inputs {
      github_token,
      use_commit_message: self.use_commit_message,
      use_pr_title: self.use_pr_title,
      keywords: self.keywords,
    }
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  if let Err(e) = dispatch(cli).await {
    error!("{e}");
    action::set_failed(&e);
    std::process::exit(1);
  }
}

async fn dispatch(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Run(inputs) => cmd_run(cli.config, inputs).await,
    Commands::Extract { text, keywords } => cmd_extract(text, keywords),
  }
}

async fn cmd_run(settings_path: Option<PathBuf>, inputs: StepInputs) -> Result<()> {
  let config = Config::resolve(settings_path.as_deref(), &inputs.into_inputs())?;
  let ctx = TriggerContext::from_env()?;

  let outcome = run::execute(&ctx, &config).await?;
  run::publish(&outcome, &config.settings)?;

  match &outcome {
    RunOutcome::Unsupported => info!("done: unsupported event"),
    RunOutcome::Done { links, body, .. } => {
      info!("done: {} link(s), body is {} bytes", links.len(), body.len())
    }
  }
  Ok(())
}

fn cmd_extract(text: Option<String>, keywords: Option<String>) -> Result<()> {
  let text = match text {
    Some(text) => text,
    None => {
      let mut buf = String::new();
      std::io::stdin().read_to_string(&mut buf)?;
      buf
    }
  };

  let matcher = match parse_keywords(keywords.as_deref()) {
    Some(keywords) => KeywordMatcher::new(keywords.as_slice())?,
    None => KeywordMatcher::with_defaults()?,
  };

  let found: ReferenceSet = matcher.extract(&text).into_iter().collect();
  for reference in &found {
    println!("{reference}");
  }
  Ok(())
}
