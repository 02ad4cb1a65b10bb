use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};
use crate::links::extract::DEFAULT_KEYWORDS;

/// Settings file contents. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
  #[serde(default = "default_true")]
  pub use_commit_message: bool,
  #[serde(default = "default_true")]
  pub use_pr_title: bool,
  #[serde(default = "default_keywords")]
  pub keywords: Vec<String>,
  #[serde(default = "default_output_name")]
  pub output_name: String,
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      use_commit_message: default_true(),
      use_pr_title: default_true(),
      keywords: default_keywords(),
      output_name: default_output_name(),
      request_timeout_secs: default_request_timeout(),
    }
  }
}

fn default_true() -> bool {
  true
}
fn default_keywords() -> Vec<String> {
  DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
fn default_output_name() -> String {
  "links".to_string()
}
fn default_request_timeout() -> u64 {
  30
}

/// Raw step inputs. Actions hands every input over as a string, empty when
/// the workflow leaves it unset.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
  pub github_token: Option<String>,
  pub use_commit_message: Option<String>,
  pub use_pr_title: Option<String>,
  pub keywords: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
  pub token: Option<String>,
  pub settings: Settings,
}

/// Only a case-insensitive `false` turns a toggle off. Empty means unset.
pub fn parse_toggle(raw: Option<&str>) -> Option<bool> {
  let value = raw?.trim();
  if value.is_empty() {
    return None;
  }
  Some(!value.eq_ignore_ascii_case("false"))
}

/// Splits a comma-delimited keyword list. Entries are kept raw; the matcher
/// sanitizes them.
pub fn parse_keywords(raw: Option<&str>) -> Option<Vec<String>> {
  let value = raw?;
  if value.trim().is_empty() {
    return None;
  }
  Some(value.split(',').map(|k| k.to_string()).collect())
}

impl Settings {
  pub fn load(path: &Path) -> Result<Self> {
    if !path.exists() {
      return Err(LinkError::ConfigNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_yaml::from_str(&content)?;
    settings.validate()?;
    Ok(settings)
  }

  fn validate(&self) -> Result<()> {
    if self.output_name.trim().is_empty() {
      return Err(LinkError::Config("output_name must not be empty".into()));
    }
    if self.request_timeout_secs == 0 {
      return Err(LinkError::Config(
        "request_timeout_secs must be positive".into(),
      ));
    }
    Ok(())
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}

impl Config {
  /// Inputs override the settings file, which overrides the defaults.
  pub fn resolve(settings_path: Option<&Path>, inputs: &Inputs) -> Result<Self> {
    let mut settings = match settings_path {
      Some(path) => Settings::load(path)?,
      None => Settings::default(),
    };

    if let Some(enabled) = parse_toggle(inputs.use_commit_message.as_deref()) {
      settings.use_commit_message = enabled;
    }
    if let Some(enabled) = parse_toggle(inputs.use_pr_title.as_deref()) {
      settings.use_pr_title = enabled;
    }
    if let Some(keywords) = parse_keywords(inputs.keywords.as_deref()) {
      settings.keywords = keywords;
    }

    let token = inputs
      .github_token
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_string);

    Ok(Self { token, settings })
  }

  pub fn require_token(&self) -> Result<&str> {
    self
      .token
      .as_deref()
      .ok_or_else(|| LinkError::Config("github-token input or GITHUB_TOKEN not set".into()))
  }
}
