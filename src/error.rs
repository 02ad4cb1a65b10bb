use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
  #[error("config error: {0}")]
  Config(String),

  #[error("config file not found: {0}")]
  ConfigNotFound(PathBuf),

  #[error("trigger context error: {0}")]
  Context(String),

  #[error("github api {operation} failed with status {status}: {body}")]
  Api {
    operation: String,
    status: u16,
    body: String,
  },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid keyword pattern: {0}")]
  Regex(#[from] regex::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("yaml error: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;
