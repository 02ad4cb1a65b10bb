use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;

/// Sets a step output through the `GITHUB_OUTPUT` file, falling back to the
/// legacy stdout command when running outside Actions.
pub fn set_output(name: &str, value: &str) -> Result<()> {
  match std::env::var("GITHUB_OUTPUT") {
    Ok(path) if !path.is_empty() => append_output(Path::new(&path), name, value),
    _ => {
      debug!("GITHUB_OUTPUT not set, writing output command to stdout");
      println!("::set-output name={name}::{}", escape_data(value));
      Ok(())
    }
  }
}

pub fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
  let mut file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)?;
  if value.contains('\n') {
    let delimiter = "ghadelimiter_pr_issue_links";
    writeln!(file, "{name}<<{delimiter}\n{value}\n{delimiter}")?;
  } else {
    writeln!(file, "{name}={value}")?;
  }
  info!("output {name}={value:?}");
  Ok(())
}

/// Marks the step failed: one `::error::` annotation carrying the error and
/// every underlying cause.
pub fn set_failed(err: &(dyn std::error::Error + 'static)) {
  println!("::error::{}", escape_data(&error_chain(err)));
}

pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
  let mut message = err.to_string();
  let mut source = err.source();
  let mut previous = message.clone();
  while let Some(cause) = source {
    let text = cause.to_string();
    // wrappers that already print their cause inline
    if !previous.contains(&text) {
      message.push_str("\ncaused by: ");
      message.push_str(&text);
    }
    previous = text;
    source = cause.source();
  }
  message
}

fn escape_data(value: &str) -> String {
  value
    .replace('%', "%25")
    .replace('\r', "%0D")
    .replace('\n', "%0A")
}
