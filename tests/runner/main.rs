use std::io::Write;
use std::process::{Command, Stdio};

fn binary() -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_pr-issue-links"));
  for var in [
    "GITHUB_EVENT_NAME",
    "GITHUB_EVENT_PATH",
    "GITHUB_REPOSITORY",
    "GITHUB_OUTPUT",
    "GITHUB_TOKEN",
    "INPUT_GITHUB-TOKEN",
    "INPUT_USE-COMMIT-MESSAGE",
    "INPUT_USE-PR-TITLE",
    "INPUT_KEYWORDS",
  ] {
    cmd.env_remove(var);
  }
  cmd
}

// --- extract ---

#[test]
fn extract_prints_deduplicated_references() {
  let output = binary()
    .args(["extract", "Fixes #1, closes acme/widgets#7 and fixes #1 again"])
    .output()
    .unwrap();

  assert!(output.status.success());
  assert_eq!(String::from_utf8_lossy(&output.stdout), "#1\nacme/widgets#7\n");
}

#[test]
fn extract_reads_stdin_with_custom_keywords() {
  let mut child = binary()
    .args(["extract", "--keywords", "implements, refs"])
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .spawn()
    .unwrap();
  child
    .stdin
    .take()
    .unwrap()
    .write_all(b"implements #3\nfixes #4\nrefs #5\n")
    .unwrap();
  let output = child.wait_with_output().unwrap();

  assert!(output.status.success());
  assert_eq!(String::from_utf8_lossy(&output.stdout), "#3\n#5\n");
}

// --- run ---

#[test]
fn unsupported_event_sets_empty_output_without_token() {
  let dir = tempfile::tempdir().unwrap();
  let event_path = dir.path().join("event.json");
  let output_path = dir.path().join("output");
  std::fs::write(&event_path, r#"{"ref": "refs/heads/main"}"#).unwrap();

  let output = binary()
    .arg("run")
    .env("GITHUB_EVENT_NAME", "push")
    .env("GITHUB_REPOSITORY", "octo/cat")
    .env("GITHUB_EVENT_PATH", &event_path)
    .env("GITHUB_OUTPUT", &output_path)
    .output()
    .unwrap();

  assert!(output.status.success());
  assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "links=\n");
}

#[test]
fn missing_token_fails_the_step() {
  let dir = tempfile::tempdir().unwrap();
  let event_path = dir.path().join("event.json");
  std::fs::write(
    &event_path,
    r#"{"action": "opened", "pull_request": {"number": 3}}"#,
  )
  .unwrap();

  let output = binary()
    .arg("run")
    .env("GITHUB_EVENT_NAME", "pull_request")
    .env("GITHUB_REPOSITORY", "octo/cat")
    .env("GITHUB_EVENT_PATH", &event_path)
    .output()
    .unwrap();

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stdout).starts_with("::error::config error"));
}

#[test]
fn missing_trigger_environment_fails_the_step() {
  let output = binary().arg("run").output().unwrap();

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stdout).contains("GITHUB_EVENT_NAME not set"));
}
