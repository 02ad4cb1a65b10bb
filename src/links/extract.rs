use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::links::reference::IssueReference;

pub const DEFAULT_KEYWORDS: &[&str] = &[
  "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
];

/// Keyword followed by whitespace and `#N` or `owner/repo#N`.
///
/// The leading group stands in for a lookbehind: the keyword may only start
/// the text or follow a character that is not `/`, `-`, `.` or a word
/// character. That character belongs to the match but never to a reference.
/// The digit run is greedy and the character after it is checked in
/// `extract`: it must not be an ASCII word character, the same class the
/// leading guard uses.
const PATTERN_TEMPLATE: &str = r"(?i)(?:^|[^/A-Za-z0-9_.\-])(?:{keywords})\s+(?:(?P<repo>[A-Za-z0-9_][A-Za-z0-9_.\-]*/[A-Za-z0-9_][A-Za-z0-9_.\-]*))?#(?P<issue>[1-9][0-9]*)";

fn is_ascii_word(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

/// Strips everything outside `[A-Za-z0-9_]` so configured keywords cannot
/// carry pattern syntax. Returns `None` when nothing is left.
pub fn sanitize_keyword(raw: &str) -> Option<String> {
  let cleaned: String = raw
    .trim()
    .chars()
    .filter(|c| is_ascii_word(*c))
    .collect();
  (!cleaned.is_empty()).then_some(cleaned)
}

#[derive(Debug, Clone)]
pub struct KeywordMatcher {
  regex: Option<Regex>,
}

impl KeywordMatcher {
  pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
    let mut cleaned: Vec<String> = Vec::new();
    for keyword in keywords {
      if let Some(k) = sanitize_keyword(keyword.as_ref()) {
        if !cleaned.contains(&k) {
          cleaned.push(k);
        }
      }
    }

    if cleaned.is_empty() {
      debug!("no usable keywords configured, matcher will match nothing");
      return Ok(Self { regex: None });
    }

    let pattern = PATTERN_TEMPLATE.replace("{keywords}", &cleaned.join("|"));
    Ok(Self {
      regex: Some(Regex::new(&pattern)?),
    })
  }

  pub fn with_defaults() -> Result<Self> {
    Self::new(DEFAULT_KEYWORDS)
  }

  pub fn extract(&self, text: &str) -> Vec<IssueReference> {
    let Some(regex) = &self.regex else {
      return Vec::new();
    };

    regex
      .captures_iter(text)
      .filter_map(|caps| {
        let issue = caps.name("issue")?;
        if text[issue.end()..].chars().next().is_some_and(is_ascii_word) {
          return None;
        }
        let issue = issue.as_str();
        let number: u64 = match issue.parse() {
          Ok(n) => n,
          Err(_) => {
            debug!("skipping issue number out of range: {issue}");
            return None;
          }
        };
        Some(match caps.name("repo") {
          Some(repo) => IssueReference::cross_repo(repo.as_str(), number),
          None => IssueReference::local(number),
        })
      })
      .collect()
  }
}
