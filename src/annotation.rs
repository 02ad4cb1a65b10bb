use chrono::{DateTime, SecondsFormat, Utc};

use crate::links::reference::ReferenceSet;

pub const START_MARKER: &str = "<!-- pr-issue-links:start -->";
pub const END_MARKER: &str = "<!-- pr-issue-links:end -->";
pub const OUTPUT_SEPARATOR: &str = ", ";

const LINKING_VERB: &str = "closes";
const ATTRIBUTION: &str = "Generated by pr-issue-links from commit messages and the pull request title.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
  /// Value for the machine-readable step output.
  pub output: String,
  /// Pull request body with the annotation block replaced.
  pub body: String,
}

pub fn render_output(refs: &ReferenceSet) -> String {
  refs
    .iter()
    .map(|r| r.to_string())
    .collect::<Vec<_>>()
    .join(OUTPUT_SEPARATOR)
}

/// Removes every annotation block. Each end marker closes the nearest start
/// marker before it; markers without a partner are left in place. The gap a
/// removed block leaves collapses to one blank line, and an untouched body
/// round-trips exactly.
pub fn strip_blocks(body: &str) -> String {
  let mut kept: Vec<&str> = Vec::new();
  let mut cursor = 0;
  let mut search = 0;

  while let Some(offset) = body[search..].find(END_MARKER) {
    let end = search + offset;
    let close = end + END_MARKER.len();
    if let Some(start) = body[cursor..end].rfind(START_MARKER) {
      kept.push(&body[cursor..cursor + start]);
      cursor = close;
    }
    search = close;
  }

  if kept.is_empty() {
    return body.to_string();
  }
  kept.push(&body[cursor..]);

  let last = kept.len() - 1;
  let pieces: Vec<&str> = kept
    .iter()
    .enumerate()
    .map(|(i, &piece)| {
      let piece = if i > 0 {
        piece.trim_start_matches(['\n', '\r'])
      } else {
        piece
      };
      if i < last {
        piece.trim_end()
      } else {
        piece
      }
    })
    .filter(|piece| !piece.is_empty())
    .collect();

  pieces.join("\n\n").trim_end().to_string()
}

fn capitalize(sentence: &str) -> String {
  let mut chars = sentence.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

fn render_block(refs: &ReferenceSet, rendered_at: DateTime<Utc>) -> String {
  let mut lines = vec![START_MARKER.to_string()];
  for reference in refs {
    lines.push(format!("- {}", capitalize(&format!("{LINKING_VERB} {reference}"))));
  }
  lines.push(String::new());
  lines.push(format!(
    "<sub>Last updated {}. {ATTRIBUTION}</sub>",
    rendered_at.to_rfc3339_opts(SecondsFormat::Secs, true)
  ));
  lines.push(END_MARKER.to_string());
  lines.join("\n")
}

pub fn render(refs: &ReferenceSet, previous_body: &str, rendered_at: DateTime<Utc>) -> Rendered {
  let stripped = strip_blocks(previous_body);

  let body = if refs.is_empty() {
    stripped
  } else {
    let block = render_block(refs, rendered_at);
    let base = stripped.trim_end();
    if base.is_empty() {
      block
    } else {
      format!("{base}\n\n{block}")
    }
  };

  Rendered {
    output: render_output(refs),
    body,
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::links::extract::KeywordMatcher;
  use crate::links::reference::IssueReference;

  fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
  }

  fn refs(items: &[IssueReference]) -> ReferenceSet {
    items.iter().cloned().collect()
  }

  #[test]
  fn test_output_string() {
    let set = refs(&[
      IssueReference::local(1),
      IssueReference::cross_repo("acme/widgets", 7),
    ]);
    assert_eq!(render_output(&set), "#1, acme/widgets#7");
    assert_eq!(render_output(&ReferenceSet::new()), "");
  }

  #[test]
  fn test_appends_block_with_one_line_per_reference() {
    let set = refs(&[IssueReference::local(1), IssueReference::local(2)]);
    let rendered = render(&set, "Some description", at());

    assert!(rendered.body.starts_with("Some description\n\n<!-- pr-issue-links:start -->"));
    assert!(rendered.body.ends_with(END_MARKER));
    assert!(rendered.body.contains("- Closes #1\n- Closes #2\n"));
    assert!(rendered.body.contains("2024-05-01T12:30:00Z"));
    assert_eq!(rendered.output, "#1, #2");
  }

  #[test]
  fn test_empty_set_strips_stale_block() {
    let previous = format!("Intro\n\n{START_MARKER}\n- Closes #4\n{END_MARKER}\n");
    let rendered = render(&ReferenceSet::new(), &previous, at());
    assert_eq!(rendered.body, "Intro");
    assert_eq!(rendered.output, "");
  }

  #[test]
  fn test_empty_set_leaves_plain_body_untouched() {
    let rendered = render(&ReferenceSet::new(), "Body\n", at());
    assert_eq!(rendered.body, "Body\n");
  }

  #[test]
  fn test_replaces_every_prior_block_with_exactly_one() {
    let previous = format!(
      "{START_MARKER}\nold\n{END_MARKER}\nmiddle text\n{START_MARKER}\nolder\n{END_MARKER}"
    );
    let rendered = render(&refs(&[IssueReference::local(3)]), &previous, at());

    assert_eq!(rendered.body.matches(START_MARKER).count(), 1);
    assert_eq!(rendered.body.matches(END_MARKER).count(), 1);
    assert!(rendered.body.contains("middle text"));
    assert!(!rendered.body.contains("old"));
  }

  #[test]
  fn test_block_in_the_middle_leaves_one_blank_line() {
    let previous = format!("A\n\n{START_MARKER}\n- Closes #1\n{END_MARKER}\n\nB");
    assert_eq!(strip_blocks(&previous), "A\n\nB");
  }

  #[test]
  fn test_orphan_start_marker_keeps_following_text() {
    let set = refs(&[IssueReference::local(1)]);
    let previous = format!("Intro\n{START_MARKER}\nIMPORTANT USER TEXT\n");

    let first = render(&set, &previous, at());
    let second = render(&set, &first.body, at());

    assert!(second.body.contains("IMPORTANT USER TEXT"));
    assert_eq!(second.body.matches(END_MARKER).count(), 1);
    assert_eq!(first, second);
  }

  #[test]
  fn test_orphan_end_marker_is_left_alone() {
    let previous = format!("Text {END_MARKER} more");
    assert_eq!(strip_blocks(&previous), previous);
  }

  #[test]
  fn test_empty_previous_body() {
    let rendered = render(&refs(&[IssueReference::local(3)]), "", at());
    assert!(rendered.body.starts_with(START_MARKER));
  }

  #[test]
  fn test_rerender_is_stable() {
    let set = refs(&[IssueReference::local(8)]);
    let first = render(&set, "Body", at());
    let second = render(&set, &first.body, at());
    assert_eq!(first, second);
  }

  #[test]
  fn test_rendered_block_round_trips_through_extraction() {
    let set = refs(&[
      IssueReference::local(1),
      IssueReference::cross_repo("Acme/widgets.rs", 22),
      IssueReference::local(300),
    ]);
    let rendered = render(&set, "", at());

    let matcher = KeywordMatcher::with_defaults().unwrap();
    let extracted: ReferenceSet = matcher.extract(&rendered.body).into_iter().collect();
    let expected: Vec<_> = set.iter().collect();
    assert_eq!(extracted.iter().collect::<Vec<_>>(), expected);
  }

  #[test]
  fn test_capitalize() {
    assert_eq!(capitalize("closes #1"), "Closes #1");
    assert_eq!(capitalize(""), "");
  }
}
