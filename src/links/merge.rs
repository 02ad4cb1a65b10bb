use tracing::info;

use crate::links::reference::{IssueReference, ReferenceSet};

/// Where a batch of references was found. Declaration order is merge
/// priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
  CommitMessage { sha: String },
  Title,
}

impl std::fmt::Display for Source {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Source::CommitMessage { sha } => {
        let short = sha.get(..7).unwrap_or(sha);
        write!(f, "commit {short}")
      }
      Source::Title => write!(f, "pull request title"),
    }
  }
}

fn priority(source: &Source) -> u8 {
  match source {
    Source::CommitMessage { .. } => 0,
    Source::Title => 1,
  }
}

/// Merges references from every source into one set. Commit messages are
/// always taken before the title; within a kind the given order is kept.
pub fn merge(sources: &[(Source, Vec<IssueReference>)]) -> ReferenceSet {
  let mut ordered: Vec<&(Source, Vec<IssueReference>)> = sources.iter().collect();
  // stable, so commits keep their listing order
  ordered.sort_by_key(|(source, _)| priority(source));

  let mut set = ReferenceSet::new();
  for (source, references) in ordered {
    for reference in references {
      if set.insert(reference.clone()) {
        info!("found {reference} in {source}");
      } else {
        info!("skipping duplicate {reference} from {source}");
      }
    }
  }
  set
}
