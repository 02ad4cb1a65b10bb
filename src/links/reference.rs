use std::collections::HashSet;

/// A pointer to an issue, either local (`#12`) or cross-repository
/// (`owner/repo#12`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueReference {
  pub repo: Option<String>,
  pub number: u64,
}

impl IssueReference {
  pub fn local(number: u64) -> Self {
    Self { repo: None, number }
  }

  pub fn cross_repo(repo: impl Into<String>, number: u64) -> Self {
    Self {
      repo: Some(repo.into()),
      number,
    }
  }
}

impl std::fmt::Display for IssueReference {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.repo {
      Some(repo) => write!(f, "{repo}#{}", self.number),
      None => write!(f, "#{}", self.number),
    }
  }
}

/// Insertion-ordered set of references. Only grows.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
  order: Vec<IssueReference>,
  seen: HashSet<IssueReference>,
}

impl ReferenceSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns `false` when the reference was already present.
  pub fn insert(&mut self, reference: IssueReference) -> bool {
    if self.seen.contains(&reference) {
      return false;
    }
    self.seen.insert(reference.clone());
    self.order.push(reference);
    true
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, IssueReference> {
    self.order.iter()
  }
}

impl<'a> IntoIterator for &'a ReferenceSet {
  type Item = &'a IssueReference;
  type IntoIter = std::slice::Iter<'a, IssueReference>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl FromIterator<IssueReference> for ReferenceSet {
  fn from_iter<I: IntoIterator<Item = IssueReference>>(iter: I) -> Self {
    let mut set = Self::new();
    for reference in iter {
      set.insert(reference);
    }
    set
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display() {
    assert_eq!(IssueReference::local(12).to_string(), "#12");
    assert_eq!(
      IssueReference::cross_repo("acme/widgets", 7).to_string(),
      "acme/widgets#7"
    );
  }

  #[test]
  fn test_insert_keeps_first_occurrence_order() {
    let mut set = ReferenceSet::new();
    assert!(set.insert(IssueReference::local(2)));
    assert!(set.insert(IssueReference::local(1)));
    assert!(!set.insert(IssueReference::local(2)));

    let numbers: Vec<u64> = set.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![2, 1]);
  }

  #[test]
  fn test_local_and_cross_repo_are_distinct() {
    let set: ReferenceSet = [
      IssueReference::local(7),
      IssueReference::cross_repo("acme/widgets", 7),
    ]
    .into_iter()
    .collect();
    assert_eq!(set.len(), 2);
  }
}
