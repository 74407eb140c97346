//! Validation diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single validation problem at a location inside the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Dotted path to the offending value (empty for the root)
    pub path: String,

    /// What went wrong
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Validator output describing why a value was rejected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub issues: Vec<Issue>,
}

impl Diagnostic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostic with a single issue
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![Issue::new(path, message)],
        }
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue::new(path, message));
    }

    /// Merge another diagnostic's issues under `prefix`
    pub fn extend_prefixed(&mut self, prefix: &str, other: Diagnostic) {
        for issue in other.issues {
            let path = join_path(prefix, &issue.path);
            self.issues.push(Issue::new(path, issue.message));
        }
    }

    /// Combine the rejections of every union member into one diagnostic
    pub fn union(members: Vec<Diagnostic>) -> Self {
        let mut diagnostic = Self::single(
            "",
            format!("no union member matched ({} alternatives)", members.len()),
        );
        for (index, member) in members.into_iter().enumerate() {
            diagnostic.extend_prefixed(&format!("union[{index}]"), member);
        }
        diagnostic
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}

/// Join two dotted path fragments, skipping empty ones
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => parent.to_string(),
        (false, false) if child.starts_with('[') => format!("{parent}{child}"),
        (false, false) => format!("{parent}.{child}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_issues() {
        let mut diagnostic = Diagnostic::single("foo", "expected string, received number");
        diagnostic.push("", "refinement failed");
        assert_eq!(
            diagnostic.to_string(),
            "foo: expected string, received number; refinement failed"
        );
    }

    #[test]
    fn test_union_prefixes_member_issues() {
        let diagnostic = Diagnostic::union(vec![
            Diagnostic::single("foo", "required"),
            Diagnostic::single("bar", "required"),
        ]);

        assert_eq!(diagnostic.issues.len(), 3);
        assert_eq!(diagnostic.issues[0].path, "");
        assert_eq!(diagnostic.issues[1].path, "union[0].foo");
        assert_eq!(diagnostic.issues[2].path, "union[1].bar");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", ""), "a");
        assert_eq!(join_path("a", "b"), "a.b");
        assert_eq!(join_path("a", "[0]"), "a[0]");
    }
}
