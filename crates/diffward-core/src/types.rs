use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReviewError;

/// One file entry from a pull request's changed-file listing.
///
/// Only the fields the review needs are kept; everything else in the GitHub
/// payload is ignored during deserialization.
///
/// # Examples
///
/// ```
/// use diffward_core::ChangedFile;
///
/// let file: ChangedFile = serde_json::from_str(
///     r#"{"filename": "src/lib.rs", "status": "modified", "patch": "@@ -1 +1 @@\n-a\n+b"}"#,
/// ).unwrap();
/// assert_eq!(file.filename, "src/lib.rs");
/// assert!(file.has_patch());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root.
    #[serde(default)]
    pub filename: String,
    /// Unified diff hunk text. Absent for binary or rename-only changes.
    #[serde(default)]
    pub patch: Option<String>,
}

impl ChangedFile {
    /// Construct a file entry with a patch.
    pub fn new(filename: impl Into<String>, patch: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            patch: Some(patch.into()),
        }
    }

    /// Construct a file entry without textual diff content.
    pub fn without_patch(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            patch: None,
        }
    }

    /// Whether the entry carries non-empty diff text.
    pub fn has_patch(&self) -> bool {
        self.patch.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// A GitHub repository coordinate.
///
/// # Examples
///
/// ```
/// use diffward_core::RepoRef;
///
/// let repo: RepoRef = "octocat/hello-world".parse().unwrap();
/// assert_eq!(repo.owner, "octocat");
/// assert_eq!(repo.to_string(), "octocat/hello-world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Account or organization that owns the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((owner, name)) = s.trim().split_once('/') else {
            return Err(ReviewError::Config(format!(
                "invalid repository '{s}', expected owner/repo"
            )));
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(ReviewError::Config(format!(
                "invalid repository '{s}', expected owner/repo"
            )));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The pull request a run operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrTarget {
    /// Repository holding the pull request.
    pub repo: RepoRef,
    /// Pull request number.
    pub number: u64,
}

impl fmt::Display for PrTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}
