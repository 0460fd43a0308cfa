use std::path::Path;

use serde::Deserialize;

use crate::config::parse_leading_int;
use crate::error::ReviewError;
use crate::types::RepoRef;

/// Repository and event information supplied by the workflow runner.
///
/// # Examples
///
/// ```
/// use diffward_core::EventContext;
///
/// let ctx = EventContext::from_parts(
///     Some("octocat/hello-world"),
///     Some(r#"{"action":"opened","pull_request":{"number":7}}"#),
/// ).unwrap();
/// assert_eq!(ctx.pull_request_number, Some(7));
/// assert_eq!(ctx.repo.unwrap().name, "hello-world");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
    /// Repository from `GITHUB_REPOSITORY`.
    pub repo: Option<RepoRef>,
    /// `pull_request.number` from the event payload.
    pub pull_request_number: Option<u64>,
}

#[derive(Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestRef>,
}

#[derive(Deserialize)]
struct PullRequestRef {
    number: Option<u64>,
}

impl EventContext {
    /// Read `GITHUB_REPOSITORY` and the JSON file named by `GITHUB_EVENT_PATH`.
    ///
    /// # Errors
    ///
    /// Returns an error when `GITHUB_REPOSITORY` is malformed or the event
    /// file exists but cannot be read or parsed.
    pub fn from_env() -> Result<Self, ReviewError> {
        let repository = std::env::var("GITHUB_REPOSITORY").ok();
        let event = match std::env::var("GITHUB_EVENT_PATH") {
            Ok(path) if Path::new(&path).exists() => Some(std::fs::read_to_string(path)?),
            _ => None,
        };
        Self::from_parts(repository.as_deref(), event.as_deref())
    }

    /// Build a context from a raw `owner/repo` string and event JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Config`] for a malformed repository and
    /// [`ReviewError::Serialization`] for invalid event JSON.
    pub fn from_parts(
        repository: Option<&str>,
        event_json: Option<&str>,
    ) -> Result<Self, ReviewError> {
        let repo = repository
            .filter(|r| !r.is_empty())
            .map(str::parse::<RepoRef>)
            .transpose()?;
        let pull_request_number = match event_json {
            Some(json) if !json.trim().is_empty() => {
                let payload: EventPayload = serde_json::from_str(json)?;
                payload
                    .pull_request
                    .and_then(|pr| pr.number)
                    .filter(|n| *n > 0)
            }
            _ => None,
        };
        Ok(Self {
            repo,
            pull_request_number,
        })
    }

    /// Pick the pull request number: the event payload first, then the
    /// explicit `pr_number` input. Zero, negative or unparseable input
    /// resolves to nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use diffward_core::EventContext;
    ///
    /// let ctx = EventContext::default();
    /// assert_eq!(ctx.resolve_pr_number(Some("12")), Some(12));
    /// assert_eq!(ctx.resolve_pr_number(Some("abc")), None);
    /// assert_eq!(ctx.resolve_pr_number(None), None);
    /// ```
    pub fn resolve_pr_number(&self, pr_input: Option<&str>) -> Option<u64> {
        self.pull_request_number.or_else(|| {
            pr_input
                .and_then(parse_leading_int)
                .and_then(|n| u64::try_from(n).ok())
                .filter(|n| *n > 0)
        })
    }
}
