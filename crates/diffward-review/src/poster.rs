//! Delivery strategies for the finished review text.

use async_trait::async_trait;
use diffward_core::{PostingMode, PrTarget, ReviewError};
use tracing::debug;

use crate::github::PullRequestApi;

/// Opening marker of the managed section in a PR description.
pub const SECTION_START: &str = "<!-- ai-pr-review: start -->";
/// Closing marker of the managed section in a PR description.
pub const SECTION_END: &str = "<!-- ai-pr-review: end -->";

/// Delivers review text to one pull request.
#[async_trait]
pub trait Poster: Send + Sync {
    /// Which posting mode this strategy implements.
    fn mode(&self) -> PostingMode;

    /// Publish `body`.
    async fn deliver(&self, body: &str) -> Result<(), ReviewError>;
}

/// Posts the review as a discussion comment.
pub struct CommentPoster<'a> {
    api: &'a dyn PullRequestApi,
    target: PrTarget,
}

/// Posts the review as a pull request review with a neutral verdict.
pub struct ReviewPoster<'a> {
    api: &'a dyn PullRequestApi,
    target: PrTarget,
}

/// Upserts the review into a delimited section of the PR description.
pub struct DescriptionPoster<'a> {
    api: &'a dyn PullRequestApi,
    target: PrTarget,
}

#[async_trait]
impl Poster for CommentPoster<'_> {
    fn mode(&self) -> PostingMode {
        PostingMode::Comment
    }

    async fn deliver(&self, body: &str) -> Result<(), ReviewError> {
        self.api.create_issue_comment(&self.target, body).await
    }
}

#[async_trait]
impl Poster for ReviewPoster<'_> {
    fn mode(&self) -> PostingMode {
        PostingMode::Review
    }

    async fn deliver(&self, body: &str) -> Result<(), ReviewError> {
        self.api.create_review(&self.target, body).await
    }
}

#[async_trait]
impl Poster for DescriptionPoster<'_> {
    fn mode(&self) -> PostingMode {
        PostingMode::PrDescription
    }

    async fn deliver(&self, body: &str) -> Result<(), ReviewError> {
        let existing = self.api.pull_request_body(&self.target).await?;
        let updated = upsert_section(existing.as_deref(), body);
        debug!(target_pr = %self.target, "updating description section");
        self.api
            .update_pull_request_body(&self.target, &updated)
            .await
    }
}

/// Pick the strategy for `mode`, bound to `target`.
pub fn select_poster<'a>(
    mode: PostingMode,
    api: &'a dyn PullRequestApi,
    target: PrTarget,
) -> Box<dyn Poster + 'a> {
    match mode {
        PostingMode::Comment => Box::new(CommentPoster { api, target }),
        PostingMode::Review => Box::new(ReviewPoster { api, target }),
        PostingMode::PrDescription => Box::new(DescriptionPoster { api, target }),
    }
}

/// Render the managed section holding `body`.
pub fn render_section(body: &str) -> String {
    format!("{SECTION_START}\n\n## 🤖 AI Review\n\n{body}\n\n{SECTION_END}")
}

/// Insert or replace the managed section of a PR description.
///
/// When both markers are present with the start before the end, the first
/// such span is replaced in place. Otherwise the section is appended after
/// a blank line and the result is trimmed.
///
/// # Examples
///
/// ```
/// use diffward_review::poster::upsert_section;
///
/// let once = upsert_section(Some("Adds caching."), "LGTM");
/// assert!(once.starts_with("Adds caching.\n\n<!-- ai-pr-review: start -->"));
/// let twice = upsert_section(Some(&once), "Still LGTM");
/// assert_eq!(twice.matches("ai-pr-review: start").count(), 1);
/// assert!(twice.contains("Still LGTM") && !twice.contains("\nLGTM\n"));
/// ```
pub fn upsert_section(existing: Option<&str>, body: &str) -> String {
    let existing = existing.unwrap_or("");
    let section = render_section(body);

    if let Some(start) = existing.find(SECTION_START) {
        if let Some(rel_end) = existing[start..].find(SECTION_END) {
            let end = start + rel_end + SECTION_END.len();
            return format!("{}{section}{}", &existing[..start], &existing[end..]);
        }
    }

    format!("{existing}\n\n{section}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use diffward_core::{ChangedFile, RepoRef};

    use super::*;

    #[derive(Default)]
    struct RecordingApi {
        description: Mutex<Option<String>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PullRequestApi for RecordingApi {
        async fn list_changed_files(&self, _: &PrTarget) -> Result<Vec<ChangedFile>, ReviewError> {
            Ok(Vec::new())
        }

        async fn create_issue_comment(&self, t: &PrTarget, body: &str) -> Result<(), ReviewError> {
            self.calls.lock().unwrap().push(format!("comment {t}: {body}"));
            Ok(())
        }

        async fn create_review(&self, t: &PrTarget, body: &str) -> Result<(), ReviewError> {
            self.calls.lock().unwrap().push(format!("review {t}: {body}"));
            Ok(())
        }

        async fn pull_request_body(&self, _: &PrTarget) -> Result<Option<String>, ReviewError> {
            Ok(self.description.lock().unwrap().clone())
        }

        async fn update_pull_request_body(
            &self,
            t: &PrTarget,
            body: &str,
        ) -> Result<(), ReviewError> {
            self.calls.lock().unwrap().push(format!("describe {t}"));
            *self.description.lock().unwrap() = Some(body.to_string());
            Ok(())
        }
    }

    fn target() -> PrTarget {
        PrTarget {
            repo: RepoRef {
                owner: "octo".into(),
                name: "app".into(),
            },
            number: 3,
        }
    }

    #[test]
    fn appends_to_empty_or_missing_description() {
        let expected = render_section("body");
        assert_eq!(upsert_section(None, "body"), expected);
        assert_eq!(upsert_section(Some(""), "body"), expected);
    }

    #[test]
    fn replaces_only_the_first_span() {
        let existing = format!(
            "intro\n{}\ntrailer\n{}",
            render_section("old"),
            render_section("older")
        );
        let updated = upsert_section(Some(&existing), "new");
        assert!(updated.starts_with(&format!("intro\n{}", render_section("new"))));
        assert!(updated.contains("\ntrailer\n"));
        assert!(updated.contains("older"));
        assert!(!updated.contains("\n\nold\n\n"));
    }

    #[test]
    fn upsert_is_idempotent() {
        let once = upsert_section(Some("Description"), "review");
        let twice = upsert_section(Some(&once), "review");
        assert_eq!(once, twice);
        assert_eq!(twice.matches(SECTION_START).count(), 1);
        assert_eq!(twice.matches(SECTION_END).count(), 1);
    }

    #[test]
    fn misordered_markers_append_a_new_section() {
        let existing = format!("{SECTION_END} text {SECTION_START}");
        let updated = upsert_section(Some(&existing), "r");
        assert_eq!(updated, format!("{existing}\n\n{}", render_section("r")));
    }

    #[test]
    fn lone_start_marker_appends() {
        let existing = format!("notes {SECTION_START}");
        let updated = upsert_section(Some(&existing), "r");
        assert!(updated.ends_with(&render_section("r")));
        assert!(updated.starts_with(&existing));
    }

    #[tokio::test]
    async fn strategies_route_to_the_matching_call() {
        let api = RecordingApi::default();
        for mode in [PostingMode::Comment, PostingMode::Review] {
            let poster = select_poster(mode, &api, target());
            assert_eq!(poster.mode(), mode);
            poster.deliver("hello").await.unwrap();
        }
        assert_eq!(
            api.calls.lock().unwrap().as_slice(),
            ["comment octo/app#3: hello", "review octo/app#3: hello"]
        );
    }

    #[tokio::test]
    async fn description_poster_upserts_twice_to_one_section() {
        let api = RecordingApi {
            description: Mutex::new(Some("Fixes #1".into())),
            ..RecordingApi::default()
        };
        let poster = select_poster(PostingMode::PrDescription, &api, target());
        poster.deliver("first").await.unwrap();
        poster.deliver("second").await.unwrap();

        let description = api.description.lock().unwrap().clone().unwrap();
        assert!(description.starts_with("Fixes #1\n\n"));
        assert_eq!(description.matches(SECTION_START).count(), 1);
        assert!(description.contains("second"));
        assert!(!description.contains("first"));
    }
}
