use async_trait::async_trait;
use diffward_core::{ChangedFile, PrTarget, RepoRef, ReviewError};

/// Page size requested when listing changed files.
pub const FILES_PER_PAGE: u8 = 100;

/// The pull request operations a review run needs.
#[async_trait]
pub trait PullRequestApi: Send + Sync {
    /// Every changed file of the pull request, across all pages, in API order.
    async fn list_changed_files(&self, target: &PrTarget) -> Result<Vec<ChangedFile>, ReviewError>;

    /// Add a discussion comment to the pull request thread.
    async fn create_issue_comment(&self, target: &PrTarget, body: &str) -> Result<(), ReviewError>;

    /// Submit a review with the neutral `COMMENT` event.
    async fn create_review(&self, target: &PrTarget, body: &str) -> Result<(), ReviewError>;

    /// Current description of the pull request, if any.
    async fn pull_request_body(&self, target: &PrTarget) -> Result<Option<String>, ReviewError>;

    /// Replace the description of the pull request.
    async fn update_pull_request_body(
        &self,
        target: &PrTarget,
        body: &str,
    ) -> Result<(), ReviewError>;
}

/// GitHub REST client backed by `octocrab`.
///
/// # Examples
///
/// ```
/// use diffward_review::github::parse_pr_reference;
///
/// let target = parse_pr_reference("rust-lang/rust#12345").unwrap();
/// assert_eq!(target.repo.owner, "rust-lang");
/// assert_eq!(target.repo.name, "rust");
/// assert_eq!(target.number, 12345);
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
}

impl GitHubClient {
    /// Create a client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::GitHub`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use diffward_review::github::GitHubClient;
    ///
    /// let client = GitHubClient::new("ghp_xxxx").unwrap();
    /// ```
    pub fn new(token: &str) -> Result<Self, ReviewError> {
        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| ReviewError::GitHub(format!("failed to create GitHub client: {e}")))?;
        Ok(Self { octocrab })
    }
}

fn pulls_route(target: &PrTarget) -> String {
    format!(
        "/repos/{}/{}/pulls/{}",
        target.repo.owner, target.repo.name, target.number
    )
}

#[async_trait]
impl PullRequestApi for GitHubClient {
    async fn list_changed_files(&self, target: &PrTarget) -> Result<Vec<ChangedFile>, ReviewError> {
        let route = format!("{}/files", pulls_route(target));
        let first: octocrab::Page<ChangedFile> = self
            .octocrab
            .get(route, Some(&[("per_page", FILES_PER_PAGE)]))
            .await
            .map_err(|e| ReviewError::GitHub(format!("failed to list changed files: {e}")))?;

        self.octocrab
            .all_pages(first)
            .await
            .map_err(|e| ReviewError::GitHub(format!("failed to page changed files: {e}")))
    }

    async fn create_issue_comment(&self, target: &PrTarget, body: &str) -> Result<(), ReviewError> {
        self.octocrab
            .issues(&target.repo.owner, &target.repo.name)
            .create_comment(target.number, body)
            .await
            .map_err(|e| ReviewError::GitHub(format!("failed to post comment: {e}")))?;
        Ok(())
    }

    async fn create_review(&self, target: &PrTarget, body: &str) -> Result<(), ReviewError> {
        let route = format!("{}/reviews", pulls_route(target));
        let payload = serde_json::json!({
            "event": "COMMENT",
            "body": body,
        });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| ReviewError::GitHub(format!("failed to post review: {e}")))?;

        Ok(())
    }

    async fn pull_request_body(&self, target: &PrTarget) -> Result<Option<String>, ReviewError> {
        let pr = self
            .octocrab
            .pulls(&target.repo.owner, &target.repo.name)
            .get(target.number)
            .await
            .map_err(|e| ReviewError::GitHub(format!("failed to fetch pull request: {e}")))?;
        Ok(pr.body)
    }

    async fn update_pull_request_body(
        &self,
        target: &PrTarget,
        body: &str,
    ) -> Result<(), ReviewError> {
        let payload = serde_json::json!({ "body": body });
        let _response: serde_json::Value = self
            .octocrab
            .patch(pulls_route(target), Some(&payload))
            .await
            .map_err(|e| ReviewError::GitHub(format!("failed to update description: {e}")))?;
        Ok(())
    }
}

/// Parse a PR reference string (`owner/repo#number`).
///
/// # Errors
///
/// Returns [`ReviewError::Config`] if the format is invalid or the number
/// is zero.
///
/// # Examples
///
/// ```
/// use diffward_review::github::parse_pr_reference;
///
/// let target = parse_pr_reference("octocat/hello-world#42").unwrap();
/// assert_eq!(target.to_string(), "octocat/hello-world#42");
/// ```
pub fn parse_pr_reference(pr_ref: &str) -> Result<PrTarget, ReviewError> {
    let Some((owner_repo, number_str)) = pr_ref.split_once('#') else {
        return Err(ReviewError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        )));
    };
    let repo: RepoRef = owner_repo.parse()?;
    let number: u64 = number_str
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ReviewError::Config(format!("invalid PR number: {number_str}")))?;
    Ok(PrTarget { repo, number })
}
