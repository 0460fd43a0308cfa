use std::fmt;

use diffward_core::{EventContext, NoticeSink, PrTarget, RawInputs, ReviewError};
use diffward_difflens::chunker::chunk_diffs;
use diffward_difflens::filter::filter_files;
use tracing::{debug, info, warn};

use crate::addons::{select_addons, Addon};
use crate::github::PullRequestApi;
use crate::llm::ChatModel;
use crate::poster::select_poster;
use crate::prompt::PromptBundle;
use crate::settings::{ReviewSettings, MISSING_API_KEY};

/// Result text when no file carries reviewable diff content.
pub const NO_DIFF_MESSAGE: &str = "No diff content to review.";
/// Result text when the model answers with nothing.
pub const NO_ISSUES_MESSAGE: &str = "No issues found.";
/// Result text when the model call fails.
pub const MODEL_FAILURE_MESSAGE: &str = "The AI review failed to run. Please check action logs.";
/// Characters of diff text included in a dry-run preview.
pub const PREVIEW_CHARS: usize = 2000;

/// Stages a review run moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Inputs not yet validated.
    Init,
    /// Settings validated and pull request resolved.
    Configured,
    /// Changed files listed.
    FilesFetched,
    /// Nothing reviewable survived filtering and chunking.
    NoDiff,
    /// Prompts composed.
    Prepared,
    /// Preview produced instead of a model call.
    DryRunPreview,
    /// Model answered, or its failure was replaced by the fallback text.
    ModelInvoked,
    /// Review delivered to the pull request.
    Posted,
    /// Run finished or skipped.
    Done,
    /// Run ended with an error.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Configured => "configured",
            Stage::FilesFetched => "files_fetched",
            Stage::NoDiff => "no_diff",
            Stage::Prepared => "prepared",
            Stage::DryRunPreview => "dry_run_preview",
            Stage::ModelInvoked => "model_invoked",
            Stage::Posted => "posted",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "review stage");
}

/// Summary of a finished run.
///
/// # Examples
///
/// ```
/// use diffward_review::pipeline::{RunReport, Stage};
///
/// let report = RunReport {
///     outcome: Stage::NoDiff,
///     files_fetched: 2,
///     files_kept: 1,
///     diff_chars: 0,
///     addons: vec![],
///     posted: true,
///     body: "No diff content to review.".into(),
/// };
/// assert_eq!(
///     report.to_string(),
///     "no_diff: 2 files fetched, 1 kept, 0 diff chars, posted"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Last branch-deciding stage: `NoDiff`, `DryRunPreview` or `Posted`.
    pub outcome: Stage,
    /// Files listed for the pull request before filtering.
    pub files_fetched: usize,
    /// Files left after include/exclude filtering.
    pub files_kept: usize,
    /// Length of the chunked diff text in characters.
    pub diff_chars: usize,
    /// Addon rule blocks appended to the system prompt.
    pub addons: Vec<Addon>,
    /// Whether anything was published to the pull request.
    pub posted: bool,
    /// Final review text, also exposed as the `review_body` output.
    pub body: String,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} files fetched, {} kept, {} diff chars, {}",
            self.outcome,
            self.files_fetched,
            self.files_kept,
            self.diff_chars,
            if self.posted { "posted" } else { "not posted" }
        )
    }
}

/// Validate inputs and resolve the pull request to review.
///
/// Returns `Ok(None)` when no pull request number can be found; the run is
/// then skipped without outputs.
///
/// # Errors
///
/// Returns [`ReviewError::Config`] when `github_token` is missing or a pull
/// request is found but no repository is known. A missing model key is only
/// reported later, when the model would actually be called. Returns [`ReviewError::InvalidInput`] for a value
/// outside an allow-list.
pub fn configure(
    raw: &RawInputs,
    github_token: Option<&str>,
    env_api_key: Option<String>,
    context: &EventContext,
    sink: &dyn NoticeSink,
) -> Result<Option<(ReviewSettings, PrTarget)>, ReviewError> {
    enter(Stage::Init);
    if github_token.map_or(true, str::is_empty) {
        return Err(ReviewError::Config("Missing GITHUB_TOKEN".into()));
    }
    let settings = ReviewSettings::from_inputs(raw, env_api_key, sink)?;

    let Some(number) = context.resolve_pr_number(raw.pr_number.as_deref()) else {
        info!("No PR number found in context or input; skipping.");
        enter(Stage::Done);
        return Ok(None);
    };
    let repo = context.repo.clone().ok_or_else(|| {
        ReviewError::Config("Missing repository: set GITHUB_REPOSITORY or pass --repo".into())
    })?;

    enter(Stage::Configured);
    Ok(Some((settings, PrTarget { repo, number })))
}

/// Drives one review from changed-file listing to posting.
pub struct ReviewRun<'a> {
    settings: &'a ReviewSettings,
    target: PrTarget,
    api: &'a dyn PullRequestApi,
    model: Option<&'a dyn ChatModel>,
    sink: &'a dyn NoticeSink,
}

impl<'a> ReviewRun<'a> {
    /// Create a run without a model; only dry-run and no-diff paths can
    /// complete until [`with_model`](Self::with_model) is called.
    pub fn new(
        settings: &'a ReviewSettings,
        target: PrTarget,
        api: &'a dyn PullRequestApi,
        sink: &'a dyn NoticeSink,
    ) -> Self {
        Self {
            settings,
            target,
            api,
            model: None,
            sink,
        }
    }

    /// Attach the chat model used for the review.
    pub fn with_model(mut self, model: &'a dyn ChatModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Execute the run.
    ///
    /// Model failures are recovered with a fallback text; every other error
    /// ends the run.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::GitHub`] when listing files or posting fails,
    /// and [`ReviewError::Config`] when a model is needed but none is
    /// attached. That check runs after the no-diff and dry-run branches and
    /// before anything is posted.
    pub async fn run(&self) -> Result<RunReport, ReviewError> {
        match self.drive().await {
            Ok(report) => {
                enter(Stage::Done);
                info!(pr = %self.target, "{report}");
                Ok(report)
            }
            Err(e) => {
                enter(Stage::Failed);
                Err(e)
            }
        }
    }

    async fn drive(&self) -> Result<RunReport, ReviewError> {
        let settings = self.settings;
        let files = self.api.list_changed_files(&self.target).await?;
        enter(Stage::FilesFetched);

        let filtered = filter_files(
            &files,
            settings.include_globs.as_deref(),
            settings.exclude_globs.as_deref(),
            self.sink,
        );
        info!(
            "Fetched {} files, {} matched filters for PR #{}",
            files.len(),
            filtered.kept.len(),
            self.target.number
        );

        let patches = chunk_diffs(filtered.kept.iter().copied(), settings.max_chars);
        let mut report = RunReport {
            outcome: Stage::NoDiff,
            files_fetched: files.len(),
            files_kept: filtered.kept.len(),
            diff_chars: patches.chars().count(),
            addons: Vec::new(),
            posted: false,
            body: NO_DIFF_MESSAGE.to_string(),
        };
        let poster = select_poster(settings.posting_mode, self.api, self.target.clone());

        if patches.is_empty() {
            enter(Stage::NoDiff);
            if settings.dry_run {
                info!("DRY RUN: would post 'no diff' result");
            } else {
                poster.deliver(&report.body).await?;
                report.posted = true;
                info!("Posted 'no diff' result.");
            }
            return Ok(report);
        }

        if settings.addons {
            report.addons = select_addons(filtered.kept.iter().map(|f| f.filename.as_str()));
            debug!(addons = ?report.addons, "addons selected");
        }
        let bundle = PromptBundle::compose(
            settings.category_style,
            &report.addons,
            &self.target,
            &patches,
        );
        enter(Stage::Prepared);

        if settings.dry_run {
            report.outcome = Stage::DryRunPreview;
            report.body = self.preview(&patches);
            enter(Stage::DryRunPreview);
            info!("DRY RUN: generated preview content (not posted). Use outputs.review_body to view.");
            return Ok(report);
        }

        let model = self
            .model
            .ok_or_else(|| ReviewError::Config(MISSING_API_KEY.into()))?;
        report.body = match model.chat(bundle.messages()).await {
            Ok(text) => match text.trim() {
                "" => NO_ISSUES_MESSAGE.to_string(),
                trimmed => trimmed.to_string(),
            },
            Err(e) => {
                warn!("OpenAI call failed: {e}");
                MODEL_FAILURE_MESSAGE.to_string()
            }
        };
        enter(Stage::ModelInvoked);

        poster.deliver(&report.body).await?;
        report.outcome = Stage::Posted;
        report.posted = true;
        enter(Stage::Posted);
        Ok(report)
    }

    fn preview(&self, patches: &str) -> String {
        let truncated: String = patches.chars().take(PREVIEW_CHARS).collect();
        format!(
            "DRY RUN: Preview review for {} PR #{}\n\nSystem prompt style: {}\nModel: {}\nPosting mode: {}\n\nIncluded patches (truncated preview):\n{truncated}",
            self.target.repo,
            self.target.number,
            self.settings.category_style,
            self.settings.model,
            self.settings.posting_mode,
        )
    }
}
