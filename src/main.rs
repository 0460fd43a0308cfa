use std::path::{Path, PathBuf};

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use diffward_core::{
    ActionOutputs, EventContext, RawInputs, ReviewError, TracingSink, REVIEW_BODY_OUTPUT,
};
use diffward_review::github::{parse_pr_reference, GitHubClient};
use diffward_review::llm::LlmClient;
use diffward_review::pipeline::{configure, ReviewRun};

/// Input file picked up when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = ".github/diffward.toml";

#[derive(Parser)]
#[command(
    name = "diffward",
    version,
    about = "AI review assistant for GitHub pull requests",
    long_about = "Fetches the changed files of a pull request, filters them by glob, packs the\n\
                  patches into a character budget, asks a chat model for a categorized review\n\
                  and posts the result as a comment, a review, or a section of the PR description.\n\n\
                  Inputs are read from flags, then INPUT_* environment variables (GitHub Actions),\n\
                  then the TOML config file.\n\n\
                  Examples:\n  \
                    diffward                                   Run inside a pull_request workflow\n  \
                    diffward --pr octo/app#42 --dry-run        Preview locally without posting\n  \
                    diffward --posting-mode pr_description     Keep the review in the PR body"
)]
struct Cli {
    /// TOML file with input defaults (default: .github/diffward.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Repository as owner/repo (overrides GITHUB_REPOSITORY)
    #[arg(long)]
    repo: Option<String>,

    /// Pull request as owner/repo#number (overrides repository and PR number)
    #[arg(long)]
    pr: Option<String>,

    /// Chat model: gpt-4.1-mini, gpt-4.1, gpt-4o-mini or gpt-4o
    #[arg(long)]
    model: Option<String>,

    /// Review category style: default or strict
    #[arg(long)]
    category_style: Option<String>,

    /// Where to post: comment, review or pr_description
    #[arg(long)]
    posting_mode: Option<String>,

    /// Character budget for the diff (clamped to 10000..=300000)
    #[arg(long)]
    max_chars: Option<String>,

    /// Comma-separated globs a file must match to be reviewed
    #[arg(long)]
    include_globs: Option<String>,

    /// Comma-separated globs that exclude a file
    #[arg(long)]
    exclude_globs: Option<String>,

    /// Preview the review without calling the model or posting
    #[arg(long)]
    dry_run: bool,

    /// Pull request number when not running on a pull_request event
    #[arg(long)]
    pr_number: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long)]
    api_base_url: Option<String>,

    /// Do not append file-type addon rules to the prompt
    #[arg(long)]
    no_addons: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn inputs(&self) -> RawInputs {
        RawInputs {
            model: self.model.clone(),
            category_style: self.category_style.clone(),
            posting_mode: self.posting_mode.clone(),
            max_chars: self.max_chars.clone(),
            include_globs: self.include_globs.clone(),
            exclude_globs: self.exclude_globs.clone(),
            dry_run: self.dry_run.then(|| "true".to_string()),
            pr_number: self.pr_number.clone(),
            openai_api_key: None,
            api_base_url: self.api_base_url.clone(),
            addons: self.no_addons.then(|| "false".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outputs = ActionOutputs::from_env();
    if let Err(e) = run(&cli, &outputs).await {
        outputs.set_failed(&e.to_string());
        return Err(e.into());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Merge the config file, action inputs and flags, in increasing priority.
fn load_inputs(cli: &Cli) -> Result<RawInputs, ReviewError> {
    let file = match &cli.config {
        Some(path) => RawInputs::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                debug!(path = DEFAULT_CONFIG_PATH, "loading config file");
                RawInputs::from_file(default_path)?
            } else {
                RawInputs::default()
            }
        }
    };
    let action = RawInputs::from_action_env(|key| std::env::var(key).ok());
    Ok(file.merge(action).merge(cli.inputs()))
}

fn load_context(cli: &Cli) -> Result<EventContext, ReviewError> {
    let mut context = EventContext::from_env()?;
    if let Some(repo) = &cli.repo {
        context.repo = Some(repo.parse()?);
    }
    if let Some(pr) = &cli.pr {
        let target = parse_pr_reference(pr)?;
        context.repo = Some(target.repo);
        context.pull_request_number = Some(target.number);
    }
    Ok(context)
}

async fn run(cli: &Cli, outputs: &ActionOutputs) -> Result<(), ReviewError> {
    let raw = load_inputs(cli)?;
    let context = load_context(cli)?;
    let token = std::env::var("GITHUB_TOKEN").ok();
    let env_api_key = std::env::var("OPENAI_API_KEY").ok();

    let Some((settings, target)) =
        configure(&raw, token.as_deref(), env_api_key, &context, &TracingSink)?
    else {
        return Ok(());
    };

    let github = GitHubClient::new(token.as_deref().unwrap_or_default())?;
    let review = ReviewRun::new(&settings, target, &github, &TracingSink);
    let report = match settings.api_key.as_deref() {
        Some(key) if !settings.dry_run => {
            let llm = LlmClient::new(settings.model, key, settings.api_base_url.as_deref())?;
            review.with_model(&llm).run().await?
        }
        _ => review.run().await?,
    };

    outputs.set(REVIEW_BODY_OUTPUT, &report.body)
}
