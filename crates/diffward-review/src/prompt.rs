use diffward_core::{CategoryStyle, PrTarget};

use crate::addons::{render_addons, Addon};
use crate::llm::{ChatMessage, Role};

const DEFAULT_PREAMBLE: &str = "\
You are a senior reviewer. Provide feedback on a pull request.";

const STRICT_PREAMBLE: &str = "\
You are a senior reviewer with a strict acceptance bar. Provide feedback on a \
pull request. Treat correctness, security, data loss and broken contracts as \
blocking; anything you cannot verify from the diff must be listed as a \
question, not a finding.";

const OUTPUT_FORMAT: &str = "\
Output format with emojis:
- 📋 Summary: one short paragraph
- 🔴 Must fix (blocking)
- 🟡 Should improve (important, not blocking)
- 🔵 Nice to have (advice, style, tests, performance)
- 🧾 Standards: note DRY, SIMPLE, SOLID adherence or violations";

const DEFAULT_RULES: &str = "\
Rules:
- Be concise and actionable.
- Use bullet points for the content of each category but not for the category title.
- If no items in a category, write \"None\".
- Include code blocks only when they clarify a fix.";

const STRICT_RULES: &str = "\
Rules:
- Be concise and actionable; every item names the file it refers to.
- Use bullet points for the content of each category but not for the category title.
- If no items in a category, write \"None\".
- Anything that would fail CI, leak secrets or change public behavior without tests is \"Must fix\".
- Do not soften blocking findings; style preferences never go under \"Must fix\".
- Include code blocks only when they clarify a fix.";

/// Build the system prompt for `style`, with the rule blocks of `addons`
/// appended after a blank line.
///
/// # Examples
///
/// ```
/// use diffward_core::CategoryStyle;
/// use diffward_review::addons::Addon;
/// use diffward_review::prompt::build_system_prompt;
///
/// let prompt = build_system_prompt(CategoryStyle::Default, &[]);
/// assert!(prompt.contains("🔴 Must fix (blocking)"));
/// assert!(!prompt.contains("General engineering standards"));
///
/// let prompt = build_system_prompt(CategoryStyle::Strict, &[Addon::General]);
/// assert!(prompt.contains("strict acceptance bar"));
/// assert!(prompt.ends_with("credentials."));
/// ```
pub fn build_system_prompt(style: CategoryStyle, addons: &[Addon]) -> String {
    let (preamble, rules) = match style {
        CategoryStyle::Default => (DEFAULT_PREAMBLE, DEFAULT_RULES),
        CategoryStyle::Strict => (STRICT_PREAMBLE, STRICT_RULES),
    };
    let mut prompt = format!("{preamble}\n\n{OUTPUT_FORMAT}\n\n{rules}");
    if !addons.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(&render_addons(addons));
    }
    prompt
}

/// Build the user message carrying the pull request coordinates and the
/// chunked patches.
///
/// # Examples
///
/// ```
/// use diffward_core::{PrTarget, RepoRef};
/// use diffward_review::prompt::build_user_prompt;
///
/// let target = PrTarget { repo: "octo/app".parse::<RepoRef>().unwrap(), number: 7 };
/// assert_eq!(
///     build_user_prompt(&target, "DIFF"),
///     "Repository: octo/app\nPR #7\nChanged files and patches:\nDIFF\n"
/// );
/// ```
pub fn build_user_prompt(target: &PrTarget, patches: &str) -> String {
    format!(
        "Repository: {}\nPR #{}\nChanged files and patches:\n{patches}\n",
        target.repo, target.number
    )
}

/// The system and user messages sent to the model for one review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBundle {
    /// Instructions: role, categories, rules and addon blocks.
    pub system: String,
    /// Pull request coordinates followed by the chunked patches.
    pub user: String,
}

impl PromptBundle {
    /// Compose both prompts for `target`.
    pub fn compose(
        style: CategoryStyle,
        addons: &[Addon],
        target: &PrTarget,
        patches: &str,
    ) -> Self {
        Self {
            system: build_system_prompt(style, addons),
            user: build_user_prompt(target, patches),
        }
    }

    /// The two-message conversation: system first, then user.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: Role::System,
                content: self.system.clone(),
            },
            ChatMessage {
                role: Role::User,
                content: self.user.clone(),
            },
        ]
    }
}
