//! Review guidance blocks activated by the kinds of files in a pull request.

use std::fmt;

/// A named block of review rules appended to the system prompt.
///
/// Variants are declared in activation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Addon {
    /// Engineering standards that apply to every change.
    General,
    /// JavaScript and TypeScript sources or package manifests.
    JavaScriptTypeScript,
    /// JSX/TSX components.
    React,
    /// Python sources or packaging files.
    Python,
    /// Rust sources or Cargo manifests.
    Rust,
    /// Go sources or modules.
    Go,
    /// GitHub Actions workflow definitions.
    GitHubActions,
}

impl Addon {
    /// Every addon, in priority order.
    pub const ALL: [Addon; 7] = [
        Addon::General,
        Addon::JavaScriptTypeScript,
        Addon::React,
        Addon::Python,
        Addon::Rust,
        Addon::Go,
        Addon::GitHubActions,
    ];

    /// Short identifier used in logs and previews.
    pub fn name(self) -> &'static str {
        match self {
            Addon::General => "general",
            Addon::JavaScriptTypeScript => "javascript-typescript",
            Addon::React => "react",
            Addon::Python => "python",
            Addon::Rust => "rust",
            Addon::Go => "go",
            Addon::GitHubActions => "github-actions",
        }
    }

    /// Whether `path` is a signal for this addon. `General` matches nothing;
    /// it is always active.
    pub fn detects(self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match self {
            Addon::General => false,
            Addon::JavaScriptTypeScript => {
                matches!(ext.as_str(), "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx")
                    || matches!(file_name, "package.json" | "tsconfig.json")
            }
            Addon::React => matches!(ext.as_str(), "jsx" | "tsx"),
            Addon::Python => {
                matches!(ext.as_str(), "py" | "pyi")
                    || matches!(file_name, "pyproject.toml" | "requirements.txt" | "setup.cfg")
            }
            Addon::Rust => ext == "rs" || file_name == "Cargo.toml",
            Addon::Go => ext == "go" || file_name == "go.mod",
            Addon::GitHubActions => {
                path.starts_with(".github/workflows/") && matches!(ext.as_str(), "yml" | "yaml")
            }
        }
    }

    /// Rule text for this addon.
    pub fn rules(self) -> &'static str {
        match self {
            Addon::General => GENERAL_RULES,
            Addon::JavaScriptTypeScript => JS_TS_RULES,
            Addon::React => REACT_RULES,
            Addon::Python => PYTHON_RULES,
            Addon::Rust => RUST_RULES,
            Addon::Go => GO_RULES,
            Addon::GitHubActions => GITHUB_ACTIONS_RULES,
        }
    }
}

impl fmt::Display for Addon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const GENERAL_RULES: &str = "\
General engineering standards:
- Flag duplicated logic that should be shared (DRY).
- Prefer the simplest design that solves the problem; call out speculative abstraction.
- Check single responsibility and clear boundaries between modules (SOLID).
- Errors must be handled or propagated, never silently swallowed.
- New behavior should come with tests; point out missing edge cases.
- Never commit secrets, tokens, or credentials.";

const JS_TS_RULES: &str = "\
JavaScript/TypeScript rules:
- Avoid `any` and unchecked type assertions; prefer narrow types.
- Use strict equality (`===`), `const` by default, `let` only when reassigned.
- Every promise is awaited or returned; no floating promises.
- Do not mix CommonJS and ES module syntax in one package.";

const REACT_RULES: &str = "\
React rules:
- Hooks are called unconditionally at the top level of components.
- Effect dependency arrays list every value the effect reads.
- List items carry stable keys, never array indexes for reorderable data.
- Keep components presentational where possible; lift side effects into hooks.";

const PYTHON_RULES: &str = "\
Python rules:
- Public functions have type hints; avoid bare `except:`.
- No mutable default arguments.
- Use context managers for files, locks, and connections.
- Follow PEP 8 naming; keep modules import-side-effect free.";

const RUST_RULES: &str = "\
Rust rules:
- No `unwrap()`/`expect()` on fallible paths in library code; propagate with `?`.
- Every `unsafe` block states the invariant it relies on.
- Prefer borrowing over cloning; flag needless allocations in hot paths.
- Public items are documented; errors implement `std::error::Error`.";

const GO_RULES: &str = "\
Go rules:
- Every returned error is checked or explicitly discarded with a reason.
- Wrap errors with context (`fmt.Errorf(\"...: %w\", err)`).
- Goroutines have a clear owner and exit path; pass `context.Context` first.
- Avoid package-level mutable state.";

const GITHUB_ACTIONS_RULES: &str = "\
GitHub Actions rules:
- Pin third-party actions to a full commit SHA.
- Declare the minimal `permissions:` the workflow needs.
- Never interpolate untrusted event fields directly into `run:` scripts.
- Secrets are passed through `env:`, not command-line arguments.";

/// Choose the addons activated by `paths`.
///
/// `General` always comes first; specific addons follow in their fixed
/// priority order, each at most once.
///
/// # Examples
///
/// ```
/// use diffward_review::addons::{select_addons, Addon};
///
/// let addons = select_addons(["web/App.tsx", "server/main.rs"]);
/// assert_eq!(
///     addons,
///     vec![Addon::General, Addon::JavaScriptTypeScript, Addon::React, Addon::Rust]
/// );
/// assert_eq!(select_addons(Vec::<&str>::new()), vec![Addon::General]);
/// ```
pub fn select_addons<I, S>(paths: I) -> Vec<Addon>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut active = [false; Addon::ALL.len()];
    active[0] = true;
    for path in paths {
        let path = path.as_ref();
        for (slot, addon) in active.iter_mut().zip(Addon::ALL) {
            if !*slot && addon.detects(path) {
                *slot = true;
            }
        }
    }
    Addon::ALL
        .into_iter()
        .zip(active)
        .filter_map(|(addon, on)| on.then_some(addon))
        .collect()
}

/// Join the rule blocks of `addons`, separated by blank lines.
///
/// # Examples
///
/// ```
/// use diffward_review::addons::{render_addons, Addon};
///
/// let text = render_addons(&[Addon::General, Addon::Go]);
/// assert!(text.starts_with("General engineering standards:"));
/// assert!(text.contains("\n\nGo rules:"));
/// assert_eq!(render_addons(&[]), "");
/// ```
pub fn render_addons(addons: &[Addon]) -> String {
    addons
        .iter()
        .map(|a| a.rules())
        .collect::<Vec<_>>()
        .join("\n\n")
}
