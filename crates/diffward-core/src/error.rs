use std::path::PathBuf;

/// Errors that can occur across diffward.
///
/// Library crates return this type directly; the binary converts to a
/// `miette::Report` at the boundary and surfaces the message as the run's
/// failure reason.
///
/// # Examples
///
/// ```
/// use diffward_core::ReviewError;
///
/// let err = ReviewError::Config("Missing GITHUB_TOKEN".into());
/// assert_eq!(err.to_string(), "Missing GITHUB_TOKEN");
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ReviewError {
    /// Missing or unusable configuration.
    #[error("{0}")]
    #[diagnostic(code(diffward::config))]
    Config(String),

    /// An enumerated input received a value outside its allow-list.
    #[error("Invalid {name}: {value}. Allowed: {}", .allowed.join(", "))]
    #[diagnostic(
        code(diffward::invalid_input),
        help("use one of the values listed after `Allowed:`")
    )]
    InvalidInput {
        /// Input name as it appears in the action definition.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Every accepted value, in declaration order.
        allowed: Vec<&'static str>,
    },

    /// GitHub API failure.
    #[error("GitHub error: {0}")]
    #[diagnostic(code(diffward::github))]
    GitHub(String),

    /// Model API or response error.
    #[error("LLM error: {0}")]
    #[diagnostic(code(diffward::llm))]
    Llm(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
