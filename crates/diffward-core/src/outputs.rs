use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::error::ReviewError;

/// Name of the run output holding the final review text.
pub const REVIEW_BODY_OUTPUT: &str = "review_body";

const DELIMITER: &str = "DIFFWARD_EOF";

/// Run outputs and the failure signal, in GitHub Actions workflow-command
/// format.
///
/// # Examples
///
/// ```
/// use diffward_core::ActionOutputs;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("out");
/// let outputs = ActionOutputs::to_file(&path);
/// outputs.set("review_body", "line one\nline two").unwrap();
/// let written = std::fs::read_to_string(&path).unwrap();
/// assert!(written.starts_with("review_body<<"));
/// assert!(written.contains("line one\nline two\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActionOutputs {
    path: Option<PathBuf>,
}

impl ActionOutputs {
    /// Use the file named by `GITHUB_OUTPUT`, or stdout when unset.
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os("GITHUB_OUTPUT")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Append outputs to `path`.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Record a named output. Multi-line values use the heredoc form.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Io`] if the output file cannot be written.
    pub fn set(&self, name: &str, value: &str) -> Result<(), ReviewError> {
        match &self.path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                let delimiter = unique_delimiter(value);
                writeln!(file, "{name}<<{delimiter}")?;
                writeln!(file, "{value}")?;
                writeln!(file, "{delimiter}")?;
                Ok(())
            }
            None => {
                println!("{name}:\n{value}");
                Ok(())
            }
        }
    }

    /// Signal a fatal failure with `message`.
    pub fn set_failed(&self, message: &str) {
        println!("{}", failure_command(message));
    }
}

/// Format the `::error::` workflow command for `message`.
///
/// # Examples
///
/// ```
/// use diffward_core::outputs::failure_command;
///
/// assert_eq!(failure_command("a\nb"), "::error::a%0Ab");
/// ```
pub fn failure_command(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}

fn unique_delimiter(value: &str) -> String {
    let mut delimiter = DELIMITER.to_string();
    while value.lines().any(|l| l == delimiter) {
        delimiter.push('_');
    }
    delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_append_rather_than_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "earlier=1\n").unwrap();

        let outputs = ActionOutputs::to_file(&path);
        outputs.set(REVIEW_BODY_OUTPUT, "No diff content to review.").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "earlier=1\nreview_body<<DIFFWARD_EOF\nNo diff content to review.\nDIFFWARD_EOF\n"
        );
    }

    #[test]
    fn delimiter_avoids_collisions_with_value() {
        assert_eq!(unique_delimiter("x\nDIFFWARD_EOF\ny"), "DIFFWARD_EOF_");
        assert_eq!(unique_delimiter("plain"), "DIFFWARD_EOF");
    }

    #[test]
    fn failure_command_escapes_percent() {
        assert_eq!(failure_command("100% broken"), "::error::100%25 broken");
    }
}
