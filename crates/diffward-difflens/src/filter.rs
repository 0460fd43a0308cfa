//! Include/exclude filtering of changed files before they reach the LLM.
//!
//! Omitting include patterns means "everything not excluded"; supplying them
//! narrows the review to an allow-list. Exclude patterns are always a hard
//! veto, even for files an include pattern also accepts.

use diffward_core::{ChangedFile, NoticeSink};

use crate::glob::PatternSet;

/// Compiled include/exclude rules.
///
/// # Examples
///
/// ```
/// use diffward_difflens::filter::FileFilter;
///
/// let filter = FileFilter::new(Some("src/**"), Some("**/*.snap"));
/// assert!(filter.check("src/lib.rs").is_none());
/// assert!(filter.check("src/__snapshots__/a.snap").is_some());
/// assert!(filter.check("README.md").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: PatternSet,
    exclude: PatternSet,
}

impl FileFilter {
    /// Build a filter from the raw comma-separated pattern inputs.
    pub fn new(include_raw: Option<&str>, exclude_raw: Option<&str>) -> Self {
        Self {
            include: PatternSet::parse(include_raw),
            exclude: PatternSet::parse(exclude_raw),
        }
    }

    /// Return why `filename` would be skipped, or `None` to keep it.
    pub fn check(&self, filename: &str) -> Option<SkipReason> {
        if let Some(pattern) = self.exclude.first_match(filename) {
            return Some(SkipReason::Excluded(pattern.to_string()));
        }
        if !self.include.is_empty() && !self.include.any_match(filename) {
            return Some(SkipReason::NotIncluded);
        }
        None
    }

    /// Split `files` into kept and skipped entries, preserving input order.
    ///
    /// Each skip is reported to `sink`.
    pub fn apply<'a>(&self, files: &'a [ChangedFile], sink: &dyn NoticeSink) -> FilterResult<'a> {
        let mut kept = Vec::new();
        let mut skipped = Vec::new();

        for file in files {
            match self.check(&file.filename) {
                None => kept.push(file),
                Some(reason) => {
                    sink.notice(&format!("skipping {} ({reason})", file.filename));
                    skipped.push(SkippedFile {
                        filename: file.filename.clone(),
                        reason,
                    });
                }
            }
        }

        FilterResult { kept, skipped }
    }
}

/// Filter `files` by raw include/exclude pattern lists.
///
/// # Examples
///
/// ```
/// use diffward_core::{ChangedFile, SilentSink};
/// use diffward_difflens::filter::filter_files;
///
/// let files = vec![
///     ChangedFile::without_patch("index.js"),
///     ChangedFile::without_patch("README.md"),
/// ];
/// let result = filter_files(&files, Some("*.js"), Some(""), &SilentSink);
/// let names: Vec<&str> = result.kept.iter().map(|f| f.filename.as_str()).collect();
/// assert_eq!(names, ["index.js"]);
/// ```
pub fn filter_files<'a>(
    files: &'a [ChangedFile],
    include_raw: Option<&str>,
    exclude_raw: Option<&str>,
    sink: &dyn NoticeSink,
) -> FilterResult<'a> {
    FileFilter::new(include_raw, exclude_raw).apply(files, sink)
}

/// Result of filtering changed files.
#[derive(Debug, Clone)]
pub struct FilterResult<'a> {
    /// Files that passed the filter, borrowed from the input in input order.
    pub kept: Vec<&'a ChangedFile>,
    /// Files that were skipped with reasons.
    pub skipped: Vec<SkippedFile>,
}

/// A file that was skipped during filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Path of the skipped file.
    pub filename: String,
    /// Why the file was skipped.
    pub reason: SkipReason,
}

/// Reason a file was skipped.
///
/// # Examples
///
/// ```
/// use diffward_difflens::filter::SkipReason;
///
/// let reason = SkipReason::Excluded("**/*.lock".into());
/// assert_eq!(reason.to_string(), "excluded by **/*.lock");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Matched the named exclude pattern.
    Excluded(String),
    /// Include patterns were given and none matched.
    NotIncluded,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Excluded(pat) => write!(f, "excluded by {pat}"),
            SkipReason::NotIncluded => write!(f, "not matched by include patterns"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use diffward_core::SilentSink;

    use super::*;

    fn files() -> Vec<ChangedFile> {
        [
            "index.js",
            "README.md",
            "src/app.ts",
            "src/utils/helpers.spec.js",
            "docs/guide.md",
        ]
        .into_iter()
        .map(ChangedFile::without_patch)
        .collect()
    }

    fn names<'a>(result: &FilterResult<'a>) -> Vec<&'a str> {
        result.kept.iter().map(|f| f.filename.as_str()).collect()
    }

    #[test]
    fn no_patterns_keeps_everything_in_order() {
        let files = files();
        let result = filter_files(&files, None, Some(""), &SilentSink);
        assert_eq!(
            names(&result),
            files.iter().map(|f| f.filename.as_str()).collect::<Vec<_>>()
        );
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn include_narrows_to_allow_list() {
        let files = files();
        let result = filter_files(&files, Some("**/*.js,**/*.ts"), None, &SilentSink);
        assert_eq!(names(&result), ["src/app.ts", "src/utils/helpers.spec.js"]);
        assert!(result
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::NotIncluded));
    }

    #[test]
    fn brace_patterns_match_nothing() {
        let files = files();
        let result = filter_files(&files, Some("**/*.{js,ts}"), None, &SilentSink);
        assert!(result.kept.is_empty());
    }

    #[test]
    fn exclude_wins_over_include() {
        let files = files();
        let result = filter_files(
            &files,
            Some("**/*.js,**/*.ts"),
            Some("**/*.spec.js"),
            &SilentSink,
        );
        assert_eq!(names(&result), ["src/app.ts"]);

        let result = filter_files(&files, Some("src/**/*.js"), Some("src/utils/*.spec.js"), &SilentSink);
        assert!(result.kept.is_empty());
        assert_eq!(
            result.skipped[3].reason,
            SkipReason::Excluded("src/utils/*.spec.js".into())
        );
    }

    #[test]
    fn exclude_only_removes_matches() {
        let files = files();
        let result = filter_files(&files, None, Some("*.md, docs/**"), &SilentSink);
        assert_eq!(
            names(&result),
            ["index.js", "src/app.ts", "src/utils/helpers.spec.js"]
        );
    }

    #[test]
    fn kept_entries_borrow_from_input() {
        let files = files();
        let result = filter_files(&files, Some("index.js"), None, &SilentSink);
        assert!(std::ptr::eq(result.kept[0], &files[0]));
    }

    #[test]
    fn skips_are_reported_to_sink() {
        let files = files();
        let seen = RefCell::new(Vec::new());
        let sink = |msg: &str| seen.borrow_mut().push(msg.to_string());
        filter_files(&files, None, Some("README.md"), &sink);
        assert_eq!(
            seen.borrow().as_slice(),
            ["skipping README.md (excluded by README.md)"]
        );
    }
}
