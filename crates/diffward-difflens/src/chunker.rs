use diffward_core::ChangedFile;

/// Separator placed between records in the chunked output.
const JOINER: &str = "\n";

/// Build the record emitted for one file.
///
/// # Examples
///
/// ```
/// use diffward_difflens::chunker::file_record;
///
/// assert_eq!(file_record("a.txt", "+x"), "\n---\nFile: a.txt\n+x");
/// ```
pub fn file_record(filename: &str, patch: &str) -> String {
    format!("\n---\nFile: {filename}\n{patch}")
}

/// Concatenate file patches, in order, within a character budget.
///
/// Files without diff text are skipped. The next record is appended only if
/// the total, including the line break that joins it to the previous record,
/// stays within `budget`; the first record that does not fit ends the digest
/// (later files are dropped, never truncated). Length is counted in `char`s.
///
/// Returns an empty string when nothing fits or nothing has a patch.
///
/// # Examples
///
/// ```
/// use diffward_core::ChangedFile;
/// use diffward_difflens::chunker::chunk_diffs;
///
/// let files = vec![
///     ChangedFile::new("a.txt", "aaa"),
///     ChangedFile::without_patch("logo.png"),
///     ChangedFile::new("b.txt", "bbb"),
/// ];
/// let digest = chunk_diffs(&files, 1000);
/// assert_eq!(digest, "\n---\nFile: a.txt\naaa\n\n---\nFile: b.txt\nbbb");
/// assert_eq!(chunk_diffs(&files, 5), "");
/// ```
pub fn chunk_diffs<'a, I>(files: I, budget: usize) -> String
where
    I: IntoIterator<Item = &'a ChangedFile>,
{
    let mut out = String::new();
    let mut used = 0usize;

    for file in files {
        let Some(patch) = file.patch.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let record = file_record(&file.filename, patch);
        let joiner = if out.is_empty() { "" } else { JOINER };
        let cost = joiner.chars().count() + record.chars().count();
        if used + cost > budget {
            break;
        }
        out.push_str(joiner);
        out.push_str(&record);
        used += cost;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_files() -> Vec<ChangedFile> {
        vec![ChangedFile::new("a.txt", "aaa"), ChangedFile::new("b.txt", "bbb")]
    }

    #[test]
    fn empty_when_no_files_or_patches() {
        assert_eq!(chunk_diffs(&Vec::<ChangedFile>::new(), 100), "");
        assert_eq!(chunk_diffs(&[ChangedFile::without_patch("a.txt")], 100), "");
        assert_eq!(chunk_diffs(&[ChangedFile::new("a.txt", "")], 100), "");
    }

    #[test]
    fn includes_patches_within_budget() {
        let result = chunk_diffs(&two_files(), 1000);
        assert!(result.contains("File: a.txt"));
        assert!(result.contains("aaa"));
        assert!(result.contains("File: b.txt"));
        assert!(result.contains("bbb"));
    }

    #[test]
    fn stops_before_exceeding_budget() {
        let files = two_files();
        let first_len = chunk_diffs(&files[..1], 1000).chars().count();

        let result = chunk_diffs(&files, first_len);
        assert!(result.contains("File: a.txt"));
        assert!(!result.contains("File: b.txt"));
    }

    #[test]
    fn joiner_counts_against_budget() {
        let files = two_files();
        let both = chunk_diffs(&files, 1000);
        let len = both.chars().count();

        assert_eq!(chunk_diffs(&files, len), both);
        assert!(!chunk_diffs(&files, len - 1).contains("File: b.txt"));
    }

    #[test]
    fn oversized_patch_is_omitted_not_truncated() {
        let files = vec![
            ChangedFile::new("huge.rs", "x".repeat(500)),
            ChangedFile::new("small.rs", "y"),
        ];
        assert_eq!(chunk_diffs(&files, 100), "");
    }

    #[test]
    fn cutoff_is_hard_even_if_later_files_fit() {
        let files = vec![
            ChangedFile::new("a.rs", "a"),
            ChangedFile::new("big.rs", "b".repeat(200)),
            ChangedFile::new("c.rs", "c"),
        ];
        let result = chunk_diffs(&files, 100);
        assert!(result.contains("File: a.rs"));
        assert!(!result.contains("File: c.rs"));
    }

    #[test]
    fn budget_counts_characters_not_bytes() {
        let files = vec![ChangedFile::new("ü.txt", "ééé")];
        let record = file_record("ü.txt", "ééé");
        let chars = record.chars().count();
        assert!(record.len() > chars);
        assert_eq!(chunk_diffs(&files, chars), record);
    }

    #[test]
    fn accepts_borrowed_file_lists() {
        let files = two_files();
        let refs: Vec<&ChangedFile> = files.iter().rev().collect();
        let result = chunk_diffs(refs, 1000);
        assert!(result.find("b.txt") < result.find("a.txt"));
    }
}
