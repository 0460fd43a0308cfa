use diffward_core::{CategoryStyle, ModelName, NoticeSink, PostingMode, RawInputs, ReviewError};
use diffward_difflens::budget::normalize_budget;

/// Error text when the model must be called but no key is available.
pub const MISSING_API_KEY: &str =
    "Missing OpenAI API key: provide 'openai_api_key' input or set OPENAI_API_KEY env var";

/// Validated settings for one review run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSettings {
    /// Chat model sent with the completion request.
    pub model: ModelName,
    /// Phrasing of the system prompt categories.
    pub category_style: CategoryStyle,
    /// Where the finished review is delivered.
    pub posting_mode: PostingMode,
    /// Normalized character budget.
    pub max_chars: usize,
    /// Raw comma-separated allow-list globs.
    pub include_globs: Option<String>,
    /// Raw comma-separated veto globs.
    pub exclude_globs: Option<String>,
    /// Preview only: no model call, nothing posted.
    pub dry_run: bool,
    /// Whether file-type addon rules are added to the system prompt.
    pub addons: bool,
    /// Override for the chat-completions endpoint base.
    pub api_base_url: Option<String>,
    /// Model key from the input or `OPENAI_API_KEY`. Only needed once a
    /// model call is actually made.
    pub api_key: Option<String>,
}

impl ReviewSettings {
    /// Validate merged inputs.
    ///
    /// `env_api_key` is the `OPENAI_API_KEY` fallback used when the
    /// `openai_api_key` input is unset. Budget clamping is reported to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidInput`] for a value outside an
    /// allow-list. A missing API key is not an error here.
    ///
    /// # Examples
    ///
    /// ```
    /// use diffward_core::{PostingMode, RawInputs, SilentSink};
    /// use diffward_review::settings::ReviewSettings;
    ///
    /// let raw = RawInputs { posting_mode: Some("REVIEW".into()), ..RawInputs::default() };
    /// let settings = ReviewSettings::from_inputs(&raw, Some("sk-test".into()), &SilentSink).unwrap();
    /// assert_eq!(settings.posting_mode, PostingMode::Review);
    /// assert_eq!(settings.max_chars, 120_000);
    ///
    /// let raw = RawInputs { model: Some("gpt-5".into()), ..RawInputs::default() };
    /// let err = ReviewSettings::from_inputs(&raw, Some("k".into()), &SilentSink).unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid model: gpt-5. Allowed: gpt-4.1-mini, gpt-4.1, gpt-4o-mini, gpt-4o"
    /// );
    /// ```
    pub fn from_inputs(
        raw: &RawInputs,
        env_api_key: Option<String>,
        sink: &dyn NoticeSink,
    ) -> Result<Self, ReviewError> {
        let model = parse_or_default::<ModelName>(raw.model.as_deref())?;
        let max_chars = normalize_budget(raw.max_chars.as_deref(), sink);
        let category_style = parse_or_default::<CategoryStyle>(raw.category_style.as_deref())?;
        let posting_mode = parse_or_default::<PostingMode>(raw.posting_mode.as_deref())?;
        let dry_run = raw.dry_run_enabled();
        let addons = !raw
            .addons
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("false"));

        let api_key = raw
            .openai_api_key
            .clone()
            .or(env_api_key)
            .filter(|k| !k.is_empty());
        Ok(Self {
            model,
            category_style,
            posting_mode,
            max_chars,
            include_globs: raw.include_globs.clone(),
            exclude_globs: raw.exclude_globs.clone(),
            dry_run,
            addons,
            api_base_url: raw.api_base_url.clone(),
            api_key,
        })
    }
}

fn parse_or_default<T>(raw: Option<&str>) -> Result<T, ReviewError>
where
    T: std::str::FromStr<Err = ReviewError> + Default,
{
    raw.map_or_else(|| Ok(T::default()), |s| s.parse())
}

#[cfg(test)]
mod tests {
    use diffward_core::SilentSink;

    use super::*;

    fn settings(raw: RawInputs) -> Result<ReviewSettings, ReviewError> {
        ReviewSettings::from_inputs(&raw, Some("sk-env".into()), &SilentSink)
    }

    #[test]
    fn defaults_apply_when_inputs_are_absent() {
        let s = settings(RawInputs::default()).unwrap();
        assert_eq!(s.model, ModelName::Gpt41Mini);
        assert_eq!(s.category_style, CategoryStyle::Default);
        assert_eq!(s.posting_mode, PostingMode::Comment);
        assert_eq!(s.max_chars, 120_000);
        assert!(!s.dry_run);
        assert!(s.addons);
        assert_eq!(s.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn invalid_posting_mode_lists_allowed_values() {
        let err = settings(RawInputs {
            posting_mode: Some("Slack".into()),
            ..RawInputs::default()
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid posting_mode: slack. Allowed: comment, review, pr_description"
        );
    }

    #[test]
    fn invalid_style_is_rejected() {
        let err = settings(RawInputs {
            category_style: Some("lenient".into()),
            ..RawInputs::default()
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid category_style: lenient. Allowed: default, strict"
        );
    }

    #[test]
    fn input_key_wins_over_environment() {
        let s = settings(RawInputs {
            openai_api_key: Some("sk-input".into()),
            ..RawInputs::default()
        })
        .unwrap();
        assert_eq!(s.api_key.as_deref(), Some("sk-input"));
    }

    #[test]
    fn missing_key_is_not_a_configuration_error() {
        let s = ReviewSettings::from_inputs(&RawInputs::default(), None, &SilentSink).unwrap();
        assert!(!s.dry_run);
        assert!(s.api_key.is_none());

        let raw = RawInputs {
            dry_run: Some("TRUE".into()),
            ..RawInputs::default()
        };
        let s = ReviewSettings::from_inputs(&raw, None, &SilentSink).unwrap();
        assert!(s.dry_run);
        assert!(s.api_key.is_none());
    }

    #[test]
    fn dry_run_needs_literal_true() {
        for value in ["yes", "1", "on"] {
            let s = settings(RawInputs {
                dry_run: Some(value.into()),
                ..RawInputs::default()
            })
            .unwrap();
            assert!(!s.dry_run, "{value}");
        }
    }

    #[test]
    fn only_false_disables_addons() {
        let with = |v: &str| {
            settings(RawInputs {
                addons: Some(v.into()),
                ..RawInputs::default()
            })
            .unwrap()
            .addons
        };
        assert!(!with("false"));
        assert!(!with("FALSE"));
        assert!(with("true"));
        assert!(with("no"));
    }

    #[test]
    fn budget_is_normalized() {
        let s = settings(RawInputs {
            max_chars: Some("5".into()),
            ..RawInputs::default()
        })
        .unwrap();
        assert_eq!(s.max_chars, 10_000);
    }
}
