use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::error::ReviewError;

/// Chat model used for the review.
///
/// # Examples
///
/// ```
/// use diffward_core::ModelName;
///
/// let model: ModelName = "gpt-4o".parse().unwrap();
/// assert_eq!(model, ModelName::Gpt4o);
/// assert_eq!(ModelName::default().as_str(), "gpt-4.1-mini");
/// assert!("gpt-3.5-turbo".parse::<ModelName>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelName {
    /// `gpt-4.1-mini` (default).
    #[default]
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
    /// `gpt-4.1`.
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    /// `gpt-4o-mini`.
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    /// `gpt-4o`.
    #[serde(rename = "gpt-4o")]
    Gpt4o,
}

impl ModelName {
    /// Every accepted model, in allow-list order.
    pub const ALL: [ModelName; 4] = [
        ModelName::Gpt41Mini,
        ModelName::Gpt41,
        ModelName::Gpt4oMini,
        ModelName::Gpt4o,
    ];

    /// Identifier sent to the chat completions API.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelName::Gpt41Mini => "gpt-4.1-mini",
            ModelName::Gpt41 => "gpt-4.1",
            ModelName::Gpt4oMini => "gpt-4o-mini",
            ModelName::Gpt4o => "gpt-4o",
        }
    }
}

/// Wording and strictness of the review categories.
///
/// # Examples
///
/// ```
/// use diffward_core::CategoryStyle;
///
/// assert_eq!("strict".parse::<CategoryStyle>().unwrap(), CategoryStyle::Strict);
/// assert_eq!(CategoryStyle::default().to_string(), "default");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStyle {
    /// Baseline phrasing.
    #[default]
    Default,
    /// Rigid acceptance criteria, same category structure.
    Strict,
}

impl CategoryStyle {
    /// Every accepted style.
    pub const ALL: [CategoryStyle; 2] = [CategoryStyle::Default, CategoryStyle::Strict];

    /// Input value for this style.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryStyle::Default => "default",
            CategoryStyle::Strict => "strict",
        }
    }
}

/// Where the review text is delivered.
///
/// Parsing is case-insensitive.
///
/// # Examples
///
/// ```
/// use diffward_core::PostingMode;
///
/// assert_eq!("PR_Description".parse::<PostingMode>().unwrap(), PostingMode::PrDescription);
/// assert_eq!(PostingMode::default(), PostingMode::Comment);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingMode {
    /// Plain discussion comment on the PR thread.
    #[default]
    Comment,
    /// Pull request review with a neutral `COMMENT` verdict.
    Review,
    /// Delimited section inside the PR description.
    PrDescription,
}

impl PostingMode {
    /// Every accepted posting mode.
    pub const ALL: [PostingMode; 3] = [
        PostingMode::Comment,
        PostingMode::Review,
        PostingMode::PrDescription,
    ];

    /// Input value for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            PostingMode::Comment => "comment",
            PostingMode::Review => "review",
            PostingMode::PrDescription => "pr_description",
        }
    }
}

macro_rules! allow_listed {
    ($ty:ty, $input:literal, $normalize:expr) => {
        impl FromStr for $ty {
            type Err = ReviewError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalize: fn(&str) -> String = $normalize;
                let wanted = normalize(s);
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ReviewError::InvalidInput {
                        name: $input,
                        value: wanted,
                        allowed: Self::ALL.iter().map(|v| v.as_str()).collect(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

allow_listed!(ModelName, "model", |s| s.to_string());
allow_listed!(CategoryStyle, "category_style", |s| s.to_string());
allow_listed!(PostingMode, "posting_mode", |s| s.to_lowercase());

/// Unvalidated review inputs, exactly as supplied by one configuration layer.
///
/// Every field is optional so layers can be merged: CLI flags over action
/// inputs (`INPUT_*` environment variables) over the TOML file. Empty strings
/// count as "not supplied", matching how GitHub Actions reports unset inputs.
///
/// # Examples
///
/// ```
/// use diffward_core::RawInputs;
///
/// let file = RawInputs::from_toml("model = \"gpt-4o\"\nmax_chars = 50000").unwrap();
/// let env = RawInputs { model: Some("gpt-4.1".into()), ..RawInputs::default() };
/// let merged = file.merge(env);
/// assert_eq!(merged.model.as_deref(), Some("gpt-4.1"));
/// assert_eq!(merged.max_chars.as_deref(), Some("50000"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawInputs {
    /// Chat model identifier.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub model: Option<String>,
    /// `default` or `strict`.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub category_style: Option<String>,
    /// `comment`, `review` or `pr_description`.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub posting_mode: Option<String>,
    /// Character budget for the concatenated diff.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub max_chars: Option<String>,
    /// Comma-separated allow-list globs.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub include_globs: Option<String>,
    /// Comma-separated veto globs.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub exclude_globs: Option<String>,
    /// `"true"` to preview without calling the model or posting.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub dry_run: Option<String>,
    /// Explicit pull request number.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub pr_number: Option<String>,
    /// Model API key (falls back to `OPENAI_API_KEY`).
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub openai_api_key: Option<String>,
    /// Base URL of an OpenAI-compatible endpoint.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub api_base_url: Option<String>,
    /// `"false"` disables language-specific addon rules.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub addons: Option<String>,
}

/// Input names recognized by [`RawInputs::from_action_env`].
pub const INPUT_NAMES: [&str; 11] = [
    "model",
    "category_style",
    "posting_mode",
    "max_chars",
    "include_globs",
    "exclude_globs",
    "dry_run",
    "pr_number",
    "openai_api_key",
    "api_base_url",
    "addons",
];

impl RawInputs {
    /// Load inputs from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Io`] if the file cannot be read, or
    /// [`ReviewError::Toml`] if the content is not valid.
    pub fn from_file(path: &Path) -> Result<Self, ReviewError> {
        if !path.exists() {
            return Err(ReviewError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse inputs from a TOML string. Keys are the input names; values may
    /// be strings, integers or booleans.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Toml`] if parsing fails or a key is unknown.
    pub fn from_toml(content: &str) -> Result<Self, ReviewError> {
        let inputs: Self = toml::from_str(content)?;
        Ok(inputs.normalized())
    }

    /// Read action inputs through `lookup`, which receives variable names such
    /// as `INPUT_MAX_CHARS`.
    ///
    /// # Examples
    ///
    /// ```
    /// use diffward_core::RawInputs;
    ///
    /// let inputs = RawInputs::from_action_env(|key| match key {
    ///     "INPUT_POSTING_MODE" => Some("review".to_string()),
    ///     "INPUT_MODEL" => Some(String::new()),
    ///     _ => None,
    /// });
    /// assert_eq!(inputs.posting_mode.as_deref(), Some("review"));
    /// assert_eq!(inputs.model, None);
    /// ```
    pub fn from_action_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("INPUT_{}", name.to_uppercase()));
        Self {
            model: get("model"),
            category_style: get("category_style"),
            posting_mode: get("posting_mode"),
            max_chars: get("max_chars"),
            include_globs: get("include_globs"),
            exclude_globs: get("exclude_globs"),
            dry_run: get("dry_run"),
            pr_number: get("pr_number"),
            openai_api_key: get("openai_api_key"),
            api_base_url: get("api_base_url"),
            addons: get("addons"),
        }
        .normalized()
    }

    /// Overlay `over` on top of `self`; supplied values in `over` win.
    pub fn merge(self, over: RawInputs) -> RawInputs {
        let over = over.normalized();
        RawInputs {
            model: over.model.or(self.model),
            category_style: over.category_style.or(self.category_style),
            posting_mode: over.posting_mode.or(self.posting_mode),
            max_chars: over.max_chars.or(self.max_chars),
            include_globs: over.include_globs.or(self.include_globs),
            exclude_globs: over.exclude_globs.or(self.exclude_globs),
            dry_run: over.dry_run.or(self.dry_run),
            pr_number: over.pr_number.or(self.pr_number),
            openai_api_key: over.openai_api_key.or(self.openai_api_key),
            api_base_url: over.api_base_url.or(self.api_base_url),
            addons: over.addons.or(self.addons),
        }
    }

    /// Whether the dry-run flag is set. Only a case-insensitive `"true"`
    /// enables it.
    pub fn dry_run_enabled(&self) -> bool {
        self.dry_run
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    fn normalized(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            model: keep(self.model),
            category_style: keep(self.category_style),
            posting_mode: keep(self.posting_mode),
            max_chars: keep(self.max_chars),
            include_globs: keep(self.include_globs),
            exclude_globs: keep(self.exclude_globs),
            dry_run: keep(self.dry_run),
            pr_number: keep(self.pr_number),
            openai_api_key: keep(self.openai_api_key),
            api_base_url: keep(self.api_base_url),
            addons: keep(self.addons),
        }
    }
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<toml::Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s)),
        Some(toml::Value::Integer(i)) => Ok(Some(i.to_string())),
        Some(toml::Value::Boolean(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, integer or boolean, found {}",
            other.type_str()
        ))),
    }
}

/// Parse the leading base-10 integer of `raw`.
///
/// Leading whitespace and one optional sign are accepted; parsing stops at
/// the first non-digit. Returns `None` when no digit follows. Values too
/// large for `i64` saturate.
///
/// # Examples
///
/// ```
/// use diffward_core::parse_leading_int;
///
/// assert_eq!(parse_leading_int(" 42px"), Some(42));
/// assert_eq!(parse_leading_int("-7"), Some(-7));
/// assert_eq!(parse_leading_int("abc"), None);
/// assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
/// ```
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let value = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_every_allowed_value() {
        for m in ModelName::ALL {
            assert_eq!(m.as_str().parse::<ModelName>().unwrap(), m);
        }
        for s in CategoryStyle::ALL {
            assert_eq!(s.as_str().parse::<CategoryStyle>().unwrap(), s);
        }
        for p in PostingMode::ALL {
            assert_eq!(p.as_str().parse::<PostingMode>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_model_names_the_allowed_set() {
        let err = "gpt-5".parse::<ModelName>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid model: gpt-5. Allowed: gpt-4.1-mini, gpt-4.1, gpt-4o-mini, gpt-4o"
        );
    }

    #[test]
    fn model_and_style_are_case_sensitive() {
        assert!("GPT-4o".parse::<ModelName>().is_err());
        assert!("Strict".parse::<CategoryStyle>().is_err());
    }

    #[test]
    fn posting_mode_error_reports_lowercased_value() {
        let err = "EMAIL".parse::<PostingMode>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid posting_mode: email. Allowed: comment, review, pr_description"
        );
    }

    #[test]
    fn toml_accepts_integers_and_booleans() {
        let inputs = RawInputs::from_toml(
            r#"
max_chars = 20000
dry_run = true
include_globs = "src/**"
"#,
        )
        .unwrap();
        assert_eq!(inputs.max_chars.as_deref(), Some("20000"));
        assert!(inputs.dry_run_enabled());
        assert_eq!(inputs.include_globs.as_deref(), Some("src/**"));
    }

    #[test]
    fn toml_rejects_unknown_keys_and_tables() {
        assert!(RawInputs::from_toml("modle = \"gpt-4o\"").is_err());
        assert!(RawInputs::from_toml("model = [\"gpt-4o\"]").is_err());
    }

    #[test]
    fn empty_strings_are_not_supplied() {
        let file = RawInputs::from_toml("model = \"gpt-4o\"").unwrap();
        let env = RawInputs {
            model: Some(String::new()),
            ..RawInputs::default()
        };
        assert_eq!(file.merge(env).model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn dry_run_only_for_true() {
        let with = |v: &str| RawInputs {
            dry_run: Some(v.into()),
            ..RawInputs::default()
        };
        assert!(with("TRUE").dry_run_enabled());
        assert!(with("true").dry_run_enabled());
        assert!(!with("yes").dry_run_enabled());
        assert!(!with("1").dry_run_enabled());
        assert!(!RawInputs::default().dry_run_enabled());
    }

    #[test]
    fn action_env_uses_uppercased_input_names() {
        let inputs = RawInputs::from_action_env(|key| {
            INPUT_NAMES
                .iter()
                .find(|n| format!("INPUT_{}", n.to_uppercase()) == key)
                .map(|n| format!("{n}-value"))
        });
        assert_eq!(inputs.exclude_globs.as_deref(), Some("exclude_globs-value"));
        assert_eq!(inputs.api_base_url.as_deref(), Some("api_base_url-value"));
    }

    #[test]
    fn leading_int_edge_cases() {
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("12.5"), Some(12));
        assert_eq!(parse_leading_int("+15000"), Some(15000));
        assert_eq!(parse_leading_int("0"), Some(0));
    }
}
