use diffward_core::{parse_leading_int, NoticeSink};

/// Default character budget for the concatenated diff.
pub const MAX_CHARS_DEFAULT: usize = 120_000;
/// Smallest accepted budget.
pub const MAX_CHARS_MIN: usize = 10_000;
/// Largest accepted budget.
pub const MAX_CHARS_MAX: usize = 300_000;

/// Default value and bounds used when normalizing a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetLimits {
    /// Returned for missing, unparseable or non-positive input.
    pub default: usize,
    /// Lower clamp.
    pub min: usize,
    /// Upper clamp.
    pub max: usize,
}

impl Default for BudgetLimits {
    fn default() -> Self {
        Self {
            default: MAX_CHARS_DEFAULT,
            min: MAX_CHARS_MIN,
            max: MAX_CHARS_MAX,
        }
    }
}

/// Normalize a raw `max_chars` input into `[10_000, 300_000]`.
///
/// Missing, unparseable and non-positive values fall back to `120_000`.
/// Clamping reports the received and clamped values to `sink`.
///
/// # Examples
///
/// ```
/// use diffward_core::SilentSink;
/// use diffward_difflens::budget::normalize_budget;
///
/// assert_eq!(normalize_budget(Some("999"), &SilentSink), 10_000);
/// assert_eq!(normalize_budget(Some("0"), &SilentSink), 120_000);
/// assert_eq!(normalize_budget(Some("300001"), &SilentSink), 300_000);
/// assert_eq!(normalize_budget(Some("15000"), &SilentSink), 15_000);
/// assert_eq!(normalize_budget(None, &SilentSink), 120_000);
/// ```
pub fn normalize_budget(raw: Option<&str>, sink: &dyn NoticeSink) -> usize {
    normalize_budget_with(raw, BudgetLimits::default(), sink)
}

/// Normalize a raw budget against custom `limits`.
pub fn normalize_budget_with(
    raw: Option<&str>,
    limits: BudgetLimits,
    sink: &dyn NoticeSink,
) -> usize {
    let Some(n) = raw.and_then(parse_leading_int).filter(|n| *n > 0) else {
        return limits.default;
    };
    let n = u64::try_from(n).unwrap_or(u64::MAX);

    if n < limits.min as u64 {
        sink.notice(&format!(
            "max_chars ({n}) below minimum {}; using minimum.",
            limits.min
        ));
        return limits.min;
    }
    if n > limits.max as u64 {
        sink.notice(&format!(
            "max_chars ({n}) above maximum {}; using maximum.",
            limits.max
        ));
        return limits.max;
    }
    // in range, so it fits in usize
    n as usize
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use diffward_core::SilentSink;

    use super::*;

    fn norm(raw: &str) -> usize {
        normalize_budget(Some(raw), &SilentSink)
    }

    #[test]
    fn default_for_missing_or_empty() {
        assert_eq!(normalize_budget(None, &SilentSink), MAX_CHARS_DEFAULT);
        assert_eq!(norm(""), MAX_CHARS_DEFAULT);
    }

    #[test]
    fn clamps_below_minimum_and_defaults_non_positive() {
        assert_eq!(norm("999"), MAX_CHARS_MIN);
        assert_eq!(norm("0"), MAX_CHARS_DEFAULT);
        assert_eq!(norm("-1"), MAX_CHARS_DEFAULT);
    }

    #[test]
    fn clamps_above_maximum() {
        assert_eq!(norm(&(MAX_CHARS_MAX + 1).to_string()), MAX_CHARS_MAX);
        assert_eq!(norm("9999999"), MAX_CHARS_MAX);
        assert_eq!(norm("99999999999999999999999999"), MAX_CHARS_MAX);
    }

    #[test]
    fn passes_through_values_within_bounds() {
        assert_eq!(norm(&MAX_CHARS_MIN.to_string()), MAX_CHARS_MIN);
        assert_eq!(norm("15000"), 15_000);
        assert_eq!(norm(&(MAX_CHARS_MAX - 1).to_string()), MAX_CHARS_MAX - 1);
        assert_eq!(norm(&MAX_CHARS_MAX.to_string()), MAX_CHARS_MAX);
    }

    #[test]
    fn parses_leading_digits_only() {
        assert_eq!(norm("abc"), MAX_CHARS_DEFAULT);
        assert_eq!(norm("50000chars"), 50_000);
        assert_eq!(norm("  20000"), 20_000);
    }

    #[test]
    fn idempotent_and_in_range() {
        for raw in ["", "1", "999", "10000", "123456", "300000", "300001", "-5", "x", "1e9"] {
            let once = norm(raw);
            assert!((MAX_CHARS_MIN..=MAX_CHARS_MAX).contains(&once), "{raw} -> {once}");
            assert_eq!(norm(&once.to_string()), once, "{raw}");
        }
    }

    #[test]
    fn clamping_is_reported() {
        let seen = RefCell::new(Vec::new());
        let sink = |msg: &str| seen.borrow_mut().push(msg.to_string());

        normalize_budget(Some("999"), &sink);
        normalize_budget(Some("400000"), &sink);
        normalize_budget(Some("50000"), &sink);
        normalize_budget(Some("0"), &sink);

        assert_eq!(
            seen.borrow().as_slice(),
            [
                "max_chars (999) below minimum 10000; using minimum.",
                "max_chars (400000) above maximum 300000; using maximum.",
            ]
        );
    }

    #[test]
    fn custom_limits() {
        let limits = BudgetLimits {
            default: 50,
            min: 10,
            max: 100,
        };
        assert_eq!(normalize_budget_with(Some("5"), limits, &SilentSink), 10);
        assert_eq!(normalize_budget_with(Some("500"), limits, &SilentSink), 100);
        assert_eq!(normalize_budget_with(None, limits, &SilentSink), 50);
    }
}
