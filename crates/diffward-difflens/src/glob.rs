//! Restricted glob dialect for include/exclude filters.
//!
//! The grammar is deliberately small and is part of the input contract:
//!
//! - `**` matches any run of characters, `/` included
//! - `*` matches any run of characters except `/`
//! - every other character matches itself (no `?`, no `[...]`, no `{a,b}`)
//!
//! Patterns are anchored at both ends. Callers needing alternation supply
//! several comma-separated patterns instead of braces.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(Vec<char>),
    /// `*`: stays inside one path segment.
    Star,
    /// `**`: crosses segment boundaries.
    DoubleStar,
}

/// A compiled glob pattern.
///
/// # Examples
///
/// ```
/// use diffward_difflens::glob::GlobPattern;
///
/// let pat = GlobPattern::compile("**/*.js");
/// assert!(pat.matches("a/b/c.js"));
/// assert!(!pat.matches("index.js"));
///
/// let pat = GlobPattern::compile("src/*/test.js");
/// assert!(pat.matches("src/mod/test.js"));
/// assert!(!pat.matches("src/a/b/test.js"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    source: String,
    tokens: Vec<Token>,
}

impl GlobPattern {
    /// Compile `pattern`. Every string is a valid pattern.
    pub fn compile(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = Vec::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '*' {
                literal.push(c);
                continue;
            }
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            if chars.peek() == Some(&'*') {
                chars.next();
                tokens.push(Token::DoubleStar);
            } else {
                tokens.push(Token::Star);
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self {
            source: pattern.to_string(),
            tokens,
        }
    }

    /// The pattern text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the whole of `text` matches.
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let n = text.len();

        // reachable[p]: the tokens consumed so far can end at text position p
        let mut reachable = vec![false; n + 1];
        reachable[0] = true;

        for token in &self.tokens {
            let mut next = vec![false; n + 1];
            match token {
                Token::Literal(lit) => {
                    for p in (0..=n).filter(|&p| reachable[p]) {
                        let end = p + lit.len();
                        if end <= n && text[p..end] == lit[..] {
                            next[end] = true;
                        }
                    }
                }
                Token::Star => {
                    for p in 0..=n {
                        if !reachable[p] {
                            continue;
                        }
                        next[p] = true;
                        for q in p..n {
                            if text[q] == '/' {
                                break;
                            }
                            next[q + 1] = true;
                        }
                    }
                }
                Token::DoubleStar => {
                    if let Some(first) = reachable.iter().position(|&r| r) {
                        next[first..].iter_mut().for_each(|r| *r = true);
                    }
                }
            }
            if !next.contains(&true) {
                return false;
            }
            reachable = next;
        }

        reachable[n]
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split a comma-separated pattern list, trimming entries and dropping empty
/// ones.
///
/// # Examples
///
/// ```
/// use diffward_difflens::glob::split_patterns;
///
/// assert_eq!(split_patterns("a,b, c , ,d"), vec!["a", "b", "c", "d"]);
/// assert!(split_patterns("").is_empty());
/// ```
pub fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// An ordered set of compiled patterns. Never contains an empty pattern.
///
/// # Examples
///
/// ```
/// use diffward_difflens::glob::PatternSet;
///
/// let set = PatternSet::parse(Some("*.md, docs/**"));
/// assert_eq!(set.len(), 2);
/// assert!(set.any_match("docs/guide/intro.txt"));
/// assert!(!PatternSet::parse(None).any_match("anything"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<GlobPattern>,
}

impl PatternSet {
    /// Parse a raw comma-separated list. `None` yields an empty set.
    pub fn parse(raw: Option<&str>) -> Self {
        let patterns = raw
            .map(split_patterns)
            .unwrap_or_default()
            .iter()
            .map(|p| GlobPattern::compile(p))
            .collect();
        Self { patterns }
    }

    /// Whether the set holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Iterate patterns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &GlobPattern> {
        self.patterns.iter()
    }

    /// The first pattern accepting `text`, if any.
    pub fn first_match(&self, text: &str) -> Option<&GlobPattern> {
        self.patterns.iter().find(|p| p.matches(text))
    }

    /// True iff the set is non-empty and some pattern accepts `text`.
    pub fn any_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }
}
