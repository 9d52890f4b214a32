//! Pattern matching implementation.

use regex::{Regex, RegexBuilder};

/// Errors raised while compiling a search pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// A compiled search pattern: a literal prefix, a regex, or both.
///
/// Both parts are tested against the full `0x`-prefixed rendering. A pattern
/// with neither part matches every address.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    /// Literal prefix including the leading `0x`
    prefix: Option<String>,
    /// Expression anchored at position 0 of the rendering
    regex: Option<Regex>,
}

impl Pattern {
    /// Creates a pattern from an optional literal prefix and an optional regex.
    ///
    /// The regex is anchored at the start of the rendered string; it is
    /// compiled case-insensitively when `ignore_case` is set, and the prefix is
    /// lowercased to match the lowercase rendering used in that mode.
    pub fn new(
        prefix: Option<&str>,
        regex: Option<&str>,
        ignore_case: bool,
    ) -> Result<Self, PatternError> {
        let prefix = prefix.map(|p| {
            if ignore_case {
                p.to_lowercase()
            } else {
                p.to_string()
            }
        });

        let regex = regex
            .map(|r| {
                RegexBuilder::new(&format!("^(?:{})", r))
                    .case_insensitive(ignore_case)
                    .build()
            })
            .transpose()?;

        Ok(Self { prefix, regex })
    }

    /// Parses a command-line search term.
    ///
    /// One leading `0x` or `0X` is stripped. A term made only of hex digits
    /// becomes a literal prefix; anything else becomes a regex matched after
    /// the `0x`.
    /// An empty term matches everything.
    pub fn parse(term: &str, ignore_case: bool) -> Result<Self, PatternError> {
        let term = term
            .strip_prefix("0x")
            .or_else(|| term.strip_prefix("0X"))
            .unwrap_or(term);

        if term.is_empty() {
            return Ok(Self::default());
        }

        if term.chars().all(|c| c.is_ascii_hexdigit()) {
            Self::new(Some(&format!("0x{}", term)), None, ignore_case)
        } else {
            Self::new(None, Some(&format!("0x(?:{})", term)), ignore_case)
        }
    }

    /// Returns the literal prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the anchored regex source, if any.
    pub fn regex(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }

    /// Tests a rendered `0x...` address string.
    #[inline]
    pub fn matches(&self, rendered: &str) -> bool {
        if let Some(prefix) = &self.prefix {
            if !rendered.starts_with(prefix.as_str()) {
                return false;
            }
        }

        match &self.regex {
            Some(regex) => regex.is_match(rendered),
            None => true,
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.prefix(), self.regex()) {
            (Some(p), Some(r)) => write!(f, "prefix {} + regex {}", p, r),
            (Some(p), None) => write!(f, "prefix {}", p),
            (None, Some(r)) => write!(f, "regex {}", r),
            (None, None) => write!(f, "any"),
        }
    }
}
