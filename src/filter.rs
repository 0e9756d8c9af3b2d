use crate::config::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

static SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\^?)/").expect("valid slash regex"));

/// Compiled `ignore-exclude` suppression patterns.
///
/// Each configured fragment is expanded once, at construction, into a regex
/// matching the full value of an exclusion tag line. A `/` in a fragment
/// widens to `[/\\]` (and `^/` to `[^/\\]`) so one pattern covers both
/// path-separator conventions.
#[derive(Debug, Default)]
pub struct IgnoreFilter {
    patterns: Vec<Regex>,
}

impl IgnoreFilter {
    pub fn new(fragments: &[String]) -> Result<Self, ConfigError> {
        let mut patterns = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let widened = SLASH_RE.replace_all(fragment, r"[${1}/\\]");
            let full = format!(r"^Excluding path due to filter: (?:{widened}) => \(.*\)$");
            let regex = Regex::new(&full).map_err(|source| ConfigError::BadIgnorePattern {
                pattern: fragment.clone(),
                source,
            })?;
            patterns.push(regex);
        }
        Ok(Self { patterns })
    }

    /// True when the candidate text fully matches any suppression pattern.
    /// With no patterns configured nothing is suppressed.
    pub fn is_suppressed(&self, text: &str) -> bool {
        self.patterns.iter().any(|regex| regex.is_match(text))
    }
}
