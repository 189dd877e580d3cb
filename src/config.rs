//! Site configuration: where the site lives and which links count as course content.

use regex::Regex;
use url::Url;

use crate::error::PipelineError;

/// Default site root.
pub const DEFAULT_BASE_URL: &str = "https://university.mongodb.com";

/// Connect timeout applied when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout applied when none is configured.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Href patterns that mark a wiki-article anchor as real course content.
///
/// The live site may have moved on from this list; callers can replace it.
pub const DEFAULT_COURSE_LINK_PATTERNS: &[&str] = &[
    r"wiki/M101",
    r"wiki/M102",
    r"wiki/C100",
    r"wiki/M202",
    r"wiki/list-youtube-links",
    r"playlist\?list",
    r"view_play_list",
];

/// Settings for one run against the course site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Site root, e.g. `https://university.mongodb.com`.
    pub base_url: String,
    /// Regex patterns an article href must match to be kept.
    pub course_link_patterns: Vec<String>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            course_link_patterns: DEFAULT_COURSE_LINK_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl SiteConfig {
    /// Creates a config for a different site root, keeping other defaults.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parses the base URL. Must be absolute `http(s)`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for relative or non-HTTP roots.
    pub fn base(&self) -> Result<Url, PipelineError> {
        let url = Url::parse(self.base_url.trim_end_matches('/')).map_err(|e| {
            PipelineError::invalid_config(format!("base_url '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PipelineError::invalid_config(format!(
                "base_url '{}' must use http or https",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Compiles the course-link patterns into one alternation.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] when the list is empty or a
    /// pattern does not compile.
    pub fn link_patterns(&self) -> Result<LinkPatterns, PipelineError> {
        LinkPatterns::new(&self.course_link_patterns)
    }
}

/// Compiled course-link filter.
#[derive(Debug, Clone)]
pub struct LinkPatterns {
    regex: Regex,
}

impl LinkPatterns {
    /// Compiles `patterns` into a single matcher.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] when the list is empty or a
    /// pattern does not compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PipelineError> {
        if patterns.is_empty() {
            return Err(PipelineError::invalid_config(
                "course_link_patterns must not be empty",
            ));
        }
        for pattern in patterns {
            Regex::new(pattern.as_ref()).map_err(|e| {
                PipelineError::invalid_config(format!(
                    "course link pattern '{}': {e}",
                    pattern.as_ref()
                ))
            })?;
        }
        let joined = patterns
            .iter()
            .map(|pattern| format!("(?:{})", pattern.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&joined)
            .map_err(|e| PipelineError::invalid_config(format!("course link patterns: {e}")))?;
        Ok(Self { regex })
    }

    /// True when `href` points at course content.
    #[must_use]
    pub fn matches(&self, href: &str) -> bool {
        self.regex.is_match(href)
    }
}

impl Default for LinkPatterns {
    fn default() -> Self {
        Self::new(DEFAULT_COURSE_LINK_PATTERNS)
            .unwrap_or_else(|e| panic!("invalid built-in course link patterns: {e}"))
    }
}
