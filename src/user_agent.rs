//! Shared User-Agent string for site requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/coursegrab";

/// Default User-Agent for all site requests (identifies the tool).
#[must_use]
pub(crate) fn default_site_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("coursegrab/{version} (course-tool; +{PROJECT_UA_URL})")
}
