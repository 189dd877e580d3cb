//! Session store: cookies and CSRF token for one authenticated run.
//!
//! The session is an explicit value owned by the pipeline and lent to the
//! fetcher for each request. Its cookie jar is handed to the HTTP client as
//! the cookie provider, so cookies set on redirect hops are kept too.
//! Nothing is persisted across runs.

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use tracing::debug;
use url::Url;

use crate::error::PipelineError;

/// Cookie jar, CSRF token and login flag for a single run.
#[derive(Default)]
pub struct Session {
    jar: Arc<Jar>,
    csrf_token: String,
    authenticated: bool,
}

impl Session {
    /// Creates an empty, anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The jar backing this session, for `ClientBuilder::cookie_provider`.
    pub(crate) fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Merges `Set-Cookie` headers received from `origin` into the jar.
    ///
    /// A later cookie with the same name and path replaces the earlier one.
    /// Malformed headers are skipped.
    pub fn record_cookies<I, S>(&mut self, set_cookie_headers: I, origin: &Url)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for header in set_cookie_headers {
            self.jar.add_cookie_str(header.as_ref(), origin);
        }
        debug!(origin = %origin, "recorded cookies");
    }

    /// Stores the CSRF token carried by a raw cookie header.
    ///
    /// The token is the part after the first `=` of the first `;`-delimited
    /// segment, up to any further `=`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedToken`] when the segment has no `=`
    /// or the token would be empty.
    pub fn set_token(&mut self, raw_cookie_header: &str) -> Result<(), PipelineError> {
        let segment = raw_cookie_header.split(';').next().unwrap_or_default().trim();
        let token = segment
            .split('=')
            .nth(1)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| PipelineError::malformed_token(cookie_name(segment)))?;
        self.csrf_token = token.to_string();
        debug!("stored CSRF token");
        Ok(())
    }

    /// The stored CSRF token, if any.
    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        if self.csrf_token.is_empty() {
            None
        } else {
            Some(&self.csrf_token)
        }
    }

    /// Marks the session as logged in. Only the pipeline calls this, after a
    /// successful login response.
    pub(crate) fn mark_authenticated(&mut self) {
        self.authenticated = true;
    }

    /// True once the login request succeeded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Value of the cookie `name` that would be sent to `url`.
    ///
    /// Avoid logging the return value.
    #[must_use]
    pub fn cookie(&self, name: &str, url: &Url) -> Option<String> {
        self.cookie_header(url)?
            .split("; ")
            .filter_map(|pair| pair.split_once('='))
            .find(|(cookie_name, _)| *cookie_name == name)
            .map(|(_, value)| value.to_string())
    }

    /// The `Cookie` request header the jar produces for `url`, or `None` when
    /// no stored cookie applies.
    #[must_use]
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(ToString::to_string))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("csrf_token", &self.csrf_token().map(|_| "[REDACTED]"))
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

/// Cookie name of a `name=value` segment, for error messages without the value.
fn cookie_name(segment: &str) -> &str {
    segment.split('=').next().unwrap_or_default()
}
