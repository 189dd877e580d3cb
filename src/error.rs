//! Error types for the course discovery pipeline.
//!
//! Every stage propagates the first error it hits unchanged to the caller.
//! Messages follow the What/Suggestion pattern used across the project.
//! "Not found" is deliberately absent: a 404 on a content page is an empty
//! result, not an error.

use thiserror::Error;

/// Errors that can occur while authenticating or discovering course content.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network-level failure (DNS, connection refused, TLS, timeout). Never retried.
    #[error("network error requesting {url}: {source}\n  Suggestion: Check your connection and try again")]
    Transport {
        /// The URL that could not be reached.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status other than 200 or 404.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The login endpoint answered but refused the credentials.
    #[error("login rejected: {message}\n  Suggestion: Check your email and password")]
    LoginRejected {
        /// Human-readable message supplied by the server.
        message: String,
    },

    /// The CSRF cookie did not have the expected `name=value` shape.
    #[error(
        "malformed CSRF cookie '{header}'\n  Suggestion: The site login contract may have changed"
    )]
    MalformedToken {
        /// The first segment of the offending cookie header.
        header: String,
    },

    /// A state-changing request was attempted before a CSRF token was stored.
    #[error("no CSRF token available for POST {url}\n  Suggestion: Log in before changing state")]
    MissingToken {
        /// The URL of the rejected request.
        url: String,
    },

    /// A JSON response body did not match the expected shape.
    #[error("unexpected response body from {url}: {reason}")]
    UnexpectedBody {
        /// The URL that returned the body.
        url: String,
        /// Why the body was rejected.
        reason: String,
    },

    /// A target could not be turned into an absolute URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
    },

    /// Site configuration is unusable.
    #[error("invalid site configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// A content operation was invoked before a successful login.
    #[error("cannot {operation} before logging in\n  Suggestion: Call init first")]
    NotAuthenticated {
        /// The operation that was refused.
        operation: &'static str,
    },

    /// A content operation was invoked before the stage it depends on.
    #[error("cannot {operation} while {state}\n  Suggestion: Select a unit with get_list first")]
    OutOfOrder {
        /// The operation that was refused.
        operation: &'static str,
        /// Name of the pipeline state at the time.
        state: &'static str,
    },

    /// The pipeline already failed; no further stages run.
    #[error("pipeline aborted earlier: {reason}")]
    Aborted {
        /// The failure that aborted the pipeline.
        reason: String,
    },
}

impl PipelineError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a login rejection carrying the server message.
    pub fn login_rejected(message: impl Into<String>) -> Self {
        Self::LoginRejected {
            message: message.into(),
        }
    }

    /// Creates a malformed token error.
    pub fn malformed_token(header: impl Into<String>) -> Self {
        Self::MalformedToken {
            header: header.into(),
        }
    }

    /// Creates an unexpected body error.
    pub fn unexpected_body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedBody {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status for `HttpStatus` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
