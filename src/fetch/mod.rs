//! Document fetcher: one HTTP request carrying the session, one classified outcome.
//!
//! - 200 → [`FetchOutcome::Page`]
//! - 404 → [`FetchOutcome::NotFound`] (a meaningful "no such resource")
//! - any other status → [`PipelineError::HttpStatus`]
//! - transport failure → [`PipelineError::Transport`]
//!
//! Nothing is retried. The client stores every `Set-Cookie` header, redirect
//! hops included, in the session's jar before the outcome is classified.

mod http_client;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, SET_COOKIE};
use scraper::Html;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::error::PipelineError;
use crate::session::Session;

use http_client::build_site_http_client;

/// Header carrying the CSRF token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// HTTP method of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request to issue against the site.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    url: Url,
    method: Method,
    form: Vec<(String, String)>,
    headers: Vec<(HeaderName, String)>,
}

impl FetchRequest {
    /// A GET request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::Get,
            form: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// A form POST. The CSRF token is attached automatically.
    #[must_use]
    pub fn post(url: Url) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    /// Adds a url-encoded form field.
    #[must_use]
    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    /// Adds an extra request header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// The request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }
}

/// Classified result of a fetch that did not fail.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Status 200 with its body.
    Page(Page),
    /// Status 404.
    NotFound,
}

/// A successfully fetched response body.
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    headers: HeaderMap,
    set_cookies: Vec<String>,
    body: String,
}

impl Page {
    /// Final URL after redirects.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// A response header as text, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// `Set-Cookie` header values of the final response, in the order received.
    #[must_use]
    pub fn set_cookies(&self) -> &[String] {
        &self.set_cookies
    }

    /// Parses the body as an HTML document.
    #[must_use]
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Parses the body as JSON of the expected shape.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnexpectedBody`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, PipelineError> {
        serde_json::from_str(&self.body)
            .map_err(|e| PipelineError::unexpected_body(self.url.as_str(), e.to_string()))
    }
}

/// Issues site requests carrying session state.
///
/// A fetcher is bound to the cookie jar of the session it was created for;
/// create a new one whenever the session is replaced.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with the configured timeouts that reads and writes
    /// the cookies of `session`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the HTTP client cannot be built.
    pub fn new(config: &SiteConfig, session: &Session) -> Result<Self, PipelineError> {
        Ok(Self {
            client: build_site_http_client(
                config.connect_timeout_secs,
                config.read_timeout_secs,
                &session.cookie_jar(),
            )?,
        })
    }

    /// Sends `request` with the session's cookies (and CSRF token for POST)
    /// and classifies the response.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::MissingToken`] for a POST before a token is stored
    /// - [`PipelineError::Transport`] on network failure
    /// - [`PipelineError::HttpStatus`] for statuses other than 200 and 404
    #[instrument(skip(self, request, session), fields(method = ?request.method, url = %request.url))]
    pub async fn fetch(
        &self,
        request: FetchRequest,
        session: &Session,
    ) -> Result<FetchOutcome, PipelineError> {
        let FetchRequest {
            url,
            method,
            form,
            headers,
        } = request;

        let mut builder = match method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => {
                let token = session.csrf_token().ok_or_else(|| PipelineError::MissingToken {
                    url: url.to_string(),
                })?;
                self.client
                    .post(url.clone())
                    .header(CSRF_HEADER, token)
                    .form(&form)
            }
        };
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, timeout = e.is_timeout(), "request failed");
            PipelineError::transport(url.as_str(), e)
        })?;

        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(ToString::to_string))
            .collect();
        debug!(status, final_url = %final_url, cookies = set_cookies.len(), "response received");

        match status {
            200 => {
                let headers = response.headers().clone();
                let body = response
                    .text()
                    .await
                    .map_err(|e| PipelineError::transport(final_url.as_str(), e))?;
                Ok(FetchOutcome::Page(Page {
                    url: final_url,
                    headers,
                    set_cookies,
                    body,
                }))
            }
            404 => Ok(FetchOutcome::NotFound),
            _ => Err(PipelineError::http_status(final_url.as_str(), status)),
        }
    }
}
