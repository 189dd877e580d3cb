//! Pipeline orchestrator: login chain and content discovery.
//!
//! A [`Pipeline`] owns the [`Session`] and issues one request at a time.
//! Every operation takes `&mut self`, so a second request cannot start
//! before the previous one has resolved and its cookies are recorded.
//!
//! Progress is tracked by [`PipelineState`], advanced only through the pure
//! [`transition`] function. Fetch, login and extraction failures move the
//! pipeline to [`PipelineState::Aborted`]; afterwards every operation except
//! [`Pipeline::check_proxy`] returns [`PipelineError::Aborted`].

mod state;

pub use state::{Event, PipelineState, transition};

use reqwest::header::REFERER;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::classify::{Strategy, classify};
use crate::config::{LinkPatterns, SiteConfig};
use crate::error::PipelineError;
use crate::extract::{
    extract_course_section, extract_courseware_units, extract_courseware_videos,
    extract_handout_table, extract_media_from_unit, extract_playlist_videos, extract_profile,
    extract_wiki_article_links,
};
use crate::fetch::{FetchOutcome, FetchRequest, Fetcher, Page};
use crate::model::{
    ContentItem, ContentList, ContentMode, CourseSection, Credentials, MediaRef, Preferences,
    Profile, TabId,
};
use crate::session::Session;
use crate::utils::absolutize_url;

const LOGIN_PATH: &str = "/login";
const PROFILE_PATH: &str = "/edit_profile";
const DASHBOARD_PATH: &str = "/dashboard";
const SAVE_PREFERENCES_PATH: &str = "/save_video_preferences";

const DEFAULT_REJECTION: &str = "the server did not accept the login";

/// Body returned by `POST /login`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    value: Option<String>,
}

/// What a successful [`Pipeline::init`] discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitOutcome {
    pub profile: Profile,
    pub section: CourseSection,
}

/// Authenticated, strictly sequential course discovery against one site.
#[derive(Debug)]
pub struct Pipeline {
    config: SiteConfig,
    fetcher: Fetcher,
    session: Session,
    state: PipelineState,
    base: Url,
    patterns: LinkPatterns,
}

impl Pipeline {
    /// Creates an anonymous pipeline for the configured site.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for an unusable base URL or
    /// course-link pattern, or when the HTTP client cannot be built.
    pub fn new(config: SiteConfig) -> Result<Self, PipelineError> {
        let base = config.base()?;
        let patterns = config.link_patterns()?;
        let session = Session::new();
        let fetcher = Fetcher::new(&config, &session)?;
        Ok(Self {
            config,
            fetcher,
            session,
            state: PipelineState::Anonymous,
            base,
            patterns,
        })
    }

    /// Current position in the chain.
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The session built up so far.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Logs in and reads the profile and the courses of `tab`.
    ///
    /// Runs landing page, token extraction, login, profile and dashboard in
    /// order. Course links are rewritten for `mode`. A second call starts over
    /// with a fresh session.
    ///
    /// Unlike the content operations, a 404 anywhere in this chain is a
    /// failure: these pages are part of the site contract, so a missing one
    /// yields [`PipelineError::HttpStatus`] rather than an empty result.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::LoginRejected`] with the server message when the
    ///   credentials are refused; no further request is made
    /// - [`PipelineError::MalformedToken`] when the landing page cookie has
    ///   an unexpected shape
    /// - [`PipelineError::HttpStatus`] for any non-200 status, 404 included
    /// - [`PipelineError::Transport`] on network failure
    /// - [`PipelineError::Aborted`] if the pipeline already failed
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn init(
        &mut self,
        credentials: &Credentials,
        tab: TabId,
        mode: ContentMode,
    ) -> Result<InitOutcome, PipelineError> {
        self.ensure_not_aborted()?;
        self.session = Session::new();
        self.fetcher = Fetcher::new(&self.config, &self.session)?;
        self.state = PipelineState::Anonymous;

        let result = self.login_chain(credentials, tab, mode).await;
        self.abort_on_error(result)
    }

    /// Lists the selectable items behind a course or unit address.
    ///
    /// The strategy comes from [`classify`]. Handout tables and playlists
    /// produce a terminal list; wiki and courseware indexes produce units to
    /// pass to [`Pipeline::list_videos`]. A missing page (404) is an empty
    /// terminal list.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotAuthenticated`] before a successful `init`
    /// - [`PipelineError::InvalidUrl`] when `target` cannot be resolved
    /// - [`PipelineError::HttpStatus`] / [`PipelineError::Transport`] on fetch failure
    /// - [`PipelineError::Aborted`] if the pipeline already failed
    #[instrument(skip(self, target), fields(url = %target))]
    pub async fn get_list(
        &mut self,
        target: &str,
        mode: ContentMode,
    ) -> Result<ContentList, PipelineError> {
        self.ensure_not_aborted()?;
        if !self.state.has_courses() {
            return Err(PipelineError::NotAuthenticated {
                operation: "list course content",
            });
        }

        let result = self.fetch_list(target, mode).await;
        let list = self.abort_on_error(result)?;
        self.apply(Event::ListLoaded(list.clone()));
        Ok(list)
    }

    /// Resolves the media references of one unit.
    ///
    /// In handout mode the address already is the resource and is returned
    /// without a request. A missing page (404) yields no references.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotAuthenticated`] before a successful `init`
    /// - [`PipelineError::OutOfOrder`] before any [`Pipeline::get_list`]
    /// - [`PipelineError::InvalidUrl`] when `target` cannot be resolved
    /// - [`PipelineError::HttpStatus`] / [`PipelineError::Transport`] on fetch failure
    /// - [`PipelineError::Aborted`] if the pipeline already failed
    #[instrument(skip(self, target), fields(url = %target))]
    pub async fn list_videos(
        &mut self,
        target: &str,
        mode: ContentMode,
    ) -> Result<Vec<MediaRef>, PipelineError> {
        self.ensure_not_aborted()?;
        match &self.state {
            PipelineState::UnitSelected(_) | PipelineState::MediaResolved(_) => {}
            PipelineState::CoursesListed(_) => {
                return Err(PipelineError::OutOfOrder {
                    operation: "list videos",
                    state: self.state.name(),
                });
            }
            _ => {
                return Err(PipelineError::NotAuthenticated {
                    operation: "list videos",
                });
            }
        }

        let result = self.fetch_media(target, mode).await;
        let media = self.abort_on_error(result)?;
        self.apply(Event::MediaLoaded(media.clone()));
        Ok(media)
    }

    /// Describes the server behind `target` from its `Server` and
    /// `X-Powered-By` headers, or returns `target` when neither is sent.
    ///
    /// Uses a throwaway session and leaves the pipeline state untouched.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidUrl`] when `target` is not an absolute URL
    /// - [`PipelineError::HttpStatus`] for any status other than 200
    /// - [`PipelineError::Transport`] on network failure
    #[instrument(skip(self, target), fields(url = %target))]
    pub async fn check_proxy(&self, target: &str) -> Result<String, PipelineError> {
        let url = Url::parse(target).map_err(|_| PipelineError::invalid_url(target))?;
        let scratch = Session::new();
        let fetcher = Fetcher::new(&self.config, &scratch)?;
        let page = match fetcher.fetch(FetchRequest::get(url.clone()), &scratch).await? {
            FetchOutcome::Page(page) => page,
            FetchOutcome::NotFound => return Err(PipelineError::http_status(url.as_str(), 404)),
        };
        Ok(describe_stack(&page, target))
    }

    /// Saves the video provider and language preferences.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotAuthenticated`] before a successful `init`
    /// - [`PipelineError::HttpStatus`] / [`PipelineError::Transport`] on fetch failure
    /// - [`PipelineError::UnexpectedBody`] when the answer is not JSON
    /// - [`PipelineError::Aborted`] if the pipeline already failed
    #[instrument(skip(self))]
    pub async fn update_profile(
        &mut self,
        preferences: &Preferences,
    ) -> Result<serde_json::Value, PipelineError> {
        self.ensure_not_aborted()?;
        if !self.session.is_authenticated() {
            return Err(PipelineError::NotAuthenticated {
                operation: "update video preferences",
            });
        }

        let result = self.save_preferences(preferences).await;
        self.abort_on_error(result)
    }

    async fn login_chain(
        &mut self,
        credentials: &Credentials,
        tab: TabId,
        mode: ContentMode,
    ) -> Result<InitOutcome, PipelineError> {
        let landing = self.fetch_required(FetchRequest::get(self.base.clone())).await?;
        self.apply(Event::LandingLoaded);

        let raw_cookie = landing
            .set_cookies()
            .first()
            .ok_or_else(|| PipelineError::malformed_token(""))?;
        self.session.set_token(raw_cookie)?;
        self.apply(Event::TokenExtracted);

        let request = FetchRequest::post(self.endpoint(LOGIN_PATH)?)
            .form_field("email", credentials.email.as_str())
            .form_field("password", credentials.password());
        let login: LoginResponse = self.fetch_required(request).await?.json()?;
        if !login.success {
            let message = login
                .value
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
            warn!(%message, "login rejected");
            return Err(PipelineError::login_rejected(message));
        }
        self.session.mark_authenticated();
        info!("logged in");

        let page = self
            .fetch_required(FetchRequest::get(self.endpoint(PROFILE_PATH)?))
            .await?;
        let profile = extract_profile(&page.document());
        self.apply(Event::ProfileLoaded(profile.clone()));

        let page = self
            .fetch_required(FetchRequest::get(self.endpoint(DASHBOARD_PATH)?))
            .await?;
        let section = extract_course_section(&page.document(), tab, mode, &self.base);
        info!(
            tab = tab.panel_id(),
            courses = section.entries.len(),
            "dashboard read"
        );
        self.apply(Event::CoursesLoaded(section.clone()));

        Ok(InitOutcome { profile, section })
    }

    async fn fetch_list(
        &mut self,
        target: &str,
        mode: ContentMode,
    ) -> Result<ContentList, PipelineError> {
        let url = self.resolve_target(target)?;
        let strategy = classify(url.as_str(), mode);
        let referer = url.as_str().replace("course_wiki", "syllabus");
        let request = FetchRequest::get(url).header(REFERER, referer);

        let FetchOutcome::Page(page) = self.fetcher.fetch(request, &self.session).await? else {
            debug!("content page not found");
            return Ok(ContentList::not_found());
        };

        let items = match strategy {
            Strategy::PlaylistVideos => extract_playlist_videos(page.body())
                .into_iter()
                .map(|media| ContentItem::entry(media.clone(), media))
                .collect(),
            Strategy::CoursewareVideos => extract_courseware_units(&page.document(), &self.base),
            Strategy::HandoutTable => extract_handout_table(&page.document(), &self.base),
            Strategy::WikiArticleLinks => {
                extract_wiki_article_links(&page.document(), false, &self.patterns, &self.base)
            }
        };
        let terminal = matches!(
            strategy,
            Strategy::PlaylistVideos | Strategy::HandoutTable
        );
        debug!(%strategy, items = items.len(), terminal, "content list extracted");
        Ok(ContentList { items, terminal })
    }

    async fn fetch_media(
        &mut self,
        target: &str,
        mode: ContentMode,
    ) -> Result<Vec<MediaRef>, PipelineError> {
        let url = self.resolve_target(target)?;
        let strategy = classify(url.as_str(), mode);
        if strategy == Strategy::HandoutTable {
            return Ok(vec![url.to_string()]);
        }

        let FetchOutcome::Page(page) = self
            .fetcher
            .fetch(FetchRequest::get(url), &self.session)
            .await?
        else {
            debug!("unit page not found");
            return Ok(Vec::new());
        };

        let media = match strategy {
            Strategy::PlaylistVideos => extract_playlist_videos(page.body()),
            Strategy::CoursewareVideos => extract_courseware_videos(&page.document(), &self.base),
            Strategy::WikiArticleLinks | Strategy::HandoutTable => {
                extract_media_from_unit(&page.document())
            }
        };
        debug!(%strategy, media = media.len(), "media extracted");
        Ok(media)
    }

    async fn save_preferences(
        &mut self,
        preferences: &Preferences,
    ) -> Result<serde_json::Value, PipelineError> {
        let token = self.session.csrf_token().unwrap_or_default().to_string();
        let request = FetchRequest::post(self.endpoint(SAVE_PREFERENCES_PATH)?)
            .form_field("csrfmiddlewaretoken", token)
            .form_field("provider", preferences.provider.as_str())
            .form_field("language", preferences.language.as_str());
        let page = self.fetch_required(request).await?;
        info!(provider = %preferences.provider, language = %preferences.language, "preferences saved");
        page.json()
    }

    /// Fetches a page that is part of the site contract; 404 is an error here.
    async fn fetch_required(&mut self, request: FetchRequest) -> Result<Page, PipelineError> {
        let url = request.url().to_string();
        match self.fetcher.fetch(request, &self.session).await? {
            FetchOutcome::Page(page) => Ok(page),
            FetchOutcome::NotFound => Err(PipelineError::http_status(url, 404)),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, PipelineError> {
        self.base
            .join(path)
            .map_err(|_| PipelineError::invalid_url(format!("{}{path}", self.base)))
    }

    fn resolve_target(&self, target: &str) -> Result<Url, PipelineError> {
        absolutize_url(target, &self.base)
            .and_then(|absolute| Url::parse(&absolute).ok())
            .ok_or_else(|| PipelineError::invalid_url(target))
    }

    fn ensure_not_aborted(&self) -> Result<(), PipelineError> {
        match &self.state {
            PipelineState::Aborted(reason) => Err(PipelineError::Aborted {
                reason: reason.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn apply(&mut self, event: Event) {
        let current = std::mem::replace(&mut self.state, PipelineState::Anonymous);
        self.state = transition(current, event);
        debug!(state = self.state.name(), "pipeline state changed");
    }

    fn abort_on_error<T>(&mut self, result: Result<T, PipelineError>) -> Result<T, PipelineError> {
        if let Err(e) = &result {
            warn!(error = %e, "pipeline aborted");
            self.apply(Event::Failed(e.to_string()));
        }
        result
    }
}

/// `Proxy Server: <server> Powered-by: <x>` from the response headers.
fn describe_stack(page: &Page, target: &str) -> String {
    let mut stack = String::new();
    if let Some(server) = page.header("server") {
        stack.push_str(&format!("Proxy Server: {server} "));
    }
    if let Some(powered_by) = page.header("x-powered-by") {
        stack.push_str(&format!("Powered-by: {powered_by} "));
    }
    let stack = stack.trim();
    if stack.is_empty() {
        target.to_string()
    } else {
        stack.to_string()
    }
}
