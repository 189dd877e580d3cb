//! Pipeline states and the pure transition function.

use std::fmt;

use serde::Serialize;

use crate::model::{ContentList, CourseSection, MediaRef, Profile};

/// Where a pipeline is in the login and discovery chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum PipelineState {
    Anonymous,
    /// Landing page fetched, CSRF token not yet extracted.
    AwaitingToken,
    /// Credentials posted, login result pending.
    AwaitingLoginResult,
    Authenticated(Profile),
    CoursesListed(CourseSection),
    UnitSelected(ContentList),
    MediaResolved(Vec<MediaRef>),
    /// Terminal failure. No further transition leaves this state.
    Aborted(String),
}

impl PipelineState {
    /// Short name used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::AwaitingToken => "awaiting_token",
            Self::AwaitingLoginResult => "awaiting_login_result",
            Self::Authenticated(_) => "authenticated",
            Self::CoursesListed(_) => "courses_listed",
            Self::UnitSelected(_) => "unit_selected",
            Self::MediaResolved(_) => "media_resolved",
            Self::Aborted(_) => "aborted",
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// True once the dashboard has been read and content may be requested.
    #[must_use]
    pub fn has_courses(&self) -> bool {
        matches!(
            self,
            Self::CoursesListed(_) | Self::UnitSelected(_) | Self::MediaResolved(_)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Result of one effectful step, fed into [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    LandingLoaded,
    TokenExtracted,
    ProfileLoaded(Profile),
    CoursesLoaded(CourseSection),
    ListLoaded(ContentList),
    MediaLoaded(Vec<MediaRef>),
    Failed(String),
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Self::LandingLoaded => "landing_loaded",
            Self::TokenExtracted => "token_extracted",
            Self::ProfileLoaded(_) => "profile_loaded",
            Self::CoursesLoaded(_) => "courses_loaded",
            Self::ListLoaded(_) => "list_loaded",
            Self::MediaLoaded(_) => "media_loaded",
            Self::Failed(_) => "failed",
        }
    }
}

/// Computes the next state. Pure: no I/O, no hidden state.
///
/// `Failed` aborts from any state. An event that does not apply to the
/// current state also aborts, naming both. `Aborted` absorbs every event.
/// Once courses are listed, further lists and media lookups may follow in
/// any order since the caller navigates back and forth between units.
#[must_use]
pub fn transition(state: PipelineState, event: Event) -> PipelineState {
    use PipelineState as S;

    match (state, event) {
        (aborted @ S::Aborted(_), _) => aborted,
        (_, Event::Failed(reason)) => S::Aborted(reason),

        (S::Anonymous, Event::LandingLoaded) => S::AwaitingToken,
        (S::AwaitingToken, Event::TokenExtracted) => S::AwaitingLoginResult,
        (S::AwaitingLoginResult, Event::ProfileLoaded(profile)) => S::Authenticated(profile),
        (S::Authenticated(_), Event::CoursesLoaded(section)) => S::CoursesListed(section),

        (S::CoursesListed(_) | S::UnitSelected(_) | S::MediaResolved(_), Event::ListLoaded(list)) => {
            S::UnitSelected(list)
        }
        (S::UnitSelected(_) | S::MediaResolved(_), Event::MediaLoaded(media)) => {
            S::MediaResolved(media)
        }

        (state, event) => S::Aborted(format!(
            "unexpected event '{}' in state '{}'",
            event.name(),
            state.name()
        )),
    }
}
