//! Coursegrab Core Library
//!
//! Logs into a course site protected by a CSRF-cookie login, then walks the
//! dashboard, course indexes and unit pages to collect video and handout
//! addresses.
//!
//! # Architecture
//!
//! - [`session`] - Cookie jar, CSRF token and login flag for one run
//! - [`fetch`] - HTTP requests carrying the session, with classified outcomes
//! - [`classify`] - Picks the extraction strategy for a target
//! - [`extract`] - Pure markup extractors, one per page type
//! - [`pipeline`] - Strictly ordered login and discovery chain
//! - [`config`] - Site root, timeouts and course-link patterns

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod user_agent;

mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use classify::{Strategy, classify};
pub use config::{LinkPatterns, SiteConfig};
pub use error::PipelineError;
pub use fetch::{FetchOutcome, FetchRequest, Fetcher, Page};
pub use model::{
    Choice, ContentItem, ContentList, ContentMode, Control, CourseEntry, CourseSection,
    Credentials, EmptyCoursesNote, MediaRef, Preferences, Profile, TabId,
};
pub use pipeline::{InitOutcome, Pipeline, PipelineState};
pub use session::Session;
