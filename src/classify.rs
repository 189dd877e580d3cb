//! Content classifier: picks the extraction strategy for a target before it is fetched.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::ContentMode;
use crate::utils::compile_static_regex;

static PLAYLIST_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"playlist\?list|view_play_list"));

/// How the content behind a target is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// A video playlist / watch list page.
    PlaylistVideos,
    /// Courseware navigation and embedded unit videos.
    CoursewareVideos,
    /// Wiki articles linking videos and playlists.
    WikiArticleLinks,
    /// The syllabus handout table.
    HandoutTable,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PlaylistVideos => "playlist",
            Self::CoursewareVideos => "courseware",
            Self::WikiArticleLinks => "wiki",
            Self::HandoutTable => "handouts",
        };
        f.write_str(name)
    }
}

/// True when `target` is a playlist or watch-list URL.
#[must_use]
pub fn is_playlist_url(target: &str) -> bool {
    PLAYLIST_URL_RE.is_match(target)
}

/// Maps a target and the requested mode to a strategy.
///
/// Playlist URLs win regardless of mode; otherwise the mode decides.
#[must_use]
pub fn classify(target: &str, mode: ContentMode) -> Strategy {
    if is_playlist_url(target) {
        return Strategy::PlaylistVideos;
    }
    match mode {
        ContentMode::Courseware => Strategy::CoursewareVideos,
        ContentMode::Handouts => Strategy::HandoutTable,
        ContentMode::Wiki => Strategy::WikiArticleLinks,
    }
}
