//! Playlist and watch-list page extraction.
//!
//! Playlist pages are mostly script, so this works on the raw body text
//! instead of the parsed document.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::MediaRef;
use crate::utils::compile_static_regex;

use super::watch_url;

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#""videoId"\s*:\s*"([A-Za-z0-9_-]{11})"|watch\?(?:[^"'\s<>]*&(?:amp;)?)?v=([A-Za-z0-9_-]{11})"#,
    )
});

/// Collects the videos of a playlist page as watch URLs, first sighting first.
#[must_use]
pub fn extract_playlist_videos(body: &str) -> Vec<MediaRef> {
    let mut seen = HashSet::new();
    VIDEO_ID_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|id| id.as_str())
        .filter(|id| seen.insert(*id))
        .map(watch_url)
        .collect()
}
