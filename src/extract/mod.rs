//! Markup extractors, one per page type.
//!
//! Every function here is pure: a parsed document in, owned structured data
//! out. Missing or malformed sub-elements are skipped rather than reported,
//! since course pages are hand-maintained and inconsistent. Only transport
//! and HTTP failures, handled by the fetcher, are hard errors.

mod courses;
mod courseware;
mod handouts;
mod media;
mod playlist;
mod profile;
mod wiki;

pub use courses::extract_course_section;
pub use courseware::{extract_courseware_units, extract_courseware_videos};
pub use handouts::extract_handout_table;
pub use media::extract_media_from_unit;
pub use playlist::extract_playlist_videos;
pub use profile::extract_profile;
pub use wiki::extract_wiki_article_links;

use scraper::ElementRef;

/// Visible text of an element, trimmed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Collapses every whitespace run (including line breaks) into one space.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical watch URL for a YouTube video id.
pub(crate) fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_element_text_joins_nested_text() {
        let doc = Html::parse_fragment("<p> Week <b>1</b> videos </p>");
        let p = doc.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert_eq!(element_text(p), "Week 1 videos");
    }

    #[test]
    fn test_normalize_whitespace_joins_lines() {
        assert_eq!(
            normalize_whitespace("  You are not\n      enrolled   in\n\n any courses.  "),
            "You are not enrolled in any courses."
        );
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
