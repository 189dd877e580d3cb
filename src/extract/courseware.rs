//! Courseware extraction: chapter navigation and embedded unit videos.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::model::{ContentItem, MediaRef};
use crate::utils::{absolutize_url, compile_static_regex, compile_static_selector, is_http_url};

use super::{element_text, normalize_whitespace, watch_url};

static CHAPTER_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("div.chapter"));
static CHAPTER_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("h3"));
static UNIT_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("ul li a"));
static VIDEO_SOURCE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    compile_static_selector(
        "[data-streams], [data-youtube-id], video source[src], [data-download-url]",
    )
});

static YOUTUBE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^[A-Za-z0-9_-]{11}$"));

/// Lists the units of a courseware page as `"<chapter> / <unit>"` entries.
///
/// Units outside any chapter block are not listed.
#[must_use]
pub fn extract_courseware_units(doc: &Html, base: &Url) -> Vec<ContentItem> {
    let mut items = Vec::new();
    for chapter in doc.select(&CHAPTER_SEL) {
        let chapter_title = chapter
            .select(&CHAPTER_TITLE_SEL)
            .next()
            .map(|title| normalize_whitespace(&element_text(title)))
            .unwrap_or_default();

        for link in chapter.select(&UNIT_LINK_SEL) {
            let Some(address) = link
                .value()
                .attr("href")
                .and_then(|href| absolutize_url(href, base))
            else {
                continue;
            };
            let unit_title = normalize_whitespace(&element_text(link));
            let label = if chapter_title.is_empty() {
                unit_title
            } else {
                format!("{chapter_title} / {unit_title}")
            };
            items.push(ContentItem::entry(label, address));
        }
    }
    items
}

/// Collects the videos embedded in a courseware unit, in document order.
///
/// A direct file nested inside a YouTube player is the same video and is
/// not listed again.
#[must_use]
pub fn extract_courseware_videos(doc: &Html, base: &Url) -> Vec<MediaRef> {
    let mut youtube_players = HashSet::new();
    let mut refs = Vec::new();
    for element in doc.select(&VIDEO_SOURCE_SEL) {
        if let Some(media) = youtube_ref(element) {
            youtube_players.insert(element.id());
            refs.push(media);
        } else if !element
            .ancestors()
            .any(|ancestor| youtube_players.contains(&ancestor.id()))
            && let Some(media) = direct_ref(element, base)
        {
            refs.push(media);
        }
    }
    refs
}

/// Watch URL from `data-streams` (preferred) or `data-youtube-id`.
fn youtube_ref(element: ElementRef<'_>) -> Option<MediaRef> {
    let attrs = element.value();
    attrs
        .attr("data-streams")
        .and_then(preferred_stream_id)
        .or_else(|| {
            attrs
                .attr("data-youtube-id")
                .map(str::trim)
                .filter(|id| YOUTUBE_ID_RE.is_match(id))
        })
        .map(watch_url)
}

/// Absolute address of a `<source>` file or a `data-download-url`.
fn direct_ref(element: ElementRef<'_>, base: &Url) -> Option<MediaRef> {
    let attrs = element.value();
    let direct = if attrs.name() == "source" {
        attrs.attr("src")
    } else {
        attrs.attr("data-download-url")
    }?;
    absolutize_url(direct, base).filter(|url| is_http_url(url))
}

/// Picks the normal-speed id out of a `speed:id,speed:id` list, else the first valid id.
fn preferred_stream_id(streams: &str) -> Option<&str> {
    let mut fallback = None;
    for stream in streams.split(',') {
        let Some((speed, id)) = stream.split_once(':') else {
            continue;
        };
        let id = id.trim();
        if !YOUTUBE_ID_RE.is_match(id) {
            continue;
        }
        if matches!(speed.trim(), "1.0" | "1.00") {
            return Some(id);
        }
        fallback.get_or_insert(id);
    }
    fallback
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NAV_HTML: &str = r##"
        <nav class="courseware">
          <div class="chapter">
            <h3><a href="#">Week 1:
                 Introduction</a></h3>
            <ul>
              <li><a href="/courses/10gen/M101J/2014_May/courseware/week1/overview/">Overview</a></li>
              <li><a href="/courses/10gen/M101J/2014_May/courseware/week1/install/">Installing MongoDB</a></li>
            </ul>
          </div>
          <div class="chapter">
            <h3>Week 2: CRUD</h3>
            <ul>
              <li><a>Locked</a></li>
              <li><a href="/courses/10gen/M101J/2014_May/courseware/week2/find/">Find</a></li>
            </ul>
          </div>
        </nav>
    "##;

    fn base() -> Url {
        Url::parse("https://university.example.com").unwrap()
    }

    #[test]
    fn test_units_are_labelled_with_chapter() {
        let items = extract_courseware_units(&Html::parse_document(NAV_HTML), &base());
        let labels: Vec<_> = items.iter().map(ContentItem::label).collect();
        assert_eq!(
            labels,
            vec![
                "Week 1: Introduction / Overview",
                "Week 1: Introduction / Installing MongoDB",
                "Week 2: CRUD / Find",
            ]
        );
        assert_eq!(
            items[2].address(),
            Some("https://university.example.com/courses/10gen/M101J/2014_May/courseware/week2/find/")
        );
    }

    #[test]
    fn test_unit_videos_in_document_order() {
        let html = r#"
            <div class="vert">
              <div class="video" data-streams="0.75:aaaaaaaaaaa,1.0:bbbbbbbbbbb,1.25:ccccccccccc"></div>
            </div>
            <div class="vert">
              <div class="video" data-youtube-id="ddddddddddd"></div>
            </div>
            <div class="vert">
              <video><source src="/static/video/intro.mp4" type="video/mp4"></video>
            </div>
            <div class="vert">
              <div class="video" data-download-url="https://cdn.example.com/lecture.mp4"></div>
            </div>
        "#;
        let refs = extract_courseware_videos(&Html::parse_document(html), &base());
        assert_eq!(
            refs,
            vec![
                "https://www.youtube.com/watch?v=bbbbbbbbbbb",
                "https://www.youtube.com/watch?v=ddddddddddd",
                "https://university.example.com/static/video/intro.mp4",
                "https://cdn.example.com/lecture.mp4",
            ]
        );
    }

    #[test]
    fn test_streams_without_normal_speed_fall_back_to_first_valid() {
        assert_eq!(
            preferred_stream_id("0.75:bad,1.25:eeeeeeeeeee,1.50:fffffffffff"),
            Some("eeeeeeeeeee")
        );
        assert_eq!(
            preferred_stream_id("0.75:xxxxxxxxxxx,1.00:yyyyyyyyyyy"),
            Some("yyyyyyyyyyy")
        );
        assert_eq!(preferred_stream_id(""), None);
        assert_eq!(preferred_stream_id("1.0:"), None);
    }

    #[test]
    fn test_source_inside_youtube_player_is_not_listed_twice() {
        let html = r#"
            <div class="video" data-streams="1.0:bbbbbbbbbbb">
              <video><source src="/static/video/week1.mp4"></video>
            </div>
            <div class="video" data-youtube-id="bad">
              <video><source src="/static/video/week2.mp4"></video>
            </div>
        "#;
        let refs = extract_courseware_videos(&Html::parse_document(html), &base());
        assert_eq!(
            refs,
            vec![
                "https://www.youtube.com/watch?v=bbbbbbbbbbb",
                "https://university.example.com/static/video/week2.mp4",
            ]
        );
    }

    #[test]
    fn test_invalid_youtube_id_is_skipped() {
        let html = r#"<div data-youtube-id="not an id"></div>"#;
        let refs = extract_courseware_videos(&Html::parse_document(html), &base());
        assert!(refs.is_empty());
    }

    #[test]
    fn test_page_without_chapters_has_no_units() {
        let items = extract_courseware_units(&Html::parse_document("<ul><li><a href=\"/x\">x</a></li></ul>"), &base());
        assert!(items.is_empty());
    }
}
