//! Course wiki article extraction.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::config::LinkPatterns;
use crate::model::ContentItem;
use crate::utils::{absolutize_url, compile_static_regex, compile_static_selector};

use super::element_text;

static ARTICLE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.wiki-article p > a"));

static VIDEO_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?i)video|playlist"));
static HANDOUT_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?i)handout"));

/// Collects the video (or, with `want_handout`, handout) links of a wiki article.
///
/// An anchor is kept when its visible text matches the wanted kind and its
/// href matches one of the course-link `patterns`. Everything else is dropped
/// silently.
#[must_use]
pub fn extract_wiki_article_links(
    doc: &Html,
    want_handout: bool,
    patterns: &LinkPatterns,
    base: &Url,
) -> Vec<ContentItem> {
    let text_filter: &Regex = if want_handout {
        &HANDOUT_TEXT_RE
    } else {
        &VIDEO_TEXT_RE
    };

    doc.select(&ARTICLE_LINK_SEL)
        .filter_map(|anchor| {
            let label = element_text(anchor);
            if !text_filter.is_match(&label) {
                return None;
            }
            let href = anchor.value().attr("href")?;
            if !patterns.matches(href) {
                return None;
            }
            let address = absolutize_url(href, base)?;
            Some(ContentItem::entry(label, address))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"
        <div class="wiki-article">
          <p><a href="/courses/10gen/M101J/2014_May/wiki/M101J/week-1">Video 1</a></p>
          <p><a href="/courses/10gen/M101J/2014_May/wiki/M101J/notes">Lecture Notes</a></p>
          <p><a href="https://www.youtube.com/playlist?list=PL123">Playlist Link</a></p>
          <p><a href="/courses/10gen/M101J/2014_May/wiki/M101/handouts">Week 1 Handouts</a></p>
        </div>
        <p><a href="/courses/10gen/M101J/2014_May/wiki/M101/outside">Video outside article</a></p>
    "#;

    fn base() -> Url {
        Url::parse("https://university.example.com").unwrap()
    }

    fn patterns() -> LinkPatterns {
        LinkPatterns::new(&["wiki/M101", "playlist\\?list"]).unwrap()
    }

    #[test]
    fn test_video_filter_keeps_first_and_third() {
        let items = extract_wiki_article_links(
            &Html::parse_document(ARTICLE_HTML),
            false,
            &patterns(),
            &base(),
        );
        let labels: Vec<_> = items.iter().map(ContentItem::label).collect();
        assert_eq!(labels, vec!["Video 1", "Playlist Link"]);
        assert_eq!(
            items[0].address(),
            Some("https://university.example.com/courses/10gen/M101J/2014_May/wiki/M101J/week-1")
        );
        assert_eq!(
            items[1].address(),
            Some("https://www.youtube.com/playlist?list=PL123")
        );
    }

    #[test]
    fn test_handout_filter_is_exclusive_of_video_filter() {
        let items = extract_wiki_article_links(
            &Html::parse_document(ARTICLE_HTML),
            true,
            &patterns(),
            &base(),
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label(), "Week 1 Handouts");
    }

    #[test]
    fn test_unknown_course_code_is_dropped() {
        let html = r#"<div class="wiki-article"><p><a href="/wiki/X999/a">Video X</a></p></div>"#;
        let items =
            extract_wiki_article_links(&Html::parse_document(html), false, &patterns(), &base());
        assert!(items.is_empty());
    }

    #[test]
    fn test_anchor_without_href_is_dropped() {
        let html = r#"<div class="wiki-article"><p><a name="top">Video anchor</a></p></div>"#;
        let items =
            extract_wiki_article_links(&Html::parse_document(html), false, &patterns(), &base());
        assert!(items.is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let doc = Html::parse_document(ARTICLE_HTML);
        let first = extract_wiki_article_links(&doc, false, &patterns(), &base());
        let second = extract_wiki_article_links(&doc, false, &patterns(), &base());
        assert_eq!(first, second);
    }
}
