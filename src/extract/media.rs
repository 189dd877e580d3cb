//! Unit page media extraction.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::model::MediaRef;
use crate::utils::{compile_static_selector, is_http_url};

static ARTICLE_CODE_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.wiki-article code"));
static PARAGRAPH_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.wiki-article > p > [href]"));

/// Collects the media addresses of a unit page, in document order.
///
/// A code block listing raw `http(s)://` links one per line takes precedence.
/// Otherwise the absolute links directly inside the article's paragraphs are
/// returned.
#[must_use]
pub fn extract_media_from_unit(doc: &Html) -> Vec<MediaRef> {
    let code = doc
        .select(&ARTICLE_CODE_SEL)
        .map(|block| block.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");
    if code.contains("http://") || code.contains("https://") {
        return code
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();
    }

    doc.select(&PARAGRAPH_LINK_SEL)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| is_http_url(href))
        .map(ToString::to_string)
        .collect()
}
