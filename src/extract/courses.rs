//! Dashboard (`/dashboard`) extraction: enrolled courses of one tab.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::model::{ContentMode, CourseEntry, CourseSection, EmptyCoursesNote, TabId};
use crate::utils::{absolutize_url, compile_static_regex, compile_static_selector};

use super::{element_text, normalize_whitespace};

static CURRENT_TAB_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("#tab-current"));
static COMPLETED_TAB_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("#tab-completed"));
static COURSE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.section-course > * h4 > *"));
static EMPTY_SECTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("section.section-courses-empty"));
static FIND_COURSES_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.section-courses-empty-buttons a"));

/// Landing-page segments stripped from a course link before the mode suffix is added.
static COURSE_PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex("about|info|syllabus"));

/// Collects the courses listed under `tab`, in document order.
///
/// Each link is rewritten into the content page for `mode`. A tab showing
/// the "no courses" panel yields no entries and an [`EmptyCoursesNote`].
#[must_use]
pub fn extract_course_section(
    doc: &Html,
    tab: TabId,
    mode: ContentMode,
    base: &Url,
) -> CourseSection {
    let mut section = CourseSection {
        tab,
        entries: Vec::new(),
        empty_note: None,
    };

    let panel_selector = match tab {
        TabId::Current => &*CURRENT_TAB_SEL,
        TabId::Completed => &*COMPLETED_TAB_SEL,
    };
    let Some(panel) = doc.select(panel_selector).next() else {
        debug!(panel = tab.panel_id(), "dashboard tab panel not found");
        return section;
    };

    for link in panel.select(&COURSE_LINK_SEL) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(url) = content_page_url(href, mode, base) else {
            debug!(href, "skipping course link that cannot be made absolute");
            continue;
        };
        section.entries.push(CourseEntry {
            title: element_text(link),
            url,
        });
    }

    section.empty_note = empty_courses_note(panel, base);
    section
}

/// Rewrites a dashboard course link into the absolute content page for `mode`.
fn content_page_url(href: &str, mode: ContentMode, base: &Url) -> Option<String> {
    let stripped = COURSE_PAGE_RE.replace_all(href, "");
    let absolute = absolutize_url(&stripped, base)?;
    Some(format!("{absolute}{}", mode.course_suffix()))
}

fn empty_courses_note(panel: ElementRef<'_>, base: &Url) -> Option<EmptyCoursesNote> {
    let raw = panel
        .select(&EMPTY_SECTION_SEL)
        .map(|section| section.text().collect::<String>())
        .collect::<String>();
    let message = normalize_whitespace(&raw);
    if message.is_empty() {
        return None;
    }

    let find_courses_url = panel
        .select(&FIND_COURSES_SEL)
        .find_map(|anchor| anchor.value().attr("href"))
        .and_then(|href| absolutize_url(href, base))
        .unwrap_or_else(|| base.to_string());

    Some(EmptyCoursesNote {
        message,
        find_courses_url,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DASHBOARD_HTML: &str = r#"
        <html><body>
        <div id="tab-current" class="tab-pane">
          <div class="section-course">
            <article class="course">
              <h4><a href="/courses/10gen/M101J/2014_May/about">M101J: MongoDB for Java Developers</a></h4>
            </article>
            <article class="course">
              <h4><a href="/courses/10gen/M102/2014_May/info">M102: MongoDB for DBAs</a></h4>
            </article>
          </div>
        </div>
        <div id="tab-completed" class="tab-pane">
          <div class="section-course">
            <article class="course">
              <h4><a href="/courses/10gen/C100/2013_Oct/syllabus">C100: Certification Prep</a></h4>
            </article>
          </div>
        </div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://university.example.com").unwrap()
    }

    fn doc() -> Html {
        Html::parse_document(DASHBOARD_HTML)
    }

    #[test]
    fn test_current_tab_is_scoped_and_ordered() {
        let section = extract_course_section(&doc(), TabId::Current, ContentMode::Wiki, &base());
        assert_eq!(section.tab, TabId::Current);
        let titles: Vec<_> = section.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["M101J: MongoDB for Java Developers", "M102: MongoDB for DBAs"]
        );
        assert!(section.empty_note.is_none());
    }

    #[test]
    fn test_suffix_follows_mode() {
        let wiki = extract_course_section(&doc(), TabId::Current, ContentMode::Wiki, &base());
        assert_eq!(
            wiki.entries[0].url,
            "https://university.example.com/courses/10gen/M101J/2014_May/course_wiki"
        );

        let courseware =
            extract_course_section(&doc(), TabId::Current, ContentMode::Courseware, &base());
        assert_eq!(
            courseware.entries[1].url,
            "https://university.example.com/courses/10gen/M102/2014_May/courseware"
        );

        let handouts =
            extract_course_section(&doc(), TabId::Completed, ContentMode::Handouts, &base());
        assert_eq!(handouts.entries.len(), 1);
        assert_eq!(
            handouts.entries[0].url,
            "https://university.example.com/courses/10gen/C100/2013_Oct/syllabus"
        );
    }

    #[test]
    fn test_every_entry_url_is_absolute() {
        for tab in [TabId::Current, TabId::Completed] {
            let section = extract_course_section(&doc(), tab, ContentMode::Wiki, &base());
            for entry in &section.entries {
                assert!(Url::parse(&entry.url).is_ok(), "not absolute: {}", entry.url);
            }
        }
    }

    #[test]
    fn test_empty_tab_produces_note_not_error() {
        let html = r#"
            <div id="tab-completed">
              <section class="section-courses-empty">
                <p>You have not
                     completed   any courses yet.
                </p>
                <p>  Find new courses  </p>
              </section>
              <div class="section-courses-empty-buttons"><a href="/courses">Find Courses</a></div>
            </div>
        "#;
        let section = extract_course_section(
            &Html::parse_document(html),
            TabId::Completed,
            ContentMode::Wiki,
            &base(),
        );
        assert!(section.entries.is_empty());
        let note = section.empty_note.unwrap();
        assert_eq!(
            note.message,
            "You have not completed any courses yet. Find new courses"
        );
        assert_eq!(note.find_courses_url, "https://university.example.com/courses");
        assert!(note.to_string().ends_with("at https://university.example.com/courses."));
    }

    #[test]
    fn test_missing_panel_yields_empty_section() {
        let section = extract_course_section(
            &Html::parse_document("<html></html>"),
            TabId::Current,
            ContentMode::Wiki,
            &base(),
        );
        assert!(section.entries.is_empty());
        assert!(section.empty_note.is_none());
    }

    #[test]
    fn test_heading_children_without_href_are_skipped() {
        let html = r#"
            <div id="tab-current"><div class="section-course">
              <div><h4><span>Archived</span><a href="/courses/x/M202/2014/about">M202</a></h4></div>
            </div></div>
        "#;
        let section = extract_course_section(
            &Html::parse_document(html),
            TabId::Current,
            ContentMode::Wiki,
            &base(),
        );
        assert_eq!(section.entries.len(), 1);
        assert_eq!(section.entries[0].title, "M202");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let document = doc();
        let first = extract_course_section(&document, TabId::Current, ContentMode::Wiki, &base());
        let second = extract_course_section(&document, TabId::Current, ContentMode::Wiki, &base());
        assert_eq!(first, second);
    }
}
