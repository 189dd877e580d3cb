//! Syllabus handout table extraction.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::model::{ContentItem, Control};
use crate::utils::{absolutize_url, compile_static_selector};

use super::element_text;

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("tbody tr"));
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a[href]"));

/// Turns handout table rows into selectable entries.
///
/// The first cell is the label and the first link of the last cell is the
/// address. When at least one row resolves, an "All" control (checked) and a
/// "Cancel" control are placed in front.
#[must_use]
pub fn extract_handout_table(doc: &Html, base: &Url) -> Vec<ContentItem> {
    let rows: Vec<ContentItem> = doc
        .select(&ROW_SEL)
        .filter_map(|row| handout_row(row, base))
        .collect();

    if rows.is_empty() {
        return rows;
    }

    let mut items = Vec::with_capacity(rows.len() + 2);
    items.push(ContentItem::Control {
        control: Control::All,
        label: "All".to_string(),
        checked: true,
    });
    items.push(ContentItem::Control {
        control: Control::Cancel,
        label: "Cancel".to_string(),
        checked: false,
    });
    items.extend(rows);
    items
}

fn handout_row(row: ElementRef<'_>, base: &Url) -> Option<ContentItem> {
    let cells: Vec<ElementRef<'_>> = row.child_elements().collect();
    let first = cells.first()?;
    let last = cells.last()?;

    let href = last
        .select(&ANCHOR_SEL)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))?;
    let address = absolutize_url(href, base)?;
    Some(ContentItem::entry(element_text(*first), address))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SYLLABUS_HTML: &str = r#"
        <table>
          <thead><tr><th>Week</th><th>Topic</th><th>Download</th></tr></thead>
          <tbody>
            <tr><td> Week 1 </td><td>CRUD</td><td><a href="/static/handouts/week1.pdf">pdf</a></td></tr>
            <tr><td>Week 2</td><td>Schema design</td><td>coming soon</td></tr>
            <tr><td>Week 3</td><td>Indexes</td><td><a href="https://cdn.example.com/week3.zip">zip</a></td></tr>
          </tbody>
        </table>
    "#;

    fn base() -> Url {
        Url::parse("https://university.example.com").unwrap()
    }

    #[test]
    fn test_rows_with_links_get_controls_prepended() {
        let items = extract_handout_table(&Html::parse_document(SYLLABUS_HTML), &base());
        assert_eq!(items.len(), 4);
        assert_eq!(
            items[0],
            ContentItem::Control {
                control: Control::All,
                label: "All".to_string(),
                checked: true
            }
        );
        assert!(matches!(
            items[1],
            ContentItem::Control {
                control: Control::Cancel,
                checked: false,
                ..
            }
        ));
        assert_eq!(
            items[2],
            ContentItem::entry(
                "Week 1",
                "https://university.example.com/static/handouts/week1.pdf"
            )
        );
        assert_eq!(
            items[3],
            ContentItem::entry("Week 3", "https://cdn.example.com/week3.zip")
        );
    }

    #[test]
    fn test_table_without_links_has_no_controls() {
        let html = "<table><tbody><tr><td>Week 1</td><td>tba</td></tr></tbody></table>";
        let items = extract_handout_table(&Html::parse_document(html), &base());
        assert!(items.is_empty());
    }

    #[test]
    fn test_page_without_table_is_empty() {
        let items = extract_handout_table(&Html::parse_document("<p>No handouts</p>"), &base());
        assert!(items.is_empty());
    }
}
