//! Data model shared by the extractors and the pipeline.

use std::fmt;

use serde::Serialize;

/// Login credentials. The password is never printed.
#[derive(Clone)]
pub struct Credentials {
    /// Account email address.
    pub email: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the password. Avoid logging the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Which kind of course content the caller is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    /// Course wiki articles listing video and playlist links.
    #[default]
    Wiki,
    /// Courseware navigation with embedded videos.
    Courseware,
    /// Handout tables on the syllabus page.
    Handouts,
}

impl ContentMode {
    /// Suffix appended to a rewritten course link for this mode.
    #[must_use]
    pub fn course_suffix(self) -> &'static str {
        match self {
            Self::Wiki => "course_wiki",
            Self::Courseware => "courseware",
            Self::Handouts => "syllabus",
        }
    }
}

/// A `(label, value)` pair read from a selected `<option>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Visible option text.
    pub label: String,
    /// Submitted option value.
    pub value: String,
}

/// Snapshot of the account profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub video_provider: Choice,
    pub language: Choice,
}

/// Dashboard tab holding a group of enrolled courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabId {
    Current,
    Completed,
}

impl TabId {
    /// The element id of the tab panel on the dashboard.
    #[must_use]
    pub fn panel_id(self) -> &'static str {
        match self {
            Self::Current => "tab-current",
            Self::Completed => "tab-completed",
        }
    }
}

/// A course listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseEntry {
    pub title: String,
    /// Absolute content-page URL for the requested mode.
    pub url: String,
}

/// Note shown by the dashboard when a tab holds no courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyCoursesNote {
    /// The message text with whitespace normalized.
    pub message: String,
    /// Absolute link to the course catalogue.
    pub find_courses_url: String,
}

impl fmt::Display for EmptyCoursesNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}.", self.message, self.find_courses_url)
    }
}

/// Courses of one dashboard tab, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSection {
    pub tab: TabId,
    pub entries: Vec<CourseEntry>,
    pub empty_note: Option<EmptyCoursesNote>,
}

/// Synthetic multi-select entries placed ahead of handout rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    All,
    Cancel,
}

/// One selectable item of a course index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentItem {
    /// A unit, chapter, handout or video with its address.
    Entry { label: String, address: String },
    /// A multi-select control entry.
    Control {
        control: Control,
        label: String,
        checked: bool,
    },
}

impl ContentItem {
    /// Creates an addressable entry.
    #[must_use]
    pub fn entry(label: impl Into<String>, address: impl Into<String>) -> Self {
        Self::Entry {
            label: label.into(),
            address: address.into(),
        }
    }

    /// Visible label of the item.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Entry { label, .. } | Self::Control { label, .. } => label,
        }
    }

    /// Address of the item, `None` for control entries.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Entry { address, .. } => Some(address),
            Self::Control { .. } => None,
        }
    }
}

/// Items of a course index page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentList {
    pub items: Vec<ContentItem>,
    /// True when the items are final media or handout addresses, or when the
    /// page did not exist.
    pub terminal: bool,
}

impl ContentList {
    /// The empty, terminal list used for missing pages.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            items: Vec::new(),
            terminal: true,
        }
    }

    /// Addressable entries only, skipping controls.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items
            .iter()
            .filter_map(|item| item.address().map(|address| (item.label(), address)))
    }
}

/// Address of a video or handout resource.
pub type MediaRef = String;

/// Video preferences submitted to the profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub provider: String,
    pub language: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_mode_suffixes() {
        assert_eq!(ContentMode::Wiki.course_suffix(), "course_wiki");
        assert_eq!(ContentMode::Courseware.course_suffix(), "courseware");
        assert_eq!(ContentMode::Handouts.course_suffix(), "syllabus");
        assert_eq!(ContentMode::default(), ContentMode::Wiki);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(creds.password(), "hunter2");
    }

    #[test]
    fn test_empty_note_display() {
        let note = EmptyCoursesNote {
            message: "You are not enrolled in any courses. Find courses".to_string(),
            find_courses_url: "https://example.com/courses".to_string(),
        };
        assert_eq!(
            note.to_string(),
            "You are not enrolled in any courses. Find courses at https://example.com/courses."
        );
    }

    #[test]
    fn test_content_list_entries_skip_controls() {
        let list = ContentList {
            items: vec![
                ContentItem::Control {
                    control: Control::All,
                    label: "All".to_string(),
                    checked: true,
                },
                ContentItem::entry("Week 1", "https://example.com/w1.pdf"),
            ],
            terminal: true,
        };
        let entries: Vec<_> = list.entries().collect();
        assert_eq!(entries, vec![("Week 1", "https://example.com/w1.pdf")]);
    }

    #[test]
    fn test_content_item_serializes_with_kind_tag() {
        let json = serde_json::to_value(ContentItem::entry("Video", "https://a.com/v")).unwrap();
        assert_eq!(json["kind"], "entry");
        assert_eq!(json["address"], "https://a.com/v");
    }
}
