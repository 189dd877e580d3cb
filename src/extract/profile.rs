//! Profile page (`/edit_profile`) extraction.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::model::{Choice, Profile};
use crate::utils::compile_static_selector;

use super::element_text;

static PROVIDER_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"select[name="provider"]"#));
static LANGUAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"select[name="language"]"#));
static OPTION_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("option"));
static SELECTED_OPTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("option[selected]"));
static FIRST_NAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"input[name="first_name"]"#));
static LAST_NAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"input[name="last_name"]"#));
static USERNAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"input[name="username"]"#));

/// Reads the profile form. Missing fields become empty strings.
#[must_use]
pub fn extract_profile(doc: &Html) -> Profile {
    Profile {
        first_name: input_value(doc, &FIRST_NAME_SEL),
        last_name: input_value(doc, &LAST_NAME_SEL),
        username: input_value(doc, &USERNAME_SEL),
        video_provider: selected_choice(doc, &PROVIDER_SEL),
        language: selected_choice(doc, &LANGUAGE_SEL),
    }
}

/// The option a browser would submit: the first `selected` one, else the
/// first option of a single-choice select.
fn selected_choice(doc: &Html, select_selector: &Selector) -> Choice {
    let Some(select) = doc.select(select_selector).next() else {
        return Choice::default();
    };
    select
        .select(&SELECTED_OPTION_SEL)
        .next()
        .or_else(|| {
            if select.value().attr("multiple").is_some() {
                None
            } else {
                select.select(&OPTION_SEL).next()
            }
        })
        .map(|option| {
            let label = element_text(option);
            // An option without a value attribute submits its text.
            let value = option
                .value()
                .attr("value")
                .map_or_else(|| label.clone(), ToString::to_string);
            Choice { label, value }
        })
        .unwrap_or_default()
}

fn input_value(doc: &Html, selector: &Selector) -> String {
    doc.select(selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .unwrap_or_default()
        .to_string()
}
