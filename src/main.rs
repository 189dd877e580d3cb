//! CLI entry point for coursegrab.

use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result, bail};
use clap::Parser;
use coursegrab_core::{
    ContentList, ContentMode, CourseSection, Credentials, InitOutcome, MediaRef, Pipeline,
    Preferences, TabId,
};
use serde::Serialize;
use tracing::{debug, info};

mod app_config;
mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(
        tab = ?args.tab,
        mode = ?args.mode(),
        course = ?args.course,
        unit = ?args.unit,
        "CLI arguments parsed"
    );

    let loaded = app_config::load_default_file_config()?;
    if loaded.loaded_from_file {
        debug!(path = ?loaded.path, "loaded config file");
    }
    let mut pipeline = Pipeline::new(loaded.config.site_config())?;

    if let Some(target) = &args.check_proxy {
        let description = pipeline.check_proxy(target).await?;
        return emit(&args, &description, |d| d.clone());
    }

    let user = args
        .user
        .clone()
        .or_else(|| loaded.config.user.clone())
        .context("No login email given. Pass --user or set `user` in the config file")?;
    let password = match &args.password {
        Some(password) => password.clone(),
        None => read_password_from_stdin()?,
    };
    let credentials = Credentials::new(user, password);

    let mode = args.mode();
    let tab = TabId::from(args.tab);
    let outcome = pipeline.init(&credentials, tab, mode).await?;
    info!(
        username = %outcome.profile.username,
        courses = outcome.section.entries.len(),
        "Logged in"
    );

    if let (Some(provider), Some(language)) = (&args.provider, &args.language) {
        let preferences = Preferences {
            provider: provider.clone(),
            language: language.clone(),
        };
        let response = pipeline.update_profile(&preferences).await?;
        emit(&args, &response, |value| format!("Preferences saved: {value}"))?;
    }

    let Some(course_number) = args.course else {
        return emit(&args, &outcome, render_outcome);
    };
    let course = pick(&outcome.section.entries, course_number, "course")?;
    info!(course = %course.title, "Opening course");

    let list = pipeline.get_list(&course.url, mode).await?;
    let Some(unit_number) = args.unit else {
        return emit(&args, &list, render_list);
    };
    if list.terminal && mode != ContentMode::Handouts {
        // Playlists already list final video addresses.
        return emit(&args, &list, render_list);
    }

    let units: Vec<(&str, &str)> = list.entries().collect();
    let (label, address) = *pick(&units, unit_number, "unit")?;
    info!(unit = %label, "Resolving media");
    let media = pipeline.list_videos(address, mode).await?;
    emit(&args, &media, render_media)
}

/// Reads the password from the first line of piped stdin.
fn read_password_from_stdin() -> Result<String> {
    if io::stdin().is_terminal() {
        bail!("No password given. Pass --password or pipe it on stdin");
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Empty password read from stdin");
    }
    Ok(password)
}

/// Picks the `number`-th (1-based) element.
fn pick<'a, T>(items: &'a [T], number: u16, what: &str) -> Result<&'a T> {
    let index = usize::from(number).saturating_sub(1);
    items.get(index).with_context(|| {
        format!(
            "No {what} number {number}: only {} available",
            items.len()
        )
    })
}

fn emit<T: Serialize>(args: &Args, value: &T, render: impl Fn(&T) -> String) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

fn render_outcome(outcome: &InitOutcome) -> String {
    let profile = &outcome.profile;
    let mut lines = vec![
        format!(
            "{} {} ({})",
            profile.first_name, profile.last_name, profile.username
        ),
        format!(
            "Video provider: {}  Language: {}",
            profile.video_provider.label, profile.language.label
        ),
    ];
    lines.push(render_section(&outcome.section));
    lines.join("\n")
}

fn render_section(section: &CourseSection) -> String {
    if let Some(note) = &section.empty_note {
        return note.to_string();
    }
    section
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| format!("{:>3}. {}  {}", index + 1, entry.title, entry.url))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_list(list: &ContentList) -> String {
    if list.items.is_empty() {
        return "No content found.".to_string();
    }
    list.entries()
        .enumerate()
        .map(|(index, (label, address))| format!("{:>3}. {label}  {address}", index + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(clippy::ptr_arg)]
fn render_media(media: &Vec<MediaRef>) -> String {
    if media.is_empty() {
        return "No media found.".to_string();
    }
    media.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use coursegrab_core::{ContentItem, CourseEntry, EmptyCoursesNote, Profile};

    #[test]
    fn test_pick_is_one_based() {
        let items = ["a", "b", "c"];
        assert_eq!(*pick(&items, 1, "course").unwrap(), "a");
        assert_eq!(*pick(&items, 3, "course").unwrap(), "c");
        let err = pick(&items, 4, "course").unwrap_err();
        assert!(err.to_string().contains("only 3 available"));
    }

    #[test]
    fn test_render_section_numbers_entries() {
        let section = CourseSection {
            tab: TabId::Current,
            entries: vec![CourseEntry {
                title: "M101J".to_string(),
                url: "https://example.com/courses/M101J/course_wiki".to_string(),
            }],
            empty_note: None,
        };
        assert_eq!(
            render_section(&section),
            "  1. M101J  https://example.com/courses/M101J/course_wiki"
        );
    }

    #[test]
    fn test_render_section_prefers_empty_note() {
        let section = CourseSection {
            tab: TabId::Completed,
            entries: Vec::new(),
            empty_note: Some(EmptyCoursesNote {
                message: "No courses yet.".to_string(),
                find_courses_url: "https://example.com/courses".to_string(),
            }),
        };
        assert_eq!(
            render_section(&section),
            "No courses yet. at https://example.com/courses."
        );
    }

    #[test]
    fn test_render_outcome_includes_profile() {
        let outcome = InitOutcome {
            profile: Profile {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                username: "ada".to_string(),
                ..Profile::default()
            },
            section: CourseSection {
                tab: TabId::Current,
                entries: Vec::new(),
                empty_note: None,
            },
        };
        assert!(render_outcome(&outcome).starts_with("Ada Lovelace (ada)"));
    }

    #[test]
    fn test_render_list_skips_controls() {
        let list = ContentList {
            items: vec![
                ContentItem::Control {
                    control: coursegrab_core::Control::All,
                    label: "All".to_string(),
                    checked: true,
                },
                ContentItem::entry("Week 1", "https://example.com/w1.pdf"),
            ],
            terminal: true,
        };
        assert_eq!(render_list(&list), "  1. Week 1  https://example.com/w1.pdf");
        assert_eq!(render_list(&ContentList::not_found()), "No content found.");
    }

    #[test]
    fn test_render_media_lines() {
        let media = vec!["http://a.com/1".to_string(), "http://a.com/2".to_string()];
        assert_eq!(render_media(&media), "http://a.com/1\nhttp://a.com/2");
    }
}
