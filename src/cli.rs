//! CLI argument definitions using clap derive macros.

use clap::{Parser, ValueEnum};

use coursegrab_core::{ContentMode, TabId};

/// Log in to the course site and list course videos and handouts.
///
/// Without `--course` the enrolled courses are printed. `--course N` lists
/// the units of the N-th course and `--unit N` resolves the media of the
/// N-th unit (both 1-based).
#[derive(Parser, Debug)]
#[command(name = "coursegrab")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Login email (falls back to `user` in the config file)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Login password (read from stdin when omitted)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Dashboard tab to list courses from
    #[arg(long, value_enum, default_value_t = TabArg::Current)]
    pub tab: TabArg,

    /// Browse courseware units instead of the course wiki
    #[arg(long, conflicts_with = "handouts")]
    pub courseware: bool,

    /// Browse syllabus handouts instead of the course wiki
    #[arg(long)]
    pub handouts: bool,

    /// Course to open, by position in the course list (1-based)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub course: Option<u16>,

    /// Unit to resolve, by position in the unit list (1-based)
    #[arg(long, requires = "course", value_parser = clap::value_parser!(u16).range(1..))]
    pub unit: Option<u16>,

    /// Video provider preference to save
    #[arg(long, requires = "language")]
    pub provider: Option<String>,

    /// Video language preference to save
    #[arg(long, requires = "provider")]
    pub language: Option<String>,

    /// Describe the server behind URL from its response headers and exit
    #[arg(long, value_name = "URL")]
    pub check_proxy: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Content mode selected by `--courseware` / `--handouts`.
    #[must_use]
    pub fn mode(&self) -> ContentMode {
        if self.courseware {
            ContentMode::Courseware
        } else if self.handouts {
            ContentMode::Handouts
        } else {
            ContentMode::Wiki
        }
    }
}

/// Dashboard tab names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TabArg {
    Current,
    Completed,
}

impl From<TabArg> for TabId {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Current => TabId::Current,
            TabArg::Completed => TabId::Completed,
        }
    }
}
