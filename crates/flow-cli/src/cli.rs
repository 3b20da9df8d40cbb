//! Command-line surface

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use flow_core::models::{FontFamily, Theme};

#[derive(Parser)]
#[command(name = "flow")]
#[command(about = "Timed freewriting sessions from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start (or resume) a freewriting session in your editor
    Write {
        /// Entry id or unique id prefix to resume
        #[arg(long, value_name = "ID")]
        entry: Option<String>,
    },
    /// List past entries, newest first
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one entry in full
    Show {
        /// Entry id or unique id prefix
        id: String,
    },
    /// Delete an entry
    Delete {
        /// Entry id or unique id prefix
        id: String,
    },
    /// Inspect or change editor settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Manage the signed-in account
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Talk to the writing assistant
    Chat {
        /// Message (starts a REPL when omitted)
        message: Vec<String>,
        /// Entry id whose content is shared as document context
        #[arg(long, value_name = "ID")]
        entry: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the active settings
    Show,
    /// Change one or more settings
    Set {
        /// Editor font size in pixels (clamped to 14-48)
        #[arg(long)]
        font_size: Option<u32>,
        /// Editor font family
        #[arg(long, value_enum)]
        font: Option<FontArg>,
        /// Color theme
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,
        /// Fade the chrome during timed sessions
        #[arg(long)]
        zen: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and return to guest scope
    Logout,
    /// Show the signed-in account
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FontArg {
    Sans,
    Lato,
    Serif,
    Mono,
}

impl From<FontArg> for FontFamily {
    fn from(value: FontArg) -> Self {
        match value {
            FontArg::Sans => Self::Sans,
            FontArg::Lato => Self::Lato,
            FontArg::Serif => Self::Serif,
            FontArg::Mono => Self::Mono,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
