//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::compose::IdSource;

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Note title
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Note description
    #[arg(short = 'x', long, default_value = "")]
    pub text: String,

    /// Latitude of the location fix
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the location fix
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Image file used as the camera source for the photo
    #[arg(short, long, value_name = "FILE")]
    pub photo: Option<PathBuf>,

    /// How the note id is generated
    #[arg(long, value_enum, default_value = "random")]
    pub id_source: IdSourceArg,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Id of the note
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Write the note's photo to this file
    #[arg(long, value_name = "FILE")]
    pub photo_out: Option<PathBuf>,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the note
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Page command arguments.
#[derive(Debug, Args)]
pub struct PageCommand {
    /// Location fragment of the view to show (e.g. "#/add")
    #[arg(long, default_value = "#/")]
    pub view: String,

    /// Render as offline without probing
    #[arg(long, conflicts_with = "online")]
    pub offline: bool,

    /// Render as online without probing
    #[arg(long)]
    pub online: bool,

    /// Write the page to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Id source argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum IdSourceArg {
    /// Random UUID
    #[default]
    Random,
    /// Creation time in milliseconds
    Timestamp,
}

impl From<IdSourceArg> for IdSource {
    fn from(arg: IdSourceArg) -> Self {
        match arg {
            IdSourceArg::Random => Self::Random,
            IdSourceArg::Timestamp => Self::Timestamp,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
    /// HTML list items
    Html,
}
