//! Command-line interface for fieldnotes.
//!
//! This module provides the CLI structure and command handlers for the
//! `fnote` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ClearCommand, ConfigCommand, DeleteCommand, IdSourceArg, ListCommand,
    OutputFormat, PageCommand, ShowCommand, StatusCommand,
};

use crate::logging::Verbosity;

/// fnote - Offline-first field notes
///
/// Keeps notes with an optional location and photo on this device.
/// Nothing is sent over the network.
#[derive(Debug, Parser)]
#[command(name = "fnote")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a note
    Add(AddCommand),

    /// List notes, newest first
    List(ListCommand),

    /// Show one note
    Show(ShowCommand),

    /// Delete a note
    Delete(DeleteCommand),

    /// Delete all notes
    Clear(ClearCommand),

    /// Render the application page as HTML
    Page(PageCommand),

    /// Show storage and connectivity status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            return Verbosity::Quiet;
        }
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    }
}
