//! `fnote` - CLI for fieldnotes
//!
//! This binary provides the command-line interface for adding, listing and
//! deleting field notes and for rendering the application page.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;

use fieldnotes::app::{Action, AlwaysConfirm, App, Outcome};
use fieldnotes::capture::snapshot::{decode_data_url, extension_for};
use fieldnotes::capture::{FixedLocator, StillImageCamera};
use fieldnotes::cli::{
    AddCommand, ClearCommand, Cli, Command, ConfigCommand, DeleteCommand, ListCommand,
    OutputFormat, PageCommand, ShowCommand,
};
use fieldnotes::compose::SAVED_MESSAGE;
use fieldnotes::network::{self, Connectivity};
use fieldnotes::{init_logging, Config, GeoPoint, KeyValueStore, SqliteStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Add(cmd) => handle_add(&config, cmd, cli.quiet).await,
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Show(cmd) => handle_show(&config, &cmd),
        Command::Delete(cmd) => handle_delete(&config, cmd).await,
        Command::Clear(cmd) => handle_clear(&config, &cmd).await,
        Command::Page(cmd) => handle_page(&config, cmd).await,
        Command::Status(cmd) => handle_status(&config, cmd.json).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_app(config: &Config) -> anyhow::Result<App<SqliteStore>> {
    let path = config.database_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("failed to open notes database at {}", path.display()))?;
    Ok(App::new(store, config))
}

/// Ask a yes/no question on stderr and read the answer from stdin.
fn prompt_yes_no(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn handle_add(config: &Config, cmd: AddCommand, quiet: bool) -> anyhow::Result<()> {
    let mut app = open_app(config)?.with_id_source(cmd.id_source.into());

    let location = match (cmd.lat, cmd.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };
    if let Some(point) = location {
        app = app.with_locator(FixedLocator::new(point));
    }
    if let Some(photo) = &cmd.photo {
        app = app.with_camera(StillImageCamera::new(photo));
    }

    app.dispatch(Action::Navigate("#/add".to_string())).await?;
    app.dispatch(Action::EditTitle(cmd.title)).await?;
    app.dispatch(Action::EditText(cmd.text)).await?;

    if location.is_some() {
        if let Outcome::Message(message) = app.dispatch(Action::RequestLocation).await? {
            bail!(message);
        }
    }

    if cmd.photo.is_some() {
        if let Outcome::Message(message) = app.dispatch(Action::StartCamera).await? {
            bail!(message);
        }
        if let Outcome::Message(message) = app.dispatch(Action::TakeSnapshot).await? {
            bail!(message);
        }
        app.dispatch(Action::StopCamera).await?;
    }

    match app.dispatch(Action::SaveNote).await? {
        Outcome::Saved(note) => {
            if quiet {
                println!("{}", note.id);
            } else {
                println!("{SAVED_MESSAGE} {}", note.id);
            }
            Ok(())
        }
        Outcome::Message(message) => bail!(message),
        other => bail!("unexpected outcome while saving: {other:?}"),
    }
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let app = open_app(config)?;
    let notes = app.repo().load()?;

    match cmd.format {
        OutputFormat::Plain => print!("{}", app.renderer().render_plain(&notes)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notes)?),
        OutputFormat::Html => print!("{}", app.renderer().render_notes(&notes)),
    }
    Ok(())
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let app = open_app(config)?;
    let Some(note) = app.repo().get(&cmd.id)? else {
        bail!("no note with id {}", cmd.id);
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        print!("{}", app.renderer().render_plain(std::slice::from_ref(&note)));
    }

    if let Some(out) = &cmd.photo_out {
        let Some(data_url) = &note.photo_data_url else {
            bail!("note {} has no photo", note.id);
        };
        let Some((mime, bytes)) = decode_data_url(data_url) else {
            bail!("note {} has an unreadable photo", note.id);
        };
        write_photo(out, &mime, &bytes)?;
    }
    Ok(())
}

fn write_photo(out: &Path, mime: &str, bytes: &[u8]) -> anyhow::Result<()> {
    let path = if out.extension().is_some() {
        out.to_path_buf()
    } else {
        out.with_extension(extension_for(mime))
    };
    std::fs::write(&path, bytes)
        .with_context(|| format!("failed to write photo to {}", path.display()))?;
    eprintln!("Photo written to {}", path.display());
    Ok(())
}

async fn handle_delete(config: &Config, cmd: DeleteCommand) -> anyhow::Result<()> {
    let mut app = open_app(config)?;
    if app.repo().get(&cmd.id)?.is_none() {
        println!("No note with id {}", cmd.id);
        return Ok(());
    }

    app = if cmd.yes {
        app.with_confirm(AlwaysConfirm)
    } else {
        app.with_confirm(|prompt: &str| prompt_yes_no(prompt))
    };

    match app.dispatch(Action::DeleteNote(cmd.id)).await? {
        Outcome::Deleted(removed) => println!("Deleted {removed} note(s)."),
        Outcome::Declined => println!("Cancelled."),
        other => bail!("unexpected outcome while deleting: {other:?}"),
    }
    Ok(())
}

async fn handle_clear(config: &Config, cmd: &ClearCommand) -> anyhow::Result<()> {
    let mut app = open_app(config)?;
    let count = app.repo().count()?;

    if !cmd.yes && !prompt_yes_no(&format!("Delete all {count} notes?")) {
        println!("Cancelled.");
        return Ok(());
    }

    app.dispatch(Action::ClearAll).await?;
    println!("Cleared {count} note(s).");
    Ok(())
}

async fn connectivity(config: &Config, online: bool, offline: bool) -> Connectivity {
    if online {
        Connectivity::Online
    } else if offline {
        Connectivity::Offline
    } else {
        network::probe(&config.network.probe_addr, config.probe_timeout()).await
    }
}

async fn handle_page(config: &Config, cmd: PageCommand) -> anyhow::Result<()> {
    let mut app = open_app(config)?;
    let status = connectivity(config, cmd.online, cmd.offline).await;

    app.dispatch(Action::Navigate(cmd.view)).await?;
    app.dispatch(Action::SetConnectivity(status)).await?;
    let html = app.render_page()?;

    match &cmd.out {
        Some(path) => {
            std::fs::write(path, html)
                .with_context(|| format!("failed to write page to {}", path.display()))?;
            eprintln!("Page written to {}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let app = open_app(config)?;
    let store = app.repo().store();
    let count = app.repo().count()?;
    let updated_at = store.updated_at(app.repo().key())?;
    let stored = store.get(app.repo().key())?.is_some();
    let status = connectivity(config, false, false).await;

    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "database_bytes": store.size_bytes(),
            "notes_key": app.repo().key(),
            "stored": stored,
            "note_count": count,
            "updated_at": updated_at,
            "connectivity": status,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("fnote status");
        println!("------------");
        println!("Database:      {}", store.path().display());
        println!("Size:          {} bytes", store.size_bytes());
        println!("Notes key:     {}", app.repo().key());
        println!("Notes:         {count}");
        println!(
            "Last write:    {}",
            updated_at.as_deref().unwrap_or("never")
        );
        println!("Connectivity:  {status}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Notes key:          {}", config.storage.notes_key);
                println!();
                println!("[Capture]");
                println!("  Geo timeout (ms):   {}", config.capture.geo_timeout_ms);
                println!("  High accuracy:      {}", config.capture.high_accuracy);
                println!("  JPEG quality:       {}", config.capture.jpeg_quality);
                println!(
                    "  Fallback size:      {}x{}",
                    config.capture.fallback_width, config.capture.fallback_height
                );
                println!();
                println!("[Render]");
                println!("  Timestamp format:   {}", config.render.timestamp_format);
                println!("  Use UTC:            {}", config.render.use_utc);
                println!();
                println!("[Network]");
                println!("  Probe address:      {}", config.network.probe_addr);
                println!("  Probe timeout (ms): {}", config.network.probe_timeout_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
