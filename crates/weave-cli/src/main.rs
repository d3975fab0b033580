//! Weave CLI
//!
//! Command-line interface for Weave - plain-text notes in a Markdown vault.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use weave_core::{Config, NoteStore, StoreError};

mod commands;
mod editor;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "weave")]
#[command(about = "Weave - plain-text notes in a Markdown vault")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the notes vault (defaults to ./notes)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    /// Editor command used for note bodies
    #[arg(long, global = true)]
    editor: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new note
    #[command(alias = "add")]
    New {
        /// Note title
        title: String,
        /// Note body (opens editor or reads stdin if not provided)
        #[arg(short, long)]
        body: Option<String>,
        /// Tags to add
        #[arg(short, long)]
        tag: Vec<String>,
        /// Declared links to other notes (by ID)
        #[arg(short, long)]
        link: Vec<String>,
    },
    /// Show a note
    Show {
        /// Note ID
        id: String,
    },
    /// Edit a note (opens editor when no field is given)
    Edit {
        /// Note ID
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New body
        #[arg(short, long)]
        body: Option<String>,
        /// Replace tags
        #[arg(short, long)]
        tag: Vec<String>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// List all notes
    #[command(alias = "ls")]
    List {
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// List all tags
    Tags,
    /// Show the [[links]] written in a note's body
    Links {
        /// Note ID
        id: String,
    },
    /// Print the file path of a note
    Path {
        /// Note ID
        id: String,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (vault_dir, editor, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<StoreError>())
            .and_then(StoreError::recovery_suggestion)
        {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let mut config = Config::load_with_cli_override(cli.config_file.as_ref())
        .context("Failed to load configuration")?;

    logging::init(cli.verbose, config.log_file.as_deref());

    // Config commands work on the file as saved, without flag overrides
    let command = match cli.command {
        Commands::Config { command } => {
            return handle_config_command(command, cli.config_file.as_ref(), &output);
        }
        command => command,
    };

    config.apply_overrides(cli.vault, cli.editor);
    config.resolve_vault()?;
    config.ensure_vault_dir()?;

    let store = NoteStore::open_with_config(&config);
    tracing::debug!("Using vault {:?}", store.root());

    match command {
        Commands::New {
            title,
            body,
            tag,
            link,
        } => commands::note::create(&store, &config, title, body, tag, link, &output),
        Commands::Show { id } => commands::note::show(&store, id, &output),
        Commands::Edit {
            id,
            title,
            body,
            tag,
        } => commands::note::edit(&store, &config, id, title, body, tag, &output),
        Commands::Delete { id, force } => commands::note::delete(&store, id, force, &output),
        Commands::List { tag } => commands::note::list(&store, tag, &output),
        Commands::Tags => commands::tag::list(&store, &output),
        Commands::Links { id } => commands::link::show(&store, id, &output),
        Commands::Path { id } => commands::note::path(&store, id, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
