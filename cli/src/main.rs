//! portview - see what is listening on localhost
//!
//! An interactive view of local TCP servers with filtering, labels,
//! health checks and process termination, plus scriptable subcommands.

mod commands;
mod format;
mod tui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use portview_core::ConfigStore;
use tracing_subscriber::EnvFilter;

/// Log to this file instead of discarding logs while the TUI is open.
const LOG_FILE_ENV: &str = "PORTVIEW_LOG";

#[derive(Parser)]
#[command(name = "portview")]
#[command(author, version, about = "See and manage TCP servers listening on localhost")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all listening servers
    #[command(alias = "ls")]
    List,

    /// Kill the process listening on a port
    Kill {
        /// Port number to kill
        port: u16,

        /// Force kill (SIGKILL) instead of SIGTERM
        #[arg(short, long)]
        force: bool,
    },

    /// Manage port labels
    Label {
        #[command(subcommand)]
        action: LabelAction,
    },

    /// Manage hidden ports
    Hidden {
        #[command(subcommand)]
        action: HiddenAction,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum LabelAction {
    /// Set the label for a port
    Set { port: u16, text: String },
    /// Remove the label for a port
    #[command(alias = "rm")]
    Remove { port: u16 },
}

#[derive(Subcommand)]
enum HiddenAction {
    /// Hide a port from the list
    Add { port: u16 },
    /// Show a hidden port again
    #[command(alias = "rm")]
    Remove { port: u16 },
    /// List hidden ports
    #[command(alias = "ls")]
    List,
}

/// Install the global subscriber.
///
/// The TUI owns the terminal, so it logs to `$PORTVIEW_LOG` or nowhere;
/// subcommands log to stderr.
fn init_logging(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let log_file = std::env::var_os(LOG_FILE_ENV)
        .filter(|path| !path.is_empty())
        .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok());

    match log_file {
        Some(file) => {
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        None if interactive => {
            let _ = builder.with_writer(io::sink).try_init();
        }
        None => {
            let _ = builder.with_writer(io::stderr).try_init();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let interactive =
        cli.command.is_none() && !cli.no_tui && atty::is(atty::Stream::Stdout);
    init_logging(interactive);

    let store = match cli.config {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    };

    match cli.command {
        Some(Commands::List) => commands::list::run(&store, cli.json).await?,
        Some(Commands::Kill { port, force }) => {
            commands::kill::run(&store, port, force).await?;
        }
        Some(Commands::Label { action }) => match action {
            LabelAction::Set { port, text } => commands::label::set(&store, port, &text).await?,
            LabelAction::Remove { port } => commands::label::remove(&store, port).await?,
        },
        Some(Commands::Hidden { action }) => match action {
            HiddenAction::Add { port } => commands::hidden::add(&store, port).await?,
            HiddenAction::Remove { port } => commands::hidden::remove(&store, port).await?,
            HiddenAction::List => commands::hidden::list(&store, cli.json).await?,
        },
        Some(Commands::Config) => commands::config::show(&store, cli.json).await?,
        None => {
            if interactive {
                // A malformed config is fatal before the terminal is taken over
                let config = store.load().await?;
                tui::run(config, store).await?;
            } else {
                commands::list::run(&store, cli.json).await?;
            }
        }
    }

    Ok(())
}
