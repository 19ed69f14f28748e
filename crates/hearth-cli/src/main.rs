use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;

use commands::Workspace;

/// Default log directive when RUST_LOG is unset.
const DEFAULT_FILTER: &str = "warn,hearth=info";

#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(version, about = "Hearth - inspect and repair persisted session and preference state", long_about = None)]
struct Cli {
    /// Keep config, stores and exports in this directory instead of the platform defaults
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show session, settings and store health
    Status,
    /// Log in against the configured directory
    Login {
        identifier: String,
        secret: String,
    },
    /// Create a new identity and log in as it
    Signup(commands::session::SignupArgs),
    /// End the current session
    Logout,
    /// Show or change the theme
    Theme {
        /// dark, light or toggle
        value: Option<String>,
    },
    /// Show or change the interface language
    Language {
        /// ISO 639-1 code, e.g. fr or pt-BR
        code: Option<String>,
    },
    /// Inspect and manage the model catalog
    Model {
        #[command(subcommand)]
        action: commands::model::ModelAction,
    },
    /// Read or update free-form preferences
    Prefs {
        #[command(subcommand)]
        action: commands::settings::PrefsAction,
    },
    /// Show the saved scroll offset, or record a new one
    Scroll { offset: Option<u32> },
    /// Write a versioned snapshot of all persisted state
    Export {
        /// Output file; `-` for stdout. Defaults to the exports directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace persisted state with a snapshot
    Import {
        /// Snapshot file; `-` for stdin
        input: PathBuf,
    },
    /// Delete all persisted state
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let workspace = Workspace::open(cli.data_dir, cli.config)?;

    match cli.command {
        Commands::Status => commands::status::show(&workspace)?,
        Commands::Login { identifier, secret } => {
            commands::session::login(&workspace, &identifier, &secret)?
        }
        Commands::Signup(args) => commands::session::signup(&workspace, args)?,
        Commands::Logout => commands::session::logout(&workspace)?,
        Commands::Theme { value } => commands::settings::theme(&workspace, value.as_deref())?,
        Commands::Language { code } => commands::settings::language(&workspace, code.as_deref())?,
        Commands::Model { action } => commands::model::run(&workspace, action)?,
        Commands::Prefs { action } => commands::settings::prefs(&workspace, action)?,
        Commands::Scroll { offset } => commands::settings::scroll(&workspace, offset)?,
        Commands::Export { output } => commands::snapshot::export(&workspace, output)?,
        Commands::Import { input } => commands::snapshot::import(&workspace, &input)?,
        Commands::Reset { yes } => commands::snapshot::reset(&workspace, yes)?,
    }

    Ok(())
}
