use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagemark_core::{EditorConfig, EditorSession};
use pagemark_storage::{apply_env_overrides, load_config_file, Storage, StorageError};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod script;

use script::{Replay, Script};

#[derive(Debug, Parser)]
#[command(name = "pagemark")]
#[command(about = "Pagemark overlay model driver")]
pub struct Cli {
    /// Log overlay model decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a session event script and print the processing plan.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Editor config file, instead of the saved one.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Fail on the first capacity error instead of reporting it.
        #[arg(long)]
        strict: bool,
    },
    /// Print the effective editor configuration.
    Config {
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Replay { script, config, strict } => {
            run_replay(&script, config.as_deref(), strict)
        }
        Commands::Config { config } => {
            let config = resolve_config(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };

    // a second init in the same process keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_replay(script_path: &Path, config_path: Option<&Path>, strict: bool) -> Result<()> {
    ensure_file_exists(script_path)?;

    let config = resolve_config(config_path)?;
    let raw = fs::read(script_path)
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script: Script = serde_json::from_slice(&raw)
        .with_context(|| format!("invalid script {}", script_path.display()))?;

    debug!(events = script.events.len(), "script loaded");

    let report = Replay::new(EditorSession::new(config), script.surface)
        .strict(strict)
        .run(script.events)?;

    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");

    Ok(())
}

/// Explicit file, else the saved config, then `PAGEMARK_*` overrides
fn resolve_config(path: Option<&Path>) -> Result<EditorConfig> {
    let config = match path {
        Some(path) => {
            ensure_file_exists(path)?;
            load_config_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => load_saved_config()?,
    };

    apply_env_overrides(config).context("invalid configuration override")
}

fn load_saved_config() -> Result<EditorConfig> {
    let storage = match std::env::var_os("PAGEMARK_DATA_DIR") {
        Some(root) => Storage::with_root(root),
        None => match Storage::from_default_project() {
            Ok(storage) => storage,
            Err(StorageError::NoDataDirectory) => return Ok(EditorConfig::default()),
            Err(error) => return Err(error.into()),
        },
    };

    storage
        .load_config()
        .with_context(|| format!("failed to load config from {}", storage.root().display()))
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
