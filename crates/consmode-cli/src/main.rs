//! Consmode CLI
//!
//! One-shot command-line surface for the battery conservation flag, for
//! scripting and headless use. Same startup checks as the TUI: privilege
//! first, then hardware support, either failing with exit code 1 before
//! the control path is touched.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use consmode_config::ConsmodeConfig;
use consmode_hal::{privilege, probe, ControlError, HelperWriter, PrivilegedWriter, StateStore};

#[derive(Parser)]
#[command(name = "consmode", version, about = "Control battery conservation mode")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current conservation mode state
    Status,
    /// Enable conservation mode
    Enable,
    /// Disable conservation mode
    Disable,
}

/// Privilege guard, then capability probe.
fn startup_checks() -> Result<PathBuf, ControlError> {
    if !privilege::has_elevated_rights() {
        return Err(ControlError::NotPrivileged);
    }

    let control_path = probe::resolve_control_path();
    if !probe::control_path_exists(&control_path) {
        return Err(ControlError::UnsupportedDevice(control_path));
    }

    Ok(control_path)
}

/// Write the requested state, then report ground truth regardless of how
/// the write went. Returns the process exit code.
fn set_mode(store: &StateStore, config: &ConsmodeConfig, enable: bool) -> i32 {
    let result = HelperWriter::new(store.control_path(), config.helper.command.as_deref())
        .and_then(|writer| writer.write_flag(enable));

    // Re-read unconditionally; the displayed state is never assumed from
    // the requested value.
    let state = store.read();

    match result {
        Ok(()) => {
            let verb = if enable { "enabled" } else { "disabled" };
            info!("conservation mode {}", verb);
            println!("Conservation mode {}", verb);
            println!("Current status: {}", state);
            0
        }
        Err(e) => {
            error!("write failed: {}", e);
            eprintln!("consmode: error setting conservation mode: {e}");
            println!("Current status: {}", state);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match ConsmodeConfig::load_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("consmode: {e}");
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.surface.log_filter.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let control_path = match startup_checks() {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            eprintln!("consmode: {e}");
            std::process::exit(1);
        }
    };

    let store = StateStore::new(control_path);

    let code = match cli.command {
        Commands::Status => {
            println!("Conservation mode: {}", store.read());
            0
        }
        Commands::Enable => set_mode(&store, &config, true),
        Commands::Disable => set_mode(&store, &config, false),
    };

    std::process::exit(code);
}
