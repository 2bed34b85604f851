//! Session file management commands.
//!
//! Provides commands to list, show, validate and export sessions.

use std::path::{Path, PathBuf};

use afterscope_config::{SessionConfig, factory_sessions, validate_session};
use clap::{Args, Subcommand};

use super::common::load_session;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// List factory sessions
    List,

    /// Print a session as TOML
    Show {
        /// Factory session name or path
        name: String,
    },

    /// Check a session file and assemble it
    Validate {
        /// Factory session name or path
        name: String,
    },

    /// Write a session to a TOML file for customization
    Export {
        /// Factory session name or path
        source: String,

        /// Destination file
        path: PathBuf,

        /// Overwrite if the file already exists
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::List => list_sessions(),
        ConfigCommand::Show { name } => show_session(&name),
        ConfigCommand::Validate { name } => validate(&name),
        ConfigCommand::Export {
            source,
            path,
            force,
        } => export_session(&source, &path, force),
    }
}

fn list_sessions() -> anyhow::Result<()> {
    println!("Factory Sessions:");
    println!("=================");
    for session in factory_sessions() {
        let desc = session.description.as_deref().unwrap_or("");
        println!("  {:14} - {}", session.name, desc);
    }
    println!();
    println!("  Export one with: afterscope config export <name> <file.toml>");
    Ok(())
}

fn show_session(name: &str) -> anyhow::Result<()> {
    let session = load_session(name)?;
    print!("{}", session.to_toml()?);
    Ok(())
}

fn validate(name: &str) -> anyhow::Result<()> {
    let session = load_session(name)?;
    validate_session(&session)?;
    let parts = session.build()?;
    println!(
        "Session '{}' is valid: {} parameters, {} controls, {} bands, {} samples",
        session.name,
        parts.store.len(),
        parts.panel.control_ids().count(),
        parts.registry.len(),
        parts.grid.len()
    );
    Ok(())
}

fn export_session(source: &str, path: &Path, force: bool) -> anyhow::Result<()> {
    let session = load_session(source)?;

    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    session.save(path)?;
    // Re-read to make sure the written file loads.
    SessionConfig::load(path)?;
    println!("Exported '{}' to {}", session.name, path.display());
    Ok(())
}
