//! Band listing.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;

use super::common::load_session;

#[derive(Args)]
pub struct SeriesArgs {
    /// Factory session name or path to a session file
    #[arg(default_value = "multiband")]
    session: String,
}

pub fn run(args: SeriesArgs) -> anyhow::Result<()> {
    let session = load_session(&args.session)?;
    let parts = session.build()?;
    let registry = &parts.registry;

    println!("Bands in '{}' ({}):", session.name, registry.len());
    println!();
    println!(
        "  {:16}  {:26}  {:8}  {:6}  {}",
        "Key", "Frequency (Hz)", "Group", "Style", "Visible"
    );
    println!(
        "  {:16}  {:26}  {:8}  {:6}  {}",
        "---", "--------------", "-----", "-----", "-------"
    );

    for key in registry.keys() {
        let Some(desc) = registry.descriptor(key) else {
            continue;
        };
        let frequency = desc
            .frequency
            .values()
            .iter()
            .map(|nu| format!("{nu:.4e}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {:16}  {:26}  {:8}  {:6}  {}",
            key,
            frequency,
            desc.group.name(),
            desc.style.pattern(),
            if desc.visible { "yes" } else { "no" }
        );
    }

    println!();
    println!(
        "Time grid: {} samples, {:.3e} s to {:.3e} s",
        parts.grid.len(),
        parts.grid.as_slice().first().copied().unwrap_or_default(),
        parts.grid.as_slice().last().copied().unwrap_or_default()
    );

    Ok(())
}
