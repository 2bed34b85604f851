//! Parameter and control listing.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use afterscope_core::{Domain, ParamDescriptor};
use clap::Args;

use super::common::{load_session, value_json};

#[derive(Args)]
pub struct ParamsArgs {
    /// Factory session name or path to a session file
    #[arg(default_value = "multiband")]
    session: String,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn domain_text(desc: &ParamDescriptor) -> String {
    match &desc.domain {
        Domain::Continuous { min, max, scale } if min == max => {
            format!("fixed ({})", scale.name())
        }
        Domain::Continuous { min, max, scale } => format!("[{min}, {max}] {}", scale.name()),
        Domain::Discrete { variants } => variants.join(" | "),
        Domain::Flag => "on | off".to_string(),
    }
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let session = load_session(&args.session)?;
    let parts = session.build()?;

    if args.json {
        let entries: Vec<serde_json::Value> = parts
            .store
            .iter()
            .map(|(desc, value)| {
                serde_json::json!({
                    "name": desc.name,
                    "control": parts.panel.find(&desc.label).map(|_| desc.label.as_str()),
                    "domain": domain_text(desc),
                    "default": value_json(&desc.default),
                    "value": value_json(value),
                    "unit": desc.unit.suffix().trim(),
                    "group": desc.group,
                    "override": desc.override_value,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Session: {}", session.name);
    println!("{}", "=".repeat(9 + session.name.len()));
    if let Some(desc) = &session.description {
        println!("{desc}");
    }
    println!();
    println!(
        "  {:12}  {:18}  {:28}  {:22}  {}",
        "Name", "Control", "Domain", "Default", "Unit"
    );
    println!(
        "  {:12}  {:18}  {:28}  {:22}  {}",
        "----", "-------", "------", "-------", "----"
    );

    for (desc, _) in parts.store.iter() {
        let control = if parts.panel.find(&desc.label).is_some() {
            desc.label.as_str()
        } else {
            "-"
        };
        let default = match desc.override_value {
            Some(v) => format!("{} (off: {v})", desc.default),
            None => desc.default.to_string(),
        };
        println!(
            "  {:12}  {:18}  {:28}  {:22}  {}",
            desc.name,
            control,
            domain_text(desc),
            default,
            desc.unit.suffix().trim()
        );
    }

    println!();
    println!("Controls: {}", parts.panel.control_ids().collect::<Vec<_>>().join(", "));

    Ok(())
}
