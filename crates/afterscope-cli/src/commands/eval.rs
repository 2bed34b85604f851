//! One-shot headless evaluation.

use std::path::PathBuf;

use afterscope_core::ControlEvent;
use clap::Args;

use super::common::{Frame, assignment_event, load_session, open_explorer, parse_key_val, write_output};

#[derive(Args)]
pub struct EvalArgs {
    /// Factory session name or path to a session file
    #[arg(default_value = "multiband")]
    session: String,

    /// Move a control before evaluating (e.g. log10_E0=52, "Jet Type=Gaussian")
    #[arg(short, long = "set", value_parser = parse_key_val)]
    set: Vec<(String, String)>,

    /// Show a band hidden by default
    #[arg(long)]
    show: Vec<String>,

    /// Hide a band
    #[arg(long)]
    hide: Vec<String>,

    /// Write the frame to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a one-line summary per band instead of JSON
    #[arg(long)]
    summary: bool,
}

pub fn run(args: EvalArgs) -> anyhow::Result<()> {
    let session = load_session(&args.session)?;
    let mut explorer = open_explorer(&session)?;

    let mut events = Vec::with_capacity(args.set.len() + args.show.len() + args.hide.len());
    for (control, value) in &args.set {
        events.push(assignment_event(&session, control, value)?);
    }
    events.extend(args.show.iter().map(|key| ControlEvent::visibility(key, true)));
    events.extend(args.hide.iter().map(|key| ControlEvent::visibility(key, false)));

    let mut outcome = explorer.dispatch_batch(events);
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    // Nothing changed: still draw the defaults once.
    let report = match outcome.report.take() {
        Some(report) => report,
        None => explorer.refresh(),
    };
    for failure in &report.failures {
        eprintln!("warning: {failure}");
    }

    let frame = Frame::capture(&session.name, &explorer);

    if args.summary {
        for s in &frame.series {
            let peak = s
                .points
                .iter()
                .max_by(|a, b| a[1].total_cmp(&b[1]))
                .map_or_else(|| "-".to_string(), |p| format!("{:.3e} mJy at {:.3e} s", p[1], p[0]));
            println!(
                "{:16} {:8} {}",
                s.key,
                if s.visible { "visible" } else { "hidden" },
                peak
            );
        }
        return Ok(());
    }

    let text = serde_json::to_string_pretty(&frame)?;
    write_output(&text, args.output.as_deref())
}
