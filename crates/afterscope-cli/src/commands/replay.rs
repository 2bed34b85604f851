//! Replay of a scripted control-event sequence.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::common::{Frame, ReportSummary, load_session, open_explorer, write_output};
use crate::script::load_script;

#[derive(Args)]
pub struct ReplayArgs {
    /// Factory session name or path to a session file
    session: String,

    /// JSON script of control events
    script: PathBuf,

    /// Write the transcript to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct StepRecord {
    step: usize,
    events: usize,
    warnings: Vec<String>,
    recompute: Option<ReportSummary>,
}

#[derive(Serialize)]
struct Transcript {
    steps: Vec<StepRecord>,
    resets: u64,
    recomputes: u64,
    evaluations: u64,
    frame: Frame,
}

pub fn run(args: ReplayArgs) -> anyhow::Result<()> {
    let session = load_session(&args.session)?;
    let steps = load_script(&args.script)?;
    let mut explorer = open_explorer(&session)?;

    explorer.refresh();

    let mut records = Vec::with_capacity(steps.len());
    for (i, step) in steps.into_iter().enumerate() {
        let events = step.into_events();
        let count = events.len();
        let outcome = explorer.dispatch_batch(events);
        tracing::debug!(
            step = i + 1,
            events = count,
            recomputed = outcome.recomputed(),
            "replayed step"
        );
        records.push(StepRecord {
            step: i + 1,
            events: count,
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
            recompute: outcome.report.as_ref().map(ReportSummary::from),
        });
    }

    let transcript = Transcript {
        steps: records,
        resets: explorer.resets(),
        recomputes: explorer.controller().recomputes(),
        evaluations: explorer.controller().evaluations(),
        frame: Frame::capture(&session.name, &explorer),
    };
    tracing::info!(
        steps = transcript.steps.len(),
        recomputes = transcript.recomputes,
        "replay finished"
    );

    let text = serde_json::to_string_pretty(&transcript)?;
    write_output(&text, args.output.as_deref())
}
