//! Slider sweep with a progress bar.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use afterscope_config::SessionConfig;
use afterscope_core::{BackgroundEvaluator, ControlEvent, RawValue, SeriesRegistry};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use super::common::{load_session, open_explorer, write_output};
use crate::model::AnalyticAfterglow;

#[derive(Args)]
pub struct SweepArgs {
    /// Factory session name or path to a session file
    session: String,

    /// Slider control id to sweep (e.g. log10_E0)
    #[arg(short, long)]
    control: String,

    /// First raw position (defaults to the slider minimum)
    #[arg(long)]
    from: Option<f64>,

    /// Last raw position (defaults to the slider maximum)
    #[arg(long)]
    to: Option<f64>,

    /// Number of positions, both ends included
    #[arg(short = 'n', long, default_value = "20")]
    steps: usize,

    /// Evaluate on a background worker thread
    #[arg(long)]
    background: bool,

    /// Seconds to wait for each background evaluation
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Write the table to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Serialize)]
struct Peak {
    time: f64,
    flux: f64,
}

#[derive(Debug, Serialize)]
struct SweepRow {
    position: f64,
    warnings: Vec<String>,
    peaks: BTreeMap<String, Peak>,
}

#[derive(Debug, Serialize)]
struct SweepTable {
    session: String,
    control: String,
    rows: Vec<SweepRow>,
}

fn positions(from: f64, to: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![from],
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let span = (steps - 1) as f64;
            (0..steps)
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let frac = i as f64 / span;
                    from + (to - from) * frac
                })
                .collect()
        }
    }
}

fn peaks(registry: &SeriesRegistry) -> BTreeMap<String, Peak> {
    registry
        .visible_keys()
        .filter_map(|key| {
            registry
                .cached(key)
                .iter()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|&(time, flux)| (key.to_string(), Peak { time, flux }))
        })
        .collect()
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

pub fn run(args: SweepArgs) -> anyhow::Result<()> {
    let session = load_session(&args.session)?;
    let slider = session
        .sliders
        .iter()
        .find(|s| s.control_id() == args.control)
        .ok_or_else(|| anyhow::anyhow!("'{}' is not a slider in '{}'", args.control, session.name))?;

    let from = args.from.unwrap_or(slider.min);
    let to = args.to.unwrap_or(slider.max);
    let values = positions(from, to, args.steps);
    tracing::info!(
        control = %args.control,
        from,
        to,
        steps = values.len(),
        background = args.background,
        "starting sweep"
    );

    let pb = progress_bar(values.len(), args.quiet);
    let rows = if args.background {
        sweep_background(&session, &args.control, &values, Duration::from_secs(args.timeout), &pb)?
    } else {
        sweep_inline(&session, &args.control, &values, &pb)?
    };
    pb.finish_and_clear();

    let table = SweepTable {
        session: session.name.clone(),
        control: args.control,
        rows,
    };
    let text = serde_json::to_string_pretty(&table)?;
    write_output(&text, args.output.as_deref())
}

fn sweep_inline(
    session: &SessionConfig,
    control: &str,
    values: &[f64],
    pb: &ProgressBar,
) -> anyhow::Result<Vec<SweepRow>> {
    let mut explorer = open_explorer(session)?;
    explorer.refresh();

    let mut rows = Vec::with_capacity(values.len());
    for &position in values {
        let outcome = explorer.dispatch(ControlEvent::slider(control, position));
        let mut warnings: Vec<String> = outcome.warnings.iter().map(ToString::to_string).collect();
        if let Some(report) = &outcome.report {
            warnings.extend(report.failures.iter().map(ToString::to_string));
        }
        rows.push(SweepRow {
            position,
            warnings,
            peaks: peaks(explorer.registry()),
        });
        pb.inc(1);
    }
    Ok(rows)
}

fn sweep_background(
    session: &SessionConfig,
    control: &str,
    values: &[f64],
    timeout: Duration,
    pb: &ProgressBar,
) -> anyhow::Result<Vec<SweepRow>> {
    let parts = session.build()?;
    let mut store = parts.store;
    let mut panel = parts.panel;
    let mut registry = parts.registry;
    let mut evaluator = BackgroundEvaluator::spawn(Arc::new(AnalyticAfterglow), parts.grid)?;

    let mut rows = Vec::with_capacity(values.len());
    for &position in values {
        let mut warnings = Vec::new();
        if let Err(e) = panel.input(&mut store, control, RawValue::Number(position)) {
            warnings.push(format!("control '{control}': {e}"));
        }
        let generation = evaluator.submit(&mut store, &registry);
        match evaluator.wait_for(&mut registry, timeout) {
            Some(applied) => {
                warnings.extend(applied.failures.iter().map(ToString::to_string));
            }
            None => anyhow::bail!(
                "background evaluation {generation} did not finish within {}s",
                timeout.as_secs()
            ),
        }
        rows.push(SweepRow {
            position,
            warnings,
            peaks: peaks(&registry),
        });
        pb.inc(1);
    }

    tracing::debug!(
        applied = evaluator.applied_generation(),
        discarded = evaluator.discarded(),
        "background sweep finished"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_include_both_ends() {
        let p = positions(48.0, 52.0, 5);
        assert_eq!(p, vec![48.0, 49.0, 50.0, 51.0, 52.0]);
        assert_eq!(positions(1.0, 2.0, 1), vec![1.0]);
        assert!(positions(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn inline_and_background_agree() {
        let session = afterscope_config::get_factory_session("single_band").unwrap();
        let values = positions(51.0, 53.0, 3);
        let pb = ProgressBar::hidden();

        let inline = sweep_inline(&session, "logE0", &values, &pb).unwrap();
        let background =
            sweep_background(&session, "logE0", &values, Duration::from_secs(30), &pb).unwrap();

        assert_eq!(inline.len(), 3);
        for (a, b) in inline.iter().zip(&background) {
            assert_eq!(a.position, b.position);
            let (left, right) = (&a.peaks["r"], &b.peaks["r"]);
            assert_eq!(left.time, right.time);
            assert_eq!(left.flux, right.flux);
        }
        assert!(inline[2].peaks["r"].flux > inline[0].peaks["r"].flux);
    }
}
