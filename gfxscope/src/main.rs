//! # gfxscope - Main Entry Point
//!
//! Supports two operational modes:
//! - **Interactive TUI** (`gfxscope trace.json`): Timeline with hover tooltips
//!   and the CPU detailed view
//! - **Headless** (`--summary`, `--detail-at <MS>`): Text reports on stdout

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};

use gfxscope::cli::Args;
use gfxscope::overview::Timeline;
use gfxscope::summary::{write_detail, write_summary};
use gfxscope::timeline::tooltip::ms_text;
use gfxscope::trace_data::TraceModel;
use gfxscope::tui::App;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().starts_with("invalid argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let trace = TraceModel::from_file(&args.trace)
        .with_context(|| format!("Failed to load trace {}", args.trace.display()))?;

    let detail_at = args.detail_timestamp();
    if let Some(timestamp) = detail_at {
        if timestamp < 0 || timestamp > trace.duration {
            #[allow(clippy::cast_precision_loss)]
            let duration = ms_text(trace.duration as f64);
            anyhow::bail!(
                "invalid argument: --detail-at {} ms is outside the trace (0...{duration} ms)",
                args.detail_at.unwrap_or_default()
            );
        }
    }

    let mut timeline = Timeline::new(trace, args.overview_config(), args.detailed_config());
    timeline.set_viewport_width(args.viewport);
    if !args.quiet {
        for diagnostic in timeline.diagnostics() {
            eprintln!("warning: {diagnostic}");
        }
    }

    if !args.headless() {
        return App::new(timeline).run();
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.summary {
        write_summary(&mut out, &timeline)?;
    }
    if let Some(timestamp) = detail_at {
        if timeline.trace().cpu.events.is_empty() {
            writeln!(out, "No CPU data in trace")?;
        } else {
            let view = timeline
                .open_detailed_at(timestamp)
                .context("Failed to build the CPU detailed view")?;
            write_detail(&mut out, view)?;
        }
    }
    out.flush()?;
    Ok(())
}
