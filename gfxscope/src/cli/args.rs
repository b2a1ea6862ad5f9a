//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::config::{DetailedViewConfig, OverviewConfig};
use crate::domain::Micros;

#[derive(Parser, Debug)]
#[command(
    name = "gfxscope",
    version,
    about = "Explore graphics pipeline traces on a timeline",
    after_help = "\
EXAMPLES:
    gfxscope trace.json                         Interactive timeline
    gfxscope trace.json --summary               Print sections and diagnostics
    gfxscope trace.json --detail-at 125.5       Print CPU usage around 125.5 ms"
)]
pub struct Args {
    /// Trace document (JSON)
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Overview resolution in microseconds per pixel
    #[arg(long, default_value = "100", value_parser = positive_f64)]
    pub resolution: f64,

    /// Zoom factor of the CPU detailed view
    #[arg(long, default_value = "4", value_parser = positive_f64)]
    pub zoom: f64,

    /// Print a text summary instead of starting the TUI
    #[arg(long)]
    pub summary: bool,

    /// Print the CPU detailed breakdown around this timestamp (milliseconds)
    #[arg(long, value_name = "MS")]
    pub detail_at: Option<f64>,

    /// Viewport width in pixels used to size the detailed window
    #[arg(long, value_name = "PX", default_value = "1280", value_parser = positive_f64)]
    pub viewport: f64,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

fn positive_f64(value: &str) -> Result<f64, String> {
    let parsed: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err(format!("expected a positive number, got {value}"))
    }
}

impl Args {
    /// Run headless (no TUI).
    #[must_use]
    pub fn headless(&self) -> bool {
        self.summary || self.detail_at.is_some()
    }

    #[must_use]
    pub fn overview_config(&self) -> OverviewConfig {
        OverviewConfig { resolution: self.resolution, ..OverviewConfig::default() }
    }

    #[must_use]
    pub fn detailed_config(&self) -> DetailedViewConfig {
        DetailedViewConfig { zoom_factor: self.zoom, ..DetailedViewConfig::default() }
    }

    /// `--detail-at` in microseconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn detail_timestamp(&self) -> Option<Micros> {
        self.detail_at.map(|ms| (ms * 1000.0).round() as Micros)
    }
}
