//! Headless text report of an assembled timeline.
//!
//! ```text
//! trace: 10.0 ms, 2 cpus, 4 sections
//!   CPUs                      2 bands     0 markers
//!   Chrome graphics           1 bands     1 markers
//!   Maps - Main               2 bands     3 markers
//! diagnostics: none
//! ```

use std::io::{self, Write};

use crate::overview::Timeline;
use crate::timeline::{tooltip::ms_text, CpuDetailedView};

/// Write the overview summary.
pub fn write_summary<W: Write>(out: &mut W, timeline: &Timeline) -> io::Result<()> {
    let trace = timeline.trace();
    #[allow(clippy::cast_precision_loss)]
    let duration = ms_text(trace.duration as f64);
    writeln!(
        out,
        "trace: {duration} ms, {} cpus, {} sections",
        trace.cpu.events.len(),
        timeline.sections().len()
    )?;

    for section in timeline.sections() {
        let markers: usize =
            section.layout.global_events().iter().map(|g| g.visible_indices().count()).sum();
        writeln!(
            out,
            "  {:<24} {:>3} bands {:>5} markers",
            section.title,
            section.layout.bands().len(),
            markers
        )?;
    }

    if timeline.diagnostics().is_empty() {
        writeln!(out, "diagnostics: none")?;
    } else {
        writeln!(out, "diagnostics: {}", timeline.diagnostics().len())?;
        for diagnostic in timeline.diagnostics() {
            writeln!(out, "  {diagnostic}")?;
        }
    }
    Ok(())
}

/// Write the CPU breakdown of a detailed view.
pub fn write_detail<W: Write>(out: &mut W, view: &CpuDetailedView) -> io::Result<()> {
    let window = view.window();
    #[allow(clippy::cast_precision_loss)]
    let (start, at, end) = (
        ms_text(window.start as f64),
        ms_text(window.at as f64),
        ms_text(window.last_instant() as f64),
    );
    writeln!(out, "window: {start}...{end} ms around {at} ms")?;
    for line in view.report_lines() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DetailedViewConfig, OverviewConfig};
    use crate::trace_data::TraceModel;

    fn timeline(json: &str) -> Timeline {
        let trace = TraceModel::from_json(json).unwrap();
        Timeline::new(trace, OverviewConfig::default(), DetailedViewConfig::default())
    }

    #[test]
    fn test_summary_lists_sections_and_diagnostics() {
        let timeline = timeline(
            r#"{"duration": 2500, "chrome": {"buffers": [[[500, 10]], [[599, 10]]],
                "global_events": [[505, 100], [505, 200]]}}"#,
        );
        let mut out = Vec::new();
        write_summary(&mut out, &timeline).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("trace: 2.5 ms, 0 cpus, 3 sections\n"));
        assert!(text.contains("  Chrome graphics            1 bands     2 markers\n"));
        assert!(text.contains("diagnostics: 1\n"));
        assert!(text.contains("event type 599"));
    }

    #[test]
    fn test_detail_report() {
        let mut timeline = timeline(
            r#"{"duration": 1000, "cpu": {"events": [[[3, 0, 7], [3, 100, 0]]],
                "threads": {"7": {"pid": 7, "name": "app"}}}}"#,
        );
        let view = timeline.open_detailed_at(0).unwrap();
        let mut out = Vec::new();
        write_detail(&mut out, view).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("window: "));
        assert!(lines[1].starts_with("CPU view. 1/1 active processes/threads."));
        assert!(lines[2].starts_with("app <7>, cpu usage: "));
        assert!(lines[3].starts_with("  app "));
    }
}
