use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme::{ACCENT, CAUTION_AMBER, INFO_DIM, TEXT};
use crate::overview::Timeline;
use crate::timeline::tooltip::ms_text;

/// Header line: trace totals, visible window and diagnostics.
pub struct StatusPanel {
    duration_ms: String,
    cpu_count: usize,
    section_count: usize,
}

impl StatusPanel {
    pub fn new(timeline: &Timeline) -> Self {
        let trace = timeline.trace();
        #[allow(clippy::cast_precision_loss)]
        let duration_ms = ms_text(trace.duration as f64);
        Self {
            duration_ms,
            cpu_count: trace.cpu.events.len(),
            section_count: timeline.sections().len(),
        }
    }

    /// `window` is the visible time range in microseconds. Diagnostics grow
    /// while the trace is explored, so their count is passed per frame.
    pub fn render(&self, f: &mut Frame, area: Rect, window: (f64, f64), diagnostics: usize) {
        let mut spans = vec![
            Span::styled("GFXSCOPE", Style::new().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::styled(" | ", Style::new().fg(INFO_DIM)),
            Span::styled(format!("{} ms", self.duration_ms), Style::new().fg(TEXT)),
            Span::styled(" | ", Style::new().fg(INFO_DIM)),
            Span::styled(format!("{} cpus", self.cpu_count), Style::new().fg(TEXT)),
            Span::styled(" | ", Style::new().fg(INFO_DIM)),
            Span::styled(format!("{} sections", self.section_count), Style::new().fg(TEXT)),
            Span::styled(" | ", Style::new().fg(INFO_DIM)),
            Span::styled(
                format!("view {}...{} ms", ms_text(window.0), ms_text(window.1)),
                Style::new().fg(TEXT),
            ),
        ];
        if diagnostics > 0 {
            spans.push(Span::styled(" | ", Style::new().fg(INFO_DIM)));
            spans.push(Span::styled(
                format!("[!] {diagnostics} diagnostics"),
                Style::new().fg(CAUTION_AMBER).add_modifier(Modifier::BOLD),
            ));
        }

        let border = if diagnostics > 0 { CAUTION_AMBER } else { ACCENT };
        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).border_style(Style::new().fg(border)));
        f.render_widget(paragraph, area);
    }
}
