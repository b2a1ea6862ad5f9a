//! # Terminal User Interface (TUI)
//!
//! Interactive terminal front-end for the timeline using `ratatui`.
//!
//! ```text
//! ┌ GFXSCOPE | 1500.0 ms | 8 cpus | 5 sections | view 0.0...1500.0 ms ┐
//! ┌ Timeline ──────────────────────────────────────────────────────────┐
//! │ ▼ CPUs                 │                                            │
//! │   core 0               │░░██░░░███░░░░░██░░░░░░████░░░░░░██░░░░░░   │
//! │ ▼ Chrome graphics      │                                            │
//! │   buffer 0             │░▒▒▓▓░░░░▒▒▓▓░│░░▒▒▓▓░░░░▒▒▓▓░░░░▒▒▓▓░░   │
//! └────────────────────────────────────────────────────────────────────┘
//! ┌ CPU view. 2/3 active processes/threads. Total cpu usage: 41.20%. ──┐
//! │ app <812>, cpu usage: 30.10%.                                      │
//! │   RenderThread 20.00%  │░░████░░░░░░│░░░███░░░░                    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The timeline core draws into recorded surfaces; this module samples them
//! into terminal cells (`raster`) and feeds mouse/keyboard input back to the
//! [`Timeline`].
//!
//! ## Keys
//!
//! - Mouse move: tooltip, click on a CPU band: detailed view, click on a
//!   title: collapse/expand
//! - `Esc`/`Enter`: dismiss the detailed view
//! - `a`/`d` or `←`/`→`: pan, `w`/`s` or wheel: zoom, `↑`/`↓`: scroll
//! - `!`: diagnostics, `?`: help, `q`: quit

// TUI rendering intentionally uses precision-losing casts for cell geometry
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::too_many_lines
)]

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

mod raster;
mod status;
mod theme;

use raster::{sample_row, to_line, Columns};
use status::StatusPanel;
use theme::{usage_color, ACCENT, BACKGROUND, CAUTION_AMBER, INFO_DIM, TEXT};

use crate::overview::{SectionKind, Timeline, TITLE_HEIGHT};
use crate::timeline::detailed::usage_percent;
use crate::timeline::{Key, Tooltip};

// =============================================================================
// STYLE CONSTANTS
// =============================================================================

const STYLE_HEADING: Style = Style::new().fg(ACCENT).add_modifier(Modifier::BOLD);
const STYLE_DIM: Style = Style::new().fg(INFO_DIM);
const STYLE_KEY: Style = Style::new().fg(CAUTION_AMBER);
const STYLE_TEXT: Style = Style::new().fg(TEXT);

/// Width of the label column left of the bands
const LABEL_WIDTH: u16 = 24;
const ZOOM_STEP: f64 = 2.0;
/// Finest zoom: overview pixels per terminal column
const MIN_PIXELS_PER_COLUMN: f64 = 0.01;

// =============================================================================
// VIEW MODES
// =============================================================================

/// Current view mode determines what's displayed and how keys are handled
#[derive(Debug, Clone, Copy, PartialEq)]
enum ViewMode {
    Timeline,
    /// Schema diagnostics collected while building and exploring the timeline
    Diagnostics,
    Help,
}

/// One terminal row of the overview panel.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Row {
    Title(usize),
    Band { section: usize, band: usize },
}

/// Overview position under a terminal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pointer {
    row: Row,
    /// `None` over the label column
    x: Option<f64>,
    y: f64,
}

/// TUI application over an assembled [`Timeline`].
pub struct App {
    timeline: Timeline,
    status_panel: StatusPanel,
    view_mode: ViewMode,

    /// Overview pixel at the left edge of the band area
    scroll_x: f64,
    /// Zero until the first draw fits the whole trace
    pixels_per_column: f64,
    first_row: usize,

    // Geometry of the last draw
    overview_area: Rect,
    detail_area: Option<Rect>,

    mouse: Option<(u16, u16)>,
    detail_tooltip: Option<Tooltip>,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(timeline: Timeline) -> Self {
        let status_panel = StatusPanel::new(&timeline);
        Self {
            timeline,
            status_panel,
            view_mode: ViewMode::Timeline,
            scroll_x: 0.0,
            pixels_per_column: 0.0,
            first_row: 0,
            overview_area: Rect::default(),
            detail_area: None,
            mouse: None,
            detail_tooltip: None,
            should_quit: false,
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for (section, s) in self.timeline.sections().iter().enumerate() {
            rows.push(Row::Title(section));
            if !s.collapsed {
                rows.extend((0..s.layout.bands().len()).map(|band| Row::Band { section, band }));
            }
        }
        rows
    }

    /// Overview `y` at the vertical center of a row.
    fn row_y(&self, row: Row) -> f64 {
        match row {
            Row::Title(section) => self.timeline.section_top(section) + TITLE_HEIGHT / 2.0,
            Row::Band { section, band } => {
                let b = &self.timeline.sections()[section].layout.bands()[band];
                self.timeline.section_top(section) + TITLE_HEIGHT + (b.top + b.bottom) / 2.0
            }
        }
    }

    fn columns(&self) -> Columns {
        let inner = inner(self.overview_area);
        Columns {
            start: self.scroll_x,
            pixels_per_column: self.pixels_per_column,
            count: band_columns(inner.width),
        }
    }

    fn overview_width(&self) -> f64 {
        self.timeline.sections().first().map_or(0.0, |s| s.layout.width())
    }

    fn fit_if_needed(&mut self) {
        if self.pixels_per_column <= 0.0 {
            let columns = f64::from(band_columns(inner(self.overview_area).width));
            self.pixels_per_column = (self.overview_width() / columns).max(MIN_PIXELS_PER_COLUMN);
            self.scroll_x = 0.0;
        }
    }

    fn pointer(&self, column: u16, row: u16) -> Option<Pointer> {
        let inner = inner(self.overview_area);
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        let index = usize::from(row - inner.y) + self.first_row;
        let row = *self.rows().get(index)?;
        let offset = column - inner.x;
        let x = (offset >= LABEL_WIDTH).then(|| self.columns().center(offset - LABEL_WIDTH));
        Some(Pointer { row, x, y: self.row_y(row) })
    }

    /// Visible time range in microseconds.
    fn visible_window(&self) -> (f64, f64) {
        let Some(section) = self.timeline.sections().first() else {
            return (0.0, 0.0);
        };
        let columns = self.columns();
        let layout = &section.layout;
        let end = columns.start + f64::from(columns.count) * columns.pixels_per_column;
        (layout.offset_to_time(columns.start), layout.offset_to_time(end))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    fn zoom(&mut self, factor: f64) {
        let visible = f64::from(self.columns().count);
        let center = self.scroll_x + visible * self.pixels_per_column / 2.0;
        self.pixels_per_column = (self.pixels_per_column * factor).max(MIN_PIXELS_PER_COLUMN);
        self.scroll_x = center - visible * self.pixels_per_column / 2.0;
        self.clamp_scroll();
    }

    fn pan(&mut self, direction: f64) {
        let visible = f64::from(self.columns().count) * self.pixels_per_column;
        self.scroll_x += direction * visible / 4.0;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let visible = f64::from(self.columns().count) * self.pixels_per_column;
        let max = (self.overview_width() - visible).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max);
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        match self.view_mode {
            ViewMode::Timeline => match key {
                KeyCode::Char('q' | 'Q') => self.should_quit = true,
                KeyCode::Esc => self.timeline.on_key(Key::Escape),
                KeyCode::Enter => self.timeline.on_key(Key::Enter),
                KeyCode::Char('a' | 'A') | KeyCode::Left => self.pan(-1.0),
                KeyCode::Char('d' | 'D') | KeyCode::Right => self.pan(1.0),
                KeyCode::Char('w' | 'W' | '+') => self.zoom(1.0 / ZOOM_STEP),
                KeyCode::Char('s' | 'S' | '-') => self.zoom(ZOOM_STEP),
                KeyCode::Up => self.first_row = self.first_row.saturating_sub(1),
                KeyCode::Down => {
                    if self.first_row + 1 < self.rows().len() {
                        self.first_row += 1;
                    }
                }
                KeyCode::Char('!') => self.view_mode = ViewMode::Diagnostics,
                KeyCode::Char('?') => self.view_mode = ViewMode::Help,
                _ => self.timeline.on_key(Key::Other),
            },
            // Any key closes overlays
            ViewMode::Diagnostics | ViewMode::Help => self.view_mode = ViewMode::Timeline,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.mouse = Some((column, row));
                self.pointer_moved(column, row);
            }
            MouseEventKind::Down(MouseButton::Left) => self.clicked(column, row),
            MouseEventKind::ScrollUp => self.zoom(1.0 / ZOOM_STEP),
            MouseEventKind::ScrollDown => self.zoom(ZOOM_STEP),
            _ => {}
        }
    }

    fn pointer_moved(&mut self, column: u16, row: u16) {
        let position = self.detail_position(column, row);
        self.detail_tooltip = position.and_then(|(x, y)| self.timeline.query_detailed(x, y));
        match self.pointer(column, row) {
            Some(Pointer { x: Some(x), y, .. }) => {
                self.timeline.on_pointer_move(x, y);
            }
            // Off the bands: clears the tooltip
            _ => {
                self.timeline.on_pointer_move(-1.0, -1.0);
            }
        }
    }

    fn clicked(&mut self, column: u16, row: u16) {
        if self.detail_area.is_some_and(|area| area.contains(Position::new(column, row))) {
            return;
        }
        match self.pointer(column, row) {
            Some(Pointer { x: Some(x), y, .. }) => self.timeline.on_click(x, y),
            Some(Pointer { row: Row::Title(_), y, x: None }) => self.timeline.on_click(0.0, y),
            _ => self.timeline.on_click_outside(),
        }
    }

    /// Detailed-layout coordinates under a terminal cell.
    fn detail_position(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let view = self.timeline.detailed()?;
        let area = inner(self.detail_area?);
        if !area.contains(Position::new(column, row)) {
            return None;
        }
        let offset = column - area.x;
        if offset < LABEL_WIDTH {
            return None;
        }
        let band = detail_rows(view).get(usize::from(row - area.y)).copied().flatten()?;
        let layout = view.layout();
        let b = layout.bands().get(band)?;
        let columns = detail_columns(layout, band_columns(area.width));
        Some((columns.center(offset - LABEL_WIDTH), (b.top + b.bottom) / 2.0))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn draw(&mut self, f: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let main = if self.timeline.detailed().is_some() {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(outer[1]);
            self.detail_area = Some(split[1]);
            split[0]
        } else {
            self.detail_area = None;
            outer[1]
        };
        self.overview_area = main;
        self.fit_if_needed();
        self.timeline.set_viewport_width(f64::from(self.columns().count) * self.pixels_per_column);

        let diagnostics = self.timeline.diagnostics().len();
        self.status_panel.render(f, outer[0], self.visible_window(), diagnostics);
        self.render_overview(f, main);
        if let Some(area) = self.detail_area {
            self.render_detail(f, area);
        }
        self.render_keys(f, outer[2]);

        match self.view_mode {
            ViewMode::Timeline => self.render_tooltip(f),
            ViewMode::Diagnostics => self.render_diagnostics(f, outer[1]),
            ViewMode::Help => render_help_overlay(f, outer[1]),
        }
    }

    fn render_overview(&self, f: &mut Frame, area: Rect) {
        let inner_area = inner(area);
        let columns = self.columns();
        let rows = self.rows();
        let mut lines = Vec::new();
        for &row in rows.iter().skip(self.first_row).take(usize::from(inner_area.height)) {
            let line = match row {
                Row::Title(section) => {
                    let s = &self.timeline.sections()[section];
                    let marker = if s.collapsed { "▶" } else { "▼" };
                    let icon = if s.icon.is_some() { " ◆" } else { "" };
                    Line::from(Span::styled(format!("{marker}{icon} {}", s.title), STYLE_HEADING))
                }
                Row::Band { section, band } => {
                    let s = &self.timeline.sections()[section];
                    let label = band_label(s.kind, band);
                    let cells = sample_row(s.layout.surface(), self.row_y_in_section(row), &columns);
                    let mut spans = vec![Span::styled(pad(&label, LABEL_WIDTH), STYLE_DIM)];
                    spans.extend(to_line(&cells).spans);
                    Line::from(spans)
                }
            };
            lines.push(line);
        }

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Timeline ")
                .border_style(Style::new().fg(ACCENT))
                .style(Style::new().bg(BACKGROUND)),
        );
        f.render_widget(widget, area);
    }

    /// Band center relative to its section layout.
    fn row_y_in_section(&self, row: Row) -> f64 {
        match row {
            Row::Title(_) => 0.0,
            Row::Band { section, band } => {
                let b = &self.timeline.sections()[section].layout.bands()[band];
                (b.top + b.bottom) / 2.0
            }
        }
    }

    fn render_detail(&self, f: &mut Frame, area: Rect) {
        let Some(view) = self.timeline.detailed() else {
            return;
        };
        let layout = view.layout();
        let inner_area = inner(area);
        let columns = detail_columns(layout, band_columns(inner_area.width));
        let duration = view.window().duration();

        let mut lines = Vec::new();
        let mut band = 0;
        for process in view.processes() {
            let usage = usage_percent(process.active_time, duration);
            lines.push(Line::from(Span::styled(
                process.label(duration),
                Style::new().fg(usage_color(usage)).add_modifier(Modifier::BOLD),
            )));
            for thread in &process.threads {
                let Some(b) = layout.bands().get(band) else {
                    break;
                };
                let cells = sample_row(layout.surface(), (b.top + b.bottom) / 2.0, &columns);
                let mut spans =
                    vec![Span::styled(pad(&format!("  {}", thread.label(duration)), LABEL_WIDTH), STYLE_TEXT)];
                spans.extend(to_line(&cells).spans);
                lines.push(Line::from(spans));
                band += 1;
            }
        }

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", view.title()))
                .border_style(Style::new().fg(CAUTION_AMBER))
                .style(Style::new().bg(BACKGROUND)),
        );
        f.render_widget(Clear, area);
        f.render_widget(widget, area);
    }

    fn render_tooltip(&self, f: &mut Frame) {
        let Some((column, row)) = self.mouse else {
            return;
        };
        let Some(tooltip) = self.detail_tooltip.as_ref().or(self.timeline.tooltip()) else {
            return;
        };

        let lines: Vec<Line> = tooltip
            .lines()
            .into_iter()
            .map(|line| match (line.prefix, line.icon) {
                (Some(prefix), Some(icon)) => Line::from(vec![
                    Span::styled(format!("{prefix:<10}"), STYLE_DIM),
                    Span::styled("● ", Style::new().fg(theme::color(icon))),
                    Span::styled(line.text, STYLE_TEXT),
                ]),
                _ => Line::from(Span::styled(line.text, STYLE_TEXT)),
            })
            .collect();

        let frame = f.area();
        let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 2;
        let height = lines.len() as u16 + 2;
        let x = (column + 2).min(frame.width.saturating_sub(width));
        let y = if row + 1 + height <= frame.height { row + 1 } else { row.saturating_sub(height) };
        let popup = Rect::new(x, y, width.min(frame.width), height.min(frame.height));

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::new().fg(INFO_DIM))
                .style(Style::new().bg(ratatui::style::Color::Black)),
        );
        f.render_widget(Clear, popup);
        f.render_widget(widget, popup);
    }

    fn render_diagnostics(&self, f: &mut Frame, area: Rect) {
        let diagnostics = self.timeline.diagnostics();
        let popup = centered_popup(area, 70, (diagnostics.len() as u16).clamp(1, 20) + 4);
        let mut lines = vec![Line::from("")];
        if diagnostics.is_empty() {
            lines.push(Line::from(Span::styled("  No diagnostics", STYLE_DIM)));
        }
        lines.extend(
            diagnostics.iter().map(|d| Line::from(Span::styled(format!("  {d}"), STYLE_TEXT))),
        );
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Diagnostics ")
                .style(Style::new().bg(ratatui::style::Color::Black).fg(CAUTION_AMBER)),
        );
        f.render_widget(Clear, popup);
        f.render_widget(widget, popup);
    }

    fn render_keys(&self, f: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("Q", STYLE_KEY),
            Span::styled(":Quit ", STYLE_DIM),
            Span::styled("A/D", STYLE_KEY),
            Span::styled(":Pan ", STYLE_DIM),
            Span::styled("W/S", STYLE_KEY),
            Span::styled(":Zoom ", STYLE_DIM),
            Span::styled("?", STYLE_KEY),
            Span::styled(":Help ", STYLE_DIM),
        ];
        if self.timeline.detailed().is_some() {
            spans.push(Span::styled("Esc", STYLE_KEY));
            spans.push(Span::styled(":Close detail ", STYLE_DIM));
        } else {
            spans.push(Span::styled("Click CPU band", STYLE_KEY));
            spans.push(Span::styled(":Detail ", STYLE_DIM));
        }
        let widget = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).border_style(Style::new().fg(ACCENT)));
        f.render_widget(widget, area);
    }

    /// Run the TUI event loop
    ///
    /// # Errors
    /// Returns an error if terminal setup or rendering fails
    pub fn run(mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key.code),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }

        // Cleanup terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;

        Ok(())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn inner(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

/// Terminal columns left for bands in a panel of `width` columns.
fn band_columns(width: u16) -> u16 {
    width.saturating_sub(LABEL_WIDTH).max(1)
}

fn pad(text: &str, width: u16) -> String {
    let width = usize::from(width);
    let truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{truncated:<width$}")
}

fn band_label(kind: SectionKind, band: usize) -> String {
    match kind {
        SectionKind::Cpu => format!("  core {band}"),
        SectionKind::Chrome => format!("  buffer {band}"),
        SectionKind::Android => "  surface flinger".to_string(),
        // Buffer queue and exo bands alternate per buffer
        SectionKind::View(_) if band % 2 == 0 => format!("  buffer {}", band / 2),
        SectionKind::View(_) => "    exo".to_string(),
    }
}

/// Detail rows: `None` for process rows, band index for thread rows.
fn detail_rows(view: &crate::timeline::CpuDetailedView) -> Vec<Option<usize>> {
    let mut rows = Vec::new();
    let mut band = 0;
    for process in view.processes() {
        rows.push(None);
        for _ in &process.threads {
            rows.push(Some(band));
            band += 1;
        }
    }
    rows
}

fn detail_columns(
    layout: &crate::timeline::BandLayout<crate::timeline::RecordingSurface>,
    count: u16,
) -> Columns {
    let bands_width = layout.width() - layout.offset_x();
    Columns {
        start: layout.offset_x(),
        pixels_per_column: bands_width / f64::from(count.max(1)),
        count,
    }
}

/// Render the help overlay with keyboard shortcuts and color legend
fn render_help_overlay(f: &mut Frame, area: Rect) {
    let popup_area = centered_popup(area, 70, 20);

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("  What You're Looking At", STYLE_HEADING)),
        Line::from(Span::styled(
            "  Each band is one event stream. Colored runs are active sequences,",
            STYLE_DIM,
        )),
        Line::from(Span::styled(
            "  grey is idle. Vertical lines are vsync and jank markers.",
            STYLE_DIM,
        )),
        Line::from(""),
        Line::from(Span::styled("  Mouse", STYLE_HEADING)),
        Line::from(vec![
            Span::styled("  Hover      ", STYLE_KEY),
            Span::styled("Event sequence or idle gap under the cursor", STYLE_TEXT),
        ]),
        Line::from(vec![
            Span::styled("  Click CPU  ", STYLE_KEY),
            Span::styled("Per-process CPU usage around that time", STYLE_TEXT),
        ]),
        Line::from(vec![
            Span::styled("  Click title", STYLE_KEY),
            Span::styled(" Collapse or expand the section", STYLE_TEXT),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Keys", STYLE_HEADING)),
        Line::from(vec![
            Span::styled("  A/D", STYLE_KEY),
            Span::styled(" Pan   ", STYLE_TEXT),
            Span::styled("W/S", STYLE_KEY),
            Span::styled(" Zoom   ", STYLE_TEXT),
            Span::styled("↑↓", STYLE_KEY),
            Span::styled(" Scroll   ", STYLE_TEXT),
            Span::styled("Esc", STYLE_KEY),
            Span::styled(" Close detail   ", STYLE_TEXT),
            Span::styled("!", STYLE_KEY),
            Span::styled(" Diagnostics", STYLE_TEXT),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close", STYLE_DIM)),
    ];

    let help_widget = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::new().bg(ratatui::style::Color::Black).fg(ACCENT)),
    );

    f.render_widget(Clear, popup_area);
    f.render_widget(help_widget, popup_area);
}

/// Create a centered popup area with given width percentage and height in lines
fn centered_popup(area: Rect, width_percent: u16, height_lines: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(height_lines), Constraint::Fill(1)])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DetailedViewConfig, OverviewConfig};
    use crate::trace_data::TraceModel;

    fn app() -> App {
        let json = r#"{"duration": 10000,
            "cpu": {"events": [[[1, 0], [3, 0, 7], [0, 1000], [3, 1000, 0]], []],
                    "threads": {"7": {"pid": 7, "name": "app"}}},
            "chrome": {"buffers": [[[500, 100], [504, 300]]]}}"#;
        let trace = TraceModel::from_json(json).unwrap();
        let timeline =
            Timeline::new(trace, OverviewConfig::default(), DetailedViewConfig::default());
        let mut app = App::new(timeline);
        // 1 border + 24 label + 100 band columns + 1 border
        app.overview_area = Rect::new(0, 3, 126, 20);
        app.fit_if_needed();
        app
    }

    #[test]
    fn test_rows_follow_sections_and_collapse() {
        let mut app = app();
        assert_eq!(
            app.rows(),
            vec![
                Row::Title(0),
                Row::Band { section: 0, band: 0 },
                Row::Band { section: 0, band: 1 },
                Row::Title(1),
                Row::Band { section: 1, band: 0 },
                Row::Title(2),
            ]
        );
        app.timeline.toggle_section(0);
        assert_eq!(app.rows()[1], Row::Title(1));
    }

    #[test]
    fn test_pointer_maps_cells_to_overview_coordinates() {
        let app = app();
        assert_eq!(app.pixels_per_column, 1.0);
        // Row 5 is the second terminal row inside the panel: core 0
        let pointer = app.pointer(1 + LABEL_WIDTH + 10, 5).unwrap();
        assert_eq!(pointer.row, Row::Band { section: 0, band: 0 });
        assert_eq!(pointer.x, Some(10.5));
        assert_eq!(pointer.y, TITLE_HEIGHT + 3.0);
        assert_eq!(app.pointer(3, 5).unwrap().x, None);
        assert!(app.pointer(0, 5).is_none());
    }

    #[test]
    fn test_click_on_cpu_band_opens_detail_and_escape_closes() {
        let mut app = app();
        app.clicked(1 + LABEL_WIDTH + 5, 5);
        assert!(app.timeline.detailed().is_some());
        app.handle_key(KeyCode::Esc);
        assert!(app.timeline.detailed().is_none());
    }

    #[test]
    fn test_zoom_keeps_center_and_clamps() {
        let mut app = app();
        app.zoom(0.5);
        assert_eq!(app.pixels_per_column, 0.5);
        assert_eq!(app.scroll_x, 25.0);
        app.pan(-1.0);
        app.pan(-1.0);
        assert_eq!(app.scroll_x, 0.0);
        app.zoom(4.0);
        assert_eq!(app.scroll_x, 0.0);
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(band_label(SectionKind::Cpu, 1), "  core 1");
        assert_eq!(band_label(SectionKind::View(crate::domain::TaskId(2)), 3), "    exo");
        assert_eq!(pad("abc", 5), "abc  ");
        assert_eq!(pad("abcdefgh", 5), "abcd ");
    }
}
