//! Overview timeline: one section per subsystem, stacked under titles.
//!
//! ```text
//!   y ┌ CPUs ────────────────────────────────┐ title row (click: collapse)
//!     │ core 0 ░░██░░░███░░░░░██░░           │ 6/2 px, click: detailed view
//!     │ core 1 ░░░░██░░░░░░███░░░           │
//!     ├ Chrome graphics ─────────────────────┤
//!     │ buffer ░░▒▒▓▓░░░░▒▒▓▓░░   │ jank      │ 16/4 px
//!     ├ Android graphics ────────────────────┤
//!     │ buffer ░▒▒░░░░▒▒░░░│vsync│           │
//!     ├ <task> - <activity> ─────────────────┤
//!     │ queue  ░▒▓░░░▒▓░░                    │ 12/2 px
//!     │ exo    ░░▒▒▓░░░▒▒▓                   │ 12/12 px
//!     └──────────────────────────────────────┘
//! ```
//!
//! Pointer coordinates are overview coordinates: `x` on the shared time axis,
//! `y` from the top of the first title row.

use std::fmt;
use std::ops::RangeInclusive;

use gfxscope_common::{
    BUFFER_FILL_JANK, BUFFER_QUEUE_RANGE, CHROME_OS_JANK, CHROME_TOP_LEVEL_RANGE, CPU_IDLE_RANGE,
    EXO_RANGE, ANDROID_TOP_LEVEL_RANGE, SURFACE_FLINGER_COMPOSITION_JANK, VSYNC,
};
use log::warn;

use crate::config::{DetailedViewConfig, OverviewConfig};
use crate::domain::{Micros, TaskId, TimelineError};
use crate::timeline::{
    query, BandLayout, CpuDetailedView, EventSequence, Key, RecordingSurface, TimelineController,
    Tooltip,
};
use crate::trace_data::{EventList, TraceModel};

/// Height of a section title row.
pub const TITLE_HEIGHT: f64 = 20.0;

/// Viewport width assumed until the front-end reports one.
const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Cpu,
    Chrome,
    Android,
    View(TaskId),
}

/// A titled, collapsible group of bands sharing one layout.
#[derive(Debug)]
pub struct Section {
    pub title: String,
    /// Base64 PNG of the owning task, view sections only
    pub icon: Option<String>,
    pub kind: SectionKind,
    pub layout: BandLayout<RecordingSurface>,
    pub collapsed: bool,
}

impl Section {
    /// Height below the title row, zero when collapsed.
    #[must_use]
    pub fn body_height(&self) -> f64 {
        if self.collapsed {
            0.0
        } else {
            self.layout.next_y()
        }
    }
}

/// A band or marker set that could not be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub section: String,
    pub error: TimelineError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.section, self.error)
    }
}

/// What lies under a vertical overview position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Title(usize),
    /// `y` is relative to the section's layout
    Body { section: usize, y: f64 },
}

/// Detailed view plus the section it marks.
#[derive(Debug)]
pub struct ActiveDetail {
    pub section: usize,
    pub view: CpuDetailedView,
}

/// Whole overview: sections, current tooltip and the active detailed view.
#[derive(Debug)]
pub struct Timeline {
    trace: TraceModel,
    config: OverviewConfig,
    detailed_config: DetailedViewConfig,
    viewport_width: f64,
    sections: Vec<Section>,
    diagnostics: Vec<Diagnostic>,
    controller: TimelineController<ActiveDetail>,
    tooltip: Option<Tooltip>,
}

// ============================================================================
// Assembly
// ============================================================================

struct SectionBuilder<'a> {
    section: Section,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> SectionBuilder<'a> {
    fn new(
        title: String,
        kind: SectionKind,
        config: &OverviewConfig,
        duration: Micros,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        let mut layout = BandLayout::new(RecordingSurface::new(), config.resolution, 0, duration);
        let width = layout.timestamp_to_offset(duration as f64);
        layout.set_width(width);
        let section = Section { title, icon: None, kind, layout, collapsed: false };
        Self { section, diagnostics }
    }

    fn band(&mut self, events: &EventList, types: RangeInclusive<u32>, height: f64, padding: f64) {
        let result =
            self.section.layout.add_band(EventSequence::new(events.clone(), types), height, padding);
        self.record(result);
    }

    fn global(&mut self, events: &EventList, kind: u32) {
        let result = self.section.layout.add_global(EventSequence::single(events.clone(), kind));
        self.record(result);
    }

    fn record(&mut self, result: Result<(), TimelineError>) {
        if let Err(error) = result {
            warn!("Skipping part of section \"{}\": {error}", self.section.title);
            self.diagnostics.push(Diagnostic { section: self.section.title.clone(), error });
        }
    }

    fn finish(self) -> Section {
        self.section
    }
}

fn build_sections(trace: &TraceModel, config: &OverviewConfig) -> (Vec<Section>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut sections = Vec::new();
    let duration = trace.duration;
    let android_globals = &trace.android.global_events;

    let mut cpus =
        SectionBuilder::new("CPUs".to_string(), SectionKind::Cpu, config, duration, &mut diagnostics);
    for core in &trace.cpu.events {
        cpus.band(core, CPU_IDLE_RANGE, config.cpu_band_height, config.cpu_band_padding);
    }
    cpus.section.layout.enable_detailed_view();
    sections.push(cpus.finish());

    let mut chrome = SectionBuilder::new(
        "Chrome graphics".to_string(),
        SectionKind::Chrome,
        config,
        duration,
        &mut diagnostics,
    );
    for buffer in &trace.chrome.buffers {
        chrome.band(buffer, CHROME_TOP_LEVEL_RANGE, config.top_band_height, config.top_band_padding);
    }
    chrome.global(&trace.chrome.global_events, CHROME_OS_JANK);
    sections.push(chrome.finish());

    let mut android = SectionBuilder::new(
        "Android graphics".to_string(),
        SectionKind::Android,
        config,
        duration,
        &mut diagnostics,
    );
    // Only the surface flinger buffer is shown
    if let Some(buffer) = trace.android.buffers.first() {
        android.band(buffer, ANDROID_TOP_LEVEL_RANGE, config.top_band_height, config.top_band_padding);
    }
    android.global(android_globals, VSYNC);
    android.global(android_globals, SURFACE_FLINGER_COMPOSITION_JANK);
    sections.push(android.finish());

    for view in &trace.views {
        let (title, icon) = trace.view_title(view);
        let mut activity = SectionBuilder::new(
            title,
            SectionKind::View(view.task_id),
            config,
            duration,
            &mut diagnostics,
        );
        activity.section.icon = icon.map(str::to_string);
        for buffer in &view.buffers {
            activity.band(
                buffer,
                BUFFER_QUEUE_RANGE,
                config.inner_band_height,
                config.inner_band_padding,
            );
            activity.band(buffer, EXO_RANGE, config.inner_band_height, config.last_inner_band_padding);
        }
        activity.global(android_globals, VSYNC);
        activity.global(&view.global_events, BUFFER_FILL_JANK);
        sections.push(activity.finish());
    }

    (sections, diagnostics)
}

impl Timeline {
    #[must_use]
    pub fn new(
        trace: TraceModel,
        config: OverviewConfig,
        detailed_config: DetailedViewConfig,
    ) -> Self {
        let (sections, diagnostics) = build_sections(&trace, &config);
        Self {
            trace,
            config,
            detailed_config,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            sections,
            diagnostics,
            controller: TimelineController::new(),
            tooltip: None,
        }
    }

    #[must_use]
    pub fn trace(&self) -> &TraceModel {
        &self.trace
    }

    #[must_use]
    pub fn config(&self) -> &OverviewConfig {
        &self.config
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Tooltip from the last pointer move, if any.
    #[must_use]
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    #[must_use]
    pub fn detailed(&self) -> Option<&CpuDetailedView> {
        self.controller.active().map(|active| &active.view)
    }

    /// Index of the section the active detailed view was opened from.
    #[must_use]
    pub fn detailed_section(&self) -> Option<usize> {
        self.controller.active().map(|active| active.section)
    }

    /// Width used to size detailed-view windows.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Total height of titles and visible sections.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.sections.iter().map(|s| TITLE_HEIGHT + s.body_height()).sum()
    }

    /// Top of the title row of section `index`.
    #[must_use]
    pub fn section_top(&self, index: usize) -> f64 {
        self.sections.iter().take(index).map(|s| TITLE_HEIGHT + s.body_height()).sum()
    }

    #[must_use]
    pub fn hit(&self, y: f64) -> Option<Hit> {
        let mut top = 0.0;
        for (index, section) in self.sections.iter().enumerate() {
            if y >= top && y < top + TITLE_HEIGHT {
                return Some(Hit::Title(index));
            }
            top += TITLE_HEIGHT;
            let height = section.body_height();
            if y >= top && y < top + height {
                return Some(Hit::Body { section: index, y: y - top });
            }
            top += height;
        }
        None
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Replace the tooltip with the content under `(x, y)`.
    ///
    /// A schema error under the cursor yields no tooltip and is recorded as a
    /// diagnostic of the hovered section.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> Option<&Tooltip> {
        self.tooltip = match self.hit(y) {
            Some(Hit::Body { section, y }) => {
                match query(&self.sections[section].layout, x, y) {
                    Ok(tooltip) => tooltip,
                    Err(error) => {
                        self.record(section, error);
                        None
                    }
                }
            }
            _ => None,
        };
        self.tooltip.as_ref()
    }

    /// Tooltip for a position inside the active detailed view's layout.
    pub fn query_detailed(&mut self, x: f64, y: f64) -> Option<Tooltip> {
        let active = self.controller.active()?;
        let section = active.section;
        match query(active.view.layout(), x, y) {
            Ok(tooltip) => tooltip,
            Err(error) => {
                self.record(section, error);
                None
            }
        }
    }

    /// Click on the overview. Any click here lies outside the detailed view,
    /// so the active one is dismissed first; a click on a CPU band then opens
    /// a new one and a click on a title toggles its section.
    pub fn on_click(&mut self, x: f64, y: f64) {
        self.dismiss();
        match self.hit(y) {
            Some(Hit::Title(section)) => self.toggle_section(section),
            Some(Hit::Body { section, .. }) => self.open_detailed(section, x),
            None => {}
        }
    }

    pub fn on_key(&mut self, key: Key) {
        let dismissed = self.controller.on_key(key);
        self.discard(dismissed);
    }

    pub fn on_click_outside(&mut self) {
        let dismissed = self.controller.on_click_outside();
        self.discard(dismissed);
    }

    pub fn dismiss(&mut self) {
        let dismissed = self.controller.dismiss();
        self.discard(dismissed);
    }

    pub fn toggle_section(&mut self, index: usize) {
        if let Some(section) = self.sections.get_mut(index) {
            section.collapsed = !section.collapsed;
        }
    }

    /// Open the CPU detailed view centered on `timestamp`.
    pub fn open_detailed_at(&mut self, timestamp: Micros) -> Option<&CpuDetailedView> {
        self.dismiss();
        let section = self.sections.iter().position(|s| s.kind == SectionKind::Cpu)?;
        let layout = &self.sections[section].layout;
        let x = layout.timestamp_to_offset(timestamp as f64) + layout.offset_x();
        self.open_detailed(section, x);
        self.detailed()
    }

    fn open_detailed(&mut self, index: usize, x: f64) {
        let Some(section) = self.sections.get_mut(index) else {
            return;
        };
        if !section.layout.supports_detailed_view() {
            return;
        }
        match CpuDetailedView::open(
            &self.trace.cpu,
            &mut section.layout,
            x,
            self.viewport_width,
            &self.detailed_config,
        ) {
            Ok(view) => {
                for error in view.unknown_threads().to_vec() {
                    self.record(index, error);
                }
                let replaced = self.controller.activate(ActiveDetail { section: index, view });
                self.discard(replaced);
            }
            Err(error) => self.record(index, error),
        }
    }

    /// Record a schema error met after assembly, once per section and error.
    fn record(&mut self, section: usize, error: TimelineError) {
        let Some(title) = self.sections.get(section).map(|s| s.title.clone()) else {
            return;
        };
        let diagnostic = Diagnostic { section: title, error };
        if !self.diagnostics.contains(&diagnostic) {
            warn!("{diagnostic}");
            self.diagnostics.push(diagnostic);
        }
    }

    fn discard(&mut self, active: Option<ActiveDetail>) {
        if let Some(ActiveDetail { section, view }) = active {
            if let Some(origin) = self.sections.get_mut(section) {
                view.discard(&mut origin.layout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tid;
    use crate::timeline::{Shape, TooltipBody};

    const TRACE: &str = r#"{
        "duration": 10000,
        "cpu": {
            "events": [[[1, 0], [3, 0, 7], [0, 1000], [3, 1000, 0]]],
            "threads": {"7": {"pid": 7, "name": "app"}}
        },
        "chrome": {"buffers": [[[500, 100], [501, 200], [504, 300]]], "global_events": [[505, 5000]]},
        "android": {"buffers": [[[403, 100], [404, 400]]], "global_events": [[400, 2000], [405, 3000]]},
        "views": [{"task_id": 2, "activity": "Main",
                   "buffers": [[[100, 100], [200, 150], [101, 300], [103, 500]]],
                   "global_events": [[106, 600]]}],
        "tasks": {"2": {"title": "Maps"}}
    }"#;

    fn timeline() -> Timeline {
        let trace = TraceModel::from_json(TRACE).unwrap();
        Timeline::new(trace, OverviewConfig::default(), DetailedViewConfig::default())
    }

    #[test]
    fn test_sections_follow_trace_structure() {
        let timeline = timeline();
        let titles: Vec<&str> = timeline.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["CPUs", "Chrome graphics", "Android graphics", "Maps - Main"]);
        assert_eq!(timeline.sections()[0].layout.bands().len(), 1);
        assert_eq!(timeline.sections()[3].layout.bands().len(), 2);
        assert_eq!(timeline.sections()[3].layout.next_y(), 12.0 + 2.0 + 12.0 + 12.0);
        assert_eq!(timeline.sections()[0].layout.width(), 100.0);
        assert!(timeline.sections()[0].layout.supports_detailed_view());
        assert!(!timeline.sections()[1].layout.supports_detailed_view());
        assert!(timeline.diagnostics().is_empty());
    }

    #[test]
    fn test_schema_error_skips_band_and_keeps_others() {
        let json = r#"{"duration": 1000,
            "chrome": {"buffers": [[[500, 10]], [[550, 10]], [[501, 10]]]}}"#;
        let trace = TraceModel::from_json(json).unwrap();
        let timeline = Timeline::new(trace, OverviewConfig::default(), DetailedViewConfig::default());
        assert_eq!(timeline.sections()[1].layout.bands().len(), 2);
        assert_eq!(timeline.diagnostics().len(), 1);
        assert_eq!(
            timeline.diagnostics()[0].to_string(),
            "Chrome graphics: No render attributes registered for event type 550"
        );
    }

    #[test]
    fn test_hit_testing_respects_collapsed_sections() {
        let mut timeline = timeline();
        assert_eq!(timeline.hit(5.0), Some(Hit::Title(0)));
        assert_eq!(timeline.hit(21.0), Some(Hit::Body { section: 0, y: 1.0 }));
        // CPU body is 8 px high
        assert_eq!(timeline.hit(28.0), Some(Hit::Title(1)));

        timeline.on_click(10.0, 5.0);
        assert!(timeline.sections()[0].collapsed);
        assert_eq!(timeline.hit(21.0), Some(Hit::Title(1)));
        timeline.toggle_section(0);
        assert_eq!(timeline.height(), timeline.section_top(4));
    }

    #[test]
    fn test_pointer_move_shows_and_replaces_tooltip() {
        let mut timeline = timeline();
        let view_top = timeline.section_top(3) + TITLE_HEIGHT;
        // Inside the first run of the view's buffer queue band
        let tooltip = timeline.on_pointer_move(2.0, view_top + 1.0).cloned().unwrap();
        assert!(matches!(tooltip.body, TooltipBody::Sequence(_)));
        assert!(timeline.on_pointer_move(2.0, 5.0).is_none());
        assert!(timeline.tooltip().is_none());
    }

    #[test]
    fn test_click_on_cpu_band_opens_and_replaces_detailed_view() {
        let mut timeline = timeline();
        let cpu_shapes = timeline.sections()[0].layout.surface().len();

        timeline.on_click(5.0, TITLE_HEIGHT + 1.0);
        let view = timeline.detailed().unwrap();
        assert_eq!(view.window().at, 500);
        assert_eq!(view.processes()[0].name, "app");
        assert_eq!(timeline.sections()[0].layout.surface().len(), cpu_shapes + 1);

        // Second click replaces the view; only one marker remains
        timeline.on_click(7.0, TITLE_HEIGHT + 1.0);
        assert_eq!(timeline.detailed().unwrap().window().at, 700);
        let markers = timeline.sections()[0]
            .layout
            .surface()
            .shapes()
            .filter(|s| matches!(s, Shape::Rect { opacity: Some(_), .. }))
            .count();
        assert_eq!(markers, 1);

        timeline.on_key(Key::Escape);
        assert!(timeline.detailed().is_none());
        assert_eq!(timeline.sections()[0].layout.surface().len(), cpu_shapes);
        // Repeated triggers are harmless
        timeline.on_click_outside();
        timeline.on_key(Key::Enter);
        assert_eq!(timeline.sections()[0].layout.surface().len(), cpu_shapes);
    }

    #[test]
    fn test_click_elsewhere_dismisses_without_opening() {
        let mut timeline = timeline();
        timeline.open_detailed_at(500).unwrap();
        let chrome_top = timeline.section_top(1) + TITLE_HEIGHT;
        timeline.on_click(5.0, chrome_top + 1.0);
        assert!(timeline.detailed().is_none());
    }

    #[test]
    fn test_unmapped_thread_in_detailed_view_is_diagnosed_once() {
        let json = r#"{"duration": 1000, "cpu": {"events": [[[3, 0, 42], [3, 500, 0]]]}}"#;
        let trace = TraceModel::from_json(json).unwrap();
        let mut timeline =
            Timeline::new(trace, OverviewConfig::default(), DetailedViewConfig::default());
        assert!(timeline.diagnostics().is_empty());

        let view = timeline.open_detailed_at(100).unwrap();
        assert_eq!(view.processes()[0].pid, None);
        let expected = vec![Diagnostic {
            section: "CPUs".to_string(),
            error: TimelineError::UnknownThread(Tid(42)),
        }];
        assert_eq!(timeline.diagnostics(), expected.as_slice());

        timeline.open_detailed_at(200).unwrap();
        assert_eq!(timeline.diagnostics(), expected.as_slice());
    }
}
