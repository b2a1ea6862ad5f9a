//! CPU detailed view: a zoomed, per-thread breakdown around a clicked time.
//!
//! ```text
//!   overview CPU bands       ░░██░░░███░░[▒▒▒▒▒]░░██░░   ← selection marker
//!                                        │     │
//!                            window start ▼     ▼ window end
//!   ┌ CPU view. 2/3 active processes/threads. Total cpu usage: 41.20%.
//!   │ app <812>, cpu usage: 30.10%.
//!   │   RenderThread 20.00%   ░░████░░░░░░│░░░███░░░░
//!   │   main 10.10%           ███░░░░░░░░░│░░░░░░░██░
//!   │ surfaceflinger <301>, cpu usage: 11.10%.
//!   │   surfaceflinger 11.10% ░░░░░██░░░░░│░░░░░░░░░░
//! ```
//!
//! The per-thread sequences are synthesized from the per-core `ACTIVE`
//! scheduling events on every activation and dropped with the view.

use std::collections::BTreeMap;
use std::sync::Arc;

use gfxscope_common::{ACTIVE, BLACK, CPU_IDLE_RANGE, IDLE_IN, IDLE_OUT, TIME_MARK};
use log::debug;

use super::events::{Direction, EventSequence};
use super::layout::BandLayout;
use super::surface::{RecordingSurface, ShapeId, Surface};
use crate::config::DetailedViewConfig;
use crate::domain::{Micros, Pid, Tid, TimelineError};
use crate::trace_data::{CpuModel, Event, EventList};

/// Opacity of the zoomed-window marker drawn on the overview.
const SELECTION_OPACITY: f64 = 0.1;

// ============================================================================
// Window
// ============================================================================

/// Time window of a detailed view: `[start, end)` centered on `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailWindow {
    pub start: Micros,
    pub at: Micros,
    pub end: Micros,
}

impl DetailWindow {
    #[must_use]
    pub fn new(start: Micros, at: Micros, end: Micros) -> Self {
        Self { start, at, end }
    }

    /// Window around `timestamp` that fills the available viewport width at
    /// the zoomed resolution.
    #[must_use]
    pub fn around<S: Surface>(
        overview: &BandLayout<S>,
        timestamp: f64,
        viewport_width: f64,
        config: &DetailedViewConfig,
    ) -> Self {
        let available = config.available_width(viewport_width);
        #[allow(clippy::cast_possible_truncation)]
        let half = (overview.offset_to_time(available) / (2.0 * config.zoom_factor)).floor() as Micros;
        #[allow(clippy::cast_possible_truncation)]
        let at = timestamp.floor() as Micros;
        Self { start: at - half, at, end: at + half + 1 }
    }

    #[must_use]
    pub fn duration(&self) -> Micros {
        self.end - self.start
    }

    /// Last timestamp inside the window.
    #[must_use]
    pub fn last_instant(&self) -> Micros {
        self.end - 1
    }
}

// ============================================================================
// Reconstruction
// ============================================================================

/// Activity of one thread inside the window, as idle-out/idle-in pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadActivity {
    pub tid: Tid,
    /// Sorted by timestamp
    pub events: Vec<Event>,
    pub active_time: Micros,
}

fn add_activity(threads: &mut BTreeMap<Tid, ThreadActivity>, tid: Tid, from: Micros, to: Micros) {
    if tid.is_idle() || to <= from {
        return;
    }
    let thread = threads.entry(tid).or_insert_with(|| ThreadActivity {
        tid,
        events: Vec::new(),
        active_time: 0,
    });
    thread.events.push(Event::new(IDLE_OUT, from));
    thread.events.push(Event::new(IDLE_IN, to));
    thread.active_time += to - from;
}

/// Rebuild per-thread active intervals inside `window` from the per-core
/// `ACTIVE` events. The thread running when the window opens is the one named
/// by the last `ACTIVE` event before the window start.
#[must_use]
pub fn reconstruct_threads(cpu: &CpuModel, window: &DetailWindow) -> BTreeMap<Tid, ThreadActivity> {
    let mut threads = BTreeMap::new();
    for core in &cpu.events {
        let switches = EventSequence::single(core.clone(), ACTIVE);
        let first = switches.first_at_or_after(window.start);
        let before = match first {
            Some(index) => switches.next_event(Some(index), Direction::Backward),
            None => switches.last(),
        };

        let mut running = before.and_then(|i| switches.event(i).tid).unwrap_or(Tid::IDLE);
        let mut since = window.start;
        let mut index = first;
        while let Some(current) = index {
            let event = switches.event(current);
            if event.timestamp >= window.end {
                break;
            }
            add_activity(&mut threads, running, since, event.timestamp);
            running = event.tid.unwrap_or(Tid::IDLE);
            since = event.timestamp;
            index = switches.next_event(Some(current), Direction::Forward);
        }
        add_activity(&mut threads, running, since, window.last_instant());
    }

    // A thread that ran on several cores has interleaved intervals. An
    // interval ending at the same time another starts must close first.
    for thread in threads.values_mut() {
        thread.events.sort_by_key(|event| (event.timestamp, event.kind));
    }
    threads
}

// ============================================================================
// Aggregation
// ============================================================================

/// Share of `duration` spent active, in percent.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn usage_percent(active_time: Micros, duration: Micros) -> f64 {
    if duration <= 0 {
        return 0.0;
    }
    100.0 * active_time as f64 / duration as f64
}

#[derive(Debug, Clone)]
pub struct ThreadUsage {
    pub tid: Tid,
    pub name: String,
    pub active_time: Micros,
    pub events: EventList,
}

impl ThreadUsage {
    #[must_use]
    pub fn label(&self, duration: Micros) -> String {
        format!("{} {:.2}%", self.name, usage_percent(self.active_time, duration))
    }
}

/// Threads of one process. `pid` is `None` for threads missing from the
/// thread table.
#[derive(Debug, Clone)]
pub struct ProcessUsage {
    pub pid: Option<Pid>,
    pub name: String,
    pub active_time: Micros,
    pub threads: Vec<ThreadUsage>,
}

impl ProcessUsage {
    #[must_use]
    pub fn label(&self, duration: Micros) -> String {
        let usage = usage_percent(self.active_time, duration);
        match self.pid {
            Some(pid) => format!("{} <{}>, cpu usage: {usage:.2}%.", self.name, pid.0),
            None => format!("{}, cpu usage: {usage:.2}%.", self.name),
        }
    }
}

const OTHERS: &str = "Others";

/// Group threads by owning process. Processes are ordered by active time,
/// then by pid; threads within a process the same way by tid.
///
/// Threads missing from the thread table still count, under "Others"; the
/// lookup failures are returned alongside.
#[must_use]
pub fn group_by_process(
    cpu: &CpuModel,
    threads: BTreeMap<Tid, ThreadActivity>,
) -> (Vec<ProcessUsage>, Vec<TimelineError>) {
    let mut processes: BTreeMap<Option<Pid>, ProcessUsage> = BTreeMap::new();
    let mut unknown = Vec::new();
    for (tid, activity) in threads {
        let (pid, name) = match cpu.thread_info(tid) {
            Ok(info) => (Some(info.pid), info.name.clone()),
            Err(e) => {
                debug!("{e}, counting it under {OTHERS}");
                unknown.push(e);
                (None, format!("Thread {}", tid.0))
            }
        };
        let process = processes.entry(pid).or_insert_with(|| ProcessUsage {
            pid,
            name: pid
                .and_then(|pid| cpu.threads.get(&Tid::from(pid)))
                .map_or_else(|| OTHERS.to_string(), |info| info.name.clone()),
            active_time: 0,
            threads: Vec::new(),
        });
        process.active_time += activity.active_time;
        process.threads.push(ThreadUsage {
            tid,
            name,
            active_time: activity.active_time,
            events: Arc::from(activity.events),
        });
    }

    let mut processes: Vec<ProcessUsage> = processes.into_values().collect();
    // Unknown threads sort after every real process on equal time
    processes.sort_by_key(|p| (std::cmp::Reverse(p.active_time), p.pid.is_none(), p.pid));
    for process in &mut processes {
        process.threads.sort_by_key(|t| (std::cmp::Reverse(t.active_time), t.tid));
    }
    (processes, unknown)
}

// ============================================================================
// View
// ============================================================================

/// Zoomed per-process/per-thread CPU timeline.
#[derive(Debug)]
pub struct CpuDetailedView {
    window: DetailWindow,
    title: String,
    processes: Vec<ProcessUsage>,
    total_active: Micros,
    layout: BandLayout<RecordingSurface>,
    /// Marker drawn on the overview this view was opened from
    selection: Option<ShapeId>,
    /// Threads of the window missing from the thread table
    unknown_threads: Vec<TimelineError>,
}

impl CpuDetailedView {
    /// Open a detailed view for a click at `x` on `overview` and mark the
    /// zoomed window there.
    pub fn open<S: Surface>(
        cpu: &CpuModel,
        overview: &mut BandLayout<S>,
        x: f64,
        viewport_width: f64,
        config: &DetailedViewConfig,
    ) -> Result<Self, TimelineError> {
        let timestamp = overview.offset_to_time(x - overview.offset_x());
        let window = DetailWindow::around(overview, timestamp, viewport_width, config);
        let mut view = Self::build(cpu, window, overview.resolution(), config)?;

        let left = overview.timestamp_to_offset(window.start as f64) + overview.offset_x();
        let right = overview.timestamp_to_offset(window.end as f64) + overview.offset_x();
        let height = overview.height();
        view.selection = Some(overview.surface_mut().draw_rect(
            left,
            0.0,
            right - left,
            height,
            BLACK,
            Some(SELECTION_OPACITY),
        ));
        Ok(view)
    }

    /// Build the view for `window` without touching any overview.
    pub fn build(
        cpu: &CpuModel,
        window: DetailWindow,
        overview_resolution: f64,
        config: &DetailedViewConfig,
    ) -> Result<Self, TimelineError> {
        let threads = reconstruct_threads(cpu, &window);
        let thread_count = threads.len();
        let (processes, unknown_threads) = group_by_process(cpu, threads);
        let total_active: Micros = processes.iter().map(|p| p.active_time).sum();
        let duration = window.duration();
        debug!(
            "Detailed view {}..{} around {}: {} processes, {} threads, {} us active",
            window.start,
            window.end,
            window.at,
            processes.len(),
            thread_count,
            total_active
        );

        let title = format!(
            "CPU view. {}/{} active processes/threads. Total cpu usage: {:.2}%.",
            processes.len(),
            thread_count,
            usage_percent(total_active, duration)
        );

        let mut layout = BandLayout::new(
            RecordingSurface::new(),
            overview_resolution / config.zoom_factor,
            window.start,
            window.end,
        );
        layout.set_offset_x(config.column_width);
        let bands_width = layout.timestamp_to_offset(window.end as f64);
        layout.set_width(bands_width + config.column_width);

        for process in &processes {
            layout.add_spacing(config.process_row_height + config.padding);
            let y = layout.next_y() - 2.0 * config.padding;
            let label = process.label(duration);
            layout.surface_mut().draw_text(config.process_text_inset, y, config.font_size, &label);

            for thread in &process.threads {
                let sequence = EventSequence::new(thread.events.clone(), CPU_IDLE_RANGE);
                layout.add_band(sequence, config.thread_band_height, config.padding)?;
                let y = layout.next_y() - config.padding;
                let label = thread.label(duration);
                layout.surface_mut().draw_text(config.thread_text_inset, y, config.font_size, &label);
            }
        }

        let marks: EventList = [window.start, window.at, window.last_instant()]
            .into_iter()
            .map(|timestamp| Event::new(TIME_MARK, timestamp))
            .collect();
        layout.add_global(EventSequence::single(marks, TIME_MARK))?;

        Ok(Self {
            window,
            title,
            processes,
            total_active,
            layout,
            selection: None,
            unknown_threads,
        })
    }

    /// Tear the view down, removing its marker from the overview it was
    /// opened from.
    pub fn discard<S: Surface>(self, overview: &mut BandLayout<S>) {
        if let Some(id) = self.selection {
            overview.surface_mut().remove(id);
        }
        debug!("Detailed view {}..{} discarded", self.window.start, self.window.end);
    }

    /// Schema errors met while attributing threads to processes.
    #[must_use]
    pub fn unknown_threads(&self) -> &[TimelineError] {
        &self.unknown_threads
    }

    #[must_use]
    pub fn window(&self) -> DetailWindow {
        self.window
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn processes(&self) -> &[ProcessUsage] {
        &self.processes
    }

    /// Sum of all thread active times inside the window.
    #[must_use]
    pub fn total_active(&self) -> Micros {
        self.total_active
    }

    #[must_use]
    pub fn layout(&self) -> &BandLayout<RecordingSurface> {
        &self.layout
    }

    #[must_use]
    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    /// Title, process rows and indented thread rows as plain text.
    #[must_use]
    pub fn report_lines(&self) -> Vec<String> {
        let duration = self.window.duration();
        let mut lines = vec![self.title.clone()];
        for process in &self.processes {
            lines.push(process.label(duration));
            lines.extend(process.threads.iter().map(|t| format!("  {}", t.label(duration))));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::surface::Shape;
    use crate::trace_data::ThreadInfo;
    use std::collections::HashMap;

    fn core(events: &[(Micros, u32)]) -> EventList {
        events.iter().map(|&(ts, tid)| Event::with_tid(ACTIVE, ts, Tid(tid))).collect()
    }

    fn cpu(cores: Vec<EventList>, threads: &[(u32, u32, &str)]) -> CpuModel {
        let threads: HashMap<Tid, ThreadInfo> = threads
            .iter()
            .map(|&(tid, pid, name)| (Tid(tid), ThreadInfo { pid: Pid(pid), name: name.to_string() }))
            .collect();
        CpuModel { events: cores, threads }
    }

    #[test]
    fn test_window_is_centered_on_click() {
        let overview = BandLayout::new(RecordingSurface::new(), 100.0, 0, 1_000_000);
        let window =
            DetailWindow::around(&overview, 100_000.7, 1000.0, &DetailedViewConfig::default());
        // 657 px * 100 us / (2 * 4)
        assert_eq!(window, DetailWindow::new(100_000 - 8212, 100_000, 100_000 + 8213));
        assert_eq!(window.duration(), 2 * 8212 + 1);
    }

    #[test]
    fn test_single_thread_activity() {
        let cpu = cpu(vec![core(&[(0, 7), (100, 0)])], &[(7, 7, "app")]);
        let threads = reconstruct_threads(&cpu, &DetailWindow::new(0, 125, 300));
        assert_eq!(threads.len(), 1);
        let thread = &threads[&Tid(7)];
        assert_eq!(thread.active_time, 100);
        assert_eq!(thread.events, vec![Event::new(IDLE_OUT, 0), Event::new(IDLE_IN, 100)]);
    }

    #[test]
    fn test_thread_running_before_window_is_counted() {
        let cpu = cpu(vec![core(&[(50, 7), (400, 0)])], &[]);
        let threads = reconstruct_threads(&cpu, &DetailWindow::new(100, 200, 301));
        assert_eq!(threads[&Tid(7)].active_time, 200);
        assert_eq!(threads[&Tid(7)].events[0], Event::new(IDLE_OUT, 100));
        assert_eq!(threads[&Tid(7)].events[1], Event::new(IDLE_IN, 300));
    }

    #[test]
    fn test_thread_migrating_between_cores_is_merged_in_order() {
        let cpu = cpu(
            vec![core(&[(0, 7), (100, 0)]), core(&[(0, 8), (100, 7), (200, 0)])],
            &[],
        );
        let threads = reconstruct_threads(&cpu, &DetailWindow::new(0, 150, 300));
        let events = &threads[&Tid(7)].events;
        assert_eq!(
            events,
            &vec![
                Event::new(IDLE_OUT, 0),
                Event::new(IDLE_IN, 100),
                Event::new(IDLE_OUT, 100),
                Event::new(IDLE_IN, 200),
            ]
        );
        assert_eq!(threads[&Tid(7)].active_time, 200);
        assert_eq!(threads[&Tid(8)].active_time, 100);
        assert!(!threads.contains_key(&Tid::IDLE));
    }

    #[test]
    fn test_total_activity_is_bounded_by_window_and_cores() {
        let cores = vec![
            core(&[(0, 3), (40, 4), (90, 0), (120, 3), (260, 5), (400, 0)]),
            core(&[(10, 4), (30, 6), (30, 7), (170, 0), (250, 6)]),
            core(&[(5, 8)]),
        ];
        let cpu = cpu(cores, &[]);
        for window in [
            DetailWindow::new(0, 100, 300),
            DetailWindow::new(20, 150, 280),
            DetailWindow::new(-50, 0, 50),
            DetailWindow::new(300, 400, 1000),
        ] {
            let threads = reconstruct_threads(&cpu, &window);
            let total: Micros = threads.values().map(|t| t.active_time).sum();
            assert!(total <= window.duration() * 3, "{window:?}: {total}");
            for thread in threads.values() {
                assert!(thread.events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
            }
        }
    }

    #[test]
    fn test_grouping_orders_by_usage_and_collects_unknown_threads() {
        let cpu = cpu(
            vec![core(&[(0, 7), (40, 8), (100, 9), (250, 11), (280, 0)])],
            &[(7, 7, "app"), (8, 7, "RenderThread"), (9, 9, "surfaceflinger")],
        );
        let threads = reconstruct_threads(&cpu, &DetailWindow::new(0, 150, 300));
        let (processes, unknown) = group_by_process(&cpu, threads);
        assert_eq!(unknown, vec![TimelineError::UnknownThread(Tid(11))]);

        let names: Vec<&str> = processes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["surfaceflinger", "app", "Others"]);
        assert_eq!(processes[0].active_time, 150);
        assert_eq!(processes[1].active_time, 100);
        assert_eq!(processes[1].threads[0].name, "RenderThread");
        assert_eq!(processes[1].threads[1].name, "app");
        assert_eq!(processes[2].pid, None);
        assert_eq!(processes[2].threads[0].name, "Thread 11");
        assert_eq!(processes[2].label(300), "Others, cpu usage: 10.00%.");
        assert_eq!(processes[0].label(300), "surfaceflinger <9>, cpu usage: 50.00%.");
    }

    #[test]
    fn test_process_without_own_entry_is_named_others() {
        let cpu = cpu(vec![core(&[(0, 20), (60, 0)])], &[(20, 19, "worker")]);
        let threads = reconstruct_threads(&cpu, &DetailWindow::new(0, 50, 100));
        let (processes, unknown) = group_by_process(&cpu, threads);
        assert_eq!(processes[0].label(100), "Others <19>, cpu usage: 60.00%.");
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_build_renders_rows_bands_and_time_marks() {
        let cpu = cpu(vec![core(&[(0, 7), (100, 0)])], &[(7, 7, "app")]);
        let config = DetailedViewConfig::default();
        let view = CpuDetailedView::build(&cpu, DetailWindow::new(0, 125, 300), 100.0, &config)
            .unwrap();

        assert_eq!(
            view.title(),
            "CPU view. 1/1 active processes/threads. Total cpu usage: 33.33%."
        );
        assert_eq!(
            view.report_lines(),
            vec![
                "CPU view. 1/1 active processes/threads. Total cpu usage: 33.33%.".to_string(),
                "app <7>, cpu usage: 33.33%.".to_string(),
                "  app 33.33%".to_string(),
            ]
        );

        let layout = view.layout();
        assert_eq!(layout.resolution(), 25.0);
        assert_eq!(layout.offset_x(), 140.0);
        assert_eq!(layout.width(), 12.0 + 140.0);
        assert_eq!(layout.bands().len(), 1);
        assert_eq!(layout.bands()[0].top, 16.0);

        let marks: Vec<f64> = layout
            .surface()
            .shapes()
            .filter_map(|s| match s {
                Shape::Line { x1, .. } => Some(*x1),
                _ => None,
            })
            .collect();
        assert_eq!(marks, vec![140.0, 145.0, 140.0 + 299.0 / 25.0]);
        assert_eq!(layout.surface().texts(), vec!["app <7>, cpu usage: 33.33%.", "app 33.33%"]);
        assert!(view.unknown_threads().is_empty());
    }

    #[test]
    fn test_open_marks_overview_and_discard_removes_marker() {
        let cpu = cpu(vec![core(&[(0, 7)])], &[(7, 7, "app")]);
        let mut overview = BandLayout::new(RecordingSurface::new(), 100.0, 0, 1_000_000);
        overview
            .add_band(EventSequence::new(Arc::from(Vec::new()), CPU_IDLE_RANGE), 6.0, 2.0)
            .unwrap();
        let shapes_before = overview.surface().len();

        let view =
            CpuDetailedView::open(&cpu, &mut overview, 1000.0, 1000.0, &DetailedViewConfig::default())
                .unwrap();
        let window = view.window();
        assert_eq!(window.at, 100_000);
        let selection = view.selection().unwrap();
        match overview.surface().get(selection) {
            Some(Shape::Rect { x, y, height, color, opacity, .. }) => {
                assert_eq!(*x, window.start as f64 / 100.0);
                assert_eq!(*y, 0.0);
                assert_eq!(*height, 6.0);
                assert_eq!(*color, BLACK);
                assert_eq!(*opacity, Some(0.1));
            }
            other => panic!("expected selection rect, got {other:?}"),
        }
        assert_eq!(view.total_active(), window.duration() - 1);

        view.discard(&mut overview);
        assert_eq!(overview.surface().len(), shapes_before);
    }
}
