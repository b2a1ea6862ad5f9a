//! Band layout: maps event sequences onto stacked horizontal bands.
//!
//! # Coordinate Space
//!
//! ```text
//!  x = offset_x + (timestamp - min_timestamp) / resolution
//!
//!  y=0   ┌──────────────────────────────────────────┐
//!        │ band 0  ███▒▒▒▒░░░░░███▒▒░░░░░░░░░░░░░░░ │  height
//!        ├────────────────── padding ───────────────┤
//!        │ band 1  ░░░░███████░░░░░░░███░░░░░░░░░░░ │
//!        └──────────────────────────────────────────┘
//!                │            │       global markers span all bands
//! ```
//!
//! A segment's color is the state entered by the event that starts it; after
//! an end-of-sequence event the band reverts to the idle background.

use gfxscope_common::{Rgb, BAND_COLOR};

use super::events::{Direction, EventSequence};
use super::surface::Surface;
use crate::domain::{Micros, TimelineError};
use crate::trace_data::Event;

/// Vertical extent of one rendered band.
#[derive(Debug, Clone)]
pub struct Band {
    pub sequence: EventSequence,
    pub top: f64,
    pub bottom: f64,
}

/// One colored horizontal run of a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x: f64,
    pub width: f64,
    pub color: Rgb,
}

/// Stack of event bands drawn onto a surface at a fixed time resolution.
#[derive(Debug)]
pub struct BandLayout<S> {
    surface: S,
    /// Microseconds per pixel
    resolution: f64,
    min_timestamp: Micros,
    max_timestamp: Micros,
    offset_x: f64,
    width: f64,
    height: f64,
    /// Top of the next band
    next_y: f64,
    bands: Vec<Band>,
    global_events: Vec<EventSequence>,
    detailed_view: bool,
}

impl<S: Surface> BandLayout<S> {
    #[must_use]
    pub fn new(surface: S, resolution: f64, min_timestamp: Micros, max_timestamp: Micros) -> Self {
        Self {
            surface,
            resolution,
            min_timestamp,
            max_timestamp,
            offset_x: 0.0,
            width: 0.0,
            height: 0.0,
            next_y: 0.0,
            bands: Vec::new(),
            global_events: Vec::new(),
            detailed_view: false,
        }
    }

    /// Horizontal offset where the time axis starts (room for labels).
    pub fn set_offset_x(&mut self, offset_x: f64) {
        self.offset_x = offset_x;
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Mark this layout as able to open a detailed view on click.
    pub fn enable_detailed_view(&mut self) {
        self.detailed_view = true;
    }

    #[must_use]
    pub fn supports_detailed_view(&self) -> bool {
        self.detailed_view
    }

    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[must_use]
    pub fn min_timestamp(&self) -> Micros {
        self.min_timestamp
    }

    #[must_use]
    pub fn max_timestamp(&self) -> Micros {
        self.max_timestamp
    }

    #[must_use]
    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Bottom of the last band.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Top of the next band, including trailing padding and spacing.
    #[must_use]
    pub fn next_y(&self) -> f64 {
        self.next_y
    }

    #[must_use]
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    #[must_use]
    pub fn global_events(&self) -> &[EventSequence] {
        &self.global_events
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Convert a timestamp to a pixel offset relative to the time axis origin.
    #[must_use]
    pub fn timestamp_to_offset(&self, timestamp: f64) -> f64 {
        (timestamp - self.min_timestamp as f64) / self.resolution
    }

    /// Inverse of [`Self::timestamp_to_offset`].
    #[must_use]
    pub fn offset_to_time(&self, offset: f64) -> f64 {
        offset * self.resolution + self.min_timestamp as f64
    }

    /// Reserve vertical space without adding a band (e.g. for a caption row).
    pub fn add_spacing(&mut self, height: f64) {
        self.next_y += height;
    }

    /// Compute the colored segments of a band without drawing them.
    ///
    /// Segments tile `[min_timestamp, max_timestamp]` exactly: the first one
    /// starts at the time axis origin and the last one ends at `max_timestamp`.
    pub fn band_segments(&self, sequence: &EventSequence) -> Result<Vec<Segment>, TimelineError> {
        let first = sequence.first_at_or_after(self.min_timestamp);

        // State carried in from an event before the visible range
        let previous = match first {
            Some(index) => sequence.next_event(Some(index), Direction::Backward),
            None => sequence.last(),
        };
        let mut color = match previous {
            Some(index) if !sequence.is_end_of_sequence(index) => sequence.attributes(index)?.color,
            _ => BAND_COLOR,
        };

        let mut segments = Vec::new();
        let mut x = self.offset_x;
        let mut index = first;
        while let Some(current) = index {
            let timestamp = sequence.timestamp(current);
            if timestamp >= self.max_timestamp {
                break;
            }
            let next_x = self.timestamp_to_offset(timestamp as f64) + self.offset_x;
            if next_x > x {
                segments.push(Segment { x, width: next_x - x, color });
            }
            color = if sequence.is_end_of_sequence(current) {
                BAND_COLOR
            } else {
                sequence.attributes(current)?.color
            };
            x = next_x;
            index = sequence.next_event(Some(current), Direction::Forward);
        }

        let end_x = self.timestamp_to_offset(self.max_timestamp as f64) + self.offset_x;
        segments.push(Segment { x, width: end_x - x, color });
        Ok(segments)
    }

    /// Append a band for `sequence`. Nothing is drawn if the sequence holds an
    /// event type without render attributes.
    pub fn add_band(
        &mut self,
        sequence: EventSequence,
        height: f64,
        padding: f64,
    ) -> Result<(), TimelineError> {
        let segments = self.band_segments(&sequence)?;
        for segment in segments {
            self.surface.draw_rect(
                segment.x,
                self.next_y,
                segment.width,
                height,
                segment.color,
                None,
            );
        }

        self.bands.push(Band { sequence, top: self.next_y, bottom: self.next_y + height });
        self.next_y += height;
        self.height = self.next_y;
        self.next_y += padding;
        Ok(())
    }

    /// Add events drawn as vertical markers across all bands added so far.
    pub fn add_global(&mut self, sequence: EventSequence) -> Result<(), TimelineError> {
        let markers = sequence
            .visible_indices()
            .map(|index| {
                let attributes = sequence.attributes(index)?;
                let x = self.timestamp_to_offset(sequence.timestamp(index) as f64) + self.offset_x;
                Ok((x, attributes))
            })
            .collect::<Result<Vec<_>, TimelineError>>()?;

        for (x, attributes) in markers {
            self.surface.draw_line(x, 0.0, x, self.height, attributes.color, attributes.width);
        }
        self.global_events.push(sequence);
        Ok(())
    }

    /// Sequence of the band covering vertical position `y`.
    #[must_use]
    pub fn band_at(&self, y: f64) -> Option<&EventSequence> {
        self.bands.iter().find(|band| band.top <= y && band.bottom > y).map(|band| &band.sequence)
    }

    /// Global event closest to `timestamp`, if strictly closer than `distance`.
    #[must_use]
    pub fn find_global_event(&self, timestamp: f64, distance: f64) -> Option<Event> {
        let mut best_distance = distance;
        let mut best_event = None;
        for sequence in &self.global_events {
            let Some(index) = nearest_to(sequence, timestamp) else {
                continue;
            };
            let event = *sequence.event(index);
            let test_distance = (event.timestamp as f64 - timestamp).abs();
            if test_distance < best_distance {
                best_distance = test_distance;
                best_event = Some(event);
            }
        }
        best_event
    }
}

/// Visible event nearest to a fractional timestamp; the earlier one wins ties.
fn nearest_to(sequence: &EventSequence, timestamp: f64) -> Option<usize> {
    #[allow(clippy::cast_possible_truncation)]
    let after = sequence.first_at_or_after(timestamp.ceil() as Micros);
    let before = match after {
        Some(index) => sequence.next_event(Some(index), Direction::Backward),
        None => sequence.last(),
    };
    #[allow(clippy::cast_precision_loss)]
    let distance = |index: usize| (sequence.timestamp(index) as f64 - timestamp).abs();
    match (before, after) {
        (Some(before), Some(after)) => {
            Some(if distance(before) <= distance(after) { before } else { after })
        }
        (before, after) => before.or(after),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::surface::{RecordingSurface, Shape};
    use crate::trace_data::EventList;
    use gfxscope_common::{
        render_attributes, BUFFER_QUEUE_ACQUIRE, BUFFER_QUEUE_DEQUEUE_START,
        BUFFER_QUEUE_QUEUE_DONE, CHROME_OS_JANK, IDLE_IN, IDLE_OUT, VSYNC,
    };

    fn list(events: &[(u32, Micros)]) -> EventList {
        events.iter().map(|&(kind, ts)| Event::new(kind, ts)).collect()
    }

    fn color(code: u32) -> Rgb {
        render_attributes(code).unwrap().color
    }

    fn layout(min: Micros, max: Micros) -> BandLayout<RecordingSurface> {
        BandLayout::new(RecordingSurface::new(), 10.0, min, max)
    }

    fn assert_tiles(layout: &BandLayout<RecordingSurface>, segments: &[Segment]) {
        let mut x = layout.offset_x();
        for segment in segments {
            assert!((segment.x - x).abs() < 1e-9, "gap or overlap at {x}");
            x = segment.x + segment.width;
        }
        let end = layout.timestamp_to_offset(layout.max_timestamp() as f64) + layout.offset_x();
        assert!((x - end).abs() < 1e-9);
    }

    #[test]
    fn test_offset_conversion_round_trips() {
        let layout = layout(1000, 5000);
        assert_eq!(layout.timestamp_to_offset(1000.0), 0.0);
        assert_eq!(layout.timestamp_to_offset(1500.0), 50.0);
        assert_eq!(layout.offset_to_time(50.0), 1500.0);
        assert_eq!(layout.offset_to_time(layout.timestamp_to_offset(4321.0)), 4321.0);
    }

    #[test]
    fn test_empty_sequence_emits_one_idle_segment() {
        let layout = layout(0, 1000);
        let segments = layout.band_segments(&EventSequence::new(list(&[]), 100..=199)).unwrap();
        assert_eq!(segments, vec![Segment { x: 0.0, width: 100.0, color: BAND_COLOR }]);
    }

    #[test]
    fn test_segments_follow_previous_event_and_idle_after_end() {
        let layout = layout(0, 1000);
        let sequence = EventSequence::new(
            list(&[
                (BUFFER_QUEUE_DEQUEUE_START, 100),
                (BUFFER_QUEUE_ACQUIRE, 300),
                (BUFFER_QUEUE_QUEUE_DONE, 500),
            ]),
            100..=199,
        );
        let segments = layout.band_segments(&sequence).unwrap();
        let colors: Vec<Rgb> = segments.iter().map(|s| s.color).collect();
        assert_eq!(
            colors,
            vec![
                BAND_COLOR,
                color(BUFFER_QUEUE_DEQUEUE_START),
                color(BUFFER_QUEUE_ACQUIRE),
                BAND_COLOR
            ]
        );
        assert_eq!(segments[3].x, 50.0);
        assert_tiles(&layout, &segments);
    }

    #[test]
    fn test_segments_clip_to_time_range() {
        let mut layout = layout(200, 600);
        layout.set_offset_x(40.0);
        let sequence = EventSequence::new(
            list(&[(IDLE_OUT, 100), (IDLE_IN, 300), (IDLE_OUT, 400), (IDLE_IN, 700)]),
            0..=1,
        );
        let segments = layout.band_segments(&sequence).unwrap();
        // Active state carried in from the event at 100
        assert_eq!(segments[0].color, color(IDLE_OUT));
        assert_eq!(segments.last().unwrap().color, color(IDLE_OUT));
        assert_eq!(segments.len(), 3);
        assert_tiles(&layout, &segments);
    }

    #[test]
    fn test_event_at_max_timestamp_is_not_drawn() {
        let layout = layout(0, 500);
        let sequence = EventSequence::new(list(&[(IDLE_OUT, 100), (IDLE_IN, 500)]), 0..=1);
        let segments = layout.band_segments(&sequence).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].color, color(IDLE_OUT));
        assert_tiles(&layout, &segments);
    }

    #[test]
    fn test_add_band_tracks_extents() {
        let mut layout = layout(0, 1000);
        let events = list(&[(IDLE_OUT, 100), (IDLE_IN, 200)]);
        layout.add_band(EventSequence::new(events.clone(), 0..=1), 6.0, 2.0).unwrap();
        layout.add_band(EventSequence::new(events, 0..=1), 6.0, 2.0).unwrap();
        assert_eq!(layout.height(), 14.0);
        assert_eq!(layout.next_y(), 16.0);
        assert!(layout.band_at(3.0).is_some());
        assert!(layout.band_at(7.0).is_none());
        assert!(layout.band_at(8.0).is_some());
        assert!(layout.band_at(14.0).is_none());
        assert_eq!(layout.surface().len(), 6);
    }

    #[test]
    fn test_add_band_rejects_unknown_event_type() {
        let mut layout = layout(0, 1000);
        let result = layout.add_band(EventSequence::new(list(&[(150, 10)]), 100..=199), 6.0, 2.0);
        assert_eq!(result, Err(TimelineError::UnknownEventType { code: 150 }));
        assert!(layout.surface().is_empty());
        assert!(layout.bands().is_empty());
    }

    #[test]
    fn test_global_markers_span_layout_height() {
        let mut layout = layout(0, 1000);
        layout.add_band(EventSequence::new(list(&[]), 0..=1), 16.0, 4.0).unwrap();
        let globals = list(&[(VSYNC, 100), (CHROME_OS_JANK, 150), (VSYNC, 900)]);
        layout.add_global(EventSequence::single(globals, VSYNC)).unwrap();

        let lines: Vec<&Shape> =
            layout.surface().shapes().filter(|s| matches!(s, Shape::Line { .. })).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            &Shape::Line { x1: 10.0, y1: 0.0, x2: 10.0, y2: 16.0, color: color(VSYNC), width: 0.5 }
        );
        assert_eq!(layout.height(), 16.0);
    }

    #[test]
    fn test_find_global_event_within_distance() {
        let mut layout = layout(0, 1000);
        let globals = list(&[(VSYNC, 100), (CHROME_OS_JANK, 150), (VSYNC, 900)]);
        layout.add_global(EventSequence::single(globals.clone(), VSYNC)).unwrap();
        layout.add_global(EventSequence::single(globals, CHROME_OS_JANK)).unwrap();

        assert_eq!(layout.find_global_event(140.0, 200.0).map(|e| e.kind), Some(CHROME_OS_JANK));
        assert_eq!(layout.find_global_event(110.0, 200.0).map(|e| e.timestamp), Some(100));
        assert_eq!(layout.find_global_event(500.0, 200.0), None);
    }

    #[test]
    fn test_find_global_event_compares_fractional_distances() {
        let mut layout = layout(0, 1000);
        let globals = list(&[(VSYNC, 100), (VSYNC, 300)]);
        layout.add_global(EventSequence::single(globals, VSYNC)).unwrap();

        let at = |timestamp: f64| layout.find_global_event(timestamp, 200.0).map(|e| e.timestamp);
        assert_eq!(at(200.4), Some(300));
        assert_eq!(at(199.6), Some(100));
        assert_eq!(at(200.0), Some(100));
        assert_eq!(at(0.5), Some(100));
        assert_eq!(at(499.5), Some(300));
    }
}
