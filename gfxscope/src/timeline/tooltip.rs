//! Tooltip content for the position under the cursor.
//!
//! Resolution order:
//! 1. band under the cursor (none → no tooltip)
//! 2. global marker within [`GLOBAL_EVENT_DISTANCE`] (takes precedence)
//! 3. idle gap, or the whole active run containing the cursor
//!
//! ```text
//! 1234.5 ms
//! 1230.1 ms  (●) app requests buffer [2.3 ms]
//! +2.3 ms    (●) app fills buffer [4.0 ms]
//! +6.3 ms    (○) buffer is queued
//! Click for detailed info
//! ```
//!
//! Querying is a pure function of the layout and the cursor position.

use gfxscope_common::{Rgb, BAND_COLOR, BLACK};

use super::events::{Direction, EventSequence};
use super::layout::BandLayout;
use super::surface::Surface;
use crate::domain::{Micros, TimelineError};

/// Global markers closer than this (µs) override band content.
pub const GLOBAL_EVENT_DISTANCE: f64 = 200.0;

// Tooltip rendering constants (pixels)
const HORIZONTAL_GAP: f64 = 10.0;
const EVENT_ICON_OFFSET: f64 = 70.0;
const EVENT_ICON_RADIUS: f64 = 4.0;
const EVENT_NAME_OFFSET: f64 = 78.0;
const VERTICAL_GAP: f64 = 5.0;
const LINE_HEIGHT: f64 = 16.0;
const FONT_SIZE: f64 = 12.0;

/// Format microseconds as milliseconds with one decimal digit.
#[must_use]
pub fn ms_text(timestamp: f64) -> String {
    format!("{:.1}", timestamp / 1000.0)
}

/// One event of an active run.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStep {
    pub timestamp: Micros,
    pub name: &'static str,
    pub color: Rgb,
    /// Time since the previous step; `None` for the first step
    pub since_previous: Option<Micros>,
    /// Time until the next step; `None` for the last step
    pub until_next: Option<Micros>,
}

/// What the cursor points at.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipBody {
    /// A global marker near the cursor
    GlobalEvent { name: &'static str, timestamp: Micros },
    /// An idle interval
    Idle { start: Micros, end: Micros },
    /// An active run of events, from its first event to its end marker
    Sequence(Vec<SequenceStep>),
}

/// Structured tooltip content.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Time under the cursor
    pub timestamp: f64,
    pub body: TooltipBody,
    /// Clicking opens a detailed view
    pub detailed_hint: bool,
}

/// One formatted tooltip line.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLine {
    /// Time column (absolute for the first step, relative afterwards)
    pub prefix: Option<String>,
    pub icon: Option<Rgb>,
    pub text: String,
}

impl TooltipLine {
    fn text(text: String) -> Self {
        Self { prefix: None, icon: None, text }
    }
}

/// Resolve tooltip content for cursor position `(x, y)` in layout coordinates.
///
/// Returns `Ok(None)` when the cursor is left of the time axis or outside
/// every band.
pub fn query<S: Surface>(
    layout: &BandLayout<S>,
    x: f64,
    y: f64,
) -> Result<Option<Tooltip>, TimelineError> {
    let offset = x - layout.offset_x();
    if offset < 0.0 {
        return Ok(None);
    }
    let Some(sequence) = layout.band_at(y) else {
        return Ok(None);
    };

    let timestamp = layout.offset_to_time(offset);
    let body = if let Some(event) = layout.find_global_event(timestamp, GLOBAL_EVENT_DISTANCE) {
        let name = gfxscope_common::render_attributes(event.kind)
            .ok_or(TimelineError::UnknownEventType { code: event.kind })?
            .name;
        TooltipBody::GlobalEvent { name, timestamp: event.timestamp }
    } else {
        band_body(layout, sequence, timestamp)?
    };

    Ok(Some(Tooltip { timestamp, body, detailed_hint: layout.supports_detailed_view() }))
}

fn band_body<S: Surface>(
    layout: &BandLayout<S>,
    sequence: &EventSequence,
    timestamp: f64,
) -> Result<TooltipBody, TimelineError> {
    // `next` is the first event after the cursor, `current` the last one at
    // or before it.
    #[allow(clippy::cast_possible_truncation)]
    let next = sequence.first_at_or_after(timestamp.floor() as Micros + 1);
    let current = match next {
        Some(index) => sequence.next_event(Some(index), Direction::Backward),
        None => sequence.last(),
    };

    let Some(mut index) = current.filter(|&i| !sequence.is_end_of_sequence(i)) else {
        let start = current.map_or(layout.min_timestamp(), |i| sequence.timestamp(i));
        let end = next.map_or(layout.max_timestamp(), |i| sequence.timestamp(i));
        return Ok(TooltipBody::Idle { start, end });
    };

    // Walk back to the start of the run
    while let Some(previous) = sequence.next_event(Some(index), Direction::Backward) {
        if sequence.is_end_of_sequence(previous) {
            break;
        }
        index = previous;
    }

    let mut steps: Vec<SequenceStep> = Vec::new();
    let mut cursor = Some(index);
    while let Some(current) = cursor {
        let attributes = sequence.attributes(current)?;
        let timestamp = sequence.timestamp(current);
        let end_of_sequence = sequence.is_end_of_sequence(current);
        let since_previous = steps.last_mut().map(|previous| {
            let elapsed = timestamp - previous.timestamp;
            previous.until_next = Some(elapsed);
            elapsed
        });
        steps.push(SequenceStep {
            timestamp,
            name: attributes.name,
            // The end marker's own color is never meant to be shown
            color: if end_of_sequence { BAND_COLOR } else { attributes.color },
            since_previous,
            until_next: None,
        });
        if end_of_sequence {
            break;
        }
        cursor = sequence.next_event(Some(current), Direction::Forward);
    }
    Ok(TooltipBody::Sequence(steps))
}

impl Tooltip {
    /// Format the tooltip as lines of text.
    #[must_use]
    pub fn lines(&self) -> Vec<TooltipLine> {
        let mut lines = vec![TooltipLine::text(format!("{} ms", ms_text(self.timestamp)))];
        match &self.body {
            TooltipBody::GlobalEvent { name, timestamp } => {
                lines.push(TooltipLine::text(format!("{name} {} ms.", ms_text(*timestamp as f64))));
            }
            TooltipBody::Idle { start, end } => {
                lines.push(TooltipLine::text(format!(
                    "Idle {}...{} ms.",
                    ms_text(*start as f64),
                    ms_text(*end as f64)
                )));
            }
            TooltipBody::Sequence(steps) => {
                let sequence_start = steps.first().map_or(0, |step| step.timestamp);
                for step in steps {
                    let prefix = if step.since_previous.is_none() {
                        format!("{} ms", ms_text(step.timestamp as f64))
                    } else {
                        format!("+{} ms", ms_text((step.timestamp - sequence_start) as f64))
                    };
                    let text = match step.until_next {
                        Some(elapsed) => format!("{} [{} ms]", step.name, ms_text(elapsed as f64)),
                        None => step.name.to_string(),
                    };
                    lines.push(TooltipLine { prefix: Some(prefix), icon: Some(step.color), text });
                }
            }
        }
        if self.detailed_hint {
            lines.push(TooltipLine::text("Click for detailed info".to_string()));
        }
        lines
    }

    /// Draw the tooltip onto `surface`; returns the total height used.
    pub fn draw(&self, surface: &mut dyn Surface) -> f64 {
        let mut y = VERTICAL_GAP + LINE_HEIGHT;
        for line in self.lines() {
            match (&line.prefix, line.icon) {
                (Some(prefix), Some(icon)) => {
                    surface.draw_text(HORIZONTAL_GAP, y, FONT_SIZE, prefix);
                    surface.draw_circle(
                        EVENT_ICON_OFFSET,
                        y - EVENT_ICON_RADIUS,
                        EVENT_ICON_RADIUS,
                        1.0,
                        icon,
                        BLACK,
                    );
                    surface.draw_text(EVENT_NAME_OFFSET, y, FONT_SIZE, &line.text);
                }
                _ => {
                    surface.draw_text(HORIZONTAL_GAP, y, FONT_SIZE, &line.text);
                }
            }
            y += LINE_HEIGHT;
        }
        y - LINE_HEIGHT + VERTICAL_GAP
    }
}
