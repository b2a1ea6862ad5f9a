//! Type-filtered views over shared event lists.
//!
//! An [`EventSequence`] is a cheap view (shared pointer + type window) over an
//! [`EventList`]. Several views may alias one list with different windows,
//! e.g. the buffer-queue and exo events of the same graphics buffer.
//!
//! Every index returned by this module refers to an event whose type lies in
//! the view's window. Events outside the window behave as if absent, while the
//! binary search still runs over the unfiltered, timestamp-sorted list.

use std::ops::RangeInclusive;

use gfxscope_common::{end_of_sequence_rule, render_attributes, EndOfSequence, RenderAttributes};

use crate::domain::{Micros, TimelineError};
use crate::trace_data::{Event, EventList};

/// Traversal direction for [`EventSequence::next_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Ordered, type-filtered view over an event list.
#[derive(Debug, Clone)]
pub struct EventSequence {
    events: EventList,
    types: RangeInclusive<u32>,
}

impl EventSequence {
    /// Create a view showing events with `types.start() <= type <= types.end()`.
    #[must_use]
    pub fn new(events: EventList, types: RangeInclusive<u32>) -> Self {
        Self { events, types }
    }

    /// Create a view showing a single event type.
    #[must_use]
    pub fn single(events: EventList, kind: u32) -> Self {
        Self::new(events, kind..=kind)
    }

    /// Unfiltered underlying events.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn event(&self, index: usize) -> &Event {
        &self.events[index]
    }

    #[must_use]
    pub fn timestamp(&self, index: usize) -> Micros {
        self.events[index].timestamp
    }

    /// Whether `index` refers to an event visible through this view.
    #[must_use]
    pub fn is_visible(&self, index: usize) -> bool {
        self.events.get(index).is_some_and(|e| self.types.contains(&e.kind))
    }

    /// Find the next (or previous) visible event, starting strictly after
    /// (before) `index`. `None` starts outside the list: at the front for
    /// [`Direction::Forward`], at the back for [`Direction::Backward`].
    #[must_use]
    pub fn next_event(&self, index: Option<usize>, direction: Direction) -> Option<usize> {
        let len = self.events.len();
        match direction {
            Direction::Forward => {
                let start = index.map_or(0, |i| i + 1);
                (start..len).find(|&i| self.is_visible(i))
            }
            Direction::Backward => {
                let end = index.map_or(len, |i| i.min(len));
                (0..end).rev().find(|&i| self.is_visible(i))
            }
        }
    }

    /// First visible event.
    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.next_event(None, Direction::Forward)
    }

    /// Last visible event.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.next_event(None, Direction::Backward)
    }

    /// Iterate visible event indices in timestamp order.
    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.events.len()).filter(|&i| self.is_visible(i))
    }

    /// Visible event closest to `timestamp`.
    ///
    /// On equal distance the earlier event wins. Returns `None` only when no
    /// event is visible.
    #[must_use]
    pub fn closest(&self, timestamp: Micros) -> Option<usize> {
        let (first, last) = (self.events.first()?, self.events.last()?);
        if first.timestamp >= timestamp {
            return self.first();
        }
        if last.timestamp <= timestamp {
            return self.last();
        }

        // Raw neighbours around the insertion point; both exist because of the
        // bounds checks above.
        let first_after = self.events.partition_point(|e| e.timestamp < timestamp);
        let before = self.next_event(Some(first_after), Direction::Backward);
        let after = self.next_event(Some(first_after - 1), Direction::Forward);

        match (before, after) {
            (None, after) => after,
            (before, None) => before,
            (Some(before), Some(after)) => {
                let diff_before = timestamp - self.timestamp(before);
                let diff_after = self.timestamp(after) - timestamp;
                if diff_before <= diff_after {
                    Some(before)
                } else {
                    Some(after)
                }
            }
        }
    }

    /// First visible event with timestamp at or after `timestamp`.
    #[must_use]
    pub fn first_at_or_after(&self, timestamp: Micros) -> Option<usize> {
        let closest = self.closest(timestamp)?;
        if self.timestamp(closest) >= timestamp {
            Some(closest)
        } else {
            self.next_event(Some(closest), Direction::Forward)
        }
    }

    /// Whether the event at `index` terminates an active run.
    #[must_use]
    pub fn is_end_of_sequence(&self, index: usize) -> bool {
        match end_of_sequence_rule(self.events[index].kind) {
            EndOfSequence::Never => false,
            EndOfSequence::Always => true,
            EndOfSequence::FollowedBy(successors) => {
                match self.next_event(Some(index), Direction::Forward) {
                    // Listed as a possible end and nothing follows
                    None => true,
                    Some(next) => successors.contains(&self.events[next].kind),
                }
            }
        }
    }

    /// Render attributes of the event at `index`.
    pub fn attributes(&self, index: usize) -> Result<&'static RenderAttributes, TimelineError> {
        let code = self.events[index].kind;
        render_attributes(code).ok_or(TimelineError::UnknownEventType { code })
    }
}
