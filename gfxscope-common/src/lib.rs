//! # Shared Event Tables (Producer ↔ Viewer)
//!
//! Defines the numeric event type codes and the static lookup tables that
//! describe how each code is rendered. The trace producer emits these codes
//! and the viewer interprets them, so both sides must agree on this table.
//!
//! ## Code Bands
//!
//! Codes are partitioned by subsystem:
//!
//! | Range       | Subsystem                                   |
//! |-------------|---------------------------------------------|
//! | `0..=3`     | CPU core activity (idle in/out, wake up)    |
//! | `100..=199` | Android buffer queue                        |
//! | `200..=299` | Wayland exo surfaces                        |
//! | `300..=399` | Chrome GPU barriers                         |
//! | `400..=499` | Android surface flinger + vsync             |
//! | `500..=599` | Chrome OS compositor                        |
//! | `10000`     | Service time mark                           |
//!
//! ## Key Tables
//!
//! - [`render_attributes`] - color, tooltip label and marker width per code
//! - [`end_of_sequence_rule`] - which codes terminate an active run

#![cfg_attr(not(test), no_std)]

use core::ops::RangeInclusive;

// ============================================================================
// Colors
// ============================================================================

/// 24-bit RGB color used by render attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Background color of a band; also used for idle intervals.
pub const BAND_COLOR: Rgb = Rgb(0xd3, 0xd3, 0xd3);

/// Color that must never be visible. Assigned to codes that always end a run.
pub const UNUSED_COLOR: Rgb = Rgb(0xff, 0x00, 0x00);

/// Black, used for overview selection and tooltip icon outlines.
pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);

// ============================================================================
// CPU Event Codes
// ============================================================================

/// CPU core entered the idle thread.
pub const IDLE_IN: u32 = 0;
/// CPU core left the idle thread.
pub const IDLE_OUT: u32 = 1;
/// Thread wake-up on a core.
pub const WAKE_UP: u32 = 2;
/// A thread became active on a core. Carries the thread id; tid 0 is idle.
pub const ACTIVE: u32 = 3;

// ============================================================================
// Graphics Buffer Event Codes
// ============================================================================

pub const BUFFER_QUEUE_DEQUEUE_START: u32 = 100;
pub const BUFFER_QUEUE_DEQUEUE_DONE: u32 = 101;
pub const BUFFER_QUEUE_QUEUE_START: u32 = 102;
pub const BUFFER_QUEUE_QUEUE_DONE: u32 = 103;
pub const BUFFER_QUEUE_ACQUIRE: u32 = 104;
pub const BUFFER_QUEUE_RELEASED: u32 = 105;
pub const BUFFER_FILL_JANK: u32 = 106;

pub const EXO_SURFACE_ATTACH: u32 = 200;
pub const EXO_PRODUCE_RESOURCE: u32 = 201;
pub const EXO_BOUND: u32 = 202;
pub const EXO_PENDING_QUERY: u32 = 203;
pub const EXO_RELEASED: u32 = 204;
pub const EXO_JANK: u32 = 205;

pub const CHROME_BARRIER_ORDER: u32 = 300;
pub const CHROME_BARRIER_FLUSH: u32 = 301;

pub const VSYNC: u32 = 400;
pub const SURFACE_FLINGER_INVALIDATION_START: u32 = 401;
pub const SURFACE_FLINGER_INVALIDATION_DONE: u32 = 402;
pub const SURFACE_FLINGER_COMPOSITION_START: u32 = 403;
pub const SURFACE_FLINGER_COMPOSITION_DONE: u32 = 404;
pub const SURFACE_FLINGER_COMPOSITION_JANK: u32 = 405;

pub const CHROME_OS_DRAW: u32 = 500;
pub const CHROME_OS_SWAP: u32 = 501;
pub const CHROME_OS_WAIT_FOR_ACK: u32 = 502;
pub const CHROME_OS_PRESENTATION_DONE: u32 = 503;
pub const CHROME_OS_SWAP_DONE: u32 = 504;
pub const CHROME_OS_JANK: u32 = 505;

/// Service event used for synthetic time marks (window bounds, cursor).
pub const TIME_MARK: u32 = 10000;

// ============================================================================
// Subsystem Ranges
// ============================================================================

/// Idle in/out codes shown on CPU bands.
pub const CPU_IDLE_RANGE: RangeInclusive<u32> = IDLE_IN..=IDLE_OUT;
pub const BUFFER_QUEUE_RANGE: RangeInclusive<u32> = 100..=199;
pub const EXO_RANGE: RangeInclusive<u32> = 200..=299;
pub const CHROME_BARRIER_RANGE: RangeInclusive<u32> = 300..=399;
pub const ANDROID_TOP_LEVEL_RANGE: RangeInclusive<u32> = 400..=499;
pub const CHROME_TOP_LEVEL_RANGE: RangeInclusive<u32> = 500..=599;

// ============================================================================
// Render Attributes
// ============================================================================

/// Describes how events of one type are rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderAttributes {
    /// Segment color for the interval that follows the event
    pub color: Rgb,
    /// Label shown in tooltips
    pub name: &'static str,
    /// Stroke width when the event is drawn as a global marker line
    pub width: f64,
}

const fn attrs(color: Rgb, name: &'static str) -> RenderAttributes {
    RenderAttributes { color, name, width: 1.0 }
}

const fn marker(color: Rgb, name: &'static str, width: f64) -> RenderAttributes {
    RenderAttributes { color, name, width }
}

/// Render attributes keyed by event code. Sorted by code for binary search.
static EVENT_ATTRIBUTES: [(u32, RenderAttributes); 30] = [
    (IDLE_IN, attrs(BAND_COLOR, "idle")),
    (IDLE_OUT, attrs(Rgb(0xff, 0xbf, 0x00), "active")),
    (BUFFER_QUEUE_DEQUEUE_START, attrs(Rgb(0x99, 0xcc, 0x00), "app requests buffer")),
    (BUFFER_QUEUE_DEQUEUE_DONE, attrs(Rgb(0x66, 0x99, 0x99), "app fills buffer")),
    (BUFFER_QUEUE_QUEUE_START, attrs(Rgb(0xcc, 0xcc, 0x00), "app queues buffer")),
    (BUFFER_QUEUE_QUEUE_DONE, attrs(UNUSED_COLOR, "buffer is queued")),
    (BUFFER_QUEUE_ACQUIRE, attrs(Rgb(0x66, 0xff, 0xcc), "use buffer")),
    (BUFFER_QUEUE_RELEASED, attrs(UNUSED_COLOR, "buffer released")),
    (BUFFER_FILL_JANK, marker(Rgb(0xff, 0x00, 0x00), "buffer filling jank", 1.0)),
    (EXO_SURFACE_ATTACH, attrs(Rgb(0x99, 0xcc, 0xff), "surface attach")),
    (EXO_PRODUCE_RESOURCE, attrs(Rgb(0xcc, 0x66, 0xff), "produce resource")),
    (EXO_BOUND, attrs(Rgb(0x66, 0xff, 0xff), "buffer bound")),
    (EXO_PENDING_QUERY, attrs(Rgb(0x00, 0xff, 0x99), "pending query")),
    (EXO_RELEASED, attrs(UNUSED_COLOR, "released")),
    (EXO_JANK, marker(Rgb(0xff, 0x00, 0x00), "surface attach jank", 1.0)),
    (CHROME_BARRIER_ORDER, attrs(Rgb(0xff, 0x99, 0x33), "barrier order")),
    (CHROME_BARRIER_FLUSH, attrs(UNUSED_COLOR, "barrier flush")),
    (VSYNC, marker(Rgb(0xff, 0x33, 0x00), "vsync", 0.5)),
    (SURFACE_FLINGER_INVALIDATION_START, attrs(Rgb(0xff, 0x99, 0x33), "invalidation start")),
    (SURFACE_FLINGER_INVALIDATION_DONE, attrs(UNUSED_COLOR, "invalidation done")),
    (SURFACE_FLINGER_COMPOSITION_START, attrs(Rgb(0x33, 0x99, 0xff), "composition start")),
    (SURFACE_FLINGER_COMPOSITION_DONE, attrs(UNUSED_COLOR, "composition done")),
    (
        SURFACE_FLINGER_COMPOSITION_JANK,
        marker(Rgb(0xff, 0x00, 0x00), "Android composition jank", 1.0),
    ),
    (CHROME_OS_DRAW, attrs(Rgb(0x33, 0x99, 0xff), "draw")),
    (CHROME_OS_SWAP, attrs(Rgb(0xcc, 0x99, 0x00), "swap")),
    (CHROME_OS_WAIT_FOR_ACK, attrs(Rgb(0xcc, 0xff, 0xff), "wait for ack")),
    (CHROME_OS_PRESENTATION_DONE, attrs(Rgb(0xff, 0xbf, 0x00), "presentation done")),
    (CHROME_OS_SWAP_DONE, attrs(Rgb(0x65, 0xf4, 0x41), "swap done")),
    (CHROME_OS_JANK, marker(Rgb(0xff, 0x00, 0x00), "Chrome composition jank", 1.0)),
    (TIME_MARK, marker(Rgb(0xff, 0xff, 0xff), "Time mark", 0.75)),
];

/// Look up render attributes for an event code.
///
/// Returns `None` for codes without registered attributes. For a well-formed
/// trace this never happens; it indicates a producer/viewer version mismatch.
#[must_use]
pub fn render_attributes(code: u32) -> Option<&'static RenderAttributes> {
    EVENT_ATTRIBUTES
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|i| &EVENT_ATTRIBUTES[i].1)
}

// ============================================================================
// End Of Sequence Table
// ============================================================================

/// Classification rule for an event code.
///
/// Time after an end-of-sequence event is idle until the next event starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfSequence {
    /// Code never terminates a run
    Never,
    /// Code always terminates a run
    Always,
    /// Code terminates a run when it is the last event, or when the next
    /// visible event has one of the listed codes
    FollowedBy(&'static [u32]),
}

/// Chrome does not define exactly which event is the last in a frame;
/// different pipelines finish with either presentation or swap done.
const CHROME_OS_FRAME_START: &[u32] = &[CHROME_OS_DRAW];

/// Returns the end-of-sequence rule for an event code.
#[must_use]
pub fn end_of_sequence_rule(code: u32) -> EndOfSequence {
    match code {
        IDLE_IN
        | BUFFER_QUEUE_QUEUE_DONE
        | BUFFER_QUEUE_RELEASED
        | EXO_RELEASED
        | CHROME_BARRIER_FLUSH
        | SURFACE_FLINGER_INVALIDATION_DONE
        | SURFACE_FLINGER_COMPOSITION_DONE => EndOfSequence::Always,
        CHROME_OS_PRESENTATION_DONE | CHROME_OS_SWAP_DONE => {
            EndOfSequence::FollowedBy(CHROME_OS_FRAME_START)
        }
        _ => EndOfSequence::Never,
    }
}
