//! # Timeline Core
//!
//! Event-timeline model and its layout/query engine.
//!
//! ```text
//!   EventList (Arc<[Event]>)
//!        │  type window
//!        ▼
//!   EventSequence ──▶ BandLayout ──▶ Surface (shapes)
//!        │                 │
//!        │                 ▼
//!        │            tooltip::query(x, y)
//!        ▼
//!   CpuDetailedView (zoomed, per thread) ◀── TimelineController
//! ```
//!
//! - [`events`]: filtered views, binary search, end-of-sequence classification
//! - [`layout`]: time ↔ pixel mapping and stacked bands
//! - [`tooltip`]: content under the cursor
//! - [`detailed`]: CPU drill-down
//! - [`controller`]: single active detailed view

pub mod controller;
pub mod detailed;
pub mod events;
pub mod layout;
pub mod surface;
pub mod tooltip;

pub use controller::{Key, TimelineController};
pub use detailed::{CpuDetailedView, DetailWindow, ProcessUsage, ThreadUsage};
pub use events::{Direction, EventSequence};
pub use layout::{Band, BandLayout, Segment};
pub use surface::{RecordingSurface, Shape, ShapeId, Surface};
pub use tooltip::{query, Tooltip, TooltipBody, TooltipLine};
