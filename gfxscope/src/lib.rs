//! # gfxscope - Graphics Trace Timeline Viewer
//!
//! gfxscope renders a captured graphics-pipeline trace (CPU scheduling,
//! Chrome and Android buffer flows, per-activity buffer queues) as stacked
//! timeline bands, answers hover queries with event-sequence tooltips and
//! breaks CPU usage down per process and thread around a clicked instant.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     trace.json (capture)                        │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ serde
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     TraceModel (trace_data)                     │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Timeline (overview)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │ EventSequence│──▶│  BandLayout  │──▶│   Surface    │         │
//! │  │ (classifier) │   │  (segments)  │   │  (recorded)  │         │
//! │  └──────────────┘   └──────┬───────┘   └──────┬───────┘         │
//! │                            │                  │                 │
//! │            ┌───────────────┼──────────┐       │                 │
//! │            ▼               ▼          │       ▼                 │
//! │     ┌────────────┐  ┌──────────────┐  │  ┌──────────┐           │
//! │     │  Tooltip   │  │ CPU detailed │  │  │   TUI    │           │
//! │     │  (query)   │  │    view      │  │  │ (raster) │           │
//! │     └────────────┘  └──────────────┘  │  └──────────┘           │
//! │                      TimelineController                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! ### Core Modules
//!
//! - [`trace_data`]: Trace document model and JSON loading
//! - [`timeline`]: Event sequences, band layout, tooltips, detailed view
//! - [`overview`]: Section assembly and pointer/click routing
//!
//! ### Supporting Modules
//!
//! - [`domain`]: Newtypes (`Tid`, `Pid`, `TaskId`) and error types
//! - [`config`]: Overview and detailed-view layout parameters
//! - [`cli`]: Command-line argument parsing
//! - [`summary`]: Headless text reports
//! - [`tui`]: Interactive terminal viewer
//!
//! ## Example: Headless Report
//!
//! ```no_run
//! use gfxscope::config::{DetailedViewConfig, OverviewConfig};
//! use gfxscope::overview::Timeline;
//! use gfxscope::trace_data::TraceModel;
//!
//! let trace = TraceModel::from_file("trace.json")?;
//! let mut timeline =
//!     Timeline::new(trace, OverviewConfig::default(), DetailedViewConfig::default());
//! gfxscope::summary::write_summary(&mut std::io::stdout(), &timeline)?;
//! if let Some(view) = timeline.open_detailed_at(250_000) {
//!     gfxscope::summary::write_detail(&mut std::io::stdout(), view)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod overview;
pub mod summary;
pub mod timeline;
pub mod trace_data;
pub mod tui;
