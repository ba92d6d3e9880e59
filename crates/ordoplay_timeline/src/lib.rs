// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative timeline sequencer for `OrdoPlay`.
//!
//! This crate provides time-addressable choreography:
//! - Tweens receiving normalized progress
//! - One-shot actions
//! - Wait barriers that close parallel groups
//! - Counted and infinite loop regions
//! - Nested timelines composed as single spans
//!
//! ## Architecture
//!
//! A [`Timeline`] is authored with builder calls, frozen on first use, and then
//! driven by the host one tick at a time ([`Timeline::tick`] /
//! [`Timeline::advance`]) or scrubbed to an arbitrary timecode
//! ([`Timeline::scrub_to`]). Each step resolves the event list against a
//! [`Sweep`] from the previous cursor to the new target.

pub mod clock;
pub mod error;
pub mod event;
pub mod host;
pub mod loop_control;
pub mod nested;
pub mod playback;
pub mod resolve;
pub mod sequence;
pub mod span;
pub mod timeline;
pub mod vars;

pub use clock::{Clock, ClockConfig, ClockMode, ManualClock};
pub use error::{ErrorKind, Result, TimelineError};
pub use event::{ActionContext, Event, EventInfo, EventKind, LoopMarker, LoopMarkerKind};
pub use host::HostId;
pub use loop_control::{LoopController, LoopState};
pub use nested::NestedTimeline;
pub use playback::{PlaybackState, TickStatus};
pub use resolve::{Direction, Sweep, Traversal};
pub use sequence::{Sequence, SequenceUpdate};
pub use span::Span;
pub use timeline::{Timeline, TimelineId};
pub use vars::Vars;
