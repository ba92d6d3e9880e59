// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline events.
//!
//! Every entry in a timeline's event list shares the same addressing: the
//! owning timeline, a dense authoring index and the scheduled timecode. The
//! payload is one of a closed set of kinds.

use crate::error::Result;
use crate::resolve::Direction;
use crate::span::Span;
use crate::timeline::{Timeline, TimelineId};
use crate::vars::Vars;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Callback invoked when an action point is crossed
pub type ActionFn = Box<dyn FnMut(&ActionContext<'_>)>;

/// Kind of a timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// One-shot callback
    Action,
    /// Synchronization barrier
    Wait,
    /// Start of a loop region
    LoopBegin,
    /// End of a loop region
    LoopEnd,
    /// Tween span
    Sequence,
    /// Nested timeline span
    Nested,
}

impl EventKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Action => "Do",
            Self::Wait => "Wait",
            Self::LoopBegin => "LoopBegin",
            Self::LoopEnd => "LoopEnd",
            Self::Sequence => "Sequence",
            Self::Nested => "Nested",
        }
    }

    /// Whether the event occupies a duration
    pub fn is_span(&self) -> bool {
        matches!(self, Self::Sequence | Self::Nested)
    }
}

/// Begin or end of a loop region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopMarkerKind {
    /// Region start
    Begin,
    /// Region end
    End,
}

/// Loop region marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopMarker {
    /// Begin or end
    pub kind: LoopMarkerKind,
    /// Number of passes; zero or negative repeats forever. Unused on `End`.
    pub count: i32,
}

impl LoopMarker {
    /// Whether the region repeats until stopped
    pub fn is_infinite(&self) -> bool {
        self.count <= 0
    }
}

/// Zero-duration callback
pub struct ActionPoint {
    callback: ActionFn,
}

impl ActionPoint {
    pub(crate) fn new(callback: ActionFn) -> Self {
        Self { callback }
    }

    pub(crate) fn invoke(&mut self, ctx: &ActionContext<'_>) {
        (self.callback)(ctx);
    }
}

/// What an action callback sees when it fires
pub struct ActionContext<'a> {
    /// Authoring index of the action
    pub index: usize,
    /// Scheduled timecode of the action
    pub timecode: f32,
    /// Direction the cursor was moving
    pub direction: Direction,
    vars: &'a Vars,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(index: usize, timecode: f32, direction: Direction, vars: &'a Vars) -> Self {
        Self {
            index,
            timecode,
            direction,
            vars,
        }
    }

    /// Read a timeline variable
    pub fn var<T: Any>(&self, name: &str) -> Result<&'a T> {
        self.vars.get(name)
    }
}

/// Event payload
pub(crate) enum EventBody {
    Action(ActionPoint),
    Wait,
    Loop(LoopMarker),
    Span(Span),
}

/// An entry in a timeline's event list
pub struct Event {
    pub(crate) timeline: TimelineId,
    pub(crate) index: usize,
    pub(crate) timecode: f32,
    pub(crate) body: EventBody,
}

impl Event {
    /// Timeline owning this event
    pub fn timeline(&self) -> TimelineId {
        self.timeline
    }

    /// Authoring index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Scheduled timecode, relative to the owning timeline's start
    pub fn timecode(&self) -> f32 {
        self.timecode
    }

    /// Event kind
    pub fn kind(&self) -> EventKind {
        match &self.body {
            EventBody::Action(_) => EventKind::Action,
            EventBody::Wait => EventKind::Wait,
            EventBody::Loop(marker) => match marker.kind {
                LoopMarkerKind::Begin => EventKind::LoopBegin,
                LoopMarkerKind::End => EventKind::LoopEnd,
            },
            EventBody::Span(Span::Sequence(_)) => EventKind::Sequence,
            EventBody::Span(Span::Nested(_)) => EventKind::Nested,
        }
    }

    /// Duration, zero for point events
    pub fn duration(&self) -> f32 {
        self.span().map_or(0.0, Span::duration)
    }

    /// Span payload, if any
    pub fn span(&self) -> Option<&Span> {
        match &self.body {
            EventBody::Span(span) => Some(span),
            _ => None,
        }
    }

    /// Loop marker payload, if any
    pub fn loop_marker(&self) -> Option<LoopMarker> {
        match &self.body {
            EventBody::Loop(marker) => Some(*marker),
            _ => None,
        }
    }

    /// Embedded timeline, if this is a nested span
    pub fn nested(&self) -> Option<&Timeline> {
        match &self.body {
            EventBody::Span(Span::Nested(nested)) => Some(nested.timeline()),
            _ => None,
        }
    }

    /// Sequence name, if this is a named tween
    pub fn name(&self) -> Option<&str> {
        match &self.body {
            EventBody::Span(Span::Sequence(sequence)) => sequence.name(),
            _ => None,
        }
    }

    /// Serializable summary of this event
    pub fn info(&self) -> EventInfo {
        EventInfo {
            index: self.index,
            kind: self.kind(),
            timecode: self.timecode,
            duration: self.duration(),
            name: self.name().map(str::to_string),
            loop_count: self
                .loop_marker()
                .filter(|m| m.kind == LoopMarkerKind::Begin)
                .map(|m| m.count),
            children: self.nested().map(Timeline::describe).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.index, self.kind().name())?;
        if let Some(name) = self.name() {
            write!(f, " '{name}'")?;
        }
        write!(f, " @ {:.3}", self.timecode)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("index", &self.index)
            .field("kind", &self.kind())
            .field("timecode", &self.timecode)
            .field("duration", &self.duration())
            .finish()
    }
}

/// Serializable event listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    /// Authoring index
    pub index: usize,
    /// Event kind
    pub kind: EventKind,
    /// Scheduled timecode
    pub timecode: f32,
    /// Duration (zero for point events)
    pub duration: f32,
    /// Tween name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Repeat count of a loop begin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<i32>,
    /// Events of a nested timeline
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EventInfo>,
}
