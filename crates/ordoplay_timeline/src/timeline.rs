// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline authoring.
//!
//! Authoring calls append events and maintain two counters: the timecode of the
//! last barrier (committed time) and the longest span appended since then.
//! Spans appended between two barriers form a parallel group that starts at the
//! committed timecode; [`Timeline::wait`] commits the group by advancing the
//! committed timecode by its longest member.

use crate::clock::ClockMode;
use crate::error::{validate_duration, Result, TimelineError};
use crate::event::{ActionContext, ActionPoint, Event, EventBody, EventInfo, LoopMarker, LoopMarkerKind};
use crate::host::HostId;
use crate::loop_control::LoopController;
use crate::nested::NestedTimeline;
use crate::playback::PlaybackState;
use crate::sequence::{Sequence, SequenceUpdate, UpdateFn};
use crate::span::Span;
use crate::vars::Vars;
use serde::{Deserialize, Serialize};
use std::any::Any;
use uuid::Uuid;

/// Unique identifier for a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TimelineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authoring lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Events may be appended
    Editable,
    /// Frozen; only resolvable
    Started,
}

/// Whether the timeline drives itself or is driven by a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Root,
    Nested,
}

/// An ordered list of timed events with its playback state
pub struct Timeline {
    pub(crate) id: TimelineId,
    pub(crate) host: HostId,
    pub(crate) clock_mode: ClockMode,
    pub(crate) role: Role,
    pub(crate) phase: Phase,
    pub(crate) events: Vec<Event>,
    pub(crate) vars: Vars,
    pub(crate) last_barrier: f32,
    pub(crate) longest_pending: f32,
    pub(crate) state: PlaybackState,
    pub(crate) cursor: Option<f32>,
    pub(crate) loops: LoopController,
    pub(crate) resume_after: Option<usize>,
}

impl Timeline {
    /// Create an empty timeline for a host
    pub fn new(host: HostId, clock_mode: ClockMode) -> Self {
        Self {
            id: TimelineId::new(),
            host,
            clock_mode,
            role: Role::Root,
            phase: Phase::Editable,
            events: Vec::new(),
            vars: Vars::new(),
            last_barrier: 0.0,
            longest_pending: 0.0,
            state: PlaybackState::Stopped,
            cursor: None,
            loops: LoopController::default(),
            resume_after: None,
        }
    }

    /// Timeline ID
    pub fn id(&self) -> TimelineId {
        self.id
    }

    /// Host this timeline was created for
    pub fn host(&self) -> HostId {
        self.host
    }

    /// Clock mode selecting the host delta
    pub fn clock_mode(&self) -> ClockMode {
        self.clock_mode
    }

    /// Whether the timeline is frozen
    pub fn is_started(&self) -> bool {
        self.phase == Phase::Started
    }

    /// Whether the timeline is embedded in a parent
    pub fn is_nested(&self) -> bool {
        self.role == Role::Nested
    }

    /// All events in authoring order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Event count
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events were appended
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Committed length. Final once the timeline is started; a loop region
    /// counts once regardless of its repeat count.
    pub fn duration(&self) -> f32 {
        self.last_barrier
    }

    /// Serializable listing of the schedule
    pub fn describe(&self) -> Vec<EventInfo> {
        self.events.iter().map(Event::info).collect()
    }

    pub(crate) fn ensure_editable(&self) -> Result<()> {
        match self.phase {
            Phase::Editable => Ok(()),
            Phase::Started => Err(TimelineError::AlreadyStarted),
        }
    }

    fn push(&mut self, body: EventBody) {
        let index = self.events.len();
        self.events.push(Event {
            timeline: self.id,
            index,
            timecode: self.last_barrier,
            body,
        });
    }

    fn push_sequence(&mut self, name: Option<String>, duration: f32, on_update: UpdateFn) -> Result<&mut Self> {
        self.ensure_editable()?;
        let duration = validate_duration(duration)?;
        self.push(EventBody::Span(Span::Sequence(Sequence::new(name, duration, Some(on_update)))));
        self.longest_pending = self.longest_pending.max(duration);
        Ok(self)
    }

    // ========================================================================
    // Authoring
    // ========================================================================

    /// Append a tween starting with the current parallel group
    pub fn tween<F>(&mut self, duration: f32, on_update: F) -> Result<&mut Self>
    where
        F: FnMut(&SequenceUpdate<'_>) + 'static,
    {
        self.push_sequence(None, duration, Box::new(on_update))
    }

    /// Append a named tween
    pub fn tween_named<F>(&mut self, name: impl Into<String>, duration: f32, on_update: F) -> Result<&mut Self>
    where
        F: FnMut(&SequenceUpdate<'_>) + 'static,
    {
        self.push_sequence(Some(name.into()), duration, Box::new(on_update))
    }

    /// Append a tween split into `frame_count` equal frames. `on_frame` runs
    /// whenever the current frame index changes.
    pub fn frames<F>(&mut self, duration: f32, frame_count: usize, mut on_frame: F) -> Result<&mut Self>
    where
        F: FnMut(&SequenceUpdate<'_>, usize) + 'static,
    {
        let mut previous = None;
        self.tween(duration, move |update| {
            let frame = (update.progress * frame_count as f32).floor() as usize;
            if frame < frame_count && previous != Some(frame) {
                previous = Some(frame);
                on_frame(update, frame);
            }
        })
    }

    /// Append a serial delay, independent of pending spans
    pub fn hold(&mut self, duration: f32) -> Result<&mut Self> {
        self.ensure_editable()?;
        let duration = validate_duration(duration)?;

        self.wait()?;
        self.push(EventBody::Span(Span::Sequence(Sequence::new(None, duration, None))));
        self.last_barrier += duration;
        self.longest_pending = 0.0;
        self.wait()
    }

    /// Append a one-shot action at the committed timecode
    pub fn do_action<F>(&mut self, callback: F) -> Result<&mut Self>
    where
        F: FnMut(&ActionContext<'_>) + 'static,
    {
        self.ensure_editable()?;
        self.push(EventBody::Action(ActionPoint::new(Box::new(callback))));
        Ok(self)
    }

    /// Commit the current parallel group
    pub fn wait(&mut self) -> Result<&mut Self> {
        self.ensure_editable()?;

        // Don't add redundant waits
        if matches!(
            self.events.last(),
            None | Some(Event {
                body: EventBody::Wait,
                ..
            })
        ) {
            return Ok(self);
        }

        self.last_barrier += self.longest_pending;
        self.longest_pending = 0.0;
        self.push(EventBody::Wait);
        Ok(self)
    }

    /// Open a loop region repeated `count` times; zero or less repeats forever
    pub fn loop_begin(&mut self, count: i32) -> Result<&mut Self> {
        self.push_loop_marker(LoopMarkerKind::Begin, count)
    }

    /// Open a loop region repeated until playback stops
    pub fn loop_forever(&mut self) -> Result<&mut Self> {
        self.loop_begin(0)
    }

    /// Close the current loop region
    pub fn loop_end(&mut self) -> Result<&mut Self> {
        self.push_loop_marker(LoopMarkerKind::End, 0)
    }

    fn push_loop_marker(&mut self, kind: LoopMarkerKind, count: i32) -> Result<&mut Self> {
        self.wait()?;
        self.push(EventBody::Loop(LoopMarker { kind, count }));
        Ok(self)
    }

    /// Embed `child` as a span of the current parallel group.
    ///
    /// The child must be unstarted, loop-free, and share this timeline's host
    /// and clock mode. It is frozen and owned by this timeline from then on.
    pub fn nest(&mut self, child: Timeline) -> Result<&mut Self> {
        self.ensure_editable()?;
        let nested = NestedTimeline::adopt(self, child)?;
        let duration = nested.duration();
        self.push(EventBody::Span(Span::Nested(nested)));
        self.longest_pending = self.longest_pending.max(duration);
        Ok(self)
    }

    /// Author a child with this timeline's host and clock mode, then nest it
    pub fn nest_with<F>(&mut self, init: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Timeline) -> Result<()>,
    {
        self.ensure_editable()?;
        let mut child = Timeline::new(self.host, self.clock_mode);
        init(&mut child)?;
        self.nest(child)
    }

    /// Set a timeline variable
    pub fn set_var<T: Any>(&mut self, name: impl Into<String>, value: T) -> Result<&mut Self> {
        self.ensure_editable()?;
        self.vars.set(name, value);
        Ok(self)
    }

    /// Read a timeline variable
    pub fn var<T: Any>(&self, name: &str) -> Result<&T> {
        self.vars.get(name)
    }

    /// Variable names in insertion order
    pub fn var_names(&self) -> impl Iterator<Item = &str> {
        self.vars.names()
    }

    // ========================================================================
    // Freezing
    // ========================================================================

    /// Close a dangling loop (or the last parallel group) and freeze
    pub(crate) fn prepare(&mut self) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }

        let open_loop = self
            .events
            .iter()
            .rev()
            .find_map(Event::loop_marker)
            .is_some_and(|marker| marker.kind == LoopMarkerKind::Begin);

        if open_loop {
            self.loop_end()?;
        } else {
            self.wait()?;
        }

        self.phase = Phase::Started;
        tracing::debug!(
            "Timeline {} started: {} events, {:.3}s",
            self.id,
            self.events.len(),
            self.duration()
        );
        Ok(())
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(HostId::new(), ClockMode::default())
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("id", &self.id)
            .field("clock_mode", &self.clock_mode)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("events", &self.events)
            .field("vars", &self.vars)
            .finish()
    }
}
