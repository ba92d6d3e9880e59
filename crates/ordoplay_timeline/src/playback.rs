// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback control for root timelines.
//!
//! Playback is poll driven: while a timeline is playing, the host calls
//! [`Timeline::tick`] (or [`Timeline::advance`]) once per frame. Each tick
//! resolves one sweep from the previous cursor; when the target reaches the
//! end, one final sweep pinned at [`Timeline::duration`] delivers the terminal
//! updates and the timeline finishes.

use crate::clock::Clock;
use crate::error::{validate_timecode, Result, TimelineError};
use crate::event::EventBody;
use crate::resolve::{Sweep, Traversal};
use crate::span::Span;
use crate::timeline::{Role, Timeline};
use serde::{Deserialize, Serialize};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Never played
    #[default]
    Stopped,
    /// Attached to the host ticker
    Playing,
    /// Detached, cursor kept
    Paused,
    /// Reached the end or stopped
    Finished,
}

impl PlaybackState {
    /// Whether the host should keep ticking
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if currently paused
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

/// Result of one host tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Not playing; nothing was resolved
    Idle,
    /// Resolved; more ticks needed
    Running,
    /// Resolved the terminal step; the timeline detached itself
    Finished,
}

impl Timeline {
    fn ensure_root(&self) -> Result<()> {
        match self.role {
            Role::Root => Ok(()),
            Role::Nested => Err(TimelineError::NestedControl),
        }
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the host ticker is attached
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Whether playback ran to the end (root) or the cursor reached the end (nested)
    pub fn is_ended(&self) -> bool {
        match self.role {
            Role::Root => self.state == PlaybackState::Finished,
            Role::Nested => self.cursor.is_some_and(|cursor| cursor >= self.duration()),
        }
    }

    /// Last resolved timecode, `None` before the first resolve
    pub fn cursor(&self) -> Option<f32> {
        self.cursor
    }

    /// Last resolved timecode, zero before the first resolve
    pub fn play_time(&self) -> f32 {
        self.cursor.unwrap_or(0.0)
    }

    /// Passes completed by the current (or most recent) loop region
    pub fn loops_completed(&self) -> u32 {
        self.loops.loops_completed()
    }

    /// Forget the cursor and loop state, including those of nested timelines
    pub(crate) fn rewind(&mut self) {
        self.cursor = None;
        self.resume_after = None;
        self.loops.reset();
        for event in &mut self.events {
            if let EventBody::Span(Span::Nested(nested)) = &mut event.body {
                nested.rewind();
            }
        }
    }

    /// Attach to the host ticker.
    ///
    /// Freezes the timeline on first use. A finished timeline starts over.
    pub fn play(&mut self) -> Result<&mut Self> {
        self.ensure_root()?;
        if self.state == PlaybackState::Playing {
            return Err(TimelineError::AlreadyPlaying);
        }
        self.prepare()?;

        if self.state == PlaybackState::Finished {
            self.rewind();
        }

        self.state = PlaybackState::Playing;
        tracing::debug!("Timeline {} playing from {:.3}", self.id, self.play_time());
        Ok(self)
    }

    /// Detach from the host ticker, keeping the cursor
    pub fn pause(&mut self) -> Result<&mut Self> {
        self.ensure_root()?;
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            tracing::debug!("Timeline {} paused at {:.3}", self.id, self.play_time());
        }
        Ok(self)
    }

    /// Detach from the host ticker and mark the timeline finished
    pub fn stop(&mut self) -> Result<&mut Self> {
        self.ensure_root()?;
        if self.state != PlaybackState::Finished {
            self.state = PlaybackState::Finished;
            tracing::debug!("Timeline {} stopped at {:.3}", self.id, self.play_time());
        }
        Ok(self)
    }

    /// Seek directly to `timecode`, firing only events sitting exactly on it.
    ///
    /// The target is clamped to `[0, duration]`.
    pub fn scrub_to(&mut self, timecode: f32) -> Result<&mut Self> {
        self.ensure_root()?;
        if self.state == PlaybackState::Playing {
            return Err(TimelineError::ScrubWhilePlaying);
        }
        let timecode = validate_timecode(timecode)?;
        self.prepare()?;

        let target = timecode.clamp(0.0, self.duration());
        self.resume_after = None;
        let resolution = self.resolve(Sweep::new(self.cursor, target, Traversal::Scrub))?;
        self.cursor = Some(resolution.cursor);
        self.loops.seek(&self.events, target);

        if self.state == PlaybackState::Finished && target < self.duration() {
            self.state = PlaybackState::Paused;
        }
        tracing::trace!("Timeline {} scrubbed to {:.3}", self.id, target);
        Ok(self)
    }

    /// Advance by one host tick of `delta` seconds. Negative deltas play in
    /// reverse toward zero.
    pub fn tick(&mut self, delta: f32) -> Result<TickStatus> {
        self.ensure_root()?;
        if self.state != PlaybackState::Playing {
            return Ok(TickStatus::Idle);
        }
        let delta = validate_timecode(delta)?;
        let duration = self.duration();

        let (target, pinned) = match self.cursor {
            None => (0.0, false),
            Some(cursor) => {
                let next = cursor + delta;
                if delta >= 0.0 && next >= duration {
                    (duration, true)
                } else if delta < 0.0 && next <= 0.0 {
                    (0.0, true)
                } else {
                    (next, false)
                }
            }
        };

        let resolution = match self.resume_after.take() {
            Some(begin_index) => self.resolve_forward(Sweep::restart(target), begin_index + 1)?,
            None => self.resolve(Sweep::new(self.cursor, target, Traversal::Skip))?,
        };
        self.cursor = Some(resolution.cursor);

        if pinned && !resolution.rewound {
            self.state = PlaybackState::Finished;
            tracing::debug!("Timeline {} finished at {:.3}", self.id, resolution.cursor);
            return Ok(TickStatus::Finished);
        }
        Ok(TickStatus::Running)
    }

    /// Advance by one host tick, taking the delta for this timeline's clock mode
    pub fn advance<C: Clock + ?Sized>(&mut self, clock: &C) -> Result<TickStatus> {
        self.tick(clock.delta(self.clock_mode))
    }
}
