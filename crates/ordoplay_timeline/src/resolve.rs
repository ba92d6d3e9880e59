// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time-to-events resolution.
//!
//! A [`Sweep`] describes one step of the cursor, from the previously resolved
//! timecode to a new target. Resolving a sweep visits every event of a
//! timeline, in authoring order when moving forward and in reverse authoring
//! order when moving backward, and selects the ones active for that step:
//!
//! - Spans are active when `[start, end)` overlaps the target, with the upper
//!   bound widened by the step size so that a span passed over between two
//!   ticks still gets a final update clamped to 100% (or 0% backward).
//! - Point events follow the sweep's [`Traversal`] policy.
//!
//! Loop markers are handed to the [`LoopController`](crate::LoopController),
//! which may rewind the sweep in the middle of a forward resolve. Moving back
//! over a loop marker re-derives the loop state from the new position.

use crate::error::{Result, TimelineError};
use crate::event::{ActionContext, EventBody};
use crate::loop_control::LoopStep;
use crate::timeline::{Phase, Timeline};
use serde::{Deserialize, Serialize};

/// Point event selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Traversal {
    /// Direct seek: only events sitting exactly on the target fire
    Scrub,
    /// Per-tick advance: every event crossed since the previous cursor fires
    Skip,
}

/// Direction of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Target is after the cursor
    Forward,
    /// Target is at or before the cursor
    Reverse,
}

/// One cursor step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Previously resolved timecode, `None` if nothing was resolved yet
    pub from: Option<f32>,
    /// Target timecode
    pub to: f32,
    /// Point event policy
    pub traversal: Traversal,
}

impl Sweep {
    /// Create a sweep
    pub fn new(from: Option<f32>, to: f32, traversal: Traversal) -> Self {
        Self { from, to, traversal }
    }

    /// Sweep that treats everything up to `to` as crossed
    pub fn restart(to: f32) -> Self {
        Self::new(None, to, Traversal::Skip)
    }

    /// Direction of travel. Equal endpoints count as reverse.
    pub fn direction(&self) -> Direction {
        match self.from {
            Some(from) if self.to <= from => Direction::Reverse,
            _ => Direction::Forward,
        }
    }

    /// Whether a zero-duration event at `timecode` is selected
    pub fn selects_point(&self, timecode: f32) -> bool {
        match self.traversal {
            Traversal::Scrub => timecode == self.to && self.from != Some(self.to),
            Traversal::Skip => match self.from {
                None => timecode <= self.to,
                Some(from) if self.to > from => from < timecode && timecode <= self.to,
                Some(from) => self.to <= timecode && timecode < from,
            },
        }
    }

    /// Whether a span covering `[start, end)` is selected.
    ///
    /// Moving forward, `target - frame < end` with `frame = target - from`
    /// reduces to `from < end`.
    pub fn selects_span(&self, start: f32, end: f32) -> bool {
        match self.from {
            None => start <= self.to,
            Some(from) if self.to > from => start <= self.to && from < end,
            Some(from) => start < from && self.to < end,
        }
    }
}

/// Outcome of resolving one sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Resolution {
    /// Cursor after the sweep, including any loop rewind
    pub cursor: f32,
    /// Whether a loop moved the cursor back
    pub rewound: bool,
}

impl Timeline {
    /// Resolve a sweep over the whole event list
    pub(crate) fn resolve(&mut self, sweep: Sweep) -> Result<Resolution> {
        if self.phase != Phase::Started {
            return Err(TimelineError::NotStarted);
        }
        match sweep.direction() {
            Direction::Forward => self.resolve_forward(sweep, 0),
            Direction::Reverse => self.resolve_reverse(sweep),
        }
    }

    /// Forward resolve starting at authoring index `start`
    pub(crate) fn resolve_forward(&mut self, mut sweep: Sweep, start: usize) -> Result<Resolution> {
        let Self {
            id,
            events,
            vars,
            loops,
            resume_after,
            ..
        } = self;
        let mut rewound = false;
        let mut index = start;

        while index < events.len() {
            let event = &mut events[index];
            let timecode = event.timecode;

            match &mut event.body {
                EventBody::Span(span) => {
                    if sweep.selects_span(timecode, timecode + span.duration()) {
                        span.update(timecode, &sweep, vars)?;
                    }
                }
                EventBody::Action(action) => {
                    if sweep.selects_point(timecode) {
                        tracing::trace!("Timeline {}: action #{} @ {:.3}", id, index, timecode);
                        action.invoke(&ActionContext::new(index, timecode, Direction::Forward, vars));
                    }
                }
                EventBody::Wait => {}
                EventBody::Loop(marker) => {
                    if sweep.traversal == Traversal::Skip && sweep.selects_point(timecode) {
                        match loops.cross(index, timecode, *marker, sweep.to) {
                            LoopStep::Continue => {}
                            LoopStep::Rewind { begin_index, to } => {
                                rewound = true;
                                sweep = Sweep::restart(to);
                                index = begin_index + 1;
                                continue;
                            }
                            LoopStep::Defer { begin_index } => {
                                *resume_after = Some(begin_index);
                                return Ok(Resolution {
                                    cursor: sweep.to,
                                    rewound: true,
                                });
                            }
                        }
                    }
                }
            }
            index += 1;
        }

        Ok(Resolution {
            cursor: sweep.to,
            rewound,
        })
    }

    fn resolve_reverse(&mut self, sweep: Sweep) -> Result<Resolution> {
        let Self { id, events, vars, loops, .. } = self;
        let mut crossed_marker = false;

        for (index, event) in events.iter_mut().enumerate().rev() {
            let timecode = event.timecode;
            match &mut event.body {
                EventBody::Span(span) => {
                    if sweep.selects_span(timecode, timecode + span.duration()) {
                        span.update(timecode, &sweep, vars)?;
                    }
                }
                EventBody::Action(action) => {
                    if sweep.selects_point(timecode) {
                        tracing::trace!("Timeline {}: action #{} @ {:.3} (reverse)", id, index, timecode);
                        action.invoke(&ActionContext::new(index, timecode, Direction::Reverse, vars));
                    }
                }
                EventBody::Wait => {}
                EventBody::Loop(_) => {
                    if sweep.traversal == Traversal::Skip && sweep.selects_point(timecode) {
                        tracing::trace!("Timeline {}: loop marker #{} crossed in reverse", id, index);
                        crossed_marker = true;
                    }
                }
            }
        }

        if crossed_marker {
            loops.seek(events, sweep.to);
        }

        Ok(Resolution {
            cursor: sweep.to,
            rewound: false,
        })
    }
}
