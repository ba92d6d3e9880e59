// SPDX-License-Identifier: MIT OR Apache-2.0
//! Duration-bearing events.

use crate::error::Result;
use crate::nested::NestedTimeline;
use crate::resolve::Sweep;
use crate::sequence::Sequence;
use crate::vars::Vars;

/// An event occupying `[timecode, timecode + duration)` that receives
/// progress updates while the cursor moves across it
pub enum Span {
    /// Tween
    Sequence(Sequence),
    /// Embedded timeline
    Nested(NestedTimeline),
}

impl Span {
    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        match self {
            Self::Sequence(sequence) => sequence.duration(),
            Self::Nested(nested) => nested.duration(),
        }
    }

    /// Whether the span has reached its end
    pub fn is_ended(&self) -> bool {
        match self {
            Self::Sequence(sequence) => sequence.is_ended(),
            Self::Nested(nested) => nested.timeline().is_ended(),
        }
    }

    /// Update the span for a sweep. `start` is the span's scheduled timecode.
    pub(crate) fn update(&mut self, start: f32, sweep: &Sweep, vars: &Vars) -> Result<()> {
        match self {
            Self::Sequence(sequence) => {
                sequence.update(start, sweep, vars);
                Ok(())
            }
            // Nested timelines read their own vars.
            Self::Nested(nested) => nested.update(start, sweep),
        }
    }
}
