// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tween spans.

use crate::error::Result;
use crate::resolve::{Direction, Sweep};
use crate::vars::Vars;
use std::any::Any;

/// Callback receiving tween progress
pub type UpdateFn = Box<dyn FnMut(&SequenceUpdate<'_>)>;

/// A tween: a fixed duration reporting normalized progress
pub struct Sequence {
    name: Option<String>,
    duration: f32,
    progress: f32,
    on_update: Option<UpdateFn>,
}

impl Sequence {
    pub(crate) fn new(name: Option<String>, duration: f32, on_update: Option<UpdateFn>) -> Self {
        Self {
            name,
            duration,
            progress: 0.0,
            on_update,
        }
    }

    /// Tween name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Last reported progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether the last update reached 100%
    pub fn is_ended(&self) -> bool {
        self.progress >= 1.0
    }

    pub(crate) fn update(&mut self, start: f32, sweep: &Sweep, vars: &Vars) {
        self.progress = progress_at(sweep.to - start, self.duration);

        if let Some(on_update) = &mut self.on_update {
            on_update(&SequenceUpdate {
                progress: self.progress,
                timecode: sweep.to,
                direction: sweep.direction(),
                name: self.name.as_deref(),
                vars,
            });
        }
    }
}

/// Normalized progress after `elapsed` seconds of a span lasting `duration`
fn progress_at(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        if elapsed >= 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

/// What an update callback sees on each tick
pub struct SequenceUpdate<'a> {
    /// Normalized progress in `[0, 1]`
    pub progress: f32,
    /// Timecode being resolved, relative to the owning timeline
    pub timecode: f32,
    /// Direction the cursor was moving
    pub direction: Direction,
    name: Option<&'a str>,
    vars: &'a Vars,
}

impl<'a> SequenceUpdate<'a> {
    /// Tween name
    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    /// Whether this update reports the end of the tween
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Read a timeline variable
    pub fn var<T: Any>(&self, name: &str) -> Result<&'a T> {
        self.vars.get(name)
    }
}
