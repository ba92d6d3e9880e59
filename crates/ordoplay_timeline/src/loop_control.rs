// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loop region state machine.
//!
//! Only forward per-tick playback drives the controller. Scrubbing and reverse
//! playback over a marker re-derive the state from the new position instead.

use crate::event::{Event, LoopMarker, LoopMarkerKind};

/// Loop controller state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LoopState {
    /// No active loop region
    #[default]
    Idle,
    /// Inside the region opened by a begin marker
    InLoop {
        /// Authoring index of the begin marker
        begin_index: usize,
        /// Timecode of the begin marker
        begin_timecode: f32,
        /// Repeat count of the region
        count: i32,
    },
}

/// What the resolver must do after a marker was crossed
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LoopStep {
    /// Keep scanning
    Continue,
    /// Move the cursor back to `to` and rescan after the begin marker
    Rewind { begin_index: usize, to: f32 },
    /// Rewinding would not move the cursor: rescan after the begin marker next tick
    Defer { begin_index: usize },
}

/// Tracks the active loop region during playback
#[derive(Debug, Clone, Default)]
pub struct LoopController {
    state: LoopState,
    completed: u32,
}

impl LoopController {
    /// Current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Passes completed by the current (or most recent) loop region
    pub fn loops_completed(&self) -> u32 {
        self.completed
    }

    /// Forget any active region
    pub fn reset(&mut self) {
        self.state = LoopState::Idle;
        self.completed = 0;
    }

    /// Handle a marker at `timecode` crossed by a forward sweep targeting `to`
    pub(crate) fn cross(&mut self, index: usize, timecode: f32, marker: LoopMarker, to: f32) -> LoopStep {
        match marker.kind {
            LoopMarkerKind::Begin => {
                let tracked = matches!(
                    self.state,
                    LoopState::InLoop { begin_index, .. } if begin_index == index
                );
                if !tracked {
                    self.state = LoopState::InLoop {
                        begin_index: index,
                        begin_timecode: timecode,
                        count: marker.count,
                    };
                    self.completed = 0;
                    if marker.is_infinite() {
                        tracing::debug!("Loop #{} entered @ {:.3} (endless)", index, timecode);
                    } else {
                        tracing::debug!("Loop #{} entered @ {:.3} (count {})", index, timecode, marker.count);
                    }
                }
                LoopStep::Continue
            }
            LoopMarkerKind::End => match self.state {
                LoopState::Idle => {
                    tracing::error!("LoopEnd #{} found with no matching LoopBegin", index);
                    LoopStep::Continue
                }
                LoopState::InLoop {
                    begin_index,
                    begin_timecode,
                    count,
                } => {
                    self.completed = self.completed.saturating_add(1);
                    if count > 0 && self.completed >= count.unsigned_abs() {
                        tracing::debug!("Loop #{} done after {} passes", begin_index, self.completed);
                        self.state = LoopState::Idle;
                        return LoopStep::Continue;
                    }

                    let distance = timecode - begin_timecode;
                    let mut rewound = to - distance;
                    if count <= 0 && distance > 0.0 && rewound >= timecode {
                        // An endless region skips the whole passes this sweep would repeat.
                        let skipped = ((to - timecode) / distance).floor() as u32;
                        self.completed = self.completed.saturating_add(skipped);
                        rewound = begin_timecode + (to - begin_timecode).rem_euclid(distance);
                    }

                    if rewound < to {
                        LoopStep::Rewind {
                            begin_index,
                            to: rewound,
                        }
                    } else {
                        LoopStep::Defer { begin_index }
                    }
                }
            },
        }
    }

    /// Re-derive the state for a cursor placed directly at `timecode` by a
    /// scrub, or moved back over a marker by reverse playback.
    ///
    /// The cursor is inside a region when its begin is at or before the
    /// timecode and its end is after it. Pass counting starts over.
    pub(crate) fn seek(&mut self, events: &[Event], timecode: f32) {
        self.reset();
        for event in events.iter().take_while(|e| e.timecode() <= timecode) {
            let Some(marker) = event.loop_marker() else {
                continue;
            };
            self.state = match marker.kind {
                LoopMarkerKind::Begin => LoopState::InLoop {
                    begin_index: event.index(),
                    begin_timecode: event.timecode(),
                    count: marker.count,
                },
                LoopMarkerKind::End => LoopState::Idle,
            };
        }
    }
}
