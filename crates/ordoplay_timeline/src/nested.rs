// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timelines embedded as spans of a parent timeline.
//!
//! Nesting moves the child into the parent's event list. From then on the
//! child is only reachable through its parent and only the parent advances it,
//! translating its own timecode into the child's local time.

use crate::error::{Result, TimelineError};
use crate::resolve::{Sweep, Traversal};
use crate::timeline::{Role, Timeline};

/// A complete timeline scheduled as a single span
pub struct NestedTimeline {
    inner: Box<Timeline>,
}

impl NestedTimeline {
    /// Validate `child` against `parent` and freeze it
    pub(crate) fn adopt(parent: &Timeline, mut child: Timeline) -> Result<Self> {
        if child.is_started() {
            return Err(TimelineError::NestedStarted);
        }
        if child.events().iter().any(|e| e.loop_marker().is_some()) {
            return Err(TimelineError::NestedLoop);
        }
        if child.clock_mode() != parent.clock_mode() {
            return Err(TimelineError::ClockModeMismatch {
                parent: parent.clock_mode(),
                nested: child.clock_mode(),
            });
        }
        if child.host() != parent.host() {
            return Err(TimelineError::HostMismatch);
        }

        child.prepare()?;
        child.role = Role::Nested;
        tracing::debug!(
            "Timeline {}: nested {} ({} events, {:.3}s)",
            parent.id(),
            child.id(),
            child.len(),
            child.duration()
        );

        Ok(Self {
            inner: Box::new(child),
        })
    }

    /// The embedded timeline
    pub fn timeline(&self) -> &Timeline {
        &self.inner
    }

    /// Total scheduled length of the embedded timeline
    pub fn duration(&self) -> f32 {
        self.inner.duration()
    }

    /// Advance the child to the parent's target, shifted by the child's offset.
    ///
    /// Ticks clamp the local target to the child's length. Scrubs keep it
    /// unclamped so that only child events sitting exactly on the parent's
    /// target fire; tween progress is clamped either way.
    pub(crate) fn update(&mut self, offset: f32, sweep: &Sweep) -> Result<()> {
        if !self.inner.is_started() {
            return Err(TimelineError::NotStarted);
        }

        let raw = sweep.to - offset;
        let local = match sweep.traversal {
            Traversal::Scrub => raw,
            Traversal::Skip => raw.clamp(0.0, self.inner.duration()),
        };
        // A parent sweep without a previous cursor replays the child from scratch.
        if sweep.from.is_none() {
            self.inner.cursor = None;
        }

        let resolution = self
            .inner
            .resolve(Sweep::new(self.inner.cursor, local, sweep.traversal))?;
        self.inner.cursor = Some(resolution.cursor);
        Ok(())
    }

    pub(crate) fn rewind(&mut self) {
        self.inner.rewind();
    }

    #[cfg(test)]
    pub(crate) fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockMode;
    use crate::error::ErrorKind;
    use crate::event::{EventBody, EventKind};
    use crate::host::HostId;
    use crate::playback::TickStatus;
    use crate::resolve::Direction;
    use crate::span::Span;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn play_to_end(timeline: &mut Timeline, delta: f32) {
        timeline.play().unwrap();
        for _ in 0..10_000 {
            if timeline.tick(delta).unwrap() == TickStatus::Finished {
                return;
            }
        }
        panic!("timeline did not finish");
    }

    #[test]
    fn test_nest_schedules_as_span() {
        let host = HostId::new();
        let mut child = Timeline::new(host, ClockMode::Scaled);
        child.hold(1.5).unwrap();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        parent.hold(1.0).unwrap().nest(child).unwrap().tween(0.5, |_| {}).unwrap();
        parent.play().unwrap();

        let nested = parent.events().iter().find(|e| e.kind() == EventKind::Nested).unwrap();
        assert_eq!(nested.timecode(), 1.0);
        assert_eq!(nested.duration(), 1.5);
        assert!(nested.nested().unwrap().is_started());
        assert_eq!(parent.duration(), 2.5);
    }

    #[test]
    fn test_nested_local_time() {
        let host = HostId::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let fired_sink = fired.clone();

        let mut child = Timeline::new(host, ClockMode::Scaled);
        child
            .tween(1.0, move |u| sink.borrow_mut().push((u.timecode, u.progress)))
            .unwrap()
            .wait()
            .unwrap()
            .do_action(move |ctx| fired_sink.borrow_mut().push(ctx.timecode))
            .unwrap();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        parent.hold(1.0).unwrap().nest(child).unwrap();
        play_to_end(&mut parent, 0.25);

        let seen = seen.borrow();
        assert!(seen.contains(&(0.25, 0.25)));
        assert_eq!(seen.first(), Some(&(0.0, 0.0)));
        assert_eq!(seen.iter().filter(|(_, p)| *p == 1.0).count(), 1);
        assert_eq!(*fired.borrow(), vec![1.0]);
    }

    #[test]
    fn test_scrub_across_nested_fires_on_exact_target() {
        let host = HostId::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let (first, last) = (fired.clone(), fired.clone());

        let mut child = Timeline::new(host, ClockMode::Scaled);
        child
            .do_action(move |ctx| first.borrow_mut().push(ctx.timecode))
            .unwrap()
            .hold(1.0)
            .unwrap()
            .do_action(move |ctx| last.borrow_mut().push(ctx.timecode))
            .unwrap();

        // Child spans [1, 2) of a 3 second parent.
        let mut parent = Timeline::new(host, ClockMode::Scaled);
        parent.hold(1.0).unwrap().nest(child).unwrap().hold(1.0).unwrap();

        parent.scrub_to(0.5).unwrap();
        parent.scrub_to(3.0).unwrap();
        parent.scrub_to(1.5).unwrap();
        parent.scrub_to(0.5).unwrap();
        assert!(fired.borrow().is_empty());

        parent.scrub_to(1.0).unwrap();
        assert_eq!(*fired.borrow(), vec![0.0]);

        parent.scrub_to(2.0).unwrap();
        assert_eq!(*fired.borrow(), vec![0.0, 1.0]);

        parent.scrub_to(1.5).unwrap();
        parent.scrub_to(0.25).unwrap();
        parent.scrub_to(1.0).unwrap();
        assert_eq!(*fired.borrow(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_scrub_past_nested_completes_tweens() {
        let host = HostId::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut child = Timeline::new(host, ClockMode::Scaled);
        child.tween(1.0, move |u| sink.borrow_mut().push(u.progress)).unwrap();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        parent.hold(1.0).unwrap().nest(child).unwrap().hold(1.0).unwrap();

        parent.scrub_to(0.5).unwrap();
        parent.scrub_to(3.0).unwrap();
        parent.scrub_to(0.0).unwrap();
        assert_eq!(*seen.borrow(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_reverse_ticks_through_nested() {
        let host = HostId::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = fired.clone();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        parent
            .hold(1.0)
            .unwrap()
            .nest_with(move |child| {
                child
                    .hold(0.5)?
                    .do_action(move |ctx| sink.borrow_mut().push((ctx.timecode, ctx.direction)))?
                    .hold(0.5)?;
                Ok(())
            })
            .unwrap();

        parent.scrub_to(2.0).unwrap();
        assert!(fired.borrow().is_empty());

        play_to_end(&mut parent, -0.25);
        assert_eq!(*fired.borrow(), vec![(0.5, Direction::Reverse)]);
        assert_eq!(parent.play_time(), 0.0);
    }

    #[test]
    fn test_loop_replays_nested() {
        let host = HostId::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = fired.clone();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        parent
            .loop_begin(2)
            .unwrap()
            .nest_with(move |child| {
                child
                    .do_action(move |ctx| sink.borrow_mut().push(ctx.direction))?
                    .hold(1.0)?;
                Ok(())
            })
            .unwrap()
            .loop_end()
            .unwrap();

        play_to_end(&mut parent, 0.25);
        assert_eq!(*fired.borrow(), vec![Direction::Forward, Direction::Forward]);
        assert_eq!(parent.loops_completed(), 2);
    }

    #[test]
    fn test_nest_with_inherits_host_and_mode() {
        let mut parent = Timeline::new(HostId::new(), ClockMode::FixedStep);
        parent
            .nest_with(|child| {
                child.tween(2.0, |_| {})?;
                Ok(())
            })
            .unwrap();
        parent.play().unwrap();

        let nested = parent.events()[0].nested().unwrap();
        assert_eq!(nested.clock_mode(), ClockMode::FixedStep);
        assert_eq!(nested.host(), parent.host());
        assert_eq!(parent.duration(), 2.0);
    }

    #[test]
    fn test_nest_rejects_loops() {
        let host = HostId::new();
        let mut child = Timeline::new(host, ClockMode::Scaled);
        child.loop_begin(2).unwrap().hold(0.5).unwrap();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        parent.hold(1.0).unwrap();
        let before = parent.len();

        let err = parent.nest(child).unwrap_err();
        assert!(matches!(err, TimelineError::NestedLoop));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(parent.len(), before);
    }

    #[test]
    fn test_nest_rejects_clock_mismatch() {
        let host = HostId::new();
        let mut child = Timeline::new(host, ClockMode::Unscaled);
        child.hold(0.5).unwrap();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        let err = parent.nest(child).unwrap_err();
        assert!(matches!(err, TimelineError::ClockModeMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(parent.is_empty());
    }

    #[test]
    fn test_nest_rejects_other_host() {
        let mut child = Timeline::new(HostId::new(), ClockMode::Scaled);
        child.hold(0.5).unwrap();

        let mut parent = Timeline::new(HostId::new(), ClockMode::Scaled);
        assert!(matches!(parent.nest(child), Err(TimelineError::HostMismatch)));
        assert!(parent.is_empty());
    }

    #[test]
    fn test_nest_rejects_started_child() {
        let host = HostId::new();
        let mut child = Timeline::new(host, ClockMode::Scaled);
        child.hold(0.5).unwrap();
        child.scrub_to(0.0).unwrap();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        let err = parent.nest(child).unwrap_err();
        assert!(matches!(err, TimelineError::NestedStarted));
        assert!(parent.is_empty());
    }

    #[test]
    fn test_nested_control_rejected() {
        let host = HostId::new();
        let mut child = Timeline::new(host, ClockMode::Scaled);
        child.hold(0.5).unwrap();

        let mut parent = Timeline::new(host, ClockMode::Scaled);
        parent.nest(child).unwrap();

        let EventBody::Span(Span::Nested(nested)) = &mut parent.events[0].body else {
            panic!("expected nested span");
        };
        let inner = nested.timeline_mut();
        assert!(matches!(inner.play(), Err(TimelineError::NestedControl)));
        assert!(matches!(inner.pause(), Err(TimelineError::NestedControl)));
        assert!(matches!(inner.scrub_to(0.1), Err(TimelineError::NestedControl)));
        assert!(matches!(inner.tick(0.1), Err(TimelineError::NestedControl)));
        assert_eq!(inner.play().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_update_before_start_rejected() {
        let host = HostId::new();
        let mut child = Timeline::new(host, ClockMode::Scaled);
        child.hold(0.5).unwrap();
        let mut nested = NestedTimeline {
            inner: Box::new(child),
        };

        let err = nested
            .update(0.0, &Sweep::restart(0.25))
            .unwrap_err();
        assert!(matches!(err, TimelineError::NotStarted));
    }
}
