// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sample timeline animating a sprite.

use ordoplay_timeline::{ClockMode, HostId, Result, Timeline};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// State written by the sample timeline's callbacks
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sprite {
    /// Horizontal position in pixels
    pub x: f32,
    /// Opacity in `[0, 1]`
    pub opacity: f32,
    /// Current bounce frame
    pub frame: usize,
    /// Completed bounces
    pub bounces: u32,
    /// Action messages
    pub log: Vec<String>,
}

/// Sprite shared between callbacks and the host
pub type SharedSprite = Rc<RefCell<Sprite>>;

/// Build the sample timeline.
///
/// Slides and fades the sprite in, plays a four-frame bounce three times,
/// then fades out through a nested timeline.
pub fn build(host: HostId, mode: ClockMode) -> Result<(Timeline, SharedSprite)> {
    let sprite = SharedSprite::default();
    let mut timeline = Timeline::new(host, mode);

    let slide = sprite.clone();
    let fade_in = sprite.clone();
    let arrived = sprite.clone();
    let bounce = sprite.clone();
    let landed = sprite.clone();
    let fade_out = sprite.clone();
    let gone = sprite.clone();

    timeline
        .set_var("start_x", 0.0_f32)?
        .set_var("end_x", 320.0_f32)?
        .tween_named("slide", 1.5, move |update| {
            let (Ok(from), Ok(to)) = (update.var::<f32>("start_x"), update.var::<f32>("end_x")) else {
                return;
            };
            slide.borrow_mut().x = from + (to - from) * update.progress;
        })?
        .tween_named("fade_in", 0.5, move |update| {
            fade_in.borrow_mut().opacity = update.progress;
        })?
        .wait()?
        .do_action(move |ctx| {
            arrived
                .borrow_mut()
                .log
                .push(format!("arrived @ {:.2} ({:?})", ctx.timecode, ctx.direction));
        })?
        .loop_begin(3)?
        .frames(0.4, 4, move |_, frame| {
            bounce.borrow_mut().frame = frame;
        })?
        .wait()?
        .do_action(move |_| {
            landed.borrow_mut().bounces += 1;
        })?
        .loop_end()?
        .nest_with(move |child| {
            child
                .tween_named("fade_out", 0.75, move |update| {
                    fade_out.borrow_mut().opacity = 1.0 - update.progress;
                })?
                .wait()?
                .do_action(move |ctx| {
                    gone.borrow_mut().log.push(format!("gone @ {:.2}", ctx.timecode));
                })?;
            Ok(())
        })?;

    Ok((timeline, sprite))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordoplay_timeline::TickStatus;

    #[test]
    fn test_sample_schedule() {
        let (timeline, _) = build(HostId::new(), ClockMode::Scaled).unwrap();
        let names: Vec<_> = timeline.events().iter().filter_map(|e| e.name()).collect();
        assert_eq!(names, vec!["slide", "fade_in"]);
        assert!(!timeline.is_started());
    }

    #[test]
    fn test_sample_plays_through() {
        let (mut timeline, sprite) = build(HostId::new(), ClockMode::Scaled).unwrap();
        timeline.play().unwrap();
        // Loop region counts once in the duration.
        assert!((timeline.duration() - 2.65).abs() < 1e-5);

        let mut status = TickStatus::Running;
        for _ in 0..1_000 {
            status = timeline.tick(0.05).unwrap();
            if status == TickStatus::Finished {
                break;
            }
        }
        assert_eq!(status, TickStatus::Finished);

        let sprite = sprite.borrow();
        assert_eq!(sprite.x, 320.0);
        assert_eq!(sprite.opacity, 0.0);
        assert_eq!(sprite.bounces, 3);
        assert_eq!(sprite.log.len(), 2);
        assert!(sprite.log[1].starts_with("gone"));
    }
}
