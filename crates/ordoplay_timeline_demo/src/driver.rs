// SPDX-License-Identifier: MIT OR Apache-2.0
//! Real-time host ticker.
//!
//! Plays a root timeline on a tokio interval, feeding each tick the measured
//! wall-clock delta through a [`ManualClock`].

use crate::DemoError;
use ordoplay_timeline::{ClockConfig, ManualClock, TickStatus, Timeline};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Summary of one driven playback
#[derive(Debug, Clone, Copy)]
pub struct DriveReport {
    /// Host ticks delivered
    pub ticks: u32,
    /// Wall time from play to the last tick
    pub wall_time: Duration,
    /// Whether the timeline reached its end on its own
    pub finished: bool,
}

/// Play `timeline` until it finishes, stopping it after `max_ticks`
pub async fn drive(timeline: &mut Timeline, config: &ClockConfig, max_ticks: u32) -> Result<DriveReport, DemoError> {
    // Rejects non-finite deltas and periods that round to zero.
    let period = Duration::try_from_secs_f32(config.frame_delta())
        .ok()
        .filter(|period| !period.is_zero())
        .ok_or(DemoError::InvalidFrameRate(config.frame_rate))?;

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut clock = ManualClock::default();
    let started = Instant::now();
    let mut last = started;
    let mut ticks = 0;

    timeline.play()?;
    tracing::info!(
        "Driving timeline {} at {:.1} fps ({})",
        timeline.id(),
        config.frame_rate,
        config.mode.name()
    );

    let finished = loop {
        interval.tick().await;
        let now = Instant::now();
        clock.set_frame(now.duration_since(last).as_secs_f32(), config.time_scale, config.fixed_step);
        last = now;
        ticks += 1;

        match timeline.advance(&clock)? {
            TickStatus::Finished => break true,
            TickStatus::Idle => break false,
            TickStatus::Running if ticks >= max_ticks => {
                tracing::warn!("Stopping timeline {} after {} ticks", timeline.id(), ticks);
                timeline.stop()?;
                break false;
            }
            TickStatus::Running => {}
        }
    };

    let report = DriveReport {
        ticks,
        wall_time: started.elapsed(),
        finished,
    };
    tracing::debug!("Drive done: {:?}", report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordoplay_timeline::PlaybackState;
    use std::cell::Cell;
    use std::rc::Rc;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn fast_config() -> ClockConfig {
        ClockConfig {
            frame_rate: 500.0,
            ..ClockConfig::default()
        }
    }

    #[test]
    fn test_drive_to_end() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let mut timeline = Timeline::default();
        timeline.hold(0.02).unwrap().do_action(move |_| flag.set(true)).unwrap();

        let report = block_on(drive(&mut timeline, &fast_config(), 10_000)).unwrap();
        assert!(report.finished);
        assert!(report.ticks >= 2);
        assert!(fired.get());
        assert_eq!(timeline.state(), PlaybackState::Finished);
    }

    #[test]
    fn test_drive_stops_endless_loop() {
        let mut timeline = Timeline::default();
        timeline.loop_forever().unwrap().hold(0.01).unwrap().loop_end().unwrap();

        let report = block_on(drive(&mut timeline, &fast_config(), 5)).unwrap();
        assert!(!report.finished);
        assert_eq!(report.ticks, 5);
        assert!(timeline.is_ended());
    }

    #[test]
    fn test_drive_rejects_unusable_frame_rates() {
        for frame_rate in [0.0, -30.0, f32::NAN, f32::INFINITY, 1e30] {
            let config = ClockConfig {
                frame_rate,
                ..ClockConfig::default()
            };
            let mut timeline = Timeline::default();
            let err = block_on(drive(&mut timeline, &config, 10)).unwrap_err();
            assert!(matches!(err, DemoError::InvalidFrameRate(_)));
            assert!(!timeline.is_started());
        }
    }

    #[test]
    fn test_drive_rejects_subnormal_frame_rate_from_ron() {
        let config = ClockConfig::from_ron("(frame_rate: 1e-45)").unwrap();
        assert!(config.frame_delta().is_infinite());

        let mut timeline = Timeline::default();
        let err = block_on(drive(&mut timeline, &config, 10)).unwrap_err();
        assert!(matches!(err, DemoError::InvalidFrameRate(_)));
    }
}
