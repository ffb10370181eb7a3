//! Fixed-rate frame pacing for the headless host loop.
//!
//! [`FramePacer`] stands in for a display refresh: each call to
//! [`YieldPoint::next_frame`] sleeps until the next frame deadline. Chunked
//! passes yield through it, and the cloud animation advances one frame per
//! call.

use std::time::{Duration, Instant};

use terra_sched::YieldPoint;
use tracing::warn;

/// Frame rate used when none is configured.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// How far the pacer may fall behind before it stops trying to catch up and
/// restarts its schedule from the current instant.
pub const MAX_FRAME_LAG: Duration = Duration::from_millis(250);

/// Sleeps to fixed frame deadlines and counts frames.
///
/// `next_frame` sleeps the calling thread, so drive it from a blocking
/// executor such as `pollster::block_on`, never from a shared async runtime.
#[derive(Debug)]
pub struct FramePacer {
    frame_interval: Duration,
    next_deadline: Instant,
    frames: u64,
}

impl FramePacer {
    /// A pacer running at `frame_rate` frames per second, starting now.
    /// A zero rate is treated as one.
    pub fn new(frame_rate: u32) -> Self {
        Self::starting_at(frame_rate, Instant::now())
    }

    fn starting_at(frame_rate: u32, start: Instant) -> Self {
        let frame_interval = Duration::from_secs(1) / frame_rate.max(1);
        Self {
            frame_interval,
            next_deadline: start + frame_interval,
            frames: 0,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Frames completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulated time in seconds: completed frames times the frame interval.
    pub fn sim_time(&self) -> f64 {
        self.frames as f64 * self.frame_interval.as_secs_f64()
    }

    /// Advance to the next frame as of `now`, returning how long to sleep.
    fn advance(&mut self, now: Instant) -> Duration {
        let deadline = self.next_deadline;
        self.frames += 1;

        if now > deadline + MAX_FRAME_LAG {
            warn!(
                behind_ms = (now - deadline).as_secs_f64() * 1000.0,
                "host loop fell behind, resetting frame schedule"
            );
            self.next_deadline = now + self.frame_interval;
            return Duration::ZERO;
        }

        self.next_deadline = deadline + self.frame_interval;
        deadline.saturating_duration_since(now)
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE)
    }
}

impl YieldPoint for FramePacer {
    async fn next_frame(&mut self) {
        let wait = self.advance(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
        terra_sched::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixty_hz_interval() {
        let pacer = FramePacer::new(60);
        let expected = Duration::from_secs(1) / 60;
        assert_eq!(pacer.frame_interval(), expected);
    }

    #[test]
    fn test_zero_rate_treated_as_one() {
        let pacer = FramePacer::new(0);
        assert_eq!(pacer.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_waits_until_deadline() {
        let start = Instant::now();
        let mut pacer = FramePacer::starting_at(50, start);
        let wait = pacer.advance(start + Duration::from_millis(5));
        assert_eq!(wait, Duration::from_millis(15));
        assert_eq!(pacer.frames(), 1);
    }

    #[test]
    fn test_late_frame_does_not_wait() {
        let start = Instant::now();
        let mut pacer = FramePacer::starting_at(50, start);
        let wait = pacer.advance(start + Duration::from_millis(30));
        assert_eq!(wait, Duration::ZERO);
        // The schedule keeps its cadence: the next deadline is 40 ms in.
        let wait = pacer.advance(start + Duration::from_millis(32));
        assert_eq!(wait, Duration::from_millis(8));
    }

    #[test]
    fn test_large_lag_resets_schedule() {
        let start = Instant::now();
        let mut pacer = FramePacer::starting_at(50, start);
        let late = start + Duration::from_secs(2);
        assert_eq!(pacer.advance(late), Duration::ZERO);
        assert_eq!(pacer.advance(late), Duration::from_millis(20));
    }

    #[test]
    fn test_sim_time_counts_frames() {
        let start = Instant::now();
        let mut pacer = FramePacer::starting_at(4, start);
        for i in 1..=3 {
            pacer.advance(start + Duration::from_millis(250 * i));
        }
        assert_eq!(pacer.frames(), 3);
        assert!((pacer.sim_time() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_next_frame_sleeps_roughly_one_interval() {
        let mut pacer = FramePacer::new(200);
        let before = Instant::now();
        pollster::block_on(pacer.next_frame());
        pollster::block_on(pacer.next_frame());
        assert!(before.elapsed() >= Duration::from_millis(9));
        assert_eq!(pacer.frames(), 2);
    }
}
