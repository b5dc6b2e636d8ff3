use std::thread::sleep;
use std::time::{Duration, Instant};

/// Caps the game loop at a fixed frame rate. A frame that overran its
/// budget is followed immediately by the next one, without sleeping.
pub struct FrameClock {
    interval: Duration,
    frame_start: Instant,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        FrameClock { interval, frame_start: Instant::now() }
    }

    /// Starts a new frame and returns the time since the previous one started.
    pub fn start_frame(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.frame_start);
        self.frame_start = now;
        elapsed
    }

    pub fn wait(&self) {
        if let Some(rest) = remaining(self.interval, self.frame_start.elapsed()) {
            sleep(rest);
        }
    }
}

pub fn remaining(interval: Duration, work: Duration) -> Option<Duration> {
    interval.checked_sub(work).filter(|rest| !rest.is_zero())
}
