use std::time::{Duration, Instant};

/// One frame at 60 Hz, truncated to 16.6 ms.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_600);

/// Monotonic frame deadline.
///
/// `start` marks the beginning of a frame; `remaining` says how long the loop
/// may still wait for events before the next frame is due. Deadlines never
/// accumulate debt: a late frame starts the next interval from its own start.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    frame_start: Option<Instant>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frame_start: None,
        }
    }

    /// Marks the start of a frame.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        self.frame_start = Some(now);
    }

    /// The instant the current frame is due to end, if a frame was started.
    pub fn deadline(&self) -> Option<Instant> {
        self.frame_start.map(|s| s + self.interval)
    }

    /// Time left before the deadline; zero once it passed or when no frame started.
    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.deadline()
            .map_or(Duration::ZERO, |d| d.saturating_duration_since(now))
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_counts_down_to_zero() {
        let mut pacer = FramePacer::new(Duration::from_millis(16));
        let t0 = Instant::now();
        pacer.start_at(t0);

        assert_eq!(pacer.remaining_at(t0), Duration::from_millis(16));
        assert_eq!(pacer.remaining_at(t0 + Duration::from_millis(10)), Duration::from_millis(6));
        assert_eq!(pacer.remaining_at(t0 + Duration::from_millis(40)), Duration::ZERO);
    }

    #[test]
    fn unstarted_pacer_never_waits() {
        let pacer = FramePacer::default();
        assert_eq!(pacer.deadline(), None);
        assert_eq!(pacer.remaining(), Duration::ZERO);
    }
}
