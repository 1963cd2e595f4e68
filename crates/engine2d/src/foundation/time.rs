//! Time management utilities

use std::time::{Duration, Instant};

/// Nanoseconds per second, the unit of frame timestamps
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Monotonic frame clock producing nanosecond timestamps
///
/// Timestamps are measured from the moment the clock was created, so the
/// first frame starts close to zero.
pub struct FrameClock {
    origin: Instant,
    last_timestamp: u64,
    delta_nanos: u64,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_timestamp: 0,
            delta_nanos: 0,
            frame_count: 0,
        }
    }

    /// Current timestamp without advancing the frame counter
    pub fn now_nanos(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// Advance one frame and return its timestamp
    pub fn tick(&mut self) -> u64 {
        let now = self.now_nanos().max(self.last_timestamp);
        self.delta_nanos = now - self.last_timestamp;
        self.last_timestamp = now;
        self.frame_count += 1;
        now
    }

    /// Time between the last two ticks in seconds
    pub fn delta_time(&self) -> f64 {
        self.delta_nanos as f64 / NANOS_PER_SECOND as f64
    }

    /// Timestamp of the last tick
    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since clock creation
    pub fn average_fps(&self) -> f64 {
        if self.last_timestamp > 0 {
            self.frame_count as f64 * NANOS_PER_SECOND as f64 / self.last_timestamp as f64
        } else {
            0.0
        }
    }
}

/// Fixed-rate pacing for the game loop
pub struct TickPacer {
    interval: Duration,
    next_deadline: Instant,
}

impl TickPacer {
    /// Create a pacer for the given tick rate
    ///
    /// A rate of zero disables pacing.
    pub fn new(ticks_per_second: u32) -> Self {
        let interval = if ticks_per_second == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(NANOS_PER_SECOND / u64::from(ticks_per_second))
        };
        Self {
            interval,
            next_deadline: Instant::now() + interval,
        }
    }

    /// Interval between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep until the next tick is due
    ///
    /// When the loop has fallen behind the deadline is reset instead of
    /// trying to catch up with a burst of frames.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            std::thread::sleep(self.next_deadline - now);
            self.next_deadline += self.interval;
        } else {
            self.next_deadline = now + self.interval;
        }
    }
}
