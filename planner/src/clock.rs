use bevy_time::Time;

/// Source of "now", in seconds, for time-gated diagnostics.
pub trait Clock {
    fn now(&self) -> f64;
}

impl Clock for Time {
    fn now(&self) -> f64 {
        self.elapsed_secs_f64()
    }
}

/// A clock stuck at a given time, for replays and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// Lets an event through at most once per `interval` seconds.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: f64,
    last: Option<f64>,
}

impl RateLimiter {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true and records `now` if the interval has elapsed since the last emission.
    pub fn ready(&mut self, now: f64) -> bool {
        match self.last {
            Some(last) if now <= last + self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}
