//! Numeric model behind one progress row: clamped position, throttled
//! instantaneous rate, and an ETA derived from the all-time average rate.

use std::time::{Duration, Instant};

/// Minimum spacing between two rate samples. Updates closer together than
/// this reuse the previous rate instead of dividing by a near-zero interval.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Throughput as shown on a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rate {
    /// No sample yet, nothing transferred, or a non-finite result.
    Unknown,
    /// Magnitude per second.
    PerSec(f64),
    /// The tracker has completed.
    Done,
}

/// Estimated time remaining.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eta {
    Unknown,
    /// Seconds remaining (0 once completed).
    Secs(f64),
}

impl Rate {
    pub fn per_sec(self) -> Option<f64> {
        match self {
            Rate::PerSec(r) => Some(r),
            _ => None,
        }
    }
}

impl Eta {
    pub fn secs(self) -> Option<f64> {
        match self {
            Eta::Secs(s) => Some(s),
            Eta::Unknown => None,
        }
    }
}

/// Point-in-time view of a tracker, used for rendering and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub current: f64,
    pub total: f64,
    /// Fill proportion in [0.0, 1.0].
    pub fraction: f64,
    /// Throttled instantaneous rate.
    pub rate: Rate,
    /// All-time average rate (current / elapsed), when defined.
    pub average_rate: Option<f64>,
    /// Remaining time from the average rate.
    pub eta: Eta,
    pub completed: bool,
}

/// Progress state for one operation.
///
/// `total` is fixed at construction and `current` only moves forward. Once
/// [`complete`](Self::complete) has been called, further updates are ignored.
#[derive(Debug, Clone)]
pub struct ProgressModel {
    total: f64,
    current: f64,
    started_at: Instant,
    last_update_at: Instant,
    last_sample_at: Instant,
    last_sample_value: f64,
    instant_rate: Option<f64>,
    completed: bool,
}

impl ProgressModel {
    pub fn new(total: f64, now: Instant) -> Self {
        Self {
            total,
            current: 0.0,
            started_at: now,
            last_update_at: now,
            last_sample_at: now,
            last_sample_value: 0.0,
            instant_rate: None,
            completed: false,
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Record a new absolute progress value observed at `now`.
    pub fn update_at(&mut self, value: f64, now: Instant) {
        if self.completed {
            return;
        }
        let value = clamp_to_total(value, self.total);
        if value > self.current {
            self.current = value;
        }
        if now > self.last_update_at {
            self.last_update_at = now;
        }

        let since_sample = now.saturating_duration_since(self.last_sample_at);
        if since_sample >= SAMPLE_INTERVAL {
            let delta = self.current - self.last_sample_value;
            self.instant_rate = Some(delta / since_sample.as_secs_f64());
            self.last_sample_at = now;
            self.last_sample_value = self.current;
        }
    }

    /// Force `current` to `total` (0 for a non-positive total). Idempotent.
    pub fn complete(&mut self) {
        if self.completed {
            return;
        }
        self.current = self.total.max(0.0);
        self.completed = true;
    }

    /// Seconds between creation and the latest update.
    pub fn elapsed_secs(&self) -> f64 {
        self.last_update_at
            .saturating_duration_since(self.started_at)
            .as_secs_f64()
    }

    pub fn fraction(&self) -> f64 {
        if self.completed {
            return 1.0;
        }
        if !(self.total > 0.0) {
            return 0.0;
        }
        (self.current / self.total).clamp(0.0, 1.0)
    }

    pub fn rate(&self) -> Rate {
        if self.completed {
            return Rate::Done;
        }
        if self.elapsed_secs() <= 0.0 || self.current <= 0.0 {
            return Rate::Unknown;
        }
        match self.instant_rate {
            Some(r) if r.is_finite() => Rate::PerSec(r),
            _ => Rate::Unknown,
        }
    }

    pub fn average_rate(&self) -> Option<f64> {
        let elapsed = self.elapsed_secs();
        if elapsed <= 0.0 || self.current <= 0.0 {
            return None;
        }
        Some(self.current / elapsed).filter(|r| r.is_finite())
    }

    pub fn eta(&self) -> Eta {
        if self.completed {
            return Eta::Secs(0.0);
        }
        let Some(avg) = self.average_rate() else {
            return Eta::Unknown;
        };
        let secs = (self.total - self.current) / avg;
        if secs.is_finite() && secs >= 0.0 {
            Eta::Secs(secs)
        } else {
            Eta::Unknown
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            current: self.current,
            total: self.total,
            fraction: self.fraction(),
            rate: self.rate(),
            average_rate: self.average_rate(),
            eta: self.eta(),
            completed: self.completed,
        }
    }
}

/// Clamp into `[0, total]`. NaN becomes 0.
fn clamp_to_total(value: f64, total: f64) -> f64 {
    if value > total {
        total
    } else if value > 0.0 {
        value
    } else {
        0.0
    }
}
