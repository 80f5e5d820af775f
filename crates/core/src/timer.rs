//! Round countdown.
//!
//! The timer itself never schedules anything: a driver (the adapter's tokio
//! task, or a test) delivers one tick per second tagged with the generation it
//! was started for. Every arm bumps the generation, so a tick still in flight
//! for a cancelled or replaced countdown is recognised and dropped.

/// Identity of one armed countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerGeneration(u64);

impl TimerGeneration {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Outcome of delivering one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Tick for a dead generation, or the timer is not armed.
    Stale,
    /// Seconds left after this tick.
    Remaining(u32),
    /// Countdown hit zero. Reported once; the timer disarms itself.
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct RoundTimer {
    generation: u64,
    duration_secs: u32,
    remaining_secs: u32,
    armed: bool,
}

impl RoundTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown, replacing any previous one.
    ///
    /// A zero duration only cancels and returns `None`.
    pub fn arm(&mut self, duration_secs: u32) -> Option<TimerGeneration> {
        self.generation = self.generation.wrapping_add(1);
        if duration_secs == 0 {
            self.armed = false;
            return None;
        }
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.armed = true;
        Some(TimerGeneration(self.generation))
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn tick(&mut self, generation: TimerGeneration) -> TimerTick {
        if !self.armed || generation.0 != self.generation {
            return TimerTick::Stale;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.armed = false;
            TimerTick::Expired
        } else {
            TimerTick::Remaining(self.remaining_secs)
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Generation of the live countdown, if any.
    pub fn generation(&self) -> Option<TimerGeneration> {
        self.armed.then_some(TimerGeneration(self.generation))
    }

    pub fn remaining_secs(&self) -> u32 {
        if self.armed {
            self.remaining_secs
        } else {
            0
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }
}
