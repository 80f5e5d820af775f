//! tokio driver for the round countdown.
//!
//! One spawned task per armed countdown posts its generation once per second.
//! The session decides what each tick means; this side only stops posting.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::core::TimerGeneration;
use crate::types::TIMER_TICK_MS;

#[derive(Debug)]
pub struct TimerHandle {
    tick_tx: mpsc::UnboundedSender<TimerGeneration>,
    running: Option<(TimerGeneration, JoinHandle<()>)>,
}

impl TimerHandle {
    pub fn new(tick_tx: mpsc::UnboundedSender<TimerGeneration>) -> Self {
        Self {
            tick_tx,
            running: None,
        }
    }

    /// Post `ticks` ticks for `generation`, replacing any running countdown.
    pub fn start(&mut self, generation: TimerGeneration, ticks: u32) {
        self.cancel();
        if ticks == 0 {
            return;
        }

        let tx = self.tick_tx.clone();
        let period = Duration::from_millis(TIMER_TICK_MS);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            for _ in 0..ticks {
                interval.tick().await;
                if tx.send(generation).is_err() {
                    break;
                }
            }
        });
        self.running = Some((generation, task));
    }

    pub fn cancel(&mut self) {
        if let Some((_, task)) = self.running.take() {
            task.abort();
        }
    }

    pub fn generation(&self) -> Option<TimerGeneration> {
        self.running.as_ref().map(|(generation, _)| *generation)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
