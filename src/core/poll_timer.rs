// LiveTail - GPL-3.0-or-later
// This file is part of LiveTail.
//
// Copyright (C) 2026 Daniel Freiermuth
//
// LiveTail is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// LiveTail is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with LiveTail.  If not, see <https://www.gnu.org/licenses/>.

//! Owned, cancellable polling timer.
//!
//! Arming spawns a background task that emits the arm generation on every
//! period. Re-arming cancels the previous task first, so at most one task is
//! ever alive per timer. Dropping the timer cancels it.

use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub struct PollTimer {
    period: Duration,
    tick_tx: UnboundedSender<u64>,
    task: Option<JoinHandle<()>>,
}

impl PollTimer {
    /// Create a disarmed timer and the receiver its ticks arrive on.
    ///
    /// Each tick carries the generation passed to [`PollTimer::arm`].
    #[must_use]
    pub fn new(period: Duration) -> (Self, UnboundedReceiver<u64>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let timer = Self {
            period,
            tick_tx,
            task: None,
        };
        (timer, tick_rx)
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking every period, replacing any running schedule.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, generation: u64) {
        self.disarm();

        let tx = self.tick_tx.clone();
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(generation).is_err() {
                    tracing::debug!("Poll timer receiver gone, stopping generation {generation}");
                    break;
                }
            }
        }));
        tracing::trace!("Poll timer armed (generation {generation}, every {period:?})");
    }

    /// Stop ticking. No-op when not armed.
    pub fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::trace!("Poll timer disarmed");
        }
    }

    pub const fn is_armed(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
