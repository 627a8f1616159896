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

//! Runs a [`LiveWindow`] against a backend.
//!
//! The session owns the store, the poll timer and every backend call in
//! flight. Calls run as tokio tasks and report back through a channel; their
//! results only reach the store once the session feeds them through the
//! window again.

use super::controller::{Completion, Intent, LiveWindow, ViewEvent};
use crate::api::LogsApi;
use crate::core::PollTimer;
use crate::state::LogsState;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

pub struct LiveSession<A: LogsApi + 'static> {
    window: LiveWindow,
    logs: LogsState,
    api: Arc<A>,
    config_url: String,

    timer: PollTimer,
    ticks: UnboundedReceiver<u64>,

    completion_tx: UnboundedSender<Completion>,
    completions: UnboundedReceiver<Completion>,
    tasks: JoinSet<()>,
}

impl<A: LogsApi + 'static> LiveSession<A> {
    pub fn new(api: Arc<A>, config_url: String, poll_interval: Duration, logs: LogsState) -> Self {
        let (timer, ticks) = PollTimer::new(poll_interval);
        let (completion_tx, completions) = mpsc::unbounded_channel();

        Self {
            window: LiveWindow::new(),
            logs,
            api,
            config_url,
            timer,
            ticks,
            completion_tx,
            completions,
            tasks: JoinSet::new(),
        }
    }

    pub const fn logs(&self) -> &LogsState {
        &self.logs
    }

    pub const fn window(&self) -> &LiveWindow {
        &self.window
    }

    pub fn table_scroll_to_row(&mut self) -> Option<usize> {
        self.window.table_scroll_to_row(&self.logs)
    }

    pub fn mount(&mut self) {
        self.handle(ViewEvent::Mount);
    }

    /// Stop polling and cancel every backend call in flight
    pub fn unmount(&mut self) {
        self.handle(ViewEvent::Unmount);
        self.timer.disarm();
        self.tasks.abort_all();
        while self.completions.try_recv().is_ok() {}
        while self.ticks.try_recv().is_ok() {}
    }

    pub fn handle(&mut self, event: ViewEvent) {
        profiling::scope!("LiveSession::handle");
        for intent in self.window.handle(event, &self.logs) {
            self.execute(intent);
        }
    }

    fn execute(&mut self, intent: Intent) {
        match intent {
            Intent::Dispatch(action) => self.logs.apply(action),
            Intent::LoadSources => {
                let api = Arc::clone(&self.api);
                self.spawn(async move { Completion::Sources(api.get_sources().await) });
            }
            Intent::LoadSource(source) => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let namespaces = api.get_namespaces(&source.id).await;
                    Completion::Source { source, namespaces }
                });
            }
            Intent::LoadConfig => {
                let api = Arc::clone(&self.api);
                let url = self.config_url.clone();
                self.spawn(async move { Completion::Config(api.get_config(&url).await) });
            }
            Intent::PersistConfig { seq, config } => {
                let api = Arc::clone(&self.api);
                let url = self.config_url.clone();
                self.spawn(async move {
                    let result = api.update_config(&url, &config).await;
                    Completion::ConfigSaved {
                        seq,
                        config,
                        result,
                    }
                });
            }
            Intent::ExecuteQueries { generation } => {
                let api = Arc::clone(&self.api);
                let query = self.logs.query(Utc::now());
                tracing::debug!("Executing queries (generation {generation})");
                self.spawn(async move {
                    let result = api.execute_queries(&query).await;
                    Completion::Queries { generation, result }
                });
            }
            Intent::FetchNewer {
                query_generation,
                generation,
                cursor,
            } => {
                let api = Arc::clone(&self.api);
                let query = self.logs.query(Utc::now());
                self.spawn(async move {
                    let result = api.fetch_newer(&query, cursor).await;
                    Completion::Newer {
                        query_generation,
                        generation,
                        result,
                    }
                });
            }
            Intent::FetchMore {
                query_generation,
                cursor,
            } => {
                let api = Arc::clone(&self.api);
                let query = self.logs.query(Utc::now());
                self.spawn(async move {
                    let result = api.fetch_more(&query, cursor).await;
                    Completion::More {
                        query_generation,
                        cursor,
                        result,
                    }
                });
            }
            Intent::ArmPolling { generation } => self.timer.arm(generation),
            Intent::DisarmPolling => self.timer.disarm(),
        }
    }

    fn spawn<F>(&mut self, call: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.completion_tx.clone();
        self.tasks.spawn(async move {
            let completion = call.await;
            if tx.send(completion).is_err() {
                tracing::debug!("Session gone, dropping backend result");
            }
        });
    }

    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("Backend task panicked: {e}");
                }
            }
        }
    }

    /// Handle every tick and completion that is already waiting.
    ///
    /// Returns the number of events handled.
    pub fn process_ready(&mut self) -> usize {
        // Reaped tasks have already sent their result, so the drain below sees it
        self.reap();

        let mut handled = 0;
        while let Ok(completion) = self.completions.try_recv() {
            self.handle(ViewEvent::Completed(completion));
            handled += 1;
        }
        while let Ok(generation) = self.ticks.try_recv() {
            self.handle(ViewEvent::PollTick { generation });
            handled += 1;
        }
        handled
    }

    /// Whether a backend call or the poll timer can still produce an event
    pub fn is_waiting(&self) -> bool {
        !self.tasks.is_empty() || self.timer.is_armed()
    }

    /// Handle the next tick or completion, waiting for one if none is ready.
    ///
    /// Returns `false` once the window is no longer mounted, or when no call
    /// is in flight and polling is off, since nothing could arrive anymore.
    pub async fn step(&mut self) -> bool {
        if !self.window.is_mounted() {
            return false;
        }

        if self.process_ready() > 0 {
            return self.window.is_mounted();
        }

        if !self.is_waiting() {
            tracing::debug!("No call in flight and polling is off, session is idle");
            return false;
        }

        tokio::select! {
            Some(completion) = self.completions.recv() => {
                self.handle(ViewEvent::Completed(completion));
            }
            Some(generation) = self.ticks.recv() => {
                self.handle(ViewEvent::PollTick { generation });
            }
        }

        self.window.is_mounted()
    }

    pub async fn run(&mut self) {
        while self.step().await {}
    }
}
