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

//! The live window: decides when to poll, when to refetch and where the
//! table should scroll.
//!
//! [`LiveWindow::handle`] is a pure transition. It reads the store, updates
//! its own bookkeeping and returns [`Intent`]s; executing them (dispatching
//! actions, talking to the backend, arming the timer) is the caller's job.
//!
//! Every fetch carries the query generation it was issued under. The
//! generation only moves when the query parameters change, so a poll tick
//! never invalidates work in flight; it is skipped while a query is still
//! running. Newer-fetches additionally carry their own generation. Results
//! of superseded generations are discarded.

use crate::api::{ApiError, QueryResult};
use crate::config::{LogConfig, SeverityFormat, SeverityLevelColor};
use crate::core::{
    filter, ColumnSpec, Filter, FilterOperator, Namespace, Source, TablePage, TableTime,
    TimePeriod, TimeRange,
};
use crate::state::{LogsAction, LogsState};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Rows kept visible above the default scroll position
pub const SCROLL_LOOKBACK_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    /// Polling timer armed
    LiveUpdating,
    /// User scrolled away from the live edge; polling suspended
    ScrolledAway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    TornDown,
}

/// Outcome of a backend call started by an [`Intent`]
#[derive(Debug)]
pub enum Completion {
    Sources(Result<Vec<Source>, ApiError>),
    Source {
        source: Source,
        namespaces: Result<Vec<Namespace>, ApiError>,
    },
    Config(Result<LogConfig, ApiError>),
    ConfigSaved {
        seq: u64,
        config: LogConfig,
        result: Result<(), ApiError>,
    },
    Queries {
        generation: u64,
        result: Result<QueryResult, ApiError>,
    },
    Newer {
        query_generation: u64,
        generation: u64,
        result: Result<TablePage, ApiError>,
    },
    More {
        query_generation: u64,
        cursor: DateTime<Utc>,
        result: Result<TablePage, ApiError>,
    },
}

/// Everything that can happen to the window
#[derive(Debug)]
pub enum ViewEvent {
    Mount,
    Unmount,

    SubmitSearch(String),
    AddFilter(Filter),
    /// A tag was clicked in the table
    SelectTag {
        key: String,
        tag: String,
    },
    RemoveFilter(Uuid),
    ChangeFilter {
        id: Uuid,
        operator: FilterOperator,
        value: String,
    },
    ChooseTimeRange(TimeRange),
    ChooseTableTime(TableTime),
    ChooseSource(String),
    ChooseNamespace(Namespace),
    /// A span was dragged on the histogram
    ZoomChart(TimePeriod),

    /// User scrolled the table vertically
    ScrollVertical,
    /// Table reached its top edge
    ScrollToTop,
    ToggleLiveUpdating,

    /// Table wants rows newer than the cursor
    FetchNewer(DateTime<Utc>),
    /// Table wants rows older than the cursor
    FetchMore(DateTime<Utc>),

    UpdateColumns(Vec<ColumnSpec>),
    UpdateSeverityFormat(SeverityFormat),
    UpdateSeverityLevels(Vec<SeverityLevelColor>),

    PollTick {
        generation: u64,
    },
    Completed(Completion),
}

/// Side effects requested by the window
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Dispatch(LogsAction),
    LoadSources,
    /// Make the source current and populate its namespaces
    LoadSource(Source),
    LoadConfig,
    ExecuteQueries {
        generation: u64,
    },
    FetchNewer {
        query_generation: u64,
        generation: u64,
        cursor: DateTime<Utc>,
    },
    FetchMore {
        query_generation: u64,
        cursor: DateTime<Utc>,
    },
    ArmPolling {
        generation: u64,
    },
    DisarmPolling,
    PersistConfig {
        seq: u64,
        config: LogConfig,
    },
}

#[derive(Debug)]
pub struct LiveWindow {
    lifecycle: Lifecycle,
    state: ViewState,
    has_scrolled: bool,

    timer_armed: bool,
    timer_generation: u64,

    query_generation: u64,
    newer_generation: u64,
    loading_newer: bool,
    /// Row to scroll to once, after newer rows were prepended
    scroll_anchor: Option<usize>,
    /// Cursor of the older-rows fetch in flight
    more_in_flight: Option<DateTime<Utc>>,

    config_seq: u64,
}

impl Default for LiveWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveWindow {
    pub const fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Created,
            state: ViewState::Idle,
            has_scrolled: false,
            timer_armed: false,
            timer_generation: 0,
            query_generation: 0,
            newer_generation: 0,
            loading_newer: false,
            scroll_anchor: None,
            more_in_flight: None,
            config_seq: 0,
        }
    }

    pub const fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    pub const fn is_polling(&self) -> bool {
        self.timer_armed
    }

    pub const fn has_scrolled(&self) -> bool {
        self.has_scrolled
    }

    pub const fn is_loading_newer(&self) -> bool {
        self.loading_newer
    }

    pub const fn query_generation(&self) -> u64 {
        self.query_generation
    }

    /// What the header shows as "live"
    pub fn is_live(&self, logs: &LogsState) -> bool {
        self.state == ViewState::LiveUpdating && logs.time_range.is_live()
    }

    /// Row the table should scroll to, if any.
    ///
    /// Right after newer rows were prepended this is the number of new rows,
    /// keeping the previously visible rows in place; it is returned once.
    /// After a manual scroll nothing is forced. Otherwise the table sits near
    /// the end of the forward page.
    pub fn table_scroll_to_row(&mut self, logs: &LogsState) -> Option<usize> {
        if let Some(rows) = self.scroll_anchor.take() {
            return Some(rows);
        }

        if self.has_scrolled {
            return None;
        }

        Some(logs.forward.len().saturating_sub(SCROLL_LOOKBACK_ROWS))
    }

    pub fn handle(&mut self, event: ViewEvent, logs: &LogsState) -> Vec<Intent> {
        let mut out = Vec::new();

        match self.lifecycle {
            Lifecycle::Created => {
                if matches!(event, ViewEvent::Mount) {
                    self.mount(logs, &mut out);
                } else {
                    tracing::debug!("Ignoring {event:?} before mount");
                }
                return out;
            }
            Lifecycle::TornDown => {
                tracing::debug!("Ignoring {event:?} after teardown");
                return out;
            }
            Lifecycle::Mounted => {}
        }

        match event {
            ViewEvent::Mount => tracing::debug!("Window already mounted"),
            ViewEvent::Unmount => self.unmount(&mut out),

            ViewEvent::SubmitSearch(term) => {
                out.push(Intent::Dispatch(LogsAction::SetSearchTerm(term)));
                self.refetch_all(&logs.time_range, &mut out);
            }
            ViewEvent::AddFilter(filter) => {
                out.push(Intent::Dispatch(LogsAction::AddFilter(filter)));
                self.refetch_all(&logs.time_range, &mut out);
            }
            ViewEvent::SelectTag { key, tag } => {
                let filter = Filter::from_tag(key, tag);
                out.push(Intent::Dispatch(LogsAction::AddFilter(filter)));
                self.refetch_all(&logs.time_range, &mut out);
            }
            ViewEvent::RemoveFilter(id) => self.remove_filter(logs, id, &mut out),
            ViewEvent::ChangeFilter {
                id,
                operator,
                value,
            } => self.change_filter(logs, id, operator, value, &mut out),
            ViewEvent::ChooseTimeRange(range) => self.choose_time_range(range, &mut out),
            ViewEvent::ZoomChart(period) => match TimeRange::from_period(period) {
                Some(range) => self.choose_time_range(range, &mut out),
                None => tracing::warn!("Ignoring zoom to unrepresentable period {period:?}"),
            },
            ViewEvent::ChooseTableTime(at) => {
                out.push(Intent::Dispatch(LogsAction::SetTableTime(at)));
                self.refetch_all(&logs.time_range, &mut out);
            }
            ViewEvent::ChooseSource(id) => {
                match logs.sources.iter().find(|source| source.id == id) {
                    Some(source) => out.push(Intent::LoadSource(source.clone())),
                    None => tracing::warn!("Unknown source {id}"),
                }
            }
            ViewEvent::ChooseNamespace(namespace) => {
                out.push(Intent::Dispatch(LogsAction::SetNamespace(namespace)));
                self.refetch_all(&logs.time_range, &mut out);
            }

            ViewEvent::ScrollVertical => self.scroll_vertical(&mut out),
            ViewEvent::ScrollToTop => {
                self.has_scrolled = false;
                if self.state != ViewState::LiveUpdating {
                    self.start_updating(&logs.time_range, &mut out);
                }
            }
            ViewEvent::ToggleLiveUpdating => {
                if self.state == ViewState::LiveUpdating {
                    self.stop_updating(&mut out);
                    self.state = ViewState::Idle;
                } else {
                    self.start_updating(&logs.time_range, &mut out);
                }
            }

            ViewEvent::FetchNewer(cursor) => {
                self.newer_generation += 1;
                self.loading_newer = true;
                out.push(Intent::FetchNewer {
                    query_generation: self.query_generation,
                    generation: self.newer_generation,
                    cursor,
                });
            }
            ViewEvent::FetchMore(cursor) => {
                if self.more_in_flight == Some(cursor) {
                    tracing::trace!("Older rows before {cursor} already requested");
                } else {
                    self.more_in_flight = Some(cursor);
                    out.push(Intent::FetchMore {
                        query_generation: self.query_generation,
                        cursor,
                    });
                }
            }

            ViewEvent::UpdateColumns(columns) => {
                self.save_config(logs.log_config().clone().with_columns(columns), &mut out);
            }
            ViewEvent::UpdateSeverityFormat(format) => {
                self.save_config(
                    logs.log_config().clone().with_severity_format(format),
                    &mut out,
                );
            }
            ViewEvent::UpdateSeverityLevels(levels) => {
                self.save_config(
                    logs.log_config().clone().with_severity_levels(levels),
                    &mut out,
                );
            }

            ViewEvent::PollTick { generation } => {
                if !self.timer_armed || generation != self.timer_generation {
                    tracing::trace!("Dropping tick of stale timer generation {generation}");
                } else if logs.query_count > 0 {
                    tracing::debug!("Query still running, skipping poll");
                } else {
                    self.issue_query(&mut out);
                }
            }
            ViewEvent::Completed(completion) => self.complete(completion, logs, &mut out),
        }

        out
    }

    fn mount(&mut self, logs: &LogsState, out: &mut Vec<Intent>) {
        tracing::debug!("Mounting live window");
        self.lifecycle = Lifecycle::Mounted;
        out.push(Intent::LoadSources);
        out.push(Intent::LoadConfig);

        if logs.current_namespace.is_some() {
            self.refetch_all(&logs.time_range, out);
        } else {
            self.start_updating(&logs.time_range, out);
        }
    }

    fn unmount(&mut self, out: &mut Vec<Intent>) {
        tracing::debug!("Tearing down live window");
        self.stop_updating(out);
        self.state = ViewState::Idle;
        self.lifecycle = Lifecycle::TornDown;
    }

    /// Arm polling if `range` is open-ended; always replaces any armed timer
    fn start_updating(&mut self, range: &TimeRange, out: &mut Vec<Intent>) {
        self.stop_updating(out);

        if range.is_live() {
            self.timer_generation += 1;
            self.timer_armed = true;
            self.state = ViewState::LiveUpdating;
            out.push(Intent::ArmPolling {
                generation: self.timer_generation,
            });
        } else {
            self.state = ViewState::Idle;
        }
    }

    fn stop_updating(&mut self, out: &mut Vec<Intent>) {
        if self.timer_armed {
            self.timer_armed = false;
            out.push(Intent::DisarmPolling);
        }
    }

    fn scroll_vertical(&mut self, out: &mut Vec<Intent>) {
        self.stop_updating(out);
        self.state = ViewState::ScrolledAway;
        self.has_scrolled = true;
    }

    fn choose_time_range(&mut self, range: TimeRange, out: &mut Vec<Intent>) {
        out.push(Intent::Dispatch(LogsAction::SetTimeRange(range)));
        self.refetch_all(&range, out);
    }

    /// Only filter mutations that take effect refetch, exactly once. Changes
    /// to an unknown filter or to an invalid pattern are dropped.
    fn change_filter(
        &mut self,
        logs: &LogsState,
        id: Uuid,
        operator: FilterOperator,
        value: String,
        out: &mut Vec<Intent>,
    ) {
        if logs.filters.get(id).is_none() {
            tracing::warn!("Ignoring change of unknown filter {id}");
            return;
        }
        if let Err(e) = filter::validate_value(operator, &value) {
            tracing::warn!("Ignoring filter change: {e}");
            return;
        }

        out.push(Intent::Dispatch(LogsAction::ChangeFilter {
            id,
            operator,
            value,
        }));
        self.refetch_all(&logs.time_range, out);
    }

    /// Same rule as [`Self::change_filter`]: removing an unknown filter is a no-op
    fn remove_filter(&mut self, logs: &LogsState, id: Uuid, out: &mut Vec<Intent>) {
        if logs.filters.get(id).is_none() {
            tracing::warn!("Ignoring removal of unknown filter {id}");
            return;
        }

        out.push(Intent::Dispatch(LogsAction::RemoveFilter(id)));
        self.refetch_all(&logs.time_range, out);
    }

    /// Reload the whole dataset for new query parameters and resume updating.
    ///
    /// Results of anything issued before are discarded from here on. A manual
    /// scroll position survives; only scrolling back to the top releases it.
    fn refetch_all(&mut self, range: &TimeRange, out: &mut Vec<Intent>) {
        self.query_generation += 1;
        self.loading_newer = false;
        self.scroll_anchor = None;
        self.more_in_flight = None;
        self.issue_query(out);
        self.start_updating(range, out);
    }

    fn issue_query(&self, out: &mut Vec<Intent>) {
        out.push(Intent::Dispatch(LogsAction::QueryStarted));
        out.push(Intent::ExecuteQueries {
            generation: self.query_generation,
        });
    }

    fn save_config(&mut self, config: LogConfig, out: &mut Vec<Intent>) {
        self.config_seq += 1;
        let seq = self.config_seq;
        out.push(Intent::Dispatch(LogsAction::ProposeConfig {
            seq,
            config: config.clone(),
        }));
        out.push(Intent::PersistConfig { seq, config });
    }

    fn complete(&mut self, completion: Completion, logs: &LogsState, out: &mut Vec<Intent>) {
        match completion {
            Completion::Sources(Ok(sources)) => {
                // Namespaces are loaded once: for the preselected source if
                // the backend knows it, otherwise for the first one.
                if logs.namespaces.is_empty() {
                    let wanted = logs.current_source.as_ref().and_then(|current| {
                        let found = sources.iter().find(|source| source.id == current.id);
                        if found.is_none() {
                            tracing::warn!("Source {} not found, using the first one", current.id);
                        }
                        found
                    });
                    if let Some(source) = wanted.or_else(|| sources.first()) {
                        out.push(Intent::LoadSource(source.clone()));
                    }
                }
                out.push(Intent::Dispatch(LogsAction::SetSources(sources)));
            }
            Completion::Sources(Err(e)) => tracing::warn!("Failed to load sources: {e}"),

            Completion::Source {
                source,
                namespaces: Ok(namespaces),
            } => {
                let first = namespaces.first().cloned();
                out.push(Intent::Dispatch(LogsAction::SetSource { source, namespaces }));
                if logs.current_namespace.is_none() {
                    if let Some(namespace) = first {
                        out.push(Intent::Dispatch(LogsAction::SetNamespace(namespace)));
                        self.refetch_all(&logs.time_range, out);
                    }
                }
            }
            Completion::Source {
                source,
                namespaces: Err(e),
            } => tracing::warn!("Failed to load namespaces of source {}: {e}", source.id),

            Completion::Config(Ok(config)) => {
                out.push(Intent::Dispatch(LogsAction::SetConfig(config)));
            }
            Completion::Config(Err(e)) => tracing::warn!("Failed to load log viewer config: {e}"),

            Completion::ConfigSaved {
                seq,
                config,
                result: Ok(()),
            } => out.push(Intent::Dispatch(LogsAction::ConfirmConfig { seq, config })),
            Completion::ConfigSaved {
                seq,
                result: Err(e),
                ..
            } => {
                tracing::warn!("Failed to save log viewer config, reverting: {e}");
                out.push(Intent::Dispatch(LogsAction::RejectConfig { seq }));
            }

            Completion::Queries { generation, result } => {
                out.push(Intent::Dispatch(LogsAction::QueryFinished));
                if generation != self.query_generation {
                    tracing::debug!(
                        "Discarding stale query result {generation} (current {})",
                        self.query_generation
                    );
                    return;
                }
                match result {
                    Ok(result) => out.push(Intent::Dispatch(LogsAction::SetQueryResult(result))),
                    Err(e) if e.is_transient() => {
                        tracing::warn!("Query failed, keeping previous data: {e}");
                    }
                    Err(e) => tracing::error!("Query rejected, keeping previous data: {e}"),
                }
            }

            Completion::Newer {
                query_generation,
                generation,
                result,
            } => {
                if query_generation != self.query_generation
                    || generation != self.newer_generation
                {
                    tracing::debug!("Discarding stale newer rows (request {generation})");
                    return;
                }
                self.loading_newer = false;
                match result {
                    Ok(page) => {
                        let added = page.len();
                        self.scroll_anchor = (added > 0).then_some(added);
                        out.push(Intent::Dispatch(LogsAction::PrependNewer(page)));
                    }
                    Err(e) => tracing::warn!("Fetching newer rows failed: {e}"),
                }
            }

            Completion::More {
                query_generation,
                cursor,
                result,
            } => {
                if self.more_in_flight == Some(cursor) {
                    self.more_in_flight = None;
                }
                if query_generation != self.query_generation {
                    tracing::debug!("Discarding older rows of a superseded query");
                    return;
                }
                match result {
                    Ok(page) => out.push(Intent::Dispatch(LogsAction::AppendOlder(page))),
                    Err(e) => tracing::warn!("Fetching older rows failed: {e}"),
                }
            }
        }
    }
}
