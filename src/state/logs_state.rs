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

//! Store of the log viewer: query parameters and loaded data.
//!
//! The state is only ever changed through [`LogsAction`]s. Everything shown
//! on screen (display buffer, histogram total, colours) is derived on read.

use crate::api::{LogsQuery, QueryResult};
use crate::config::{LogConfig, Pending, SeverityFormat, SeverityLevelColor};
use crate::core::histogram::{self, HistogramColor, HistogramDatum};
use crate::core::table::{self, ColumnSpec, TablePage};
use crate::core::{Filter, FilterOperator, FilterSet, Namespace, Source, TableTime, TimeRange};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Mutations of [`LogsState`]
#[derive(Debug, Clone, PartialEq)]
pub enum LogsAction {
    SetSources(Vec<Source>),
    /// Make `source` current and replace the namespace list
    SetSource {
        source: Source,
        namespaces: Vec<Namespace>,
    },
    SetNamespace(Namespace),
    SetTimeRange(TimeRange),
    SetTableTime(TableTime),
    SetSearchTerm(String),
    AddFilter(Filter),
    RemoveFilter(Uuid),
    ChangeFilter {
        id: Uuid,
        operator: FilterOperator,
        value: String,
    },
    QueryStarted,
    QueryFinished,
    /// Replace histogram and both pages with a fresh dataset
    SetQueryResult(QueryResult),
    /// Newer rows arrived for the forward page
    PrependNewer(TablePage),
    /// Older rows arrived for the backward page
    AppendOlder(TablePage),
    /// Config loaded from the backend
    SetConfig(LogConfig),
    /// Local config change awaiting save `seq`
    ProposeConfig { seq: u64, config: LogConfig },
    ConfirmConfig { seq: u64, config: LogConfig },
    RejectConfig { seq: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct LogsState {
    pub sources: Vec<Source>,
    pub current_source: Option<Source>,
    pub namespaces: Vec<Namespace>,
    pub current_namespace: Option<Namespace>,

    pub time_range: TimeRange,
    pub table_time: TableTime,
    pub search_term: String,
    pub filters: FilterSet,

    pub histogram: Vec<HistogramDatum>,
    pub forward: TablePage,
    pub backward: TablePage,
    /// Rows the last accepted newer-fetch put in front of the forward page
    pub new_rows_added: usize,
    /// Queries currently in flight
    pub query_count: usize,

    log_config: Pending<LogConfig>,

    /// Bumped whenever histogram or table data changes
    data_version: u64,
}

impl LogsState {
    pub fn apply(&mut self, action: LogsAction) {
        match action {
            LogsAction::SetSources(sources) => self.sources = sources,
            LogsAction::SetSource { source, namespaces } => {
                self.current_source = Some(source);
                self.namespaces = namespaces;
            }
            LogsAction::SetNamespace(namespace) => self.current_namespace = Some(namespace),
            LogsAction::SetTimeRange(range) => self.time_range = range,
            LogsAction::SetTableTime(at) => self.table_time = at,
            LogsAction::SetSearchTerm(term) => self.search_term = term,
            LogsAction::AddFilter(filter) => self.filters.add(filter),
            LogsAction::RemoveFilter(id) => {
                if self.filters.remove(id).is_none() {
                    tracing::debug!("Filter {id} already removed");
                }
            }
            LogsAction::ChangeFilter {
                id,
                operator,
                value,
            } => {
                if let Err(e) = self.filters.change(id, operator, &value) {
                    tracing::warn!("Could not change filter: {e}");
                }
            }
            LogsAction::QueryStarted => self.query_count += 1,
            LogsAction::QueryFinished => self.query_count = self.query_count.saturating_sub(1),
            LogsAction::SetQueryResult(result) => {
                self.histogram = result.histogram;
                self.forward = result.forward;
                self.backward = result.backward;
                self.new_rows_added = 0;
                self.bump_data_version();
            }
            LogsAction::PrependNewer(page) => {
                self.new_rows_added = page.len();
                self.forward.prepend(&page);
                self.bump_data_version();
            }
            LogsAction::AppendOlder(page) => {
                self.backward.append(&page);
                self.bump_data_version();
            }
            LogsAction::SetConfig(config) => self.log_config.reload(config),
            LogsAction::ProposeConfig { seq, config } => self.log_config.propose(seq, config),
            LogsAction::ConfirmConfig { seq, config } => self.log_config.confirm(seq, config),
            LogsAction::RejectConfig { seq } => self.log_config.reject(seq),
        }
    }

    fn bump_data_version(&mut self) {
        self.data_version += 1;
    }

    /// Version number bumped whenever histogram or table data changes
    pub const fn data_version(&self) -> u64 {
        self.data_version
    }

    /// Query for the current parameters, with the table anchor resolved against `now`
    pub fn query(&self, now: DateTime<Utc>) -> LogsQuery {
        LogsQuery {
            source_id: self.current_source.as_ref().map(|source| source.id.clone()),
            namespace: self.current_namespace.clone(),
            time_range: self.time_range,
            table_time: self.table_time.resolve(now),
            search_term: self.search_term.clone(),
            filters: self.filters.as_slice().to_vec(),
        }
    }

    /// Config as displayed (including a save still in flight)
    pub fn log_config(&self) -> &LogConfig {
        self.log_config.current()
    }

    pub const fn log_config_state(&self) -> &Pending<LogConfig> {
        &self.log_config
    }

    pub fn table_columns(&self) -> &[ColumnSpec] {
        &self.log_config().table_columns
    }

    pub fn severity_format(&self) -> SeverityFormat {
        self.log_config().severity_format
    }

    pub fn severity_level_colors(&self) -> &[SeverityLevelColor] {
        &self.log_config().severity_level_colors
    }

    pub fn histogram_total(&self) -> f64 {
        histogram::histogram_total(&self.histogram)
    }

    pub fn histogram_colors(&self) -> Vec<HistogramColor> {
        histogram::histogram_colors(self.severity_level_colors())
    }

    /// Forward rows followed by backward rows, shaped by the column config
    pub fn display_buffer(&self) -> TablePage {
        table::display_buffer(&self.forward, &self.backward, self.table_columns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(times: &[i64]) -> TablePage {
        TablePage::new(
            vec!["time".to_string(), "message".to_string()],
            times
                .iter()
                .map(|t| vec![json!(t), json!(format!("m{t}"))])
                .collect(),
        )
    }

    #[test]
    fn test_query_result_replaces_pages() {
        let mut state = LogsState::default();
        state.apply(LogsAction::PrependNewer(page(&[9])));
        assert_eq!(state.new_rows_added, 1);

        state.apply(LogsAction::SetQueryResult(QueryResult {
            histogram: vec![HistogramDatum::new(0, 2.0, "info")],
            forward: page(&[5, 4]),
            backward: page(&[3]),
        }));

        assert_eq!(state.forward.len(), 2);
        assert_eq!(state.backward.len(), 1);
        assert_eq!(state.new_rows_added, 0);
        assert!((state.histogram_total() - 2.0).abs() < f64::EPSILON);
        assert_eq!(state.display_buffer().len(), 3);
    }

    #[test]
    fn test_paging_grows_both_ends() {
        let mut state = LogsState::default();
        state.apply(LogsAction::SetQueryResult(QueryResult {
            histogram: Vec::new(),
            forward: page(&[5, 4]),
            backward: page(&[3]),
        }));
        let version = state.data_version();

        state.apply(LogsAction::PrependNewer(page(&[7, 6])));
        state.apply(LogsAction::AppendOlder(page(&[2, 1])));

        assert_eq!(state.new_rows_added, 2);
        let times: Vec<_> = state
            .display_buffer()
            .values
            .iter()
            .map(|row| row[0].clone())
            .collect();
        assert_eq!(times, vec![json!(7), json!(6), json!(5), json!(4), json!(3), json!(2), json!(1)]);
        assert_eq!(state.data_version(), version + 2);
    }

    #[test]
    fn test_query_count_never_underflows() {
        let mut state = LogsState::default();
        state.apply(LogsAction::QueryStarted);
        state.apply(LogsAction::QueryFinished);
        state.apply(LogsAction::QueryFinished);
        assert_eq!(state.query_count, 0);
    }

    #[test]
    fn test_query_snapshot() {
        let mut state = LogsState::default();
        let filter = Filter::from_tag("host", "web-1");
        state.apply(LogsAction::AddFilter(filter.clone()));
        state.apply(LogsAction::SetSearchTerm("timeout".to_string()));
        state.apply(LogsAction::SetNamespace(Namespace::new("syslog", "autogen")));

        let now = Utc::now();
        let query = state.query(now);
        assert_eq!(query.filters, vec![filter]);
        assert_eq!(query.search_term, "timeout");
        assert_eq!(query.table_time, now);
        assert!(query.time_range.is_live());
    }

    #[test]
    fn test_config_save_round_trip() {
        let mut state = LogsState::default();
        let saved = LogConfig::default().with_severity_format(SeverityFormat::Text);

        state.apply(LogsAction::ProposeConfig {
            seq: 1,
            config: saved,
        });
        assert_eq!(state.severity_format(), SeverityFormat::Text);

        state.apply(LogsAction::RejectConfig { seq: 1 });
        assert_eq!(state.severity_format(), SeverityFormat::DotText);
    }
}
