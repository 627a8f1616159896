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

//! Contract with the log-viewer backend.

mod error;
mod http;

pub use error::ApiError;
pub use http::HttpLogsApi;

use crate::config::LogConfig;
use crate::core::{Filter, HistogramDatum, Namespace, Source, TablePage, TimeRange};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the backend needs to run the log queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub source_id: Option<String>,
    pub namespace: Option<Namespace>,
    pub time_range: TimeRange,
    /// Resolved table anchor: forward rows are newer, backward rows older
    pub table_time: DateTime<Utc>,
    pub search_term: String,
    pub filters: Vec<Filter>,
}

/// Full dataset for one query: histogram plus both table pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub histogram: Vec<HistogramDatum>,
    #[serde(default)]
    pub forward: TablePage,
    #[serde(default)]
    pub backward: TablePage,
}

#[async_trait]
pub trait LogsApi: Send + Sync {
    async fn get_sources(&self) -> Result<Vec<Source>, ApiError>;

    async fn get_namespaces(&self, source_id: &str) -> Result<Vec<Namespace>, ApiError>;

    /// Run the current search, filters and time range
    async fn execute_queries(&self, query: &LogsQuery) -> Result<QueryResult, ApiError>;

    /// Rows newer than `cursor`, newest first
    async fn fetch_newer(
        &self,
        query: &LogsQuery,
        cursor: DateTime<Utc>,
    ) -> Result<TablePage, ApiError>;

    /// Rows older than `cursor`, newest first
    async fn fetch_more(
        &self,
        query: &LogsQuery,
        cursor: DateTime<Utc>,
    ) -> Result<TablePage, ApiError>;

    async fn get_config(&self, url: &str) -> Result<LogConfig, ApiError>;

    async fn update_config(&self, url: &str, config: &LogConfig) -> Result<(), ApiError>;
}
