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

//! JSON-over-HTTP implementation of [`LogsApi`].

use super::{ApiError, LogsApi, LogsQuery, QueryResult};
use crate::config::LogConfig;
use crate::core::{Namespace, Source, TablePage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of the paging endpoints
#[derive(Serialize)]
struct PageRequest<'a> {
    query: &'a LogsQuery,
    cursor: DateTime<Utc>,
}

#[derive(Clone)]
pub struct HttpLogsApi {
    base_url: String,
    client: Client,
}

impl HttpLogsApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ApiError::Http {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(url: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send_checked(url, request).await?;
        response.json().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn send_checked(url: &str, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        tracing::trace!("Request {url}");
        let response = request.send().await.map_err(|source| ApiError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        Self::send(url, self.client.get(url)).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        Self::send(url, self.client.post(url).json(body)).await
    }
}

#[async_trait]
impl LogsApi for HttpLogsApi {
    async fn get_sources(&self) -> Result<Vec<Source>, ApiError> {
        self.get(&self.endpoint("sources")).await
    }

    async fn get_namespaces(&self, source_id: &str) -> Result<Vec<Namespace>, ApiError> {
        self.get(&self.endpoint(&format!("sources/{source_id}/namespaces")))
            .await
    }

    async fn execute_queries(&self, query: &LogsQuery) -> Result<QueryResult, ApiError> {
        self.post(&self.endpoint("logs/query"), query).await
    }

    async fn fetch_newer(
        &self,
        query: &LogsQuery,
        cursor: DateTime<Utc>,
    ) -> Result<TablePage, ApiError> {
        self.post(&self.endpoint("logs/newer"), &PageRequest { query, cursor })
            .await
    }

    async fn fetch_more(
        &self,
        query: &LogsQuery,
        cursor: DateTime<Utc>,
    ) -> Result<TablePage, ApiError> {
        self.post(&self.endpoint("logs/older"), &PageRequest { query, cursor })
            .await
    }

    async fn get_config(&self, url: &str) -> Result<LogConfig, ApiError> {
        self.get(url).await
    }

    async fn update_config(&self, url: &str, config: &LogConfig) -> Result<(), ApiError> {
        Self::send_checked(url, self.client.put(url).json(config)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            HttpLogsApi::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoints_join_cleanly() {
        let api = HttpLogsApi::new("http://localhost:8888/api/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:8888/api");
        assert_eq!(api.endpoint("logs/query"), "http://localhost:8888/api/logs/query");
        assert_eq!(api.endpoint("/sources"), "http://localhost:8888/api/sources");
    }
}
