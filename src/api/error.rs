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

use reqwest::StatusCode;

/// Failure of a call to the log-viewer backend
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid url '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether retrying the same call later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => status.is_server_error(),
            Self::Decode { .. } | Self::InvalidUrl(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors() {
        let unavailable = ApiError::Status {
            url: "http://host/api/logs/query".to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        };
        assert!(unavailable.is_transient());
        assert_eq!(
            unavailable.to_string(),
            "http://host/api/logs/query responded with 503 Service Unavailable"
        );

        let missing = ApiError::Status {
            url: "http://host/api/sources".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(!missing.is_transient());
    }
}
