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

use serde::{Deserialize, Serialize};
use std::fmt;

/// Retention policy assumed when a namespace is given without one
pub const DEFAULT_RETENTION_POLICY: &str = "autogen";

/// A data source known to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Database and retention policy holding the logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub database: String,
    pub retention_policy: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, retention_policy: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            retention_policy: retention_policy.into(),
        }
    }

    /// Parse `database` or `database.retention_policy`
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((database, rp)) if !rp.is_empty() => Self::new(database, rp),
            Some((database, _)) => Self::new(database, DEFAULT_RETENTION_POLICY),
            None => Self::new(text, DEFAULT_RETENTION_POLICY),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.retention_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_parse() {
        assert_eq!(Namespace::parse("syslog"), Namespace::new("syslog", "autogen"));
        assert_eq!(Namespace::parse("syslog.weekly"), Namespace::new("syslog", "weekly"));
        assert_eq!(Namespace::parse("syslog."), Namespace::new("syslog", "autogen"));
        assert_eq!(Namespace::parse("syslog.weekly").to_string(), "syslog.weekly");
    }
}
