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

mod settings;

pub use settings::{Settings, DEFAULT_POLL_INTERVAL_SECS};

use crate::core::ColumnSpec;
use serde::{Deserialize, Serialize};

/// How severity levels are rendered in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeverityFormat {
    Dot,
    Text,
    #[default]
    DotText,
}

/// Colour assigned to a severity level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityLevelColor {
    pub level: String,
    pub color: String,
}

impl SeverityLevelColor {
    pub fn new(level: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            color: color.into(),
        }
    }
}

/// Display configuration of the log viewer, owned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    #[serde(default)]
    pub table_columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub severity_format: SeverityFormat,
    #[serde(default)]
    pub severity_level_colors: Vec<SeverityLevelColor>,
}

impl LogConfig {
    #[must_use]
    pub fn with_columns(mut self, table_columns: Vec<ColumnSpec>) -> Self {
        self.table_columns = table_columns;
        self
    }

    #[must_use]
    pub const fn with_severity_format(mut self, severity_format: SeverityFormat) -> Self {
        self.severity_format = severity_format;
        self
    }

    #[must_use]
    pub fn with_severity_levels(mut self, severity_level_colors: Vec<SeverityLevelColor>) -> Self {
        self.severity_level_colors = severity_level_colors;
        self
    }
}

/// A value saved optimistically: the last value the backend confirmed plus
/// an optional local value still waiting for its save round-trip.
///
/// Readers see the pending value while it exists. A failed save discards it,
/// so the view falls back to what the backend actually holds. Every save is
/// tagged with an increasing sequence number; acknowledgements that arrive
/// out of order never replace the result of a later save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pending<T> {
    confirmed: T,
    /// Save that produced `confirmed`, 0 for a plain load
    confirmed_seq: u64,
    pending: Option<(u64, T)>,
}

impl<T> Pending<T> {
    pub const fn new(confirmed: T) -> Self {
        Self {
            confirmed,
            confirmed_seq: 0,
            pending: None,
        }
    }

    /// The value to display
    pub fn current(&self) -> &T {
        self.pending
            .as_ref()
            .map_or(&self.confirmed, |(_, value)| value)
    }

    pub const fn confirmed(&self) -> &T {
        &self.confirmed
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a local change that is about to be saved as `seq`
    pub fn propose(&mut self, seq: u64, value: T) {
        self.pending = Some((seq, value));
    }

    /// The backend accepted save `seq`.
    ///
    /// Ignored if a later save was already confirmed. The pending slot is
    /// only cleared if nothing newer was proposed since.
    pub fn confirm(&mut self, seq: u64, value: T) {
        if seq < self.confirmed_seq {
            tracing::debug!("Ignoring confirmation of save {seq}, {} is newer", self.confirmed_seq);
            return;
        }

        if self.pending.as_ref().is_some_and(|(pending, _)| *pending <= seq) {
            self.pending = None;
        }
        self.confirmed = value;
        self.confirmed_seq = seq;
    }

    /// The backend rejected save `seq`; drop it unless something newer replaced it
    pub fn reject(&mut self, seq: u64) {
        if self.pending.as_ref().is_some_and(|(pending, _)| *pending == seq) {
            self.pending = None;
        }
    }

    /// Replace the confirmed value with a fresh load, discarding local changes
    pub fn reload(&mut self, value: T) {
        self.confirmed = value;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_format_wire_names() {
        assert_eq!(serde_json::to_string(&SeverityFormat::DotText).unwrap(), "\"dotText\"");
        assert_eq!(SeverityFormat::default(), SeverityFormat::DotText);
    }

    #[test]
    fn test_log_config_defaults_missing_fields() {
        let config: LogConfig = serde_json::from_str(
            r#"{"tableColumns":[{"internalName":"time","displayName":"Time"}]}"#,
        )
        .unwrap();
        assert_eq!(config.table_columns.len(), 1);
        assert!(config.table_columns[0].visible);
        assert_eq!(config.severity_format, SeverityFormat::DotText);
        assert!(config.severity_level_colors.is_empty());
    }

    #[test]
    fn test_pending_confirm() {
        let mut value = Pending::new(LogConfig::default());
        let changed = LogConfig::default().with_severity_format(SeverityFormat::Text);

        value.propose(1, changed.clone());
        assert!(value.is_pending());
        assert_eq!(value.current().severity_format, SeverityFormat::Text);
        assert_eq!(value.confirmed().severity_format, SeverityFormat::DotText);

        value.confirm(1, changed);
        assert!(!value.is_pending());
        assert_eq!(value.confirmed().severity_format, SeverityFormat::Text);
    }

    #[test]
    fn test_pending_reject_reverts() {
        let mut value = Pending::new(LogConfig::default());
        let changed = LogConfig::default().with_severity_format(SeverityFormat::Dot);

        value.propose(1, changed);
        value.reject(1);

        assert!(!value.is_pending());
        assert_eq!(value.current(), &LogConfig::default());
    }

    #[test]
    fn test_older_confirmation_keeps_newer_proposal() {
        let mut value = Pending::new(LogConfig::default());
        let first = LogConfig::default().with_severity_format(SeverityFormat::Dot);
        let second = LogConfig::default().with_severity_format(SeverityFormat::Text);

        value.propose(1, first.clone());
        value.propose(2, second.clone());
        value.confirm(1, first);

        assert!(value.is_pending());
        assert_eq!(value.current(), &second);

        // A failure of the older save leaves the newer one alone
        value.reject(1);
        assert!(value.is_pending());
    }

    #[test]
    fn test_confirmations_out_of_order() {
        let mut value = Pending::new(LogConfig::default());
        let first = LogConfig::default().with_severity_format(SeverityFormat::Dot);
        let second = LogConfig::default().with_severity_format(SeverityFormat::Text);

        value.propose(1, first.clone());
        value.propose(2, second.clone());
        value.confirm(2, second.clone());
        value.confirm(1, first);

        assert!(!value.is_pending());
        assert_eq!(value.confirmed(), &second);
        assert_eq!(value.current(), &second);
    }

    #[test]
    fn test_reload_discards_proposal() {
        let mut value = Pending::new(LogConfig::default());
        value.propose(1, LogConfig::default().with_severity_format(SeverityFormat::Dot));

        let loaded = LogConfig::default().with_severity_format(SeverityFormat::Text);
        value.reload(loaded.clone());

        assert!(!value.is_pending());
        assert_eq!(value.current(), &loaded);
    }
}
