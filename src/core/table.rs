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

//! Table pages and the derived display buffer.
//!
//! The table is fed by two independently paginated pages: `forward` grows from
//! the live edge, `backward` grows towards history. The display buffer is
//! never stored; it is rebuilt from both pages and the column configuration.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the column carrying the row timestamp
pub const TIME_COLUMN: &str = "time";

/// Name of the column carrying the severity level
pub const SEVERITY_COLUMN: &str = "severity";

/// One row of cells, aligned with the page's columns
pub type Row = Vec<Value>;

/// Display settings of a single table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub internal_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

const fn default_visible() -> bool {
    true
}

impl ColumnSpec {
    pub fn new(internal_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            internal_name: internal_name.into(),
            display_name: display_name.into(),
            visible: true,
        }
    }

    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Header label (display name, falling back to the internal name)
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.internal_name
        } else {
            &self.display_name
        }
    }
}

/// A page of rows as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Row>,
}

impl TablePage {
    pub const fn new(columns: Vec<String>, values: Vec<Row>) -> Self {
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Timestamp of the given row, read from the `time` column
    pub fn time_at(&self, row: usize) -> Option<DateTime<Utc>> {
        let column = self.column_index(TIME_COLUMN)?;
        self.values.get(row)?.get(column).and_then(parse_time)
    }

    /// Timestamp of the first row (the newest one on a forward page)
    pub fn newest_time(&self) -> Option<DateTime<Utc>> {
        self.time_at(0)
    }

    /// Timestamp of the last row (the oldest one on a backward page)
    pub fn oldest_time(&self) -> Option<DateTime<Utc>> {
        self.time_at(self.values.len().checked_sub(1)?)
    }

    /// Re-shape this page onto `columns`.
    ///
    /// Cells are matched by column name. Columns missing from this page are
    /// filled with `null`, columns not listed in `columns` are dropped.
    pub fn coerce_to(&self, columns: &[String]) -> Self {
        if self.columns == columns {
            return self.clone();
        }

        let mapping: Vec<Option<usize>> = columns
            .iter()
            .map(|name| self.column_index(name))
            .collect();

        let values = self
            .values
            .iter()
            .map(|row| {
                mapping
                    .iter()
                    .map(|source| {
                        source
                            .and_then(|index| row.get(index))
                            .cloned()
                            .unwrap_or(Value::Null)
                    })
                    .collect()
            })
            .collect();

        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    /// Insert newer rows in front of the existing ones
    pub fn prepend(&mut self, newer: &Self) {
        if self.columns.is_empty() {
            self.columns.clone_from(&newer.columns);
        }
        let mut values = newer.coerce_to(&self.columns).values;
        values.append(&mut self.values);
        self.values = values;
    }

    /// Append older rows after the existing ones
    pub fn append(&mut self, older: &Self) {
        if self.columns.is_empty() {
            self.columns.clone_from(&older.columns);
        }
        let older = older.coerce_to(&self.columns);
        self.values.extend(older.values);
    }
}

/// Parse a timestamp cell: RFC 3339 strings or epoch milliseconds
pub fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Apply the column configuration to a single page
pub fn apply_columns(page: &TablePage, table_columns: &[ColumnSpec]) -> TablePage {
    if table_columns.is_empty() {
        return page.clone();
    }

    let visible: Vec<String> = table_columns
        .iter()
        .filter(|column| column.visible)
        .map(|column| column.internal_name.clone())
        .collect();

    page.coerce_to(&visible)
}

/// Build the display buffer: forward rows followed by backward rows.
///
/// Both pages are coerced onto one column set before concatenation. Without a
/// column configuration the forward page's columns win.
pub fn display_buffer(
    forward: &TablePage,
    backward: &TablePage,
    table_columns: &[ColumnSpec],
) -> TablePage {
    profiling::scope!("display_buffer");

    let forward = apply_columns(forward, table_columns);
    let backward = apply_columns(backward, table_columns);

    let columns = if forward.columns.is_empty() {
        backward.columns.clone()
    } else {
        forward.columns.clone()
    };
    let backward = backward.coerce_to(&columns);

    let mut values = forward.values;
    values.extend(backward.values);

    TablePage { columns, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(columns: &[&str], values: Vec<Row>) -> TablePage {
        TablePage::new(columns.iter().map(|c| (*c).to_string()).collect(), values)
    }

    #[test]
    fn test_concatenation_preserves_order() {
        let forward = page(&["time", "message"], vec![vec![json!(4), json!("f0")], vec![json!(3), json!("f1")]]);
        let backward = page(&["time", "message"], vec![vec![json!(2), json!("b0")], vec![json!(1), json!("b1")]]);

        let buffer = display_buffer(&forward, &backward, &[]);

        let messages: Vec<_> = buffer.values.iter().map(|row| row[1].clone()).collect();
        assert_eq!(messages, vec![json!("f0"), json!("f1"), json!("b0"), json!("b1")]);
        assert_eq!(buffer.columns, vec!["time", "message"]);
    }

    #[test]
    fn test_columns_follow_configuration() {
        let forward = page(
            &["time", "host", "message"],
            vec![vec![json!(1), json!("web-1"), json!("hello")]],
        );
        let columns = vec![
            ColumnSpec::new("message", "Message"),
            ColumnSpec::new("host", "Host").hidden(),
            ColumnSpec::new("time", "Time"),
        ];

        let buffer = display_buffer(&forward, &TablePage::default(), &columns);

        assert_eq!(buffer.columns, vec!["message", "time"]);
        assert_eq!(buffer.values, vec![vec![json!("hello"), json!(1)]]);
    }

    #[test]
    fn test_mismatched_backward_columns_are_coerced() {
        let forward = page(&["time", "message"], vec![vec![json!(2), json!("new")]]);
        let backward = page(&["message", "facility"], vec![vec![json!("old"), json!("kern")]]);

        let buffer = display_buffer(&forward, &backward, &[]);

        assert_eq!(buffer.columns, vec!["time", "message"]);
        assert_eq!(buffer.values[1], vec![Value::Null, json!("old")]);
    }

    #[test]
    fn test_configured_column_missing_from_page_is_blank() {
        let forward = page(&["time"], vec![vec![json!(1)]]);
        let columns = vec![ColumnSpec::new("time", ""), ColumnSpec::new("severity", "Level")];

        let buffer = display_buffer(&forward, &TablePage::default(), &columns);

        assert_eq!(buffer.values, vec![vec![json!(1), Value::Null]]);
    }

    #[test]
    fn test_cursor_times() {
        let forward = page(
            &["time", "message"],
            vec![
                vec![json!("2026-03-01T12:00:02Z"), json!("b")],
                vec![json!(1_772_366_401_000_i64), json!("a")],
            ],
        );

        assert_eq!(
            forward.newest_time().unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 2).unwrap()
        );
        assert_eq!(forward.oldest_time().unwrap().timestamp(), 1_772_366_401);
        assert_eq!(TablePage::default().oldest_time(), None);
    }

    #[test]
    fn test_prepend_and_append() {
        let mut forward = page(&["time", "message"], vec![vec![json!(2), json!("old")]]);
        forward.prepend(&page(&["time", "message"], vec![vec![json!(3), json!("new")]]));
        assert_eq!(forward.values[0][1], json!("new"));

        let mut backward = TablePage::default();
        backward.append(&page(&["time", "message"], vec![vec![json!(1), json!("older")]]));
        assert_eq!(backward.columns, vec!["time", "message"]);
        assert_eq!(backward.len(), 1);
    }

    #[test]
    fn test_column_label_fallback() {
        assert_eq!(ColumnSpec::new("procid", "").label(), "procid");
        assert_eq!(ColumnSpec::new("procid", "Proc ID").label(), "Proc ID");
    }
}
