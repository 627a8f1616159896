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

use crate::config::{LogConfig, SeverityFormat};
use crate::core::table::{self, TablePage, SEVERITY_COLUMN, TIME_COLUMN};
use serde_json::Value;
use std::fmt::Write;

const SEVERITY_DOT: &str = "●";
const COLUMN_GAP: &str = "  ";

/// Render a severity level according to the configured format
pub fn severity_cell(level: &str, format: SeverityFormat) -> String {
    match format {
        SeverityFormat::Dot => SEVERITY_DOT.to_string(),
        SeverityFormat::Text => level.to_string(),
        SeverityFormat::DotText => format!("{SEVERITY_DOT} {level}"),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string()
        }
    }
}

/// Plain-text table of the display buffer
pub struct LogTable;

impl LogTable {
    /// Header plus at most `limit` rows, columns padded to their widest cell
    pub fn render(page: &TablePage, config: &LogConfig, limit: usize) -> String {
        profiling::scope!("LogTable::render");

        let headers: Vec<String> = page
            .columns
            .iter()
            .map(|name| {
                config
                    .table_columns
                    .iter()
                    .find(|column| column.internal_name == *name)
                    .map_or_else(|| name.clone(), |column| column.label().to_string())
            })
            .collect();

        let rows: Vec<Vec<String>> = page
            .values
            .iter()
            .take(limit)
            .map(|row| {
                page.columns
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let value = row.get(i).unwrap_or(&Value::Null);
                        Self::render_cell(name, value, config.severity_format)
                    })
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        Self::render_line(&mut out, &headers, &widths);
        for row in &rows {
            Self::render_line(&mut out, row, &widths);
        }
        out
    }

    fn render_cell(column: &str, value: &Value, format: SeverityFormat) -> String {
        if value.is_null() {
            return String::new();
        }

        match column {
            TIME_COLUMN => table::parse_time(value).map_or_else(
                || format_value(value),
                |at| at.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            ),
            SEVERITY_COLUMN => severity_cell(&format_value(value), format),
            _ => format_value(value),
        }
    }

    fn render_line(out: &mut String, cells: &[String], widths: &[usize]) {
        let mut line = String::new();
        for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
            if i > 0 {
                line.push_str(COLUMN_GAP);
            }
            let _ = write!(line, "{cell:<width$}");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ColumnSpec;
    use serde_json::json;

    fn page() -> TablePage {
        TablePage::new(
            vec!["time".to_string(), "severity".to_string(), "message".to_string()],
            vec![
                vec![json!(0), json!("err"), json!("disk full")],
                vec![json!("2026-03-01T12:00:00Z"), Value::Null, json!("ok")],
            ],
        )
    }

    #[test]
    fn test_severity_formats() {
        assert_eq!(severity_cell("info", SeverityFormat::Dot), "●");
        assert_eq!(severity_cell("info", SeverityFormat::Text), "info");
        assert_eq!(severity_cell("info", SeverityFormat::DotText), "● info");
    }

    #[test]
    fn test_render_uses_display_names() {
        let config = LogConfig::default().with_columns(vec![
            ColumnSpec::new("time", "Time"),
            ColumnSpec::new("message", "Message"),
        ]);
        let rendered = LogTable::render(&page(), &config, 10);
        let header = rendered.lines().next().unwrap();
        assert!(header.starts_with("Time"));
        assert!(header.contains("severity"));
        assert!(header.ends_with("Message"));
    }

    #[test]
    fn test_render_formats_cells() {
        let config = LogConfig::default();
        let rendered = LogTable::render(&page(), &config, 10);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1970-01-01 00:00:00.000"));
        assert!(lines[1].contains("● err"));
        // Null severity renders empty but keeps the column aligned
        assert!(lines[2].starts_with("2026-03-01 12:00:00.000"));
        let column_of = |line: &str, text: &str| line.split(text).next().unwrap().chars().count();
        assert_eq!(column_of(lines[1], "disk full"), column_of(lines[2], "ok"));
    }

    #[test]
    fn test_render_respects_limit() {
        let rendered = LogTable::render(&page(), &LogConfig::default(), 1);
        assert_eq!(rendered.lines().count(), 2);
    }
}
