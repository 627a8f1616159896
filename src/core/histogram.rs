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

//! Histogram data types and derived values.

use crate::config::SeverityLevelColor;
use serde::{Deserialize, Serialize};

/// One bar segment of the histogram: a count for one severity group in one time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramDatum {
    /// Bucket start in epoch milliseconds
    pub time: i64,
    pub value: f64,
    /// Severity group the count belongs to
    #[serde(default)]
    pub group: String,
}

impl HistogramDatum {
    pub fn new(time: i64, value: f64, group: impl Into<String>) -> Self {
        Self {
            time,
            value,
            group: group.into(),
        }
    }
}

/// Colour assignment of a histogram group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramColor {
    pub group: String,
    pub color: String,
}

/// Sum of all loaded bucket values.
///
/// Always recomputed; the histogram changes on every poll.
pub fn histogram_total(data: &[HistogramDatum]) -> f64 {
    profiling::scope!("histogram_total");
    data.iter().map(|datum| datum.value).sum()
}

/// Per-group totals, in order of first appearance
pub fn group_totals(data: &[HistogramDatum]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for datum in data {
        if let Some((_, total)) = totals.iter_mut().find(|(group, _)| *group == datum.group) {
            *total += datum.value;
        } else {
            totals.push((datum.group.clone(), datum.value));
        }
    }
    totals
}

/// Histogram colours derived from the severity level colours
pub fn histogram_colors(levels: &[SeverityLevelColor]) -> Vec<HistogramColor> {
    levels
        .iter()
        .map(|level| HistogramColor {
            group: level.level.clone(),
            color: level.color.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tracks_every_update() {
        let mut data = vec![
            HistogramDatum::new(0, 3.0, "err"),
            HistogramDatum::new(0, 4.0, "info"),
            HistogramDatum::new(1_000, 5.0, "info"),
        ];
        assert!((histogram_total(&data) - 12.0).abs() < f64::EPSILON);

        data[1].value = 10.0;
        assert!((histogram_total(&data) - 18.0).abs() < f64::EPSILON);

        data.clear();
        assert!(histogram_total(&data).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_totals_keep_first_seen_order() {
        let data = vec![
            HistogramDatum::new(0, 1.0, "warning"),
            HistogramDatum::new(0, 2.0, "err"),
            HistogramDatum::new(1, 3.0, "warning"),
        ];
        assert_eq!(
            group_totals(&data),
            vec![("warning".to_string(), 4.0), ("err".to_string(), 2.0)]
        );
    }

    #[test]
    fn test_colors_follow_severity_levels() {
        let levels = vec![
            SeverityLevelColor::new("emerg", "ruby"),
            SeverityLevelColor::new("info", "rainforest"),
        ];
        let colors = histogram_colors(&levels);
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].group, "emerg");
        assert_eq!(colors[1].color, "rainforest");
    }
}
