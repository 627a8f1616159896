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

//! Time ranges driving the query, and the point-in-time anchor of the table.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Time window of the query.
///
/// An open upper bound means the view follows the live edge; a set upper
/// bound pins the view to a historical snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub lower: Option<DateTime<Utc>>,
    pub upper: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Open-ended range following the live edge
    pub const fn live(lower: Option<DateTime<Utc>>) -> Self {
        Self { lower, upper: None }
    }

    /// Range pinned between two instants
    pub const fn pinned(lower: DateTime<Utc>, upper: DateTime<Utc>) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Whether this range follows the live edge (and may therefore be polled)
    pub const fn is_live(&self) -> bool {
        self.upper.is_none()
    }

    /// Build the pinned range a chart zoom selected.
    ///
    /// Returns `None` when either bound is not a representable instant.
    pub fn from_period(period: TimePeriod) -> Option<Self> {
        let start = Utc.timestamp_millis_opt(period.start.min(period.end)).single()?;
        let end = Utc.timestamp_millis_opt(period.start.max(period.end)).single()?;
        Some(Self::pinned(start, end))
    }
}

/// A span selected on the histogram, in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePeriod {
    pub start: i64,
    pub end: i64,
}

/// Point in time the table is anchored at ("Go to").
///
/// Rows newer than the anchor fill the forward page, older rows the backward page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum TableTime {
    /// A fixed instant
    Custom(DateTime<Utc>),
    /// Seconds before now; `0` is the live edge
    Relative(i64),
}

impl Default for TableTime {
    fn default() -> Self {
        Self::Relative(0)
    }
}

impl TableTime {
    /// Resolve the anchor against the current wall clock
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Self::Custom(at) => at,
            Self::Relative(seconds) => Duration::try_seconds(seconds)
                .and_then(|offset| now.checked_sub_signed(offset))
                .unwrap_or(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_upper_bound_is_live() {
        assert!(TimeRange::default().is_live());
        assert!(TimeRange::live(Some(Utc::now())).is_live());

        let lower = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let upper = Utc.with_ymd_and_hms(2026, 3, 1, 11, 0, 0).unwrap();
        assert!(!TimeRange::pinned(lower, upper).is_live());
    }

    #[test]
    fn test_zoom_period_pins_range() {
        let range = TimeRange::from_period(TimePeriod {
            start: 1_700_000_000_000,
            end: 1_700_000_060_000,
        })
        .unwrap();

        assert!(!range.is_live());
        assert_eq!(range.lower.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(range.upper.unwrap().timestamp(), 1_700_000_060);
    }

    #[test]
    fn test_zoom_period_reversed_drag() {
        let range = TimeRange::from_period(TimePeriod {
            start: 2_000,
            end: 1_000,
        })
        .unwrap();
        assert!(range.lower < range.upper);
    }

    #[test]
    fn test_table_time_resolution() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(TableTime::default().resolve(now), now);
        assert_eq!(
            TableTime::Relative(60).resolve(now),
            Utc.with_ymd_and_hms(2026, 3, 1, 11, 59, 0).unwrap()
        );

        let custom = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(TableTime::Custom(custom).resolve(now), custom);
    }
}
