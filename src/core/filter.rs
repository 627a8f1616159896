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

//! Tag filters applied to the log query.
//!
//! Each filter carries a unique id so the filter bar can remove or change it
//! in place. Regex operators have their pattern validated up front, so an
//! invalid pattern never reaches the backend.

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),
    #[error("filter expression '{0}' has no operator (expected one of ==, !=, =~, !~)")]
    MissingOperator(String),
    #[error("filter expression '{0}' has an empty key")]
    EmptyKey(String),
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },
    #[error("no filter with id {0}")]
    NotFound(Uuid),
}

/// Comparison applied between a tag and the filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "=~")]
    Matches,
    #[serde(rename = "!~")]
    NotMatches,
}

impl FilterOperator {
    const ALL: [Self; 4] = [Self::Equal, Self::NotEqual, Self::Matches, Self::NotMatches];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Matches => "=~",
            Self::NotMatches => "!~",
        }
    }

    pub const fn is_regex(self) -> bool {
        matches!(self, Self::Matches | Self::NotMatches)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operator| operator.as_str() == s)
            .ok_or_else(|| FilterError::UnknownOperator(s.to_string()))
    }
}

/// A single `key <operator> value` filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub operator: FilterOperator,
}

impl Filter {
    /// Create a filter with a fresh id
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        operator: FilterOperator,
    ) -> Result<Self, FilterError> {
        let value = value.into();
        validate_value(operator, &value)?;
        Ok(Self {
            id: Uuid::new_v4(),
            key: key.into(),
            value,
            operator,
        })
    }

    /// Equality filter created by clicking a tag in the table
    pub fn from_tag(key: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            value: tag.into(),
            operator: FilterOperator::Equal,
        }
    }

    /// Parse `key==value`, `key!=value`, `key=~pattern` or `key!~pattern`
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        let (position, operator) = FilterOperator::ALL
            .into_iter()
            .filter_map(|operator| {
                expression
                    .find(operator.as_str())
                    .map(|position| (position, operator))
            })
            .min_by_key(|(position, _)| *position)
            .ok_or_else(|| FilterError::MissingOperator(expression.to_string()))?;

        let key = expression[..position].trim();
        if key.is_empty() {
            return Err(FilterError::EmptyKey(expression.to_string()));
        }
        let value = expression[position + operator.as_str().len()..].trim();

        Self::new(key, value, operator)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, self.operator, self.value)
    }
}

/// Check that a value is usable with the given operator
pub fn validate_value(operator: FilterOperator, value: &str) -> Result<(), FilterError> {
    if operator.is_regex() {
        Regex::new(value).map_err(|source| FilterError::InvalidRegex {
            pattern: value.to_string(),
            source: Box::new(source),
        })?;
    }
    Ok(())
}

/// Ordered set of active filters, addressed by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn add(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Filter> {
        let index = self.filters.iter().position(|filter| filter.id == id)?;
        Some(self.filters.remove(index))
    }

    /// Change operator and value of an existing filter in place
    pub fn change(
        &mut self,
        id: Uuid,
        operator: FilterOperator,
        value: &str,
    ) -> Result<(), FilterError> {
        validate_value(operator, value)?;
        let filter = self
            .filters
            .iter_mut()
            .find(|filter| filter.id == id)
            .ok_or(FilterError::NotFound(id))?;
        filter.operator = operator;
        value.clone_into(&mut filter.value);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&Filter> {
        self.filters.iter().find(|filter| filter.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    pub fn as_slice(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expressions() {
        let filter = Filter::parse("host==web-1").unwrap();
        assert_eq!(filter.key, "host");
        assert_eq!(filter.value, "web-1");
        assert_eq!(filter.operator, FilterOperator::Equal);

        let filter = Filter::parse("appname != nginx").unwrap();
        assert_eq!(filter.key, "appname");
        assert_eq!(filter.value, "nginx");
        assert_eq!(filter.operator, FilterOperator::NotEqual);

        let filter = Filter::parse("message=~time(out|d out)").unwrap();
        assert_eq!(filter.operator, FilterOperator::Matches);
        assert_eq!(filter.value, "time(out|d out)");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Filter::parse("hostweb"),
            Err(FilterError::MissingOperator(_))
        ));
        assert!(matches!(Filter::parse("==web"), Err(FilterError::EmptyKey(_))));
        assert!(matches!(
            Filter::parse("message=~[unclosed"),
            Err(FilterError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_fresh_ids() {
        let a = Filter::from_tag("host", "web-1");
        let b = Filter::from_tag("host", "web-1");
        assert_ne!(a.id, b.id);
        assert_eq!(a.operator, FilterOperator::Equal);
    }

    #[test]
    fn test_filter_set_lifecycle() {
        let mut filters = FilterSet::default();
        let filter = Filter::from_tag("severity", "err");
        let id = filter.id;
        filters.add(filter);

        filters.change(id, FilterOperator::NotEqual, "info").unwrap();
        let changed = filters.get(id).unwrap();
        assert_eq!(changed.operator, FilterOperator::NotEqual);
        assert_eq!(changed.value, "info");

        assert!(filters.change(id, FilterOperator::Matches, "(").is_err());
        assert_eq!(filters.get(id).unwrap().value, "info");

        assert!(filters.remove(id).is_some());
        assert!(filters.is_empty());
        assert!(matches!(
            filters.change(id, FilterOperator::Equal, "x"),
            Err(FilterError::NotFound(_))
        ));
    }

    #[test]
    fn test_operator_wire_names() {
        let json = serde_json::to_string(&FilterOperator::NotMatches).unwrap();
        assert_eq!(json, "\"!~\"");
        assert_eq!("=~".parse::<FilterOperator>().unwrap(), FilterOperator::Matches);
        assert!("<>".parse::<FilterOperator>().is_err());
    }
}
