//! Filter tree posted to the backend's advanced-search endpoints.
//!
//! A [`QueryDto`] is a declarative description of which records a list view
//! wants: `(field, operator, value)` triples combined by nestable AND/OR
//! groups. The backend owns the authoritative interpretation; [`QueryDto::matches`]
//! evaluates the same tree in-process against JSON records.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::types::TypeConstraintError;

/// Comparison applied by a single [`Filter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    /// SQL-style pattern match: `%` matches any run, `_` a single character.
    Lk,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Membership in a comma-separated list.
    In,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lk,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
    ];

    /// Wire representation of the operator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lk => "lk",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
        }
    }

    /// Human readable label shown in the filter builder.
    pub const fn label(self) -> &'static str {
        match self {
            Operator::Eq => "equals",
            Operator::Ne => "does not equal",
            Operator::Lk => "contains",
            Operator::Gt => "greater than",
            Operator::Gte => "greater or equal",
            Operator::Lt => "less than",
            Operator::Lte => "less or equal",
            Operator::In => "is one of",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s.trim())
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown operator `{s}`")))
    }
}

/// Scalar compared against a record field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl FilterValue {
    /// Numeric value, `None` for non-finite input.
    pub fn number(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Bool(value) => write!(f, "{value}"),
            FilterValue::Number(value) => write!(f, "{value}"),
            FilterValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(value.into())
    }
}

/// A single `(field, operator, value)` constraint.
///
/// `field` may be a comma-joined compound key (`"firstName,lastName"`); the
/// constraint holds when any of the listed fields satisfies it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Filter {
    #[validate(length(min = 1))]
    pub field: String,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    pub fn like(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Operator::Lk, value)
    }

    /// Individual field names of a possibly compound key.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.field
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
    }

    /// Evaluates this constraint against a JSON record.
    pub fn matches(&self, record: &Value) -> bool {
        let mut fields = self.fields().peekable();
        if fields.peek().is_none() {
            return false;
        }
        fields.any(|field| match lookup(record, field) {
            Some(Value::Array(items)) => items.iter().any(|item| self.matches_value(Some(item))),
            found => self.matches_value(found),
        })
    }

    fn matches_value(&self, found: Option<&Value>) -> bool {
        let Some(found) = found.filter(|value| !value.is_null()) else {
            return self.operator == Operator::Ne;
        };

        match self.operator {
            Operator::Eq => compare(found, &self.value) == Some(Ordering::Equal),
            Operator::Ne => compare(found, &self.value) != Some(Ordering::Equal),
            Operator::Gt => compare(found, &self.value) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                compare(found, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lt => compare(found, &self.value) == Some(Ordering::Less),
            Operator::Lte => matches!(
                compare(found, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Lk => scalar_text(found)
                .is_some_and(|text| like(&text, &self.value.to_string())),
            Operator::In => match &self.value {
                FilterValue::Text(list) => list
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .any(|item| {
                        compare(found, &FilterValue::Text(item.to_string()))
                            == Some(Ordering::Equal)
                    }),
                other => compare(found, other) == Some(Ordering::Equal),
            },
        }
    }
}

/// How the members of a [`FilterGroup`] are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// Recursive boolean combination of filters and subgroups.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    #[serde(default)]
    pub logical_operator: LogicalOperator,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<FilterGroup>,
}

impl FilterGroup {
    pub fn and(filters: Vec<Filter>) -> Self {
        Self {
            logical_operator: LogicalOperator::And,
            filters,
            groups: Vec::new(),
        }
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self {
            logical_operator: LogicalOperator::Or,
            filters,
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: FilterGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// A group without filters, or whose subgroups are all empty, contributes
    /// no constraint.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.groups.iter().all(FilterGroup::is_empty)
    }

    pub fn matches(&self, record: &Value) -> bool {
        let mut outcomes = self
            .filters
            .iter()
            .map(|filter| filter.matches(record))
            .chain(
                self.groups
                    .iter()
                    .filter(|group| !group.is_empty())
                    .map(|group| group.matches(record)),
            )
            .peekable();

        if outcomes.peek().is_none() {
            return true;
        }

        match self.logical_operator {
            LogicalOperator::And => outcomes.all(|outcome| outcome),
            LogicalOperator::Or => outcomes.any(|outcome| outcome),
        }
    }

    fn collect_errors(&self, path: &str, errors: &mut Vec<String>) {
        for (index, filter) in self.filters.iter().enumerate() {
            if let Err(err) = filter.validate() {
                errors.push(format!("{path}.filters[{index}]: {err}"));
            }
        }
        for (index, group) in self.groups.iter().enumerate() {
            group.collect_errors(&format!("{path}.groups[{index}]"), errors);
        }
    }
}

impl Validate for FilterGroup {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut messages = Vec::new();
        self.collect_errors("group", &mut messages);
        into_validation_result(messages)
    }
}

/// Top-level search payload.
///
/// A bare `filters` list is sugar for a single implicit AND group. Use
/// [`QueryDto::MATCH_ALL`] for the identity query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<FilterGroup>>,
}

impl QueryDto {
    /// Identity query, serialized as `{"filters":[]}`.
    pub const MATCH_ALL: QueryDto = QueryDto {
        filters: Some(Vec::new()),
        groups: None,
    };

    pub fn from_filters(filters: Vec<Filter>) -> Self {
        Self {
            filters: Some(filters),
            groups: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.get_or_insert_with(Vec::new).push(filter);
        self
    }

    pub fn with_group(mut self, group: FilterGroup) -> Self {
        self.groups.get_or_insert_with(Vec::new).push(group);
        self
    }

    /// Normalizes the payload into one implicit AND group.
    pub fn root_group(&self) -> FilterGroup {
        FilterGroup {
            logical_operator: LogicalOperator::And,
            filters: self.filters.clone().unwrap_or_default(),
            groups: self.groups.clone().unwrap_or_default(),
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.root_group().is_empty()
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.root_group().matches(record)
    }
}

impl Validate for QueryDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut messages = Vec::new();
        self.root_group().collect_errors("query", &mut messages);
        into_validation_result(messages)
    }
}

fn into_validation_result(messages: Vec<String>) -> Result<(), ValidationErrors> {
    if messages.is_empty() {
        return Ok(());
    }

    let mut errors = ValidationErrors::new();
    for message in messages {
        let mut error = ValidationError::new("invalid_filter");
        error.message = Some(message.into());
        errors.add("filters", error);
    }
    Err(errors)
}

/// Resolves a dotted path (`requestUser.email`) inside a JSON record.
fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, segment| current.get(segment))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn compare(found: &Value, expected: &FilterValue) -> Option<Ordering> {
    match (found, expected) {
        (Value::Number(left), FilterValue::Number(right)) => {
            left.as_f64()?.partial_cmp(&right.as_f64()?)
        }
        (Value::Number(left), FilterValue::Text(right)) => {
            left.as_f64()?.partial_cmp(&right.trim().parse::<f64>().ok()?)
        }
        (Value::String(left), FilterValue::Number(right)) => left
            .trim()
            .parse::<f64>()
            .ok()?
            .partial_cmp(&right.as_f64()?),
        (Value::String(left), FilterValue::Text(right)) => Some(left.as_str().cmp(right.as_str())),
        (Value::Bool(left), FilterValue::Bool(right)) => Some(left.cmp(right)),
        (Value::Bool(left), FilterValue::Text(right)) => {
            Some(left.cmp(&right.trim().parse::<bool>().ok()?))
        }
        (Value::String(left), FilterValue::Bool(right)) => {
            Some(left.trim().parse::<bool>().ok()?.cmp(right))
        }
        _ => None,
    }
}

/// Case-insensitive SQL `LIKE` matching.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '_' || c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}
