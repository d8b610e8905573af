//! Interactive construction of `Filter` lists for the "my tickets" search.
//!
//! Every field has a type and every type a fixed set of operators. Changing a
//! row's field resets its operator to the first one allowed for the new type
//! and its value to the type's default, so a row can never keep an operator
//! its field does not support.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::query::{Filter, FilterValue, Operator};

/// Kind of value a filterable field holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Select,
}

impl FieldType {
    /// Operators offered for this type; the first one is the default.
    pub const fn operators(self) -> &'static [Operator] {
        match self {
            FieldType::Text => &[Operator::Lk, Operator::Eq, Operator::Ne],
            FieldType::Number | FieldType::Date => &[
                Operator::Eq,
                Operator::Ne,
                Operator::Gt,
                Operator::Gte,
                Operator::Lt,
                Operator::Lte,
            ],
            FieldType::Boolean => &[Operator::Eq],
            FieldType::Select => &[Operator::Eq, Operator::Ne, Operator::In],
        }
    }

    pub const fn default_operator(self) -> Operator {
        match self {
            FieldType::Text => Operator::Lk,
            FieldType::Number | FieldType::Date | FieldType::Boolean | FieldType::Select => {
                Operator::Eq
            }
        }
    }

    pub fn default_value(self) -> String {
        match self {
            FieldType::Boolean => "false".to_string(),
            _ => String::new(),
        }
    }

    pub fn allows(self, operator: Operator) -> bool {
        self.operators().contains(&operator)
    }

    const fn expected(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date (YYYY-MM-DD)",
            FieldType::Boolean => "yes/no value",
            FieldType::Select => "option",
        }
    }
}

/// One entry of the field table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    /// Allowed values for [`FieldType::Select`] fields.
    pub options: &'static [&'static str],
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label,
            field_type,
            options: &[],
        }
    }

    pub const fn select(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Select,
            options,
        }
    }
}

/// Field name → type table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldCatalog {
    fields: Vec<FieldSpec>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Fields searchable from the "my tickets" view.
    pub fn my_tickets() -> Self {
        Self::new(vec![
            FieldSpec::new("requestTitle", "Title", FieldType::Text),
            FieldSpec::new("requestDescription", "Description", FieldType::Text),
            FieldSpec::new("id", "Ticket #", FieldType::Number),
            FieldSpec::select(
                "priority",
                "Priority",
                &["Critical", "High", "Medium", "Low", "Trivial"],
            ),
            FieldSpec::new("currentStateName", "State", FieldType::Text),
            FieldSpec::new("teamName", "Team", FieldType::Text),
            FieldSpec::new("assignUserEmail", "Assignee", FieldType::Text),
            FieldSpec::new("createdAt", "Created", FieldType::Date),
            FieldSpec::new("isCompleted", "Completed", FieldType::Boolean),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

/// Draft row as edited by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterRow {
    pub field: String,
    pub operator: Option<Operator>,
    pub value: String,
}

/// Reasons a builder cannot be turned into filters. Rows are numbered from 1.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterBuildError {
    #[error("Filter #{row}: choose a field, an operator and a value.")]
    Incomplete { row: usize },
    #[error("Filter #{row}: unknown field `{field}`.")]
    UnknownField { row: usize, field: String },
    #[error("Filter #{row}: `{operator}` is not available for this field.")]
    IncompatibleOperator { row: usize, operator: Operator },
    #[error("Filter #{row}: `{value}` is not a valid {expected}.")]
    InvalidValue {
        row: usize,
        value: String,
        expected: &'static str,
    },
    #[error("Filter #{row} does not exist.")]
    NoSuchRow { row: usize },
}

#[derive(Clone, Debug)]
pub struct DynamicFilterBuilder {
    catalog: FieldCatalog,
    rows: Vec<FilterRow>,
}

impl DynamicFilterBuilder {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self {
            catalog,
            rows: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn rows(&self) -> &[FilterRow] {
        &self.rows
    }

    /// Appends an empty row and returns its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(FilterRow::default());
        self.rows.len() - 1
    }

    pub fn remove_row(&mut self, index: usize) -> Option<FilterRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut FilterRow, FilterBuildError> {
        self.rows
            .get_mut(index)
            .ok_or(FilterBuildError::NoSuchRow { row: index + 1 })
    }

    /// Selects a field, resetting operator and value for its type. An unknown
    /// field clears the operator so no stale choice survives.
    pub fn set_field(&mut self, index: usize, field: &str) -> Result<(), FilterBuildError> {
        let spec = self.catalog.get(field.trim()).cloned();
        let row = self.row_mut(index)?;
        row.field = field.trim().to_string();

        match spec {
            Some(spec) => {
                row.operator = Some(spec.field_type.default_operator());
                row.value = spec.field_type.default_value();
                Ok(())
            }
            None => {
                row.operator = None;
                row.value = String::new();
                if row.field.is_empty() {
                    Ok(())
                } else {
                    Err(FilterBuildError::UnknownField {
                        row: index + 1,
                        field: row.field.clone(),
                    })
                }
            }
        }
    }

    /// Chooses an operator; operators outside the field type's set are refused.
    pub fn set_operator(&mut self, index: usize, operator: Operator) -> Result<(), FilterBuildError> {
        let field_type = self
            .rows
            .get(index)
            .and_then(|row| self.catalog.get(&row.field))
            .map(|spec| spec.field_type);
        let row = self.row_mut(index)?;

        match field_type {
            Some(field_type) if field_type.allows(operator) => {
                row.operator = Some(operator);
                Ok(())
            }
            _ => Err(FilterBuildError::IncompatibleOperator {
                row: index + 1,
                operator,
            }),
        }
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> Result<(), FilterBuildError> {
        self.row_mut(index)?.value = value.into();
        Ok(())
    }

    /// Converts every row into a [`Filter`]. Any row missing its field,
    /// operator or value rejects the whole build.
    pub fn build(&self) -> Result<Vec<Filter>, FilterBuildError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.build_row(index + 1, row))
            .collect()
    }

    fn build_row(&self, row_number: usize, row: &FilterRow) -> Result<Filter, FilterBuildError> {
        let field = row.field.trim();
        let value = row.value.trim();
        let operator = match row.operator {
            Some(operator) if !field.is_empty() && !value.is_empty() => operator,
            _ => return Err(FilterBuildError::Incomplete { row: row_number }),
        };

        let spec = self
            .catalog
            .get(field)
            .ok_or_else(|| FilterBuildError::UnknownField {
                row: row_number,
                field: field.to_string(),
            })?;

        if !spec.field_type.allows(operator) {
            return Err(FilterBuildError::IncompatibleOperator {
                row: row_number,
                operator,
            });
        }

        let invalid = || FilterBuildError::InvalidValue {
            row: row_number,
            value: value.to_string(),
            expected: spec.field_type.expected(),
        };

        let value = match spec.field_type {
            FieldType::Text if operator == Operator::Lk && !value.contains('%') => {
                FilterValue::Text(format!("%{value}%"))
            }
            FieldType::Text => FilterValue::Text(value.to_string()),
            FieldType::Number => match value.parse::<i64>() {
                Ok(number) => FilterValue::from(number),
                Err(_) => value
                    .parse::<f64>()
                    .ok()
                    .and_then(FilterValue::number)
                    .ok_or_else(invalid)?,
            },
            FieldType::Date => {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
                FilterValue::Text(value.to_string())
            }
            FieldType::Boolean => FilterValue::Bool(value.parse::<bool>().map_err(|_| invalid())?),
            FieldType::Select => {
                let known = |item: &str| spec.options.is_empty() || spec.options.contains(&item);
                let all_known = if operator == Operator::In {
                    value.split(',').map(str::trim).all(known)
                } else {
                    known(value)
                };
                if !all_known {
                    return Err(invalid());
                }
                FilterValue::Text(value.to_string())
            }
        };

        Ok(Filter::new(field, operator, value))
    }

    /// Encodes the rows as the builder's query string, for pagination links.
    pub fn query_string(&self) -> Result<String, serde_html_form::ser::Error> {
        serde_html_form::to_string(FilterRowsParams {
            field: self.rows.iter().map(|row| row.field.clone()).collect(),
            operator: self
                .rows
                .iter()
                .map(|row| row.operator.map(Operator::as_str).unwrap_or_default().to_string())
                .collect(),
            value: self.rows.iter().map(|row| row.value.clone()).collect(),
        })
    }
}

#[derive(Serialize)]
struct FilterRowsParams {
    field: Vec<String>,
    operator: Vec<String>,
    value: Vec<String>,
}

/// HTML form binding: parallel `field`, `operator` and `value` lists.
///
/// `changed` carries the index of the row whose field select was just
/// changed; that row is reset instead of searching.
#[derive(Debug, Default, Deserialize)]
pub struct FilterBuilderForm {
    #[serde(default)]
    pub field: Vec<String>,
    #[serde(default)]
    pub operator: Vec<String>,
    #[serde(default)]
    pub value: Vec<String>,
    pub changed: Option<usize>,
    /// Set when the user asked for an extra empty row.
    #[serde(default)]
    pub add: Option<String>,
    pub page: Option<u32>,
}

impl FilterBuilderForm {
    pub fn into_builder(self, catalog: FieldCatalog) -> DynamicFilterBuilder {
        let rows = self.field.len().max(self.operator.len()).max(self.value.len());
        let mut builder = DynamicFilterBuilder::new(catalog);

        for index in 0..rows {
            builder.rows.push(FilterRow {
                field: self.field.get(index).map(|s| s.trim().to_string()).unwrap_or_default(),
                operator: self
                    .operator
                    .get(index)
                    .and_then(|op| op.parse::<Operator>().ok()),
                value: self.value.get(index).cloned().unwrap_or_default(),
            });
        }

        if let Some(index) = self.changed {
            if let Some(field) = builder.rows.get(index).map(|row| row.field.clone()) {
                // Unknown fields are reported again by `build`.
                let _ = builder.set_field(index, &field);
            }
        }

        if self.add.is_some() {
            builder.add_row();
        }

        builder
    }

    /// True when the submission only edits the builder and must not search.
    pub fn is_edit_only(&self) -> bool {
        self.changed.is_some() || self.add.is_some()
    }
}
