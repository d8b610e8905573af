//! Data handed from services to templates.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::pageable::{SortDirection, SortKey};
use crate::domain::ticket::Ticket;
use crate::domain::workflow::{AvailableTransition, Workflow};
use crate::domain::query::Operator;
use crate::forms::filter_builder::{FieldCatalog, FieldSpec, FieldType, FilterRow};
use crate::pagination::Paginated;

/// Data required to render any searchable list page.
#[derive(Debug, Serialize)]
pub struct ListPageData<T> {
    pub items: Paginated<T>,
    /// Search text echoed back into the search box.
    pub search_query: Option<String>,
    /// Active sort, rendered as `field,direction`.
    pub sort: String,
    /// Column header links per sortable field. Each keeps the search text and
    /// flips the direction of the active column.
    pub sort_links: BTreeMap<String, String>,
}

impl<T> ListPageData<T> {
    pub fn new(
        items: Paginated<T>,
        search_query: Option<String>,
        sort: &SortKey,
        sortable: &[&str],
        default_sort: &SortKey,
    ) -> Self {
        let sort_links = sortable
            .iter()
            .map(|&field| {
                let direction = if field == sort.field {
                    sort.direction.reversed()
                } else if field == default_sort.field {
                    default_sort.direction
                } else {
                    SortDirection::Asc
                };
                let key = SortKey {
                    field: field.to_string(),
                    direction,
                };
                let query = list_link_query(search_query.as_deref(), &key.to_string());
                (field.to_string(), format!("?{query}"))
            })
            .collect();

        Self {
            items,
            search_query,
            sort: sort.to_string(),
            sort_links,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Paginated::empty(),
            search_query: None,
            sort: String::new(),
            sort_links: BTreeMap::new(),
        }
    }
}

#[derive(Serialize)]
struct ListLinkParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<&'a str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    sort: &'a str,
}

/// Encodes the search text and sort order of a list link, without `page`.
pub fn list_link_query(search_query: Option<&str>, sort: &str) -> String {
    let params = ListLinkParams {
        q: search_query,
        sort,
    };
    serde_html_form::to_string(params).unwrap_or_else(|err| {
        log::warn!("Failed to encode list parameters: {err}");
        String::new()
    })
}

/// "My tickets" page: results plus the filter builder state.
#[derive(Debug, Serialize)]
pub struct MyTicketsPageData {
    pub tickets: Paginated<Ticket>,
    pub rows: Vec<FilterRowView>,
    pub fields: Vec<FieldView>,
    /// Why the builder could not be turned into a query.
    pub build_error: Option<String>,
    /// Builder rows encoded for pagination links.
    pub filter_query: String,
    /// False when the submission only edited the builder.
    pub searched: bool,
}

/// Operator choice rendered in a filter row.
#[derive(Debug, Serialize)]
pub struct OperatorView {
    pub value: &'static str,
    pub label: &'static str,
}

/// Field choice rendered in a filter row, with the operators its type allows.
#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub operators: Vec<OperatorView>,
    pub options: &'static [&'static str],
}

impl From<&FieldSpec> for FieldView {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name,
            label: spec.label,
            field_type: spec.field_type,
            operators: spec
                .field_type
                .operators()
                .iter()
                .map(|operator: &Operator| OperatorView {
                    value: operator.as_str(),
                    label: operator.label(),
                })
                .collect(),
            options: spec.options,
        }
    }
}

/// A builder row together with the choices its current field allows.
#[derive(Debug, Serialize)]
pub struct FilterRowView {
    pub field: String,
    pub operator: Option<&'static str>,
    pub value: String,
    /// `None` until a known field is chosen.
    pub field_type: Option<FieldType>,
    pub operators: Vec<OperatorView>,
    pub options: &'static [&'static str],
}

impl FilterRowView {
    pub fn new(row: &FilterRow, catalog: &FieldCatalog) -> Self {
        let field = catalog.get(&row.field).map(FieldView::from);
        Self {
            field: row.field.clone(),
            operator: row.operator.map(Operator::as_str),
            value: row.value.clone(),
            field_type: field.as_ref().map(|field| field.field_type),
            options: field.as_ref().map(|field| field.options).unwrap_or_default(),
            operators: field.map(|field| field.operators).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketPageData {
    pub ticket: Ticket,
    pub workflow: Option<Workflow>,
    pub transitions: Vec<AvailableTransition>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowPageData {
    pub workflow: Workflow,
}
