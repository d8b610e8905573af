//! Pagination request descriptor and the paged response envelope.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::types::TypeConstraintError;

/// Page size used when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size accepted before a request is sent.
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown sort direction `{other}`"
            ))),
        }
    }
}

/// One `(field, direction)` ordering key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parses the `field,direction` form used in query strings. The direction
    /// defaults to ascending.
    pub fn parse(raw: &str) -> Result<Self, TypeConstraintError> {
        let (field, direction) = match raw.split_once(',') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (raw, SortDirection::Asc),
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.field, self.direction.as_str())
    }
}

fn validate_sort_keys(sort: &[SortKey]) -> Result<(), ValidationError> {
    if sort.iter().any(|key| key.field.trim().is_empty()) {
        return Err(ValidationError::new("empty_sort_field"));
    }
    Ok(())
}

/// Page/size/sort descriptor sent alongside a query. Pages are 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Pagination {
    #[validate(range(min = 1))]
    pub page: u32,
    #[validate(range(min = 1, max = MAX_PAGE_SIZE))]
    pub size: u32,
    #[serde(default)]
    #[validate(custom(function = "validate_sort_keys"))]
    pub sort: Vec<SortKey>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct PageParams {
    page: u32,
    size: u32,
    sort: Vec<String>,
}

impl Pagination {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Encodes `page`, `size` and one `sort=field,direction` pair per key.
    pub fn query_string(&self) -> Result<String, serde_html_form::ser::Error> {
        serde_html_form::to_string(PageParams {
            page: self.page,
            size: self.size,
            sort: self.sort.iter().map(SortKey::to_string).collect(),
        })
    }
}

/// Paged response envelope returned by every search endpoint.
///
/// `total_pages` comes from the server and is authoritative; it is never
/// derived from `content.len()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageableResult<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> PageableResult<T> {
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
        }
    }

    pub fn has_next(&self, page: u32) -> bool {
        page < self.total_pages
    }

    pub fn has_previous(&self, page: u32) -> bool {
        page > 1
    }
}
