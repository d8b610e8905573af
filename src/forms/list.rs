//! Query parameters shared by every list view (`q`, `sort`, `page`).

use serde::Deserialize;

use crate::domain::pageable::{DEFAULT_PAGE_SIZE, Pagination, SortKey};
use crate::domain::query::{Filter, QueryDto};
use crate::domain::types::SearchTerm;
use crate::forms::FormError;

#[derive(Debug, Default, Deserialize)]
pub struct ListQueryForm {
    /// Free-text search entered in the list's search box.
    pub q: Option<String>,
    /// Sort order as `field,direction`.
    pub sort: Option<String>,
    pub page: Option<u32>,
}

/// Search request derived from a [`ListQueryForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListSearch {
    pub query: QueryDto,
    pub pagination: Pagination,
    pub search_term: Option<SearchTerm>,
    pub sort: SortKey,
}

impl ListQueryForm {
    /// Turns the list parameters into a search. The free text becomes a `lk`
    /// filter on `search_field`, which may be a compound key such as
    /// `"firstName,lastName,email"`.
    pub fn into_search(
        self,
        search_field: &str,
        sortable: &[&str],
        default_sort: SortKey,
    ) -> Result<ListSearch, FormError> {
        let page = match self.page {
            Some(0) => return Err(FormError::InvalidPage),
            Some(page) => page,
            None => 1,
        };

        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let key = SortKey::parse(raw).map_err(|_| FormError::InvalidSort)?;
                if !sortable.contains(&key.field.as_str()) {
                    return Err(FormError::InvalidSort);
                }
                key
            }
            None => default_sort,
        };

        let search_term = self.q.and_then(|q| SearchTerm::new(q).ok());

        let query = match &search_term {
            Some(term) => QueryDto::MATCH_ALL.with_filter(Filter::like(search_field, format!("%{term}%"))),
            None => QueryDto::MATCH_ALL,
        };

        Ok(ListSearch {
            query,
            pagination: Pagination::new(page, DEFAULT_PAGE_SIZE).sorted_by(sort.clone()),
            search_term,
            sort,
        })
    }
}
