//! Shared implementation of every searchable list page.

use serde::de::DeserializeOwned;

use crate::client::{ApiClient, ClientSession, ErrorSink, SecurityMode};
use crate::domain::pageable::{SortDirection, SortKey};
use crate::dto::ListPageData;
use crate::forms::list::ListQueryForm;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::Paginated;
use crate::services::{ServiceError, ServiceResult};

/// Backend search endpoint together with its list-page conventions.
#[derive(Clone, Copy, Debug)]
pub struct SearchTarget {
    /// Search endpoint, e.g. `/api/users/search`.
    pub path: &'static str,
    /// Field (possibly compound) the search box matches with `lk`.
    pub search_field: &'static str,
    /// Fields the user may sort by.
    pub sortable: &'static [&'static str],
    pub default_sort_field: &'static str,
    pub default_sort_direction: SortDirection,
    /// Authority required to open the list.
    pub authority: &'static str,
}

impl SearchTarget {
    pub fn default_sort(&self) -> SortKey {
        SortKey {
            field: self.default_sort_field.to_string(),
            direction: self.default_sort_direction,
        }
    }
}

/// Loads one page of `target` for the list view.
pub async fn load_list_page<T>(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    target: &SearchTarget,
    form: ListQueryForm,
) -> ServiceResult<ListPageData<T>>
where
    T: DeserializeOwned,
{
    if !user.has_authority(target.authority) {
        return Err(ServiceError::Unauthorized);
    }

    let search = form.into_search(target.search_field, target.sortable, target.default_sort())?;

    let result = api
        .search::<T>(
            target.path,
            Some(&search.query),
            Some(&search.pagination),
            SecurityMode::ClientSession(session),
            Some(sink),
        )
        .await
        .map_err(|err| {
            log::error!("Failed to search {}: {err}", target.path);
            err
        })?;

    Ok(ListPageData::new(
        Paginated::from_result(result, search.pagination.page),
        search.search_term.map(|term| term.into_inner()),
        &search.sort,
        target.sortable,
        &target.default_sort(),
    ))
}
