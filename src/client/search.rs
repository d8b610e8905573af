//! Composes paged POST searches against the backend.

use reqwest::Method;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::client::{
    ApiClient, ApiError, ErrorSink, FetchOptions, RequestBody, SecurityMode, report,
};
use crate::domain::pageable::{PageableResult, Pagination};
use crate::domain::query::QueryDto;

/// A fully composed search call: the URL carries pagination, the body the query.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub url: String,
    pub body: QueryDto,
}

/// Builds `{base_url}{path}?page=..&size=..[&sort=..]` and the JSON body.
///
/// A missing query matches everything; a missing pagination is the first page
/// of [`crate::domain::pageable::DEFAULT_PAGE_SIZE`] records. Both are validated
/// before anything leaves the process.
pub fn compose_search(
    base_url: &str,
    path: &str,
    query: Option<&QueryDto>,
    pagination: Option<&Pagination>,
) -> Result<SearchRequest, ApiError> {
    let body = query.cloned().unwrap_or(QueryDto::MATCH_ALL);
    let pagination = pagination.cloned().unwrap_or_default();

    body.validate()?;
    pagination.validate()?;

    let params = pagination
        .query_string()
        .map_err(|err| ApiError::Validation(err.to_string()))?;

    let base = base_url.trim_end_matches('/');
    let separator = if path.contains('?') { '&' } else { '?' };
    let url = if path.starts_with('/') || path.is_empty() {
        format!("{base}{path}{separator}{params}")
    } else {
        format!("{base}/{path}{separator}{params}")
    };

    Ok(SearchRequest { url, body })
}

impl ApiClient {
    /// POSTs a query to a search endpoint and returns one page of results.
    ///
    /// Validation failures are reported to the sink and no request is sent.
    pub async fn search<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&QueryDto>,
        pagination: Option<&Pagination>,
        security: SecurityMode<'_>,
        sink: Option<&dyn ErrorSink>,
    ) -> Result<PageableResult<T>, ApiError> {
        let request = match compose_search(self.base_url(), path, query, pagination) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("Rejected search on {path}: {err}");
                return Err(report(sink, err));
            }
        };

        let body = RequestBody::json(&request.body).map_err(|err| {
            log::error!("Failed to encode search body for {path}: {err}");
            report(sink, err)
        })?;
        let mut options = FetchOptions::new(Method::POST, security).body(body);
        options.sink = sink;

        let page = self
            .fetch_url::<PageableResult<T>>(&request.url, options)
            .await?;
        Ok(page.unwrap_or_else(PageableResult::empty))
    }
}
