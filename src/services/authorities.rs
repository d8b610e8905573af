use crate::SERVICE_ADMIN_AUTHORITY;
use crate::client::{ApiClient, ClientSession, ErrorSink, SecurityMode};
use crate::domain::authority::{Authority, NewAuthority};
use crate::domain::pageable::SortDirection;
use crate::domain::types::AuthorityId;
use crate::dto::ListPageData;
use crate::forms::authorities::AuthorityForm;
use crate::forms::list::ListQueryForm;
use crate::models::auth::AuthenticatedUser;
use crate::services::listing::{SearchTarget, load_list_page};
use crate::services::{ServiceError, ServiceResult};

pub const AUTHORITIES: SearchTarget = SearchTarget {
    path: "/api/authorities/search",
    search_field: "name,description",
    sortable: &["name", "id"],
    default_sort_field: "name",
    default_sort_direction: SortDirection::Asc,
    authority: SERVICE_ADMIN_AUTHORITY,
};

pub async fn list_authorities(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    form: ListQueryForm,
) -> ServiceResult<ListPageData<Authority>> {
    load_list_page(api, user, session, sink, &AUTHORITIES, form).await
}

pub async fn create_authority(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    form: AuthorityForm,
) -> ServiceResult<()> {
    if !user.has_authority(SERVICE_ADMIN_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let new_authority = NewAuthority::try_from(form)?;

    api.post::<serde_json::Value, _>(
        "/api/authorities",
        &new_authority,
        SecurityMode::ClientSession(session),
        Some(sink),
    )
    .await
    .map_err(|err| {
        log::error!("Failed to create authority: {err}");
        err
    })?;

    Ok(())
}

pub async fn update_authority(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    authority_id: i64,
    form: AuthorityForm,
) -> ServiceResult<()> {
    if !user.has_authority(SERVICE_ADMIN_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let authority_id = AuthorityId::new(authority_id).map_err(|_| ServiceError::NotFound)?;
    let changes = NewAuthority::try_from(form)?;

    api.put::<serde_json::Value, _>(
        &format!("/api/authorities/{authority_id}"),
        &changes,
        SecurityMode::ClientSession(session),
        Some(sink),
    )
    .await
    .map_err(|err| {
        log::error!("Failed to update authority {authority_id}: {err}");
        err
    })?;

    Ok(())
}

pub async fn delete_authority(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    authority_id: i64,
) -> ServiceResult<()> {
    if !user.has_authority(SERVICE_ADMIN_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let authority_id = AuthorityId::new(authority_id).map_err(|_| ServiceError::NotFound)?;

    api.delete(
        &format!("/api/authorities/{authority_id}"),
        SecurityMode::ClientSession(session),
        Some(sink),
    )
    .await
    .map_err(|err| {
        log::error!("Failed to delete authority {authority_id}: {err}");
        err
    })?;

    Ok(())
}
