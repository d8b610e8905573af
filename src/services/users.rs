use crate::SERVICE_ADMIN_AUTHORITY;
use crate::client::{ApiClient, ClientSession, ErrorSink};
use crate::domain::pageable::SortDirection;
use crate::domain::user::User;
use crate::dto::ListPageData;
use crate::forms::list::ListQueryForm;
use crate::models::auth::AuthenticatedUser;
use crate::services::ServiceResult;
use crate::services::listing::{SearchTarget, load_list_page};

pub const USERS: SearchTarget = SearchTarget {
    path: "/api/users/search",
    search_field: "email,firstName,lastName",
    sortable: &["email", "firstName", "lastName"],
    default_sort_field: "email",
    default_sort_direction: SortDirection::Asc,
    authority: SERVICE_ADMIN_AUTHORITY,
};

pub async fn list_users(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    form: ListQueryForm,
) -> ServiceResult<ListPageData<User>> {
    load_list_page(api, user, session, sink, &USERS, form).await
}
