use crate::client::{ApiClient, ClientSession, ErrorSink, SecurityMode};
use crate::domain::pageable::SortDirection;
use crate::domain::types::WorkflowId;
use crate::domain::workflow::Workflow;
use crate::dto::{ListPageData, WorkflowPageData};
use crate::forms::list::ListQueryForm;
use crate::models::auth::AuthenticatedUser;
use crate::services::listing::{SearchTarget, load_list_page};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_AUTHORITY, SERVICE_ADMIN_AUTHORITY};

pub const WORKFLOWS: SearchTarget = SearchTarget {
    path: "/api/workflows/search",
    search_field: "name,description",
    sortable: &["name", "id"],
    default_sort_field: "name",
    default_sort_direction: SortDirection::Asc,
    authority: SERVICE_ADMIN_AUTHORITY,
};

pub async fn list_workflows(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    form: ListQueryForm,
) -> ServiceResult<ListPageData<Workflow>> {
    load_list_page(api, user, session, sink, &WORKFLOWS, form).await
}

/// Loads a workflow with its states and transitions for display. The graph is
/// shown as the backend returns it.
pub async fn load_workflow(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    workflow_id: i64,
) -> ServiceResult<WorkflowPageData> {
    if !user.has_authority(SERVICE_ACCESS_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let workflow_id = WorkflowId::new(workflow_id).map_err(|_| ServiceError::NotFound)?;

    let workflow = api
        .get::<Workflow>(
            &format!("/api/workflows/{workflow_id}"),
            SecurityMode::ClientSession(session),
            Some(sink),
        )
        .await
        .map_err(|err| {
            log::error!("Failed to load workflow {workflow_id}: {err}");
            err
        })?
        .ok_or(ServiceError::NotFound)?;

    Ok(WorkflowPageData { workflow })
}
