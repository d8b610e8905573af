use reqwest::Method;
use reqwest::multipart::{Form, Part};

use crate::client::{
    ApiClient, ApiError, ClientSession, ErrorSink, FetchOptions, RequestBody, SecurityMode,
};
use crate::domain::pageable::{DEFAULT_PAGE_SIZE, Pagination, SortDirection, SortKey};
use crate::domain::query::{Filter, FilterGroup, QueryDto};
use crate::domain::ticket::{AttachmentBlob, Ticket, TicketStateUpdate};
use crate::domain::types::{AttachmentId, TicketId};
use crate::domain::workflow::Workflow;
use crate::dto::{FieldView, FilterRowView, ListPageData, MyTicketsPageData, TicketPageData};
use crate::forms::filter_builder::{FieldCatalog, FilterBuilderForm};
use crate::forms::list::ListQueryForm;
use crate::forms::tickets::{AttachmentUpload, TicketStateForm};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::Paginated;
use crate::services::listing::{SearchTarget, load_list_page};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_AUTHORITY, SERVICE_ADMIN_AUTHORITY};

pub const TICKETS: SearchTarget = SearchTarget {
    path: "/api/tickets/search",
    search_field: "requestTitle,requestDescription",
    sortable: &["id", "requestTitle", "priority", "currentStateName", "createdAt"],
    default_sort_field: "createdAt",
    default_sort_direction: SortDirection::Desc,
    authority: SERVICE_ADMIN_AUTHORITY,
};

/// Field the "my tickets" query is always narrowed by.
pub const REQUESTER_FIELD: &str = "requestUserEmail";

/// All tickets of the tenant.
pub async fn list_tickets(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    form: ListQueryForm,
) -> ServiceResult<ListPageData<Ticket>> {
    load_list_page(api, user, session, sink, &TICKETS, form).await
}

/// Tickets requested by the current user, narrowed by the filter builder.
///
/// Submissions that only edit the builder, and builders that do not produce
/// a valid query, never reach the backend.
pub async fn search_my_tickets(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    form: FilterBuilderForm,
) -> ServiceResult<MyTicketsPageData> {
    if !user.has_authority(SERVICE_ACCESS_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let page = match form.page {
        Some(0) => return Err(ServiceError::Form("Invalid page number".to_string())),
        Some(page) => page,
        None => 1,
    };
    let edit_only = form.is_edit_only();
    let builder = form.into_builder(FieldCatalog::my_tickets());

    let mut data = MyTicketsPageData {
        tickets: Paginated::empty(),
        rows: builder
            .rows()
            .iter()
            .map(|row| FilterRowView::new(row, builder.catalog()))
            .collect(),
        fields: builder.catalog().fields().iter().map(FieldView::from).collect(),
        build_error: None,
        filter_query: builder.query_string().unwrap_or_default(),
        searched: false,
    };

    if edit_only {
        return Ok(data);
    }

    let filters = match builder.build() {
        Ok(filters) => filters,
        Err(err) => {
            log::warn!("Rejected ticket filter: {err}");
            data.build_error = Some(err.to_string());
            return Ok(data);
        }
    };

    let mut query = QueryDto::from_filters(vec![Filter::eq(REQUESTER_FIELD, user.email.as_str())]);
    if !filters.is_empty() {
        query = query.with_group(FilterGroup::and(filters));
    }
    let pagination = Pagination::new(page, DEFAULT_PAGE_SIZE).sorted_by(SortKey::desc("createdAt"));

    let result = api
        .search::<Ticket>(
            TICKETS.path,
            Some(&query),
            Some(&pagination),
            SecurityMode::ClientSession(session),
            Some(sink),
        )
        .await
        .map_err(|err| {
            log::error!("Failed to search my tickets: {err}");
            err
        })?;

    data.tickets = Paginated::from_result(result, page);
    data.searched = true;
    Ok(data)
}

/// Ticket with its workflow and the transitions leaving its current state.
pub async fn load_ticket(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    ticket_id: i64,
) -> ServiceResult<TicketPageData> {
    if !user.has_authority(SERVICE_ACCESS_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let ticket_id = TicketId::new(ticket_id).map_err(|_| ServiceError::NotFound)?;
    let security = SecurityMode::ClientSession(session);

    let ticket = api
        .get::<Ticket>(&format!("/api/tickets/{ticket_id}"), security, None)
        .await
        .map_err(|err| not_found_or(err, sink, "ticket"))?
        .ok_or(ServiceError::NotFound)?;

    let workflow = match ticket.workflow_id {
        Some(workflow_id) => {
            api.get::<Workflow>(&format!("/api/workflows/{workflow_id}"), security, Some(sink))
                .await?
        }
        None => None,
    };

    let transitions = match (&workflow, ticket.current_state_id) {
        (Some(workflow), Some(state_id)) => workflow.transitions_from(state_id),
        _ => Vec::new(),
    };

    Ok(TicketPageData {
        ticket,
        workflow,
        transitions,
    })
}

/// Moves a ticket to another workflow state. The backend decides whether the
/// transition is allowed.
pub async fn update_ticket_state(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    ticket_id: i64,
    form: TicketStateForm,
) -> ServiceResult<()> {
    if !user.has_authority(SERVICE_ACCESS_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let ticket_id = TicketId::new(ticket_id).map_err(|_| ServiceError::NotFound)?;
    let update = TicketStateUpdate::try_from(form)?;

    api.patch::<serde_json::Value, _>(
        &format!("/api/tickets/{ticket_id}/state"),
        &update,
        SecurityMode::ClientSession(session),
        Some(sink),
    )
    .await
    .map_err(|err| {
        log::error!("Failed to update ticket {ticket_id}: {err}");
        err
    })?;

    Ok(())
}

pub async fn upload_attachment(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    ticket_id: i64,
    upload: AttachmentUpload,
) -> ServiceResult<()> {
    if !user.has_authority(SERVICE_ACCESS_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let ticket_id = TicketId::new(ticket_id).map_err(|_| ServiceError::NotFound)?;

    let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
    if let Some(content_type) = upload.content_type.as_deref() {
        part = part
            .mime_str(content_type)
            .map_err(|_| ServiceError::Form("Unsupported file type".to_string()))?;
    }
    let body = RequestBody::Multipart(Form::new().part("file", part));

    let options = FetchOptions::new(Method::POST, SecurityMode::ClientSession(session))
        .body(body)
        .sink(sink);

    api.fetch::<serde_json::Value>(&format!("/api/tickets/{ticket_id}/attachments"), options)
        .await
        .map_err(|err| {
            log::error!("Failed to upload attachment to ticket {ticket_id}: {err}");
            err
        })?;

    Ok(())
}

pub async fn download_attachment(
    api: &ApiClient,
    user: &AuthenticatedUser,
    session: &dyn ClientSession,
    sink: &dyn ErrorSink,
    attachment_id: i64,
) -> ServiceResult<AttachmentBlob> {
    if !user.has_authority(SERVICE_ACCESS_AUTHORITY) {
        return Err(ServiceError::Unauthorized);
    }

    let attachment_id = AttachmentId::new(attachment_id).map_err(|_| ServiceError::NotFound)?;

    api.fetch_blob(
        &format!("/api/attachments/{attachment_id}/download"),
        SecurityMode::ClientSession(session),
        None,
    )
    .await
    .map_err(|err| not_found_or(err, sink, "attachment"))
}

/// A backend 404 becomes [`ServiceError::NotFound`]; anything else is
/// reported to the sink as usual.
fn not_found_or(err: ApiError, sink: &dyn ErrorSink, what: &str) -> ServiceError {
    if err.status() == 404 {
        return ServiceError::NotFound;
    }
    log::error!("Failed to load {what}: {err}");
    if !err.is_signed_out() {
        sink.report(&err);
    }
    ServiceError::Api(err)
}
