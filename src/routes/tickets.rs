use actix_identity::Identity;
use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::client::{AlertCollector, ApiClient, FlashErrorSink, IdentitySession};
use crate::forms::filter_builder::FilterBuilderForm;
use crate::forms::list::ListQueryForm;
use crate::forms::tickets::{AttachmentUpload, TicketStateForm, UploadAttachmentForm};
use crate::models::auth::AuthenticatedUser;
use crate::routes::{
    base_context, common_error_response, redirect, render_list_page, render_template,
};
use crate::services::{ServiceError, tickets as tickets_service};

#[get("/tickets")]
pub async fn show_tickets(
    user: AuthenticatedUser,
    identity: Identity,
    params: web::Query<ListQueryForm>,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let session = IdentitySession::new(identity);
    let alerts = AlertCollector::default();

    let result =
        tickets_service::list_tickets(&api, &user, &session, &alerts, params.into_inner()).await;

    render_list_page(
        &tera,
        &flash_messages,
        &user,
        "tickets",
        "tickets/index.html",
        result,
        alerts,
    )
}

#[get("/tickets/mine")]
pub async fn show_my_tickets(
    req: HttpRequest,
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    // Filter rows arrive as repeated `field`/`operator`/`value` parameters.
    let form = match serde_html_form::from_str::<FilterBuilderForm>(req.query_string()) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Malformed filter parameters: {err}");
            FlashMessage::error("The filter could not be read.").send();
            return redirect("/tickets/mine");
        }
    };

    let session = IdentitySession::new(identity);
    let alerts = AlertCollector::default();

    match tickets_service::search_my_tickets(&api, &user, &session, &alerts, form).await {
        Ok(data) => {
            let mut page_errors = alerts.into_alerts();
            page_errors.extend(data.build_error.clone());

            let mut context = base_context(&flash_messages, &user, "my_tickets", page_errors);
            context.insert("items", &data.tickets);
            context.insert("rows", &data.rows);
            context.insert("fields", &data.fields);
            context.insert("page_query", &filter_page_query(&data.filter_query));
            context.insert("searched", &data.searched);
            render_template(&tera, "tickets/mine.html", &context)
        }
        Err(err) => match common_error_response(err) {
            Ok(response) => response,
            Err(ServiceError::Form(message)) => {
                FlashMessage::error(message).send();
                redirect("/tickets/mine")
            }
            Err(ServiceError::Api(_)) => {
                let context = base_context(
                    &flash_messages,
                    &user,
                    "my_tickets",
                    alerts.into_alerts(),
                );
                render_template(&tera, "tickets/mine.html", &context)
            }
            Err(err) => {
                log::error!("Failed to search my tickets: {err}");
                HttpResponse::InternalServerError().finish()
            }
        },
    }
}

#[get("/tickets/{ticket_id}")]
pub async fn show_ticket(
    ticket_id: web::Path<i64>,
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let session = IdentitySession::new(identity);

    match tickets_service::load_ticket(
        &api,
        &user,
        &session,
        &FlashErrorSink,
        ticket_id.into_inner(),
    )
    .await
    {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "tickets", Vec::new());
            context.insert("ticket", &data.ticket);
            context.insert("workflow", &data.workflow);
            context.insert("transitions", &data.transitions);
            render_template(&tera, "tickets/show.html", &context)
        }
        Err(err) => match common_error_response(err) {
            Ok(response) => response,
            Err(ServiceError::NotFound) => {
                FlashMessage::error("Ticket not found.").send();
                redirect("/tickets/mine")
            }
            Err(ServiceError::Api(_)) => redirect("/tickets/mine"),
            Err(err) => {
                log::error!("Failed to show ticket: {err}");
                HttpResponse::InternalServerError().finish()
            }
        },
    }
}

#[post("/tickets/{ticket_id}/state")]
pub async fn update_ticket_state(
    ticket_id: web::Path<i64>,
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
    web::Form(form): web::Form<TicketStateForm>,
) -> impl Responder {
    let ticket_id = ticket_id.into_inner();
    let session = IdentitySession::new(identity);
    let back = format!("/tickets/{ticket_id}");

    match tickets_service::update_ticket_state(
        &api,
        &user,
        &session,
        &FlashErrorSink,
        ticket_id,
        form,
    )
    .await
    {
        Ok(()) => {
            FlashMessage::success("Ticket state updated.").send();
            redirect(&back)
        }
        Err(err) => match common_error_response(err) {
            Ok(response) => response,
            Err(ServiceError::Form(message)) => {
                FlashMessage::error(message).send();
                redirect(&back)
            }
            Err(ServiceError::NotFound) => {
                FlashMessage::error("Ticket not found.").send();
                redirect("/tickets/mine")
            }
            Err(err) => {
                log::error!("Failed to update ticket state: {err}");
                redirect(&back)
            }
        },
    }
}

#[post("/tickets/{ticket_id}/attachments")]
pub async fn upload_attachment(
    ticket_id: web::Path<i64>,
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
    MultipartForm(form): MultipartForm<UploadAttachmentForm>,
) -> impl Responder {
    let ticket_id = ticket_id.into_inner();
    let back = format!("/tickets/{ticket_id}");

    let upload = match AttachmentUpload::try_from(&form) {
        Ok(upload) => upload,
        Err(err) => {
            log::warn!("Rejected attachment upload: {err}");
            FlashMessage::error("Choose a non-empty file to upload.").send();
            return redirect(&back);
        }
    };

    let session = IdentitySession::new(identity);

    match tickets_service::upload_attachment(
        &api,
        &user,
        &session,
        &FlashErrorSink,
        ticket_id,
        upload,
    )
    .await
    {
        Ok(()) => {
            FlashMessage::success("Attachment uploaded.").send();
            redirect(&back)
        }
        Err(err) => match common_error_response(err) {
            Ok(response) => response,
            Err(ServiceError::Form(message)) => {
                FlashMessage::error(message).send();
                redirect(&back)
            }
            Err(err) => {
                log::error!("Failed to upload attachment: {err}");
                redirect(&back)
            }
        },
    }
}

fn filter_page_query(filter_query: &str) -> String {
    if filter_query.is_empty() {
        String::new()
    } else {
        format!("&{filter_query}")
    }
}
