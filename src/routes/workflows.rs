use actix_identity::Identity;
use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::client::{AlertCollector, ApiClient, FlashErrorSink, IdentitySession};
use crate::forms::list::ListQueryForm;
use crate::models::auth::AuthenticatedUser;
use crate::routes::{
    base_context, common_error_response, redirect, render_list_page, render_template,
};
use crate::services::{ServiceError, workflows as workflows_service};

#[get("/workflows")]
pub async fn show_workflows(
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
        workflows_service::list_workflows(&api, &user, &session, &alerts, params.into_inner())
            .await;

    render_list_page(
        &tera,
        &flash_messages,
        &user,
        "workflows",
        "workflows/index.html",
        result,
        alerts,
    )
}

#[get("/workflows/{workflow_id}")]
pub async fn show_workflow(
    workflow_id: web::Path<i64>,
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let session = IdentitySession::new(identity);

    match workflows_service::load_workflow(
        &api,
        &user,
        &session,
        &FlashErrorSink,
        workflow_id.into_inner(),
    )
    .await
    {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "workflows", Vec::new());
            context.insert("workflow", &data.workflow);
            render_template(&tera, "workflows/show.html", &context)
        }
        Err(err) => match common_error_response(err) {
            Ok(response) => response,
            Err(ServiceError::NotFound) => {
                FlashMessage::error("Workflow not found.").send();
                redirect("/workflows")
            }
            Err(ServiceError::Api(_)) => redirect("/workflows"),
            Err(err) => {
                log::error!("Failed to show workflow: {err}");
                HttpResponse::InternalServerError().finish()
            }
        },
    }
}
