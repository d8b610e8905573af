use actix_identity::Identity;
use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::client::{AlertCollector, ApiClient, FlashErrorSink, IdentitySession};
use crate::forms::authorities::AuthorityForm;
use crate::forms::list::ListQueryForm;
use crate::models::auth::AuthenticatedUser;
use crate::routes::{common_error_response, redirect, render_list_page};
use crate::services::{ServiceError, ServiceResult, authorities as authorities_service};

#[get("/authorities")]
pub async fn show_authorities(
    user: AuthenticatedUser,
    identity: Identity,
    params: web::Query<ListQueryForm>,
    api: web::Data<ApiClient>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let session = IdentitySession::new(identity);
    let alerts = AlertCollector::default();

    let result = authorities_service::list_authorities(
        &api,
        &user,
        &session,
        &alerts,
        params.into_inner(),
    )
    .await;

    render_list_page(
        &tera,
        &flash_messages,
        &user,
        "authorities",
        "authorities/index.html",
        result,
        alerts,
    )
}

#[post("/authorities/add")]
pub async fn add_authority(
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
    web::Form(form): web::Form<AuthorityForm>,
) -> impl Responder {
    let session = IdentitySession::new(identity);
    let result =
        authorities_service::create_authority(&api, &user, &session, &FlashErrorSink, form).await;
    finish(result, "Authority added.")
}

#[post("/authorities/{authority_id}/save")]
pub async fn save_authority(
    authority_id: web::Path<i64>,
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
    web::Form(form): web::Form<AuthorityForm>,
) -> impl Responder {
    let session = IdentitySession::new(identity);
    let result = authorities_service::update_authority(
        &api,
        &user,
        &session,
        &FlashErrorSink,
        authority_id.into_inner(),
        form,
    )
    .await;
    finish(result, "Authority updated.")
}

#[post("/authorities/{authority_id}/delete")]
pub async fn delete_authority(
    authority_id: web::Path<i64>,
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
) -> impl Responder {
    let session = IdentitySession::new(identity);
    let result = authorities_service::delete_authority(
        &api,
        &user,
        &session,
        &FlashErrorSink,
        authority_id.into_inner(),
    )
    .await;
    finish(result, "Authority deleted.")
}

fn finish(result: ServiceResult<()>, success: &str) -> actix_web::HttpResponse {
    match result {
        Ok(()) => {
            FlashMessage::success(success).send();
            redirect("/authorities")
        }
        Err(err) => match common_error_response(err) {
            Ok(response) => response,
            Err(ServiceError::Form(message)) => {
                FlashMessage::error(message).send();
                redirect("/authorities")
            }
            Err(ServiceError::NotFound) => {
                FlashMessage::error("Authority not found.").send();
                redirect("/authorities")
            }
            // Backend errors were already shown through the flash sink.
            Err(err) => {
                log::error!("Authority change failed: {err}");
                redirect("/authorities")
            }
        },
    }
}
