use actix_identity::Identity;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::FlashMessage;

use crate::client::{ApiClient, FlashErrorSink, IdentitySession};
use crate::models::auth::AuthenticatedUser;
use crate::routes::{common_error_response, redirect};
use crate::services::{ServiceError, tickets as tickets_service};

/// Streams an attachment to the browser as a download. Nothing is kept on
/// this server afterwards.
#[get("/attachments/{attachment_id}")]
pub async fn download_attachment(
    attachment_id: web::Path<i64>,
    user: AuthenticatedUser,
    identity: Identity,
    api: web::Data<ApiClient>,
) -> impl Responder {
    let attachment_id = attachment_id.into_inner();
    let session = IdentitySession::new(identity);

    match tickets_service::download_attachment(
        &api,
        &user,
        &session,
        &FlashErrorSink,
        attachment_id,
    )
    .await
    {
        Ok(blob) => {
            let file_name = blob
                .file_name
                .unwrap_or_else(|| format!("attachment-{attachment_id}"));
            let content_type = blob
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());

            HttpResponse::Ok()
                .content_type(content_type)
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(file_name)],
                })
                .body(blob.bytes)
        }
        Err(err) => match common_error_response(err) {
            Ok(response) => response,
            Err(ServiceError::NotFound) => {
                FlashMessage::error("Attachment not found.").send();
                redirect("/tickets/mine")
            }
            Err(err) => {
                log::error!("Failed to download attachment {attachment_id}: {err}");
                redirect("/tickets/mine")
            }
        },
    }
}
