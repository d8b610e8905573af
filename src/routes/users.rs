use actix_identity::Identity;
use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::client::{AlertCollector, ApiClient, IdentitySession};
use crate::forms::list::ListQueryForm;
use crate::models::auth::AuthenticatedUser;
use crate::routes::render_list_page;
use crate::services::users as users_service;

#[get("/users")]
pub async fn show_users(
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
        users_service::list_users(&api, &user, &session, &alerts, params.into_inner()).await;

    render_list_page(
        &tera,
        &flash_messages,
        &user,
        "users",
        "users/index.html",
        result,
        alerts,
    )
}
