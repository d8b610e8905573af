use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};

use crate::client::{ApiClient, FlashErrorSink};
use crate::forms::auth::{LoginForm, OAuthForm};
use crate::middleware::SIGNIN_PATH;
use crate::models::config::ServerConfig;
use crate::routes::{collect_alerts, redirect, render_template};
use crate::services::auth::{self as auth_service, SignedIn};
use crate::services::{ServiceError, ServiceResult};

#[get("/auth/signin")]
pub async fn show_signin(
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = Context::new();
    context.insert("alerts", &collect_alerts(&flash_messages, Vec::new()));
    context.insert("current_page", "signin");
    context.insert("providers", &server_config.oauth_providers);
    render_template(&tera, "auth/signin.html", &context)
}

#[post("/auth/signin")]
pub async fn signin(
    req: HttpRequest,
    api: web::Data<ApiClient>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let result = auth_service::sign_in(&api, &server_config.secret, &FlashErrorSink, form).await;
    start_session(&req, result)
}

#[post("/auth/oauth")]
pub async fn oauth_signin(
    req: HttpRequest,
    api: web::Data<ApiClient>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<OAuthForm>,
) -> impl Responder {
    let result = auth_service::exchange_provider_token(
        &api,
        &server_config.secret,
        &server_config.oauth_providers,
        &FlashErrorSink,
        form,
    )
    .await;
    start_session(&req, result)
}

fn start_session(req: &HttpRequest, result: ServiceResult<SignedIn>) -> HttpResponse {
    match result {
        Ok(signed_in) => match Identity::login(&req.extensions(), signed_in.token) {
            Ok(_) => {
                log::info!("{} signed in", signed_in.user.email);
                redirect("/")
            }
            Err(err) => {
                log::error!("Failed to start a session: {err}");
                HttpResponse::InternalServerError().finish()
            }
        },
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(SIGNIN_PATH)
        }
        // Backend errors were already shown through the flash sink.
        Err(err) => {
            log::warn!("Sign-in rejected: {err}");
            redirect(SIGNIN_PATH)
        }
    }
}
