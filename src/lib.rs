#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::middleware::{Compress, Logger};
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::client::ApiClient;
#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::routes::attachments::download_attachment;
#[cfg(feature = "server")]
use crate::routes::auth::{oauth_signin, show_signin, signin};
#[cfg(feature = "server")]
use crate::routes::authorities::{
    add_authority, delete_authority, save_authority, show_authorities,
};
#[cfg(feature = "server")]
use crate::routes::main::{logout, not_assigned, show_index};
#[cfg(feature = "server")]
use crate::routes::tickets::{
    show_my_tickets, show_ticket, show_tickets, update_ticket_state, upload_attachment,
};
#[cfg(feature = "server")]
use crate::routes::users::show_users;
#[cfg(feature = "server")]
use crate::routes::workflows::{show_workflow, show_workflows};

pub mod domain;
pub mod forms;
pub mod pagination;

#[cfg(feature = "server")]
pub mod client;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Authority required for the ticketing pages.
pub const SERVICE_ACCESS_AUTHORITY: &str = "ticketing";
/// Authority required for tenant-wide lists and administration.
pub const SERVICE_ADMIN_AUTHORITY: &str = "ticketing_admin";

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let api_client = ApiClient::from_config(&server_config);
    log::info!("Using backend at {}", api_client.base_url());

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(show_signin)
            .service(signin)
            .service(oauth_signin)
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(not_assigned)
                    .service(show_tickets)
                    .service(show_my_tickets)
                    .service(show_ticket)
                    .service(update_ticket_state)
                    .service(upload_attachment)
                    .service(download_attachment)
                    .service(show_users)
                    .service(show_authorities)
                    .service(add_authority)
                    .service(save_authority)
                    .service(delete_authority)
                    .service(show_workflows)
                    .service(show_workflow)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(api_client.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
