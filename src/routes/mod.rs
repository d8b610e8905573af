//! HTTP handlers and the helpers they share.

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::client::AlertCollector;
use crate::dto::{ListPageData, list_link_query};
use crate::middleware::SIGNIN_PATH;
use crate::models::auth::AuthenticatedUser;
use crate::services::{ServiceError, ServiceResult};

pub mod attachments;
pub mod auth;
pub mod authorities;
pub mod main;
pub mod tickets;
pub mod users;
pub mod workflows;

/// Maps flash levels to Bootstrap alert classes.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Flash messages from the previous request followed by errors collected
/// while rendering this one.
pub fn collect_alerts(
    flash_messages: &IncomingFlashMessages,
    page_errors: Vec<String>,
) -> Vec<(String, &'static str)> {
    flash_messages
        .iter()
        .map(|f| (f.content().to_string(), alert_level_to_str(&f.level())))
        .chain(page_errors.into_iter().map(|error| (error, "danger")))
        .collect()
}

/// Context every authenticated page starts from.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    page_errors: Vec<String>,
) -> Context {
    let mut context = Context::new();
    context.insert("alerts", &collect_alerts(flash_messages, page_errors));
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Handles the errors every page shares: missing authority and a session the
/// backend no longer accepts. Anything else is handed back to the caller.
pub fn common_error_response(err: ServiceError) -> Result<HttpResponse, ServiceError> {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("You do not have access to this page.").send();
            Ok(redirect("/na"))
        }
        err if err.is_signed_out() => {
            FlashMessage::warning("Your session has expired. Please sign in again.").send();
            Ok(redirect(SIGNIN_PATH))
        }
        err => Err(err),
    }
}

/// Renders a searchable list page. Backend failures keep the page usable: the
/// list is shown empty and the collected errors appear as alerts.
pub fn render_list_page<T: Serialize>(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    template: &str,
    result: ServiceResult<ListPageData<T>>,
    collector: AlertCollector,
) -> HttpResponse {
    let mut page_errors = collector.into_alerts();
    let data = match result {
        Ok(data) => data,
        Err(err) => match common_error_response(err) {
            Ok(response) => return response,
            Err(ServiceError::Form(message)) => {
                page_errors.push(message);
                ListPageData::empty()
            }
            Err(ServiceError::Api(err)) => {
                log::error!("Failed to load {current_page}: {err}");
                ListPageData::empty()
            }
            Err(err) => {
                log::error!("Failed to load {current_page}: {err}");
                return HttpResponse::InternalServerError().finish();
            }
        },
    };

    let mut context = base_context(flash_messages, user, current_page, page_errors);
    context.insert("items", &data.items);
    context.insert("search_query", &data.search_query);
    context.insert("sort", &data.sort);
    context.insert("sort_links", &data.sort_links);
    context.insert("page_query", &list_page_query(&data));

    render_template(tera, template, &context)
}

/// Search and sort parameters appended to pagination links.
fn list_page_query<T>(data: &ListPageData<T>) -> String {
    let query = list_link_query(data.search_query.as_deref(), &data.sort);
    if query.is_empty() {
        query
    } else {
        format!("&{query}")
    }
}
