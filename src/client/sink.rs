//! Destinations for errors surfaced to the user interface.

use std::cell::RefCell;

use actix_web_flash_messages::FlashMessage;

use crate::client::errors::ApiError;

/// Receives every reportable API error (toast, banner, log).
pub trait ErrorSink {
    fn report(&self, error: &ApiError);
}

impl<F> ErrorSink for F
where
    F: Fn(&ApiError),
{
    fn report(&self, error: &ApiError) {
        self(error)
    }
}

/// Queues errors as flash messages shown after the next redirect.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlashErrorSink;

impl ErrorSink for FlashErrorSink {
    fn report(&self, error: &ApiError) {
        FlashMessage::error(error.to_string()).send();
    }
}

/// Collects errors for the page currently being rendered.
#[derive(Debug, Default)]
pub struct AlertCollector {
    alerts: RefCell<Vec<String>>,
}

impl AlertCollector {
    pub fn into_alerts(self) -> Vec<String> {
        self.alerts.into_inner()
    }
}

impl ErrorSink for AlertCollector {
    fn report(&self, error: &ApiError) {
        self.alerts.borrow_mut().push(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use actix_web::cookie::{Cookie, Key};
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, HttpResponse, test, web};
    use actix_web_flash_messages::storage::CookieMessageStore;
    use actix_web_flash_messages::{FlashMessagesFramework, IncomingFlashMessages, Level};

    use super::*;

    #[::core::prelude::v1::test]
    fn collector_keeps_messages_in_order() {
        let collector = AlertCollector::default();
        collector.report(&ApiError::Validation("page must be positive".into()));
        collector.report(&ApiError::Http {
            status: 409,
            message: "Name already taken".into(),
        });

        assert_eq!(
            collector.into_alerts(),
            vec![
                "Bad request: page must be positive".to_string(),
                "Name already taken".to_string()
            ]
        );
    }

    #[::core::prelude::v1::test]
    fn closures_are_sinks() {
        let count = Cell::new(0);
        let sink = |_: &ApiError| count.set(count.get() + 1);

        sink.report(&ApiError::Unauthenticated);
        sink.report(&ApiError::MissingCredentials);
        assert_eq!(count.get(), 2);
    }

    #[actix_web::test]
    async fn flash_errors_reach_the_next_page() {
        let store = CookieMessageStore::builder(Key::generate()).build();
        let app = test::init_service(
            App::new()
                .wrap(FlashMessagesFramework::builder(store).build())
                .route(
                    "/fail",
                    web::post().to(|| async {
                        FlashErrorSink.report(&ApiError::Http {
                            status: 409,
                            message: "Name already taken".into(),
                        });
                        HttpResponse::SeeOther()
                            .insert_header((header::LOCATION, "/show"))
                            .finish()
                    }),
                )
                .route(
                    "/show",
                    web::get().to(|messages: IncomingFlashMessages| async move {
                        messages
                            .iter()
                            .map(|m| {
                                let level = if m.level() == Level::Error { "error" } else { "other" };
                                format!("{level}:{}", m.content())
                            })
                            .collect::<Vec<_>>()
                            .join("\n")
                    }),
                ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::post().uri("/fail").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let cookies: Vec<Cookie<'static>> =
            resp.response().cookies().map(|c| c.into_owned()).collect();

        let mut req = test::TestRequest::get().uri("/show");
        for cookie in cookies {
            req = req.cookie(cookie);
        }
        let body = test::call_and_read_body(&app, req.to_request()).await;
        assert_eq!(body, "error:Name already taken");
    }
}
