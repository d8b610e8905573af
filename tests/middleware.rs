use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{
    App, HttpResponse, Responder,
    http::{StatusCode, header},
    test, web,
};

use teamflow::middleware::{RedirectUnauthorized, SIGNIN_PATH};
use teamflow::models::auth::AuthenticatedUser;
use teamflow::models::config::ServerConfig;

fn server_config() -> ServerConfig {
    ServerConfig {
        domain: "localhost".to_string(),
        address: "127.0.0.1".to_string(),
        port: 0,
        templates_dir: "templates/**/*".to_string(),
        secret: "x".repeat(64),
        api_base_url: "http://127.0.0.1:9".to_string(),
        service_token: None,
        oauth_providers: Vec::new(),
    }
}

async fn whoami(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(user.email)
}

#[actix_web::test]
async fn backend_401_redirects_to_signin() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .default_service(web::to(|| async { HttpResponse::Unauthorized().finish() })),
    )
    .await;

    let req = test::TestRequest::default().to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), SIGNIN_PATH);
}

#[actix_web::test]
async fn other_responses_pass_through() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .route("/ok", web::get().to(|| async { HttpResponse::Ok().finish() }))
            .route(
                "/forbidden",
                web::get().to(|| async { HttpResponse::Forbidden().finish() }),
            ),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/ok").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/forbidden").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn missing_session_redirects_to_signin() {
    let config = server_config();
    let key = Key::from(config.secret.as_bytes());
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .wrap(IdentityMiddleware::default())
            .wrap(SessionMiddleware::new(CookieSessionStore::default(), key))
            .app_data(web::Data::new(config))
            .route("/me", web::get().to(whoami)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), SIGNIN_PATH);
}
