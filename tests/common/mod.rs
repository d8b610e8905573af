//! Local stand-in for the ticketing backend.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::Value;

use teamflow::client::{ApiClient, ApiError, ClientSession, ErrorSink};
use teamflow::domain::types::TenantId;
use teamflow::models::auth::AuthenticatedUser;

pub const SECRET: &str = "integration-test-secret";

/// One request as seen by the stub.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

pub struct StubBackend {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: ServerHandle,
}

impl StubBackend {
    /// Starts a server answering every request with `respond`.
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&Recorded) -> HttpResponse + Send + Sync + 'static,
    {
        let respond = Arc::new(respond);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let server = HttpServer::new(move || {
            let respond = respond.clone();
            let recorded = recorded.clone();
            App::new().default_service(web::to(move |req: HttpRequest, body: web::Bytes| {
                let respond = respond.clone();
                let recorded = recorded.clone();
                async move {
                    let header = |name: &str| {
                        req.headers()
                            .get(name)
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_string)
                    };
                    let request = Recorded {
                        method: req.method().to_string(),
                        path: req.path().to_string(),
                        query: req.query_string().to_string(),
                        authorization: header("authorization"),
                        content_type: header("content-type"),
                        body: body.to_vec(),
                    };
                    let response = respond(&request);
                    recorded.lock().unwrap().push(request);
                    response
                }
            }))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind stub backend");

        let address = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://{address}"),
            requests,
            handle,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Some("service-token".to_string()))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// Session double recording sign-outs.
pub struct TestSession {
    token: Option<String>,
    signed_out: Cell<bool>,
}

impl TestSession {
    pub fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            signed_out: Cell::new(false),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            token: None,
            signed_out: Cell::new(false),
        }
    }

    pub fn signed_out(&self) -> bool {
        self.signed_out.get()
    }
}

impl ClientSession for TestSession {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn sign_out(&self) {
        self.signed_out.set(true);
    }
}

/// Sink keeping every reported error.
#[derive(Default)]
pub struct RecordingSink {
    errors: RefCell<Vec<ApiError>>,
}

impl RecordingSink {
    pub fn errors(&self) -> Vec<ApiError> {
        self.errors.borrow().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, error: &ApiError) {
        self.errors.borrow_mut().push(error.clone());
    }
}

pub fn user(authorities: &[&str]) -> AuthenticatedUser {
    let mut user = AuthenticatedUser {
        sub: "42".to_string(),
        email: "agent@example.com".to_string(),
        tenant_id: TenantId::new(1).unwrap(),
        name: "Agent".to_string(),
        authorities: authorities.iter().map(|a| a.to_string()).collect(),
        exp: 0,
    };
    user.set_expiration(1);
    user
}

pub fn json(status: u16, body: Value) -> HttpResponse {
    HttpResponse::build(actix_web::http::StatusCode::from_u16(status).unwrap()).json(body)
}
