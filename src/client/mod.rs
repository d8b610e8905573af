//! HTTP client for the ticketing backend.
//!
//! [`ApiClient::fetch`] is the single choke point for every call: it attaches
//! the bearer token selected by the [`SecurityMode`], negotiates JSON,
//! normalizes failures into [`ApiError`] and hands them to the caller's
//! [`ErrorSink`] before returning them. A 401 answered to a client-session
//! request signs the session out instead of being reported.

use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::ticket::AttachmentBlob;
use crate::models::config::ServerConfig;

pub mod errors;
pub mod search;
pub mod session;
pub mod sink;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use errors::ApiError;
pub use session::{ClientSession, IdentitySession};
pub use sink::{AlertCollector, ErrorSink, FlashErrorSink};

/// Which credential source a request uses.
#[derive(Clone, Copy)]
pub enum SecurityMode<'a> {
    /// Token of the signed-in user; a 401 signs the session out.
    ClientSession(&'a dyn ClientSession),
    /// Service token configured for server-side calls.
    ServerSession,
    /// No `Authorization` header.
    Public,
}

/// Request payload.
pub enum RequestBody {
    Json(Value),
    Multipart(reqwest::multipart::Form),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|err| ApiError::Validation(err.to_string()))
    }
}

/// Per-call options of [`ApiClient::fetch`].
pub struct FetchOptions<'a> {
    pub method: Method,
    pub body: Option<RequestBody>,
    pub security: SecurityMode<'a>,
    pub sink: Option<&'a dyn ErrorSink>,
}

impl<'a> FetchOptions<'a> {
    pub fn new(method: Method, security: SecurityMode<'a>) -> Self {
        Self {
            method,
            body: None,
            security,
            sink: None,
        }
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn sink(mut self, sink: &'a dyn ErrorSink) -> Self {
        self.sink = Some(sink);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    service_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, service_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_token: service_token.filter(|token| !token.trim().is_empty()),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.api_base_url, config.service_token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an API path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Performs one request and decodes its JSON body; `None` for empty bodies.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: FetchOptions<'_>,
    ) -> Result<Option<T>, ApiError> {
        self.fetch_url(&self.url(path), options).await
    }

    pub(crate) async fn fetch_url<T: DeserializeOwned>(
        &self,
        url: &str,
        options: FetchOptions<'_>,
    ) -> Result<Option<T>, ApiError> {
        let FetchOptions {
            method,
            body,
            security,
            sink,
        } = options;

        let result = async {
            let response = self.send(method, url, body, security).await?;
            decode_json(response).await
        }
        .await;

        result.map_err(|err| report(sink, err))
    }

    /// Downloads a binary body (attachments).
    pub async fn fetch_blob(
        &self,
        path: &str,
        security: SecurityMode<'_>,
        sink: Option<&dyn ErrorSink>,
    ) -> Result<AttachmentBlob, ApiError> {
        let url = self.url(path);
        let result = async {
            let response = self.send(Method::GET, &url, None, security).await?;
            let content_type = header_value(&response, CONTENT_TYPE.as_str());
            let file_name = header_value(&response, CONTENT_DISPOSITION.as_str())
                .as_deref()
                .and_then(disposition_file_name);
            let bytes = response.bytes().await.map_err(network_error)?;

            Ok(AttachmentBlob {
                bytes: bytes.to_vec(),
                content_type,
                file_name,
            })
        }
        .await;

        result.map_err(|err| report(sink, err))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        security: SecurityMode<'_>,
        sink: Option<&dyn ErrorSink>,
    ) -> Result<Option<T>, ApiError> {
        let mut options = FetchOptions::new(Method::GET, security);
        options.sink = sink;
        self.fetch(path, options).await
    }

    pub async fn post<T, B>(
        &self,
        path: &str,
        body: &B,
        security: SecurityMode<'_>,
        sink: Option<&dyn ErrorSink>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body, security, sink).await
    }

    pub async fn put<T, B>(
        &self,
        path: &str,
        body: &B,
        security: SecurityMode<'_>,
        sink: Option<&dyn ErrorSink>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, body, security, sink).await
    }

    pub async fn patch<T, B>(
        &self,
        path: &str,
        body: &B,
        security: SecurityMode<'_>,
        sink: Option<&dyn ErrorSink>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PATCH, path, body, security, sink).await
    }

    pub async fn delete(
        &self,
        path: &str,
        security: SecurityMode<'_>,
        sink: Option<&dyn ErrorSink>,
    ) -> Result<(), ApiError> {
        let mut options = FetchOptions::new(Method::DELETE, security);
        options.sink = sink;
        self.fetch::<Value>(path, options).await.map(|_| ())
    }

    async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        security: SecurityMode<'_>,
        sink: Option<&dyn ErrorSink>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = RequestBody::json(body).map_err(|err| report(sink, err))?;
        let mut options = FetchOptions::new(method, security).body(body);
        options.sink = sink;
        self.fetch(path, options).await
    }

    fn bearer_token(&self, security: SecurityMode<'_>) -> Result<Option<String>, ApiError> {
        match security {
            SecurityMode::ClientSession(session) => session
                .token()
                .map(Some)
                .ok_or(ApiError::MissingCredentials),
            SecurityMode::ServerSession => self
                .service_token
                .clone()
                .map(Some)
                .ok_or(ApiError::MissingCredentials),
            SecurityMode::Public => Ok(None),
        }
    }

    /// Sends the request and turns non-2xx statuses into errors.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<RequestBody>,
        security: SecurityMode<'_>,
    ) -> Result<Response, ApiError> {
        let token = self.bearer_token(security)?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request,
        };

        log::debug!("{method} {url}");
        let response = request.send().await.map_err(network_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let SecurityMode::ClientSession(session) = security {
                log::info!("{method} {url} rejected the session token, signing out");
                session.sign_out();
                return Err(ApiError::Unauthenticated);
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("{method} {url} failed with {status}");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        Ok(response)
    }
}

/// Reports the error to the sink unless the session was signed out.
fn report(sink: Option<&dyn ErrorSink>, err: ApiError) -> ApiError {
    if let Some(sink) = sink {
        if !err.is_signed_out() {
            sink.report(&err);
        }
    }
    err
}

fn network_error(err: reqwest::Error) -> ApiError {
    log::error!("Backend request failed: {err}");
    ApiError::Network {
        details: err.to_string(),
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let bytes = response.bytes().await.map_err(network_error)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| ApiError::Decode(err.to_string()))
}

/// Extracts a human readable message from an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail", "error", "title"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// File name from a `Content-Disposition` header value.
fn disposition_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
