//! Sign-in flows. Both end with an application token that becomes the
//! identity of the browser session.

use crate::client::{ApiClient, ApiError, ErrorSink, SecurityMode};
use crate::domain::auth::{Credentials, ProviderToken, TokenResponse};
use crate::forms::auth::{LoginForm, OAuthForm};
use crate::models::auth::AuthenticatedUser;
use crate::services::{ServiceError, ServiceResult};

/// Outcome of a successful sign-in.
#[derive(Debug)]
pub struct SignedIn {
    /// Token to store as the session identity.
    pub token: String,
    pub user: AuthenticatedUser,
}

/// Exchanges email and password for an application token.
pub async fn sign_in(
    api: &ApiClient,
    secret: &str,
    sink: &dyn ErrorSink,
    form: LoginForm,
) -> ServiceResult<SignedIn> {
    let credentials = Credentials::try_from(form)?;

    let response = api
        .post::<TokenResponse, _>(
            "/api/auth/login",
            &credentials,
            SecurityMode::Public,
            Some(sink),
        )
        .await
        .map_err(|err| {
            log::warn!("Sign-in failed for {}: {err}", credentials.email);
            err
        })?;

    accept_token(response, secret, sink)
}

/// Exchanges a token issued by an external identity provider for an
/// application token. Only providers listed in the configuration are accepted.
pub async fn exchange_provider_token(
    api: &ApiClient,
    secret: &str,
    providers: &[String],
    sink: &dyn ErrorSink,
    form: OAuthForm,
) -> ServiceResult<SignedIn> {
    let provider_token = ProviderToken::try_from(form)?;

    if !providers
        .iter()
        .any(|provider| provider.eq_ignore_ascii_case(&provider_token.provider))
    {
        return Err(ServiceError::Form(format!(
            "Sign-in with {} is not available",
            provider_token.provider
        )));
    }

    let response = api
        .post::<TokenResponse, _>(
            "/api/auth/oauth",
            &provider_token,
            SecurityMode::Public,
            Some(sink),
        )
        .await
        .map_err(|err| {
            log::warn!("Token exchange with {} failed: {err}", provider_token.provider);
            err
        })?;

    accept_token(response, secret, sink)
}

/// Checks that the backend issued a token this application can read.
fn accept_token(
    response: Option<TokenResponse>,
    secret: &str,
    sink: &dyn ErrorSink,
) -> ServiceResult<SignedIn> {
    let rejected = |reason: String| {
        let err = ApiError::Decode(reason);
        sink.report(&err);
        ServiceError::Api(err)
    };

    let token = response
        .map(|response| response.access_token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| rejected("the server did not return a token".to_string()))?;

    let user = AuthenticatedUser::from_jwt(&token, secret).map_err(|err| {
        log::error!("Backend issued an unreadable token: {err}");
        rejected("the server returned an invalid token".to_string())
    })?;

    Ok(SignedIn { token, user })
}
