//! The signed-in user, decoded from the application token kept in the identity cookie.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{FromRequest, HttpRequest, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::types::TenantId;
use crate::models::config::ServerConfig;

/// Claims of the application token issued by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub authorities: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|candidate| candidate == authority)
    }

    /// Pushes the expiry `days` into the future.
    pub fn set_expiration(&mut self, days: i64) {
        let expiration = Utc::now() + Duration::days(days);
        self.exp = expiration.timestamp().max(0) as usize;
    }

    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, actix_web::Error> {
        let identity = req
            .get_identity()
            .map_err(|_| ErrorUnauthorized("Not signed in"))?;
        let token = identity
            .id()
            .map_err(|_| ErrorUnauthorized("Not signed in"))?;
        let config = req
            .app_data::<web::Data<ServerConfig>>()
            .ok_or_else(|| ErrorInternalServerError("Server configuration is missing"))?;

        Self::from_jwt(&token, &config.secret).map_err(|err| {
            log::info!("Rejected session token: {err}");
            ErrorUnauthorized("Session expired")
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthenticatedUser {
        let mut user = AuthenticatedUser {
            sub: "7".to_string(),
            email: "agent@example.com".to_string(),
            tenant_id: TenantId::new(3).unwrap(),
            name: "Agent".to_string(),
            authorities: vec!["ticketing".to_string()],
            exp: 0,
        };
        user.set_expiration(1);
        user
    }

    #[test]
    fn jwt_round_trip_with_shared_secret() {
        let user = user();
        let token = user.to_jwt("secret").unwrap();
        assert_eq!(AuthenticatedUser::from_jwt(&token, "secret").unwrap(), user);
        assert!(AuthenticatedUser::from_jwt(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut user = user();
        user.set_expiration(-2);
        let token = user.to_jwt("secret").unwrap();
        assert!(AuthenticatedUser::from_jwt(&token, "secret").is_err());
    }

    #[test]
    fn authority_check() {
        let user = user();
        assert!(user.has_authority("ticketing"));
        assert!(!user.has_authority("ticketing_admin"));
    }
}
