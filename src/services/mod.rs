//! Page-level operations. Each service checks the user's authority, turns
//! form input into backend calls and returns the data a template needs.

use thiserror::Error;

use crate::client::ApiError;
use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;

pub mod auth;
pub mod authorities;
pub mod listing;
pub mod tickets;
pub mod users;
pub mod workflows;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("insufficient authority")]
    Unauthorized,

    #[error("{0}")]
    Form(String),

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),
}

impl ServiceError {
    /// True when the backend rejected the session and it was signed out.
    pub fn is_signed_out(&self) -> bool {
        matches!(self, ServiceError::Api(err) if err.is_signed_out())
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
