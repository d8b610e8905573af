//! Form definitions backing the routes and the filter builder.

use thiserror::Error;
use validator::ValidationErrors;

use crate::forms::filter_builder::FilterBuildError;

pub mod auth;
pub mod authorities;
pub mod filter_builder;
pub mod list;
#[cfg(feature = "server")]
pub mod tickets;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    FilterBuild(#[from] FilterBuildError),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid page number")]
    InvalidPage,

    #[error("invalid sort order")]
    InvalidSort,

    #[error("invalid state")]
    InvalidState,

    #[error("invalid file")]
    InvalidFile,
}
