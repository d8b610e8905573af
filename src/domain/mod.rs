pub mod auth;
pub mod authority;
pub mod pageable;
pub mod query;
pub mod ticket;
pub mod types;
pub mod user;
pub mod workflow;
