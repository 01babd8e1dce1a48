//! HTTP inbound adapter exposing the REST endpoints.

pub mod cache_control;
pub mod error;
pub mod health;
pub mod routes;
pub mod state;

pub use error::ApiResult;
