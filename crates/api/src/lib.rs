//! Akademik API server library.
//!
//! Exposes the building blocks (config, state, error handling, serializers,
//! routes) so integration tests and the binary entrypoint can both use them.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod serializers;
pub mod state;
