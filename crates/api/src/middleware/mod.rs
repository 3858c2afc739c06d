//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires an active console operator
//!   (super-admin account type, staff, or superuser).

pub mod auth;
pub mod rbac;
