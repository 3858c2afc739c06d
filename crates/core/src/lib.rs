//! Akademik domain core.
//!
//! Pure domain types and rules with no HTTP or repository dependencies:
//! identifiers, the error taxonomy, choice enumerations, user/profile
//! validation, the authenticatable principal contract, and the operator
//! console configuration.

pub mod admin;
pub mod choices;
pub mod error;
pub mod principal;
pub mod search;
pub mod types;
pub mod users;
