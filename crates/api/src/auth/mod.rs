//! Authentication primitives.
//!
//! - [`password`] -- Argon2id hashing and the password acceptance policy.
//! - [`jwt`] -- HS256 access-token generation and validation.

pub mod jwt;
pub mod password;
