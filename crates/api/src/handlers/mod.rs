//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate validation to [`crate::serializers`] (or
//! [`crate::forms`] for the console), persistence to the repositories in
//! `akademik_db`, and map errors via [`crate::error::AppError`].

pub mod auth;
pub mod console;
pub mod lecturers;
pub mod students;
pub mod users;
