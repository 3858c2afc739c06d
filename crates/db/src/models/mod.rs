//! Domain model structs and DTOs.
//!
//! Each entity submodule contains:
//! - A `FromRow` struct matching the database row
//! - The write DTO(s) consumed by its repository
//! - The `Serialize` read projection returned to API clients

pub mod console;
pub mod lecturer;
pub mod student;
pub mod user;
