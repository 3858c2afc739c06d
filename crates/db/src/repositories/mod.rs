//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub(crate) mod console;
pub mod lecturer_repo;
pub mod student_repo;
pub mod user_repo;

pub use lecturer_repo::LecturerRepo;
pub use student_repo::StudentRepo;
pub use user_repo::UserRepo;
