//! User entity model and DTOs.

use akademik_core::choices::{Gender, StudyProgram, UserType};
use akademik_core::principal::Principal;
use akademik_core::types::{Date, DbId, Timestamp};
use akademik_core::users::display_name;
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub user_type: UserType,
    pub profile_picture: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub program_studi: Option<StudyProgram>,
    pub tempat_lahir: Option<String>,
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<Timestamp>,
    pub date_joined: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Full name, or the username when no full name is set.
    pub fn display_name(&self) -> &str {
        display_name(self.full_name.as_deref(), &self.username)
    }

    /// Super-admins and staff accounts may use the operator console.
    pub fn is_console_operator(&self) -> bool {
        self.is_active && (self.user_type == UserType::SuperAdmin || self.is_staff || self.is_superuser)
    }
}

impl Principal for User {
    fn principal_id(&self) -> DbId {
        self.id
    }

    fn credential_hash(&self) -> &str {
        &self.password_hash
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Safe user representation for API responses (no password hash).
///
/// `id`, `created_at` and `updated_at` are output-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub user_type: UserType,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub tempat_lahir: Option<String>,
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    pub program_studi: Option<StudyProgram>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            user_type: user.user_type,
            phone_number: user.phone_number.clone(),
            profile_picture: user.profile_picture.clone(),
            tempat_lahir: user.tempat_lahir.clone(),
            birth_date: user.birth_date,
            gender: user.gender,
            program_studi: user.program_studi,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for inserting a user.
///
/// `password_hash` must already be a hash or an unusable marker; plaintext
/// never reaches this layer.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub user_type: UserType,
    pub profile_picture: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub program_studi: Option<StudyProgram>,
    pub tempat_lahir: Option<String>,
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// DTO for replacing a user's editable attributes.
///
/// Every field is written as given (including `None` → NULL); partial
/// updates are merged onto the current row before reaching the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateUser {
    pub username: String,
    pub full_name: Option<String>,
    pub user_type: UserType,
    pub profile_picture: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub program_studi: Option<StudyProgram>,
    pub tempat_lahir: Option<String>,
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl From<&User> for UpdateUser {
    fn from(user: &User) -> Self {
        UpdateUser {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            user_type: user.user_type,
            profile_picture: user.profile_picture.clone(),
            phone_number: user.phone_number.clone(),
            email: user.email.clone(),
            program_studi: user.program_studi,
            tempat_lahir: user.tempat_lahir.clone(),
            birth_date: user.birth_date,
            gender: user.gender,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}
