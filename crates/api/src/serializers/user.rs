//! User write projections.
//!
//! The read projection is [`akademik_db::models::user::UserResponse`]; it
//! never carries the password hash.

use akademik_core::choices::{Gender, StudyProgram, UserType};
use akademik_core::types::{Date, DbId};
use akademik_core::users::{blank_to_none, validate_username};
use akademik_db::models::user::{CreateUser, UpdateUser, User};
use akademik_db::repositories::UserRepo;
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use super::{double_option, ensure_unique};
use crate::error::AppResult;

pub const ENTITY: &str = "user";

fn default_true() -> bool {
    true
}

/// Full user write payload (POST, PUT).
///
/// `id`, `created_at` and `updated_at` are output-only and rejected here.
/// `password` is write-only and hashed before it reaches storage.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserInput {
    #[validate(
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub full_name: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub profile_picture: Option<String>,
    #[validate(length(max = 15, message = "Ensure this field has no more than 15 characters."))]
    pub phone_number: Option<String>,
    pub program_studi: Option<StudyProgram>,
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub tempat_lahir: Option<String>,
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub password: Option<String>,
}

impl From<&User> for UserInput {
    fn from(user: &User) -> Self {
        UserInput {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            user_type: user.user_type,
            profile_picture: user.profile_picture.clone(),
            phone_number: user.phone_number.clone(),
            program_studi: user.program_studi,
            tempat_lahir: user.tempat_lahir.clone(),
            birth_date: user.birth_date,
            gender: user.gender,
            is_active: user.is_active,
            password: None,
        }
    }
}

impl UserInput {
    /// Validate field rules, then check uniqueness against every user other
    /// than `existing`.
    ///
    /// Blank emails are normalized to absent first.
    pub async fn clean(mut self, pool: &PgPool, existing: Option<DbId>) -> AppResult<Self> {
        self.email = blank_to_none(self.email);
        self.validate()?;
        ensure_unique_identity(pool, &self.username, self.email.as_deref(), existing).await?;
        Ok(self)
    }

    /// Insert DTO; staff flags are not writable through this projection.
    pub fn into_create(self, password_hash: String) -> CreateUser {
        CreateUser {
            username: self.username,
            password_hash,
            full_name: self.full_name,
            user_type: self.user_type,
            profile_picture: self.profile_picture,
            phone_number: self.phone_number,
            email: self.email,
            program_studi: self.program_studi,
            tempat_lahir: self.tempat_lahir,
            birth_date: self.birth_date,
            gender: self.gender,
            is_active: self.is_active,
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Update DTO that keeps `current`'s staff flags.
    pub fn into_update(self, current: &User) -> UpdateUser {
        UpdateUser {
            username: self.username,
            full_name: self.full_name,
            user_type: self.user_type,
            profile_picture: self.profile_picture,
            phone_number: self.phone_number,
            email: self.email,
            program_studi: self.program_studi,
            tempat_lahir: self.tempat_lahir,
            birth_date: self.birth_date,
            gender: self.gender,
            is_active: self.is_active,
            is_staff: current.is_staff,
            is_superuser: current.is_superuser,
        }
    }
}

/// Username and email must be free, ignoring the record being edited.
pub async fn ensure_unique_identity(
    pool: &PgPool,
    username: &str,
    email: Option<&str>,
    existing: Option<DbId>,
) -> AppResult<()> {
    ensure_unique(
        UserRepo::username_taken(pool, username, existing).await?,
        ENTITY,
        "username",
    )?;
    if let Some(email) = email {
        ensure_unique(UserRepo::email_taken(pool, email, existing).await?, ENTITY, "email")?;
    }
    Ok(())
}

/// Partial user write payload (PATCH). Absent fields keep their value;
/// `null` clears a nullable field.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub username: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    pub user_type: Option<UserType>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub program_studi: Option<Option<StudyProgram>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tempat_lahir: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gender: Option<Option<Gender>>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

impl UserPatch {
    /// Overlay the supplied fields onto `base`.
    pub fn apply(self, mut base: UserInput) -> UserInput {
        if let Some(v) = self.username {
            base.username = v;
        }
        if let Some(v) = self.full_name {
            base.full_name = v;
        }
        if let Some(v) = self.email {
            base.email = v;
        }
        if let Some(v) = self.user_type {
            base.user_type = v;
        }
        if let Some(v) = self.profile_picture {
            base.profile_picture = v;
        }
        if let Some(v) = self.phone_number {
            base.phone_number = v;
        }
        if let Some(v) = self.program_studi {
            base.program_studi = v;
        }
        if let Some(v) = self.tempat_lahir {
            base.tempat_lahir = v;
        }
        if let Some(v) = self.birth_date {
            base.birth_date = v;
        }
        if let Some(v) = self.gender {
            base.gender = v;
        }
        if let Some(v) = self.is_active {
            base.is_active = v;
        }
        if self.password.is_some() {
            base.password = self.password;
        }
        base
    }
}
