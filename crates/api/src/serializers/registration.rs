//! Public self-registration.

use akademik_core::choices::{Gender, UserType};
use akademik_core::error::CoreError;
use akademik_core::principal::unusable_password;
use akademik_core::types::Date;
use akademik_core::users::{blank_to_none, validate_password_confirmation, validate_username};
use akademik_db::models::user::{CreateUser, User};
use akademik_db::repositories::UserRepo;
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use super::user::ensure_unique_identity;
use crate::auth::password::{prepare_password, validate_password_strength};
use crate::error::AppResult;

/// Registration payload. `password` and `password_confirm` are write-only.
#[derive(Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegistrationInput {
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
    #[validate(length(max = 15, message = "Ensure this field has no more than 15 characters."))]
    pub phone_number: Option<String>,
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub tempat_lahir: Option<String>,
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    pub password: String,
    pub password_confirm: String,
}

impl std::fmt::Debug for RegistrationInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("username", &self.username)
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}

impl RegistrationInput {
    /// Run every check that does not need the database.
    fn check(&self, min_password_length: usize) -> Result<(), CoreError> {
        self.validate()?;
        validate_password_confirmation(&self.password, &self.password_confirm)?;
        validate_password_strength("password", &self.password, min_password_length)
    }

    /// Validate, then create the account.
    ///
    /// The record is inserted with an unusable credential and the hashed
    /// password is applied afterwards, both inside one transaction, so a
    /// failure at either step leaves nothing behind.
    pub async fn register(mut self, pool: &PgPool, min_password_length: usize) -> AppResult<User> {
        self.email = blank_to_none(self.email);
        self.check(min_password_length)?;
        ensure_unique_identity(pool, &self.username, self.email.as_deref(), None).await?;

        let password_hash = prepare_password("password", &self.password, min_password_length)?;
        let create = CreateUser {
            username: self.username,
            password_hash: unusable_password(),
            full_name: self.full_name,
            user_type: self.user_type,
            profile_picture: None,
            phone_number: self.phone_number,
            email: self.email,
            program_studi: None,
            tempat_lahir: self.tempat_lahir,
            birth_date: self.birth_date,
            gender: self.gender,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        };

        let user = UserRepo::create_then_set_password(pool, &create, &password_hash).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akademik_core::users::PASSWORD_MISMATCH;
    use assert_matches::assert_matches;

    fn registration(json: serde_json::Value) -> RegistrationInput {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn mismatched_confirmation_is_a_cross_field_error() {
        let input = registration(serde_json::json!({
            "username": "budi",
            "password": "x1",
            "password_confirm": "x2",
            "user_type": "mahasiswa"
        }));
        let err = input.check(1).unwrap_err();
        assert_matches!(err, CoreError::CrossField(msg) if msg == PASSWORD_MISMATCH);
    }

    #[test]
    fn every_user_type_may_register() {
        for tag in ["super_admin", "dosen", "mahasiswa"] {
            let input = registration(serde_json::json!({
                "username": "root",
                "password": "x1",
                "password_confirm": "x1",
                "user_type": tag
            }));
            assert!(input.check(1).is_ok());
        }
    }

    #[test]
    fn short_password_fails_configured_policy() {
        let input = registration(serde_json::json!({
            "username": "budi",
            "password": "x1",
            "password_confirm": "x1"
        }));
        assert!(input.check(1).is_ok());
        assert_eq!(input.check(8).unwrap_err().field(), Some("password"));
    }

    #[test]
    fn confirmation_is_required() {
        let result = serde_json::from_value::<RegistrationInput>(serde_json::json!({
            "username": "budi",
            "password": "x1"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn debug_output_omits_passwords() {
        let input = registration(serde_json::json!({
            "username": "budi",
            "password": "s3cret",
            "password_confirm": "s3cret"
        }));
        assert!(!format!("{input:?}").contains("s3cret"));
    }
}
