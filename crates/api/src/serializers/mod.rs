//! Transport projections and write-path validation.
//!
//! Each entity has a write type (`*Input`, full replacement), a partial
//! write type (`*Patch`), and a read type (the `*Response` structs in
//! `akademik_db::models`). Write types reject unknown and read-only fields.

pub mod lecturer;
pub mod registration;
pub mod student;
pub mod user;

use akademik_core::choices::UserType;
use akademik_core::error::CoreError;
use akademik_core::types::DbId;
use akademik_db::models::user::User;
use akademik_db::repositories::UserRepo;
use serde::{Deserialize, Deserializer};
use sqlx::PgPool;

use crate::error::AppResult;

/// Deserialize a present field (even `null`) as `Some(..)`.
///
/// Combined with `#[serde(default)]` this distinguishes an absent field
/// (`None`) from an explicit `null` (`Some(None)`) in PATCH bodies.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Fail with a uniqueness error when `taken` is true.
pub fn ensure_unique(taken: bool, entity: &'static str, field: &str) -> Result<(), CoreError> {
    if taken {
        return Err(CoreError::Uniqueness {
            entity,
            field: field.to_string(),
        });
    }
    Ok(())
}

/// How a profile's owning-user reference is resolved.
#[derive(Debug, Clone, Copy)]
pub struct OwnerRule {
    /// Input field carrying the user id (reported on errors).
    pub field: &'static str,
    /// When set, only users of this account type are candidates.
    pub role: Option<UserType>,
}

/// Resolve an owner id against the candidate set described by `rule`.
///
/// An id outside the candidate set is reported exactly like an id that
/// does not exist.
pub async fn resolve_owner(pool: &PgPool, user_id: DbId, rule: OwnerRule) -> AppResult<User> {
    let owner = match rule.role {
        Some(role) => UserRepo::find_by_id_and_type(pool, user_id, role).await?,
        None => UserRepo::find_by_id(pool, user_id).await?,
    };
    owner.ok_or_else(|| CoreError::reference(rule.field, user_id).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "double_option")]
        email: Option<Option<String>>,
    }

    #[test]
    fn double_option_distinguishes_absent_from_null() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.email, None);

        let null: Probe = serde_json::from_str(r#"{"email": null}"#).unwrap();
        assert_eq!(null.email, Some(None));

        let set: Probe = serde_json::from_str(r#"{"email": "a@b.id"}"#).unwrap();
        assert_eq!(set.email, Some(Some("a@b.id".into())));
    }

    #[test]
    fn ensure_unique_reports_entity_and_field() {
        assert!(ensure_unique(false, "user", "username").is_ok());
        let err = ensure_unique(true, "user", "username").unwrap_err();
        assert_eq!(err.to_string(), "user with this username already exists.");
        assert_matches!(err, CoreError::Uniqueness { field, .. } if field == "username");
    }
}
