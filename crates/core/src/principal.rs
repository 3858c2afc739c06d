//! The authenticatable principal contract.
//!
//! Any account record that can log in exposes an id, a stored credential
//! hash, and an active flag. Hashing itself lives in the API crate; this
//! module only knows how an unusable credential is marked.

use crate::types::DbId;

/// Prefix marking a stored credential that can never match a password.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// Build a fresh unusable credential.
///
/// Used as the placeholder for records created before (or without) a
/// password being set. The random suffix keeps placeholders distinct.
pub fn unusable_password() -> String {
    format!("{UNUSABLE_PASSWORD_PREFIX}{}", uuid::Uuid::new_v4().simple())
}

pub trait Principal {
    fn principal_id(&self) -> DbId;

    /// The stored credential (a PHC hash string or an unusable marker).
    fn credential_hash(&self) -> &str;

    fn is_active(&self) -> bool;

    fn has_usable_password(&self) -> bool {
        !self.credential_hash().starts_with(UNUSABLE_PASSWORD_PREFIX)
    }
}
