//! Role-based access control extractors.
//!
//! Console access depends on flags an operator can change at any time, so
//! the check reads the current user row instead of trusting token claims.

use akademik_core::error::CoreError;
use akademik_db::models::user::User;
use akademik_db::repositories::UserRepo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an active super-admin, staff or superuser account.
/// Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn operator_only(RequireAdmin(operator): RequireAdmin) -> AppResult<Json<()>> {
///     tracing::info!(user_id = operator.id, "console access");
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let user = UserRepo::find_by_id(&state.pool, auth.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
            })?;

        if !user.is_console_operator() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Super admin or staff access required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
