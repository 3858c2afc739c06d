//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// Reads require authentication; writes require a console operator
/// (enforced by handler extractors).
///
/// ```text
/// GET    /          -> list_users
/// POST   /          -> create_user
/// GET    /{id}      -> get_user
/// PUT    /{id}      -> update_user
/// PATCH  /{id}      -> patch_user
/// DELETE /{id}      -> deactivate_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::patch_user)
                .delete(users::deactivate_user),
        )
}
