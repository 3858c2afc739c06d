//! Route definitions for the `/lecturers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::lecturers;
use crate::state::AppState;

/// Routes mounted at `/lecturers`.
///
/// ```text
/// GET    /          -> list_lecturers
/// POST   /          -> create_lecturer
/// GET    /{id}      -> get_lecturer
/// PUT    /{id}      -> update_lecturer
/// PATCH  /{id}      -> patch_lecturer
/// DELETE /{id}      -> delete_lecturer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(lecturers::list_lecturers).post(lecturers::create_lecturer),
        )
        .route(
            "/{id}",
            get(lecturers::get_lecturer)
                .put(lecturers::update_lecturer)
                .patch(lecturers::patch_lecturer)
                .delete(lecturers::delete_lecturer),
        )
}
