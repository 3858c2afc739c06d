//! Route definitions for the `/console` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::console;
use crate::state::AppState;

/// Routes mounted at `/console`.
///
/// `{entity}` is one of `users`, `lecturers`, `students`. All routes require
/// a console operator.
///
/// ```text
/// GET  /{entity}           -> list_records
/// POST /{entity}           -> add_record
/// GET  /{entity}/config    -> get_config
/// GET  /{entity}/{id}      -> get_record
/// PUT  /{entity}/{id}      -> edit_record
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{entity}",
            get(console::list_records).post(console::add_record),
        )
        .route("/{entity}/config", get(console::get_config))
        .route(
            "/{entity}/{id}",
            get(console::get_record).put(console::edit_record),
        )
}
