pub mod auth;
pub mod console;
pub mod health;
pub mod lecturers;
pub mod students;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                   register (public)
/// /auth/login                      login (public)
///
/// /users                           list (auth), create (operator)
/// /users/{id}                      get (auth), update, patch, deactivate (operator)
///
/// /lecturers                       list (auth), create (operator)
/// /lecturers/{id}                  get (auth), update, patch, delete (operator)
///
/// /students                        list (auth), create (operator)
/// /students/{id}                   get (auth), update, patch, delete (operator)
///
/// /console/{entity}                listing, add form (operator)
/// /console/{entity}/config         listing and form configuration (operator)
/// /console/{entity}/{id}           edit form, save (operator)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/lecturers", lecturers::router())
        .nest("/students", students::router())
        .nest("/console", console::router())
}
