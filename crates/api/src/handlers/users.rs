//! Handlers for the `/users` resource.
//!
//! Reads require an authenticated principal; writes require a console
//! operator via [`RequireAdmin`].

use akademik_core::error::CoreError;
use akademik_core::principal::unusable_password;
use akademik_core::types::DbId;
use akademik_db::models::user::{User, UserResponse};
use akademik_db::repositories::UserRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::password::prepare_password;
use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::serializers::user::{UserInput, UserPatch};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

async fn load(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/users
///
/// Newest accounts first.
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (limit, offset) = params.resolve();
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/users
///
/// Without a `password` (or with an empty one) the account gets an
/// unusable credential.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(operator): RequireAdmin,
    JsonBody(input): JsonBody<UserInput>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let mut input = input.clean(&state.pool, None).await?;
    let password_hash = match supplied_password(&mut input) {
        Some(password) => {
            prepare_password("password", &password, state.config.min_password_length)?
        }
        None => unusable_password(),
    };

    let user = UserRepo::create(&state.pool, &input.into_create(password_hash)).await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        operator_id = operator.id,
        "User created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load(&state, id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/users/{id}
///
/// Full replacement: omitted optional fields are cleared.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_operator): RequireAdmin,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<UserInput>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let current = load(&state, id).await?;
    save(&state, &current, input).await
}

/// PATCH /api/v1/users/{id}
///
/// Partial update: only the supplied fields change.
pub async fn patch_user(
    State(state): State<AppState>,
    RequireAdmin(_operator): RequireAdmin,
    Path(id): Path<DbId>,
    JsonBody(patch): JsonBody<UserPatch>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let current = load(&state, id).await?;
    let input = patch.apply(UserInput::from(&current));
    save(&state, &current, input).await
}

/// DELETE /api/v1/users/{id}
///
/// Soft delete: the account is deactivated, never removed.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(operator): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let user = load(&state, id).await?;
    if UserRepo::deactivate(&state.pool, id).await? {
        tracing::info!(
            user_id = id,
            username = %user.username,
            operator_id = operator.id,
            "User deactivated"
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Take the write-only password out of `input`; empty counts as absent.
fn supplied_password(input: &mut UserInput) -> Option<String> {
    input.password.take().filter(|p| !p.is_empty())
}

async fn save(
    state: &AppState,
    current: &User,
    input: UserInput,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let mut input = input.clean(&state.pool, Some(current.id)).await?;

    let password_hash = supplied_password(&mut input)
        .map(|password| {
            prepare_password("password", &password, state.config.min_password_length)
        })
        .transpose()?;

    let update = input.into_update(current);
    let user = UserRepo::update(&state.pool, current.id, &update, password_hash.as_deref())
        .await?
        .ok_or_else(|| not_found(current.id))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
