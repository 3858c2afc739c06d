//! Handlers for the `/lecturers` resource.

use akademik_core::error::CoreError;
use akademik_core::types::DbId;
use akademik_db::models::lecturer::{LecturerProfile, LecturerResponse};
use akademik_db::repositories::LecturerRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::serializers::lecturer::{
    lecturer_response, lecturer_responses, LecturerInput, LecturerPatch, OWNER,
};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "LecturerProfile",
        id,
    })
}

async fn load(state: &AppState, id: DbId) -> AppResult<LecturerProfile> {
    LecturerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/lecturers
pub async fn list_lecturers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<LecturerResponse>>>> {
    let (limit, offset) = params.resolve();
    let profiles = LecturerRepo::list(&state.pool, limit, offset).await?;
    let data = lecturer_responses(&state.pool, &profiles).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/lecturers
///
/// `user_id` must reference a `dosen` account without a lecturer profile.
pub async fn create_lecturer(
    State(state): State<AppState>,
    RequireAdmin(operator): RequireAdmin,
    JsonBody(input): JsonBody<LecturerInput>,
) -> AppResult<(StatusCode, Json<DataResponse<LecturerResponse>>)> {
    let row = input.clean(&state.pool, OWNER, None).await?;
    let profile = LecturerRepo::create(&state.pool, &row).await?;

    tracing::info!(
        lecturer_id = profile.id,
        user_id = profile.user_id,
        operator_id = operator.id,
        "Lecturer profile created"
    );

    let data = lecturer_response(&state.pool, &profile).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/lecturers/{id}
pub async fn get_lecturer(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LecturerResponse>>> {
    let profile = load(&state, id).await?;
    let data = lecturer_response(&state.pool, &profile).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/lecturers/{id}
pub async fn update_lecturer(
    State(state): State<AppState>,
    RequireAdmin(_operator): RequireAdmin,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<LecturerInput>,
) -> AppResult<Json<DataResponse<LecturerResponse>>> {
    load(&state, id).await?;
    save(&state, id, input).await
}

/// PATCH /api/v1/lecturers/{id}
pub async fn patch_lecturer(
    State(state): State<AppState>,
    RequireAdmin(_operator): RequireAdmin,
    Path(id): Path<DbId>,
    JsonBody(patch): JsonBody<LecturerPatch>,
) -> AppResult<Json<DataResponse<LecturerResponse>>> {
    let current = load(&state, id).await?;
    save(&state, id, patch.apply(LecturerInput::from(&current))).await
}

/// DELETE /api/v1/lecturers/{id}
///
/// Students advised by this lecturer keep their profile; their advisor is
/// cleared.
pub async fn delete_lecturer(
    State(state): State<AppState>,
    RequireAdmin(operator): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !LecturerRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(lecturer_id = id, operator_id = operator.id, "Lecturer profile deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn save(
    state: &AppState,
    id: DbId,
    input: LecturerInput,
) -> AppResult<Json<DataResponse<LecturerResponse>>> {
    let row = input.clean(&state.pool, OWNER, Some(id)).await?;
    let profile = LecturerRepo::update(&state.pool, id, &row)
        .await?
        .ok_or_else(|| not_found(id))?;
    let data = lecturer_response(&state.pool, &profile).await?;
    Ok(Json(DataResponse { data }))
}
