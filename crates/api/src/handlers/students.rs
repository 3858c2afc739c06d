//! Handlers for the `/students` resource.

use akademik_core::error::CoreError;
use akademik_core::types::DbId;
use akademik_db::models::student::{StudentProfile, StudentResponse};
use akademik_db::repositories::StudentRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::serializers::student::{
    student_response, student_responses, StudentInput, StudentPatch, OWNER,
};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "StudentProfile",
        id,
    })
}

async fn load(state: &AppState, id: DbId) -> AppResult<StudentProfile> {
    StudentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/students
///
/// Ordered by cohort, class, then student number.
pub async fn list_students(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<StudentResponse>>>> {
    let (limit, offset) = params.resolve();
    let profiles = StudentRepo::list(&state.pool, limit, offset).await?;
    let data = student_responses(&state.pool, &profiles).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/students
///
/// `user_id` must reference a `mahasiswa` account without a student profile.
pub async fn create_student(
    State(state): State<AppState>,
    RequireAdmin(operator): RequireAdmin,
    JsonBody(input): JsonBody<StudentInput>,
) -> AppResult<(StatusCode, Json<DataResponse<StudentResponse>>)> {
    let row = input.clean(&state.pool, OWNER, None).await?;
    let profile = StudentRepo::create(&state.pool, &row).await?;

    tracing::info!(
        student_id = profile.id,
        user_id = profile.user_id,
        operator_id = operator.id,
        "Student profile created"
    );

    let data = student_response(&state.pool, &profile).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StudentResponse>>> {
    let profile = load(&state, id).await?;
    let data = student_response(&state.pool, &profile).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/students/{id}
pub async fn update_student(
    State(state): State<AppState>,
    RequireAdmin(_operator): RequireAdmin,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<StudentInput>,
) -> AppResult<Json<DataResponse<StudentResponse>>> {
    load(&state, id).await?;
    save(&state, id, input).await
}

/// PATCH /api/v1/students/{id}
///
/// The owner's account type is re-checked even when `user_id` is omitted.
pub async fn patch_student(
    State(state): State<AppState>,
    RequireAdmin(_operator): RequireAdmin,
    Path(id): Path<DbId>,
    JsonBody(patch): JsonBody<StudentPatch>,
) -> AppResult<Json<DataResponse<StudentResponse>>> {
    let current = load(&state, id).await?;
    save(&state, id, patch.apply(StudentInput::from(&current))).await
}

/// DELETE /api/v1/students/{id}
pub async fn delete_student(
    State(state): State<AppState>,
    RequireAdmin(operator): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !StudentRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(student_id = id, operator_id = operator.id, "Student profile deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn save(
    state: &AppState,
    id: DbId,
    input: StudentInput,
) -> AppResult<Json<DataResponse<StudentResponse>>> {
    let row = input.clean(&state.pool, OWNER, Some(id)).await?;
    let profile = StudentRepo::update(&state.pool, id, &row)
        .await?
        .ok_or_else(|| not_found(id))?;
    let data = student_response(&state.pool, &profile).await?;
    Ok(Json(DataResponse { data }))
}
