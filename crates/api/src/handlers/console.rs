//! Handlers for the operator console (`/console/{entity}`).
//!
//! Every handler requires a console operator via [`RequireAdmin`]. The
//! entity segment selects a [`ModelAdmin`] from the static registry; list,
//! add and edit behaviour follow that configuration.

use std::collections::{BTreeMap, HashMap};

use akademik_core::admin::{
    model_admin, DateRange, Fieldset, ModelAdmin, ENTITY_LECTURERS, ENTITY_STUDENTS, ENTITY_USERS,
};
use akademik_core::choices::{
    AcademicRank, Choice, ClassSection, EducationLevel, EmploymentStatus, Gender, StudentStatus,
    UserType,
};
use akademik_core::error::CoreError;
use akademik_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use akademik_core::types::{DbId, Timestamp};
use akademik_db::models::console::{ConsoleFilter, ConsoleQuery};
use akademik_db::models::lecturer::LecturerProfile;
use akademik_db::models::student::StudentProfile;
use akademik_db::models::user::User;
use akademik_db::repositories::{LecturerRepo, StudentRepo, UserRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::forms::{password_summary, LecturerForm, StudentForm, UserAddForm, UserChangeForm};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query keys that are not filters.
const RESERVED_PARAMS: &[&str] = &["search", "ordering", "limit", "offset"];

const IS_NULL_SUFFIX: &str = "__isnull";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// `GET /console/{entity}/config`.
#[derive(Debug, Serialize)]
pub struct ConsoleConfig {
    #[serde(flatten)]
    pub admin: &'static ModelAdmin,
    /// Fixed choices for enumeration-backed filters.
    pub filter_choices: BTreeMap<&'static str, Vec<Choice>>,
    /// Accepted values for date filters.
    pub date_ranges: Vec<&'static str>,
}

/// One listing row: the record id, its display label, and the configured
/// listing columns.
#[derive(Debug, Serialize)]
pub struct ConsoleRow {
    pub id: DbId,
    pub label: String,
    pub columns: Map<String, Value>,
}

/// An add or edit form with its current values.
#[derive(Debug, Serialize)]
pub struct ConsoleForm<T: Serialize> {
    pub id: DbId,
    pub label: String,
    pub fieldsets: &'static [Fieldset],
    pub values: T,
    /// Values of read-only fields, shown but never accepted.
    pub readonly: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/console/{entity}/config
pub async fn get_config(
    RequireAdmin(_operator): RequireAdmin,
    Path(entity): Path<String>,
) -> AppResult<Json<DataResponse<ConsoleConfig>>> {
    let admin = resolve_entity(&entity)?;
    Ok(Json(DataResponse {
        data: ConsoleConfig {
            admin,
            filter_choices: filter_choices(admin),
            date_ranges: DateRange::ALL.iter().map(|r| r.as_str()).collect(),
        },
    }))
}

/// GET /api/v1/console/{entity}
///
/// `search` matches every whitespace-separated term against the configured
/// search fields. Other keys filter (`field=value`, `field__isnull=true`, or
/// a date range name for date filters). `ordering` accepts listed columns
/// with an optional `-` prefix.
pub async fn list_records(
    State(state): State<AppState>,
    RequireAdmin(_operator): RequireAdmin,
    Path(entity): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<DataResponse<Vec<ConsoleRow>>>> {
    let admin = resolve_entity(&entity)?;
    let query = console_query(admin, &params, Utc::now().date_naive())?;

    let rows = match admin.entity {
        ENTITY_USERS => {
            let users = UserRepo::console_list(&state.pool, &query).await?;
            users.iter().map(|u| user_row(admin, u)).collect()
        }
        ENTITY_LECTURERS => {
            let profiles = LecturerRepo::console_list(&state.pool, &query).await?;
            lecturer_rows(&state.pool, admin, &profiles).await?
        }
        _ => {
            let profiles = StudentRepo::console_list(&state.pool, &query).await?;
            student_rows(&state.pool, admin, &profiles).await?
        }
    };

    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/console/{entity}
///
/// Submit the add form. Responds with the new record's edit form.
pub async fn add_record(
    State(state): State<AppState>,
    RequireAdmin(operator): RequireAdmin,
    Path(entity): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<Value>>)> {
    let admin = resolve_entity(&entity)?;
    let pool = &state.pool;

    let id = match admin.entity {
        ENTITY_USERS => {
            let form: UserAddForm = parse_form(body)?;
            let user = form.save(pool, state.config.min_password_length).await?;
            user.id
        }
        ENTITY_LECTURERS => {
            let form: LecturerForm = parse_form(body)?;
            let row = form.clean(pool, None).await?;
            LecturerRepo::create(pool, &row).await?.id
        }
        _ => {
            let form: StudentForm = parse_form(body)?;
            let row = form.clean(pool, None).await?;
            StudentRepo::create(pool, &row).await?.id
        }
    };

    tracing::info!(entity = admin.entity, id, operator_id = operator.id, "Console record added");

    let data = edit_form(pool, admin, id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/console/{entity}/{id}
pub async fn get_record(
    State(state): State<AppState>,
    RequireAdmin(_operator): RequireAdmin,
    Path((entity, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Value>>> {
    let admin = resolve_entity(&entity)?;
    let data = edit_form(&state.pool, admin, id).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/console/{entity}/{id}
///
/// Submit the edit form. Every editable field must be present.
pub async fn edit_record(
    State(state): State<AppState>,
    RequireAdmin(operator): RequireAdmin,
    Path((entity, id)): Path<(String, DbId)>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<DataResponse<Value>>> {
    let admin = resolve_entity(&entity)?;
    let pool = &state.pool;
    let missing = || not_found(admin, id);

    match admin.entity {
        ENTITY_USERS => {
            let form: UserChangeForm = parse_form(body)?;
            UserRepo::find_by_id(pool, id).await?.ok_or_else(missing)?;
            let row = form.clean(pool, id).await?;
            UserRepo::update(pool, id, &row, None).await?.ok_or_else(missing)?;
        }
        ENTITY_LECTURERS => {
            let form: LecturerForm = parse_form(body)?;
            LecturerRepo::find_by_id(pool, id).await?.ok_or_else(missing)?;
            let row = form.clean(pool, Some(id)).await?;
            LecturerRepo::update(pool, id, &row).await?.ok_or_else(missing)?;
        }
        _ => {
            let form: StudentForm = parse_form(body)?;
            StudentRepo::find_by_id(pool, id).await?.ok_or_else(missing)?;
            let row = form.clean(pool, Some(id)).await?;
            StudentRepo::update(pool, id, &row).await?.ok_or_else(missing)?;
        }
    }

    tracing::info!(entity = admin.entity, id, operator_id = operator.id, "Console record changed");

    let data = edit_form(pool, admin, id).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

fn resolve_entity(entity: &str) -> AppResult<&'static ModelAdmin> {
    model_admin(entity)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown console entity '{entity}'")))
}

fn not_found(admin: &ModelAdmin, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: admin.verbose_name,
        id,
    })
}

/// Translate listing query parameters into a [`ConsoleQuery`].
///
/// `today` anchors relative date ranges.
pub fn console_query(
    admin: &'static ModelAdmin,
    params: &HashMap<String, String>,
    today: NaiveDate,
) -> Result<ConsoleQuery, CoreError> {
    let ordering = admin.resolve_ordering(params.get("ordering").map(String::as_str))?;
    let limit = params
        .get("limit")
        .map(|v| parse_number("limit", v))
        .transpose()?;
    let offset = params
        .get("offset")
        .map(|v| parse_number("offset", v))
        .transpose()?;

    let mut keys: Vec<&String> = params
        .keys()
        .filter(|k| !RESERVED_PARAMS.contains(&k.as_str()))
        .collect();
    keys.sort();

    let mut filters = Vec::with_capacity(keys.len());
    for key in keys {
        let value = &params[key];
        filters.push(parse_filter(admin, key, value, today)?);
    }

    Ok(ConsoleQuery {
        search: params
            .get("search")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        search_fields: admin.search_fields,
        filters,
        ordering,
        limit: clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        offset: clamp_offset(offset),
    })
}

fn parse_number(name: &str, raw: &str) -> Result<i64, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::invalid(name, "A valid integer is required."))
}

fn parse_filter(
    admin: &'static ModelAdmin,
    key: &str,
    value: &str,
    today: NaiveDate,
) -> Result<ConsoleFilter, CoreError> {
    let cannot_filter = || CoreError::invalid(key, format!("Cannot filter by '{key}'"));

    if let Some(name) = key.strip_suffix(IS_NULL_SUFFIX) {
        let field = admin.filter_field(name).ok_or_else(cannot_filter)?;
        if value != "true" {
            return Err(CoreError::invalid(key, "Only 'true' is accepted."));
        }
        return Ok(ConsoleFilter::IsNull { field });
    }

    let field = admin.filter_field(key).ok_or_else(cannot_filter)?;
    if admin.is_date_filter(field) {
        let (start, end) = DateRange::parse(value)?.bounds(today);
        return Ok(ConsoleFilter::Range {
            field,
            start: midnight_utc(start),
            end: midnight_utc(end),
        });
    }
    Ok(ConsoleFilter::Equals {
        field,
        value: value.to_string(),
    })
}

fn midnight_utc(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn filter_choices(admin: &ModelAdmin) -> BTreeMap<&'static str, Vec<Choice>> {
    let booleans = || {
        vec![
            Choice { value: "true", label: "Yes" },
            Choice { value: "false", label: "No" },
        ]
    };
    admin
        .list_filter
        .iter()
        .filter_map(|field| {
            let choices = match (admin.entity, *field) {
                (ENTITY_USERS, "user_type") => UserType::choices(),
                (ENTITY_USERS, "gender") => Gender::choices(),
                (ENTITY_USERS, "is_active") => booleans(),
                (ENTITY_LECTURERS, "jabatan_akademik") => AcademicRank::choices(),
                (ENTITY_LECTURERS, "pendidikan_terakhir") => EducationLevel::choices(),
                (ENTITY_LECTURERS, "status_kepegawaian") => EmploymentStatus::choices(),
                (ENTITY_STUDENTS, "kelas") => ClassSection::choices(),
                (ENTITY_STUDENTS, "status") => StudentStatus::choices(),
                _ => return None,
            };
            Some((*field, choices))
        })
        .collect()
}

fn parse_form<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

// ---------------------------------------------------------------------------
// Listing rows
// ---------------------------------------------------------------------------

fn user_row(admin: &ModelAdmin, user: &User) -> ConsoleRow {
    let columns = admin
        .list_display
        .iter()
        .map(|field| {
            let value = match *field {
                "username" => json!(user.username),
                "full_name" => json!(user.full_name),
                "email" => json!(user.email),
                "user_type" => json!(user.user_type.label()),
                "is_active" => json!(user.is_active),
                "created_at" => json!(user.created_at),
                _ => Value::Null,
            };
            (field.to_string(), value)
        })
        .collect();
    ConsoleRow {
        id: user.id,
        label: user.username.clone(),
        columns,
    }
}

async fn users_by_id(pool: &PgPool, ids: &[DbId]) -> AppResult<HashMap<DbId, User>> {
    Ok(UserRepo::find_by_ids(pool, ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

fn owner<'a>(owners: &'a HashMap<DbId, User>, id: DbId) -> AppResult<&'a User> {
    owners
        .get(&id)
        .ok_or_else(|| AppError::InternalError(format!("user {id} missing for profile")))
}

async fn lecturer_rows(
    pool: &PgPool,
    admin: &ModelAdmin,
    profiles: &[LecturerProfile],
) -> AppResult<Vec<ConsoleRow>> {
    let ids: Vec<DbId> = profiles.iter().map(|p| p.user_id).collect();
    let owners = users_by_id(pool, &ids).await?;

    profiles
        .iter()
        .map(|profile| {
            let user = owner(&owners, profile.user_id)?;
            let columns = admin
                .list_display
                .iter()
                .map(|field| {
                    let value = match *field {
                        "user" => json!(user.username),
                        "nip" => json!(profile.nip),
                        "jabatan_akademik" => json!(profile.jabatan_akademik.map(|r| r.label())),
                        "pendidikan_terakhir" => json!(profile.pendidikan_terakhir.label()),
                        "status_kepegawaian" => json!(profile.status_kepegawaian.label()),
                        _ => Value::Null,
                    };
                    (field.to_string(), value)
                })
                .collect();
            Ok(ConsoleRow {
                id: profile.id,
                label: profile.label(user),
                columns,
            })
        })
        .collect()
}

async fn student_rows(
    pool: &PgPool,
    admin: &ModelAdmin,
    profiles: &[StudentProfile],
) -> AppResult<Vec<ConsoleRow>> {
    let mut advisor_ids: Vec<DbId> = profiles.iter().filter_map(|p| p.dosen_wali_id).collect();
    advisor_ids.sort_unstable();
    advisor_ids.dedup();
    let advisors = LecturerRepo::find_by_ids(pool, &advisor_ids).await?;

    let mut user_ids: Vec<DbId> = profiles.iter().map(|p| p.user_id).collect();
    user_ids.extend(advisors.iter().map(|a| a.user_id));
    let owners = users_by_id(pool, &user_ids).await?;

    let mut advisor_labels = HashMap::with_capacity(advisors.len());
    for advisor in &advisors {
        advisor_labels.insert(advisor.id, advisor.label(owner(&owners, advisor.user_id)?));
    }

    profiles
        .iter()
        .map(|profile| {
            let user = owner(&owners, profile.user_id)?;
            let columns = admin
                .list_display
                .iter()
                .map(|field| {
                    let value = match *field {
                        "user" => json!(user.username),
                        "nim" => json!(profile.nim),
                        "angkatan" => json!(profile.angkatan),
                        "semester" => json!(profile.semester),
                        "kelas" => json!(profile.kelas.map(|k| k.label())),
                        "status" => json!(profile.status.label()),
                        "ipk" => json!(profile.ipk),
                        "dosen_wali" => json!(profile
                            .dosen_wali_id
                            .and_then(|id| advisor_labels.get(&id))),
                        _ => Value::Null,
                    };
                    (field.to_string(), value)
                })
                .collect();
            Ok(ConsoleRow {
                id: profile.id,
                label: profile.label(user),
                columns,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Edit forms
// ---------------------------------------------------------------------------

async fn edit_form(pool: &PgPool, admin: &'static ModelAdmin, id: DbId) -> AppResult<Value> {
    let missing = || not_found(admin, id);
    let fieldsets = admin.form_fieldsets(false);

    match admin.entity {
        ENTITY_USERS => {
            let user = UserRepo::find_by_id(pool, id).await?.ok_or_else(missing)?;
            let mut readonly = Map::new();
            readonly.insert("password".into(), json!(password_summary(&user)));
            readonly.insert("last_login".into(), json!(user.last_login));
            readonly.insert("date_joined".into(), json!(user.date_joined));
            readonly.insert("created_at".into(), json!(user.created_at));
            readonly.insert("updated_at".into(), json!(user.updated_at));
            to_value(ConsoleForm {
                id,
                label: user.username.clone(),
                fieldsets,
                values: UserChangeForm::from(&user),
                readonly,
            })
        }
        ENTITY_LECTURERS => {
            let profile = LecturerRepo::find_by_id(pool, id).await?.ok_or_else(missing)?;
            let user = UserRepo::find_by_id(pool, profile.user_id)
                .await?
                .ok_or_else(missing)?;
            to_value(ConsoleForm {
                id,
                label: profile.label(&user),
                fieldsets,
                values: LecturerForm::from(&profile),
                readonly: Map::new(),
            })
        }
        _ => {
            let profile = StudentRepo::find_by_id(pool, id).await?.ok_or_else(missing)?;
            let user = UserRepo::find_by_id(pool, profile.user_id)
                .await?
                .ok_or_else(missing)?;
            to_value(ConsoleForm {
                id,
                label: profile.label(&user),
                fieldsets,
                values: StudentForm::from(&profile),
                readonly: Map::new(),
            })
        }
    }
}

fn to_value<T: Serialize>(form: ConsoleForm<T>) -> AppResult<Value> {
    serde_json::to_value(form)
        .map_err(|e| AppError::InternalError(format!("Console form serialization error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use akademik_core::admin::{LECTURER_ADMIN, STUDENT_ADMIN, USER_ADMIN};
    use assert_matches::assert_matches;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn defaults_when_no_params() {
        let query = console_query(&USER_ADMIN, &params(&[]), today()).unwrap();
        assert!(query.search.is_none());
        assert!(query.filters.is_empty());
        assert_eq!(query.ordering[0].field, "created_at");
        assert!(query.ordering[0].descending);
        assert_eq!(query.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn filters_are_sorted_and_typed() {
        let query = console_query(
            &USER_ADMIN,
            &params(&[("user_type", "dosen"), ("created_at", "today"), ("is_active", "true")]),
            today(),
        )
        .unwrap();

        assert_eq!(query.filters.len(), 3);
        let start = midnight_utc(today());
        let end = midnight_utc(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
        assert_eq!(
            query.filters[0],
            ConsoleFilter::Range { field: "created_at", start, end }
        );
        assert_eq!(
            query.filters[1],
            ConsoleFilter::Equals { field: "is_active", value: "true".into() }
        );
        assert_eq!(
            query.filters[2],
            ConsoleFilter::Equals { field: "user_type", value: "dosen".into() }
        );
    }

    #[test]
    fn isnull_filter_on_advisor() {
        let query =
            console_query(&STUDENT_ADMIN, &params(&[("dosen_wali__isnull", "true")]), today())
                .unwrap();
        assert_eq!(query.filters, vec![ConsoleFilter::IsNull { field: "dosen_wali" }]);
    }

    #[test]
    fn unknown_filter_and_bad_values_are_rejected() {
        assert_matches!(
            console_query(&USER_ADMIN, &params(&[("password_hash", "x")]), today()),
            Err(CoreError::InvalidField { field, .. }) if field == "password_hash"
        );
        assert_matches!(
            console_query(&USER_ADMIN, &params(&[("created_at", "yesterday")]), today()),
            Err(CoreError::InvalidField { .. })
        );
        assert_matches!(
            console_query(&USER_ADMIN, &params(&[("limit", "ten")]), today()),
            Err(CoreError::InvalidField { field, .. }) if field == "limit"
        );
        assert_matches!(
            console_query(&USER_ADMIN, &params(&[("ordering", "password_hash")]), today()),
            Err(CoreError::InvalidField { field, .. }) if field == "ordering"
        );
    }

    #[test]
    fn blank_search_is_ignored_and_search_fields_come_from_config() {
        let query =
            console_query(&LECTURER_ADMIN, &params(&[("search", "   ")]), today()).unwrap();
        assert!(query.search.is_none());
        assert_eq!(query.search_fields, LECTURER_ADMIN.search_fields);
    }

    #[test]
    fn filter_choices_cover_enumerated_filters_only() {
        let choices = filter_choices(&STUDENT_ADMIN);
        assert!(choices.contains_key("kelas"));
        assert!(choices.contains_key("status"));
        assert!(!choices.contains_key("angkatan"));

        let choices = filter_choices(&USER_ADMIN);
        assert_eq!(choices["is_active"].len(), 2);
        assert_eq!(choices["user_type"][1].value, "dosen");
    }
}
