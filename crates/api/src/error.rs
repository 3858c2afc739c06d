use akademik_core::error::CoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ "error", "code", "field"? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `akademik_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::from(errors))
    }
}

/// Status, machine code, message and offending field of an error response.
struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    field: Option<String>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: Option<&str>) -> Self {
        self.field = field.map(str::to_string);
        self
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                ErrorParts::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorParts::internal()
            }
        };

        let mut body = json!({
            "error": parts.message,
            "code": parts.code,
        });
        if let Some(field) = parts.field {
            body["field"] = json!(field);
        }

        (parts.status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> ErrorParts {
    match core {
        CoreError::NotFound { entity, id } => ErrorParts::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::InvalidField { message, .. } => {
            ErrorParts::new(StatusCode::BAD_REQUEST, "INVALID_FIELD", message.clone())
                .with_field(core.field())
        }
        CoreError::Uniqueness { .. } => {
            ErrorParts::new(StatusCode::CONFLICT, "CONFLICT", core.to_string())
                .with_field(core.field())
        }
        CoreError::CrossField(msg) => {
            ErrorParts::new(StatusCode::BAD_REQUEST, "CROSS_FIELD", msg.clone())
        }
        CoreError::ReferenceNotFound { .. } => ErrorParts::new(
            StatusCode::BAD_REQUEST,
            "REFERENCE_NOT_FOUND",
            core.to_string(),
        )
        .with_field(core.field()),
        CoreError::Unauthorized(msg) => {
            ErrorParts::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
        }
        CoreError::Forbidden(msg) => {
            ErrorParts::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            ErrorParts::internal()
        }
    }
}

/// Human name of the entity stored in `table`, as used in uniqueness messages.
fn entity_for_table(table: &str) -> &'static str {
    match table {
        "users" => "user",
        "lecturer_profiles" => "lecturer profile",
        "student_profiles" => "student profile",
        _ => "record",
    }
}

/// Split a `uq_<table>_<field>` / `fk_<table>_<field>` constraint name.
fn constraint_field<'a>(constraint: &'a str, prefix: &str, table: &str) -> Option<&'a str> {
    constraint
        .strip_prefix(prefix)?
        .strip_prefix(table)?
        .strip_prefix('_')
}

/// Classify a sqlx error into an HTTP error response.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations (`23505`) on a `uq_` constraint map to a 409
///   uniqueness error naming the colliding field.
/// - Foreign-key violations (`23503`) on an `fk_` constraint map to a 400
///   reference error naming the field.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            let constraint = db_err.constraint().unwrap_or("unknown");
            let table = db_err.table().unwrap_or("");

            if code.as_deref() == Some("23505") && constraint.starts_with("uq_") {
                let field = constraint_field(constraint, "uq_", table).unwrap_or(constraint);
                let uniqueness = CoreError::Uniqueness {
                    entity: entity_for_table(table),
                    field: field.to_string(),
                };
                return classify_core_error(&uniqueness);
            }
            if code.as_deref() == Some("23503") && constraint.starts_with("fk_") {
                let field = constraint_field(constraint, "fk_", table).unwrap_or(constraint);
                return ErrorParts::new(
                    StatusCode::BAD_REQUEST,
                    "REFERENCE_NOT_FOUND",
                    "Referenced object does not exist.",
                )
                .with_field(Some(field));
            }

            tracing::error!(error = %db_err, "Database error");
            ErrorParts::internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorParts::internal()
        }
    }
}
