use crate::types::DbId;

/// Domain error taxonomy.
///
/// The first four variants after `NotFound` are the validation kinds raised
/// before anything is persisted; the rest cover lookups and access control.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A single field's value violates a type, format, or choice constraint.
    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },

    /// A unique-constrained field collides with an existing record.
    #[error("{entity} with this {field} already exists.")]
    Uniqueness { entity: &'static str, field: String },

    /// A rule spanning several fields or records failed.
    #[error("{0}")]
    CrossField(String),

    /// A foreign-key id did not resolve within its (role-filtered) candidates.
    #[error("Invalid pk \"{id}\" - object does not exist.")]
    ReferenceNotFound { field: String, id: DbId },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn reference(field: impl Into<String>, id: DbId) -> Self {
        CoreError::ReferenceNotFound {
            field: field.into(),
            id,
        }
    }

    /// The offending field, for the variants that carry one.
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::InvalidField { field, .. }
            | CoreError::Uniqueness { field, .. }
            | CoreError::ReferenceNotFound { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Convert `validator` derive output into a single [`CoreError::InvalidField`].
///
/// Field names are visited in sorted order so the reported field is stable
/// across runs.
impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let Some((field, errs)) = fields.first() else {
            return CoreError::CrossField("Invalid input".into());
        };
        let message = errs
            .first()
            .map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value ({})", e.code),
            })
            .unwrap_or_else(|| "Invalid value".to_string());

        CoreError::InvalidField {
            field: field.to_string(),
            message,
        }
    }
}
