//! User and profile validation rules and display helpers.
//!
//! Field-level rules are exposed as `validator` custom functions so request
//! DTOs can reference them from `#[validate(custom(...))]` attributes; the
//! cross-field rules return [`CoreError::CrossField`].

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::choices::{ClassSection, UserType};
use crate::error::CoreError;

/// Message for a registration whose password and confirmation differ.
pub const PASSWORD_MISMATCH: &str = "Passwords don't match";

/// Message for a student profile attached to a non-student account.
pub const OWNER_NOT_STUDENT: &str = "User harus bertipe Mahasiswa";

/// `NUMERIC(3,2)` limits for the IPK column.
pub const IPK_MAX_DIGITS: u32 = 3;
pub const IPK_DECIMAL_PLACES: u32 = 2;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+\z").expect("username pattern is valid"));

fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

// ---------------------------------------------------------------------------
// Field validators
// ---------------------------------------------------------------------------

/// Usernames are non-blank and may contain only letters, digits and
/// `@ . + - _`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(field_error("blank", "This field may not be blank."));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(field_error(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, \
             numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// Cohort year (angkatan) must be non-blank and at most four characters.
pub fn validate_angkatan(angkatan: &str) -> Result<(), ValidationError> {
    if angkatan.trim().is_empty() {
        return Err(field_error("blank", "This field may not be blank."));
    }
    if angkatan.chars().count() > 4 {
        return Err(field_error(
            "max_length",
            "Ensure this field has no more than 4 characters.",
        ));
    }
    Ok(())
}

/// IPK must fit `NUMERIC(3,2)`: at most 3 digits, 2 after the point.
///
/// No range is enforced beyond what the column can hold.
pub fn validate_ipk(ipk: &Decimal) -> Result<(), ValidationError> {
    let digits = ipk.mantissa().unsigned_abs().to_string().len() as u32;
    let decimals = ipk.scale();
    let whole_digits = digits.saturating_sub(decimals);

    if digits.max(decimals) > IPK_MAX_DIGITS {
        return Err(field_error(
            "max_digits",
            format!("Ensure that there are no more than {IPK_MAX_DIGITS} digits in total."),
        ));
    }
    if decimals > IPK_DECIMAL_PLACES {
        return Err(field_error(
            "max_decimal_places",
            format!("Ensure that there are no more than {IPK_DECIMAL_PLACES} decimal places."),
        ));
    }
    if whole_digits > IPK_MAX_DIGITS - IPK_DECIMAL_PLACES {
        return Err(field_error(
            "max_whole_digits",
            format!(
                "Ensure that there are no more than {} digit before the decimal point.",
                IPK_MAX_DIGITS - IPK_DECIMAL_PLACES
            ),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Cross-field rules
// ---------------------------------------------------------------------------

/// Registration requires the password and its confirmation to be identical.
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), CoreError> {
    if password != confirm {
        return Err(CoreError::CrossField(PASSWORD_MISMATCH.into()));
    }
    Ok(())
}

/// A student profile may only belong to a `mahasiswa` account.
pub fn ensure_student_owner(owner_type: UserType) -> Result<(), CoreError> {
    if owner_type != UserType::Student {
        return Err(CoreError::CrossField(OWNER_NOT_STUDENT.into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Full name, falling back to the username when it is absent or empty.
pub fn display_name<'a>(full_name: Option<&'a str>, username: &'a str) -> &'a str {
    match full_name {
        Some(name) if !name.is_empty() => name,
        _ => username,
    }
}

/// Console label for a lecturer profile: `"<name> - <nip>"`.
pub fn lecturer_label(display_name: &str, nip: Option<&str>) -> String {
    format!("{display_name} - {}", nip.unwrap_or("None"))
}

/// Console label for a student profile: `"<name> - <nim>[ - Kelas <kelas>]"`.
pub fn student_label(display_name: &str, nim: Option<&str>, kelas: Option<ClassSection>) -> String {
    let kelas_info = kelas
        .map(|k| format!(" - Kelas {k}"))
        .unwrap_or_default();
    format!("{display_name} - {}{kelas_info}", nim.unwrap_or("None"))
}

/// Treat empty optional strings as absent.
///
/// Unique nullable columns (email, nip, nim) must store NULL rather than `""`
/// so that several blank values do not collide.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
