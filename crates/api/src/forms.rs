//! Operator console forms.
//!
//! Each form carries exactly the writable fields of its console fieldsets
//! (see [`akademik_core::admin`]); anything else in the body is rejected.
//! The same structs are serialized as the initial values of an edit form.
//!
//! Profile forms name the owner field `user` and accept any account as a
//! candidate. The student form then applies the owner account-type rule.

use akademik_core::choices::{
    AcademicRank, ClassSection, EducationLevel, EmploymentStatus, Gender, StudentStatus,
    StudyProgram, UserType,
};
use akademik_core::error::CoreError;
use akademik_core::types::{Date, DbId};
use akademik_core::users::{blank_to_none, validate_username};
use akademik_db::models::lecturer::{LecturerProfile, SaveLecturerProfile};
use akademik_db::models::student::{SaveStudentProfile, StudentProfile};
use akademik_db::models::user::{CreateUser, UpdateUser, User};
use akademik_db::repositories::UserRepo;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::password::prepare_password;
use crate::error::AppResult;
use crate::serializers::lecturer::LecturerInput;
use crate::serializers::student::StudentInput;
use crate::serializers::user::ensure_unique_identity;
use crate::serializers::OwnerRule;

/// Owner resolution for console profile forms.
pub const CONSOLE_OWNER: OwnerRule = OwnerRule {
    field: "user",
    role: None,
};

pub const PASSWORD2_MISMATCH: &str = "The two password fields didn't match.";

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// User creation form (`password1` / `password2`).
#[derive(Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserAddForm {
    #[validate(
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub full_name: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    pub password1: String,
    pub password2: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserAddForm {
    pub async fn save(mut self, pool: &PgPool, min_password_length: usize) -> AppResult<User> {
        self.email = blank_to_none(self.email);
        self.validate()?;
        if self.password1 != self.password2 {
            return Err(CoreError::invalid("password2", PASSWORD2_MISMATCH).into());
        }
        ensure_unique_identity(pool, &self.username, self.email.as_deref(), None).await?;

        let password_hash = prepare_password("password1", &self.password1, min_password_length)?;
        let create = CreateUser {
            username: self.username,
            password_hash,
            full_name: self.full_name,
            user_type: self.user_type,
            profile_picture: None,
            phone_number: None,
            email: self.email,
            program_studi: None,
            tempat_lahir: None,
            birth_date: None,
            gender: None,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        };
        Ok(UserRepo::create(pool, &create).await?)
    }
}

/// User edit form. The password is shown as a summary only and cannot be
/// written here; `last_login` and `date_joined` are read-only.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserChangeForm {
    #[validate(
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub full_name: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    #[validate(length(max = 15, message = "Ensure this field has no more than 15 characters."))]
    pub phone_number: Option<String>,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub profile_picture: Option<String>,
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub tempat_lahir: Option<String>,
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    pub program_studi: Option<StudyProgram>,
    pub user_type: UserType,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl From<&User> for UserChangeForm {
    fn from(user: &User) -> Self {
        UserChangeForm {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            profile_picture: user.profile_picture.clone(),
            tempat_lahir: user.tempat_lahir.clone(),
            birth_date: user.birth_date,
            gender: user.gender,
            program_studi: user.program_studi,
            user_type: user.user_type,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}

impl UserChangeForm {
    pub async fn clean(mut self, pool: &PgPool, id: DbId) -> AppResult<UpdateUser> {
        self.email = blank_to_none(self.email);
        self.validate()?;
        ensure_unique_identity(pool, &self.username, self.email.as_deref(), Some(id)).await?;

        Ok(UpdateUser {
            username: self.username,
            full_name: self.full_name,
            user_type: self.user_type,
            profile_picture: self.profile_picture,
            phone_number: self.phone_number,
            email: self.email,
            program_studi: self.program_studi,
            tempat_lahir: self.tempat_lahir,
            birth_date: self.birth_date,
            gender: self.gender,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        })
    }
}

/// Read-only summary shown in place of the stored credential.
pub fn password_summary(user: &User) -> String {
    let hash = user.password_hash.as_str();
    if hash.starts_with(akademik_core::principal::UNUSABLE_PASSWORD_PREFIX) {
        return "No password set.".into();
    }
    match hash.split('$').nth(1) {
        Some(algorithm) if !algorithm.is_empty() => format!("algorithm: {algorithm}"),
        _ => "Invalid password format or unknown hashing algorithm.".into(),
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LecturerForm {
    pub user: DbId,
    pub nip: Option<String>,
    pub jabatan_akademik: Option<AcademicRank>,
    #[serde(default)]
    pub pendidikan_terakhir: EducationLevel,
    #[serde(default)]
    pub bidang_keahlian: String,
    #[serde(default)]
    pub status_kepegawaian: EmploymentStatus,
}

impl From<&LecturerProfile> for LecturerForm {
    fn from(profile: &LecturerProfile) -> Self {
        LecturerForm {
            user: profile.user_id,
            nip: profile.nip.clone(),
            jabatan_akademik: profile.jabatan_akademik,
            pendidikan_terakhir: profile.pendidikan_terakhir,
            bidang_keahlian: profile.bidang_keahlian.clone(),
            status_kepegawaian: profile.status_kepegawaian,
        }
    }
}

impl LecturerForm {
    pub async fn clean(self, pool: &PgPool, existing: Option<DbId>) -> AppResult<SaveLecturerProfile> {
        let input = LecturerInput {
            user_id: self.user,
            nip: self.nip,
            jabatan_akademik: self.jabatan_akademik,
            pendidikan_terakhir: self.pendidikan_terakhir,
            bidang_keahlian: self.bidang_keahlian,
            status_kepegawaian: self.status_kepegawaian,
        };
        input.clean(pool, CONSOLE_OWNER, existing).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentForm {
    pub user: DbId,
    pub nim: Option<String>,
    pub angkatan: String,
    #[serde(default = "default_semester")]
    pub semester: i32,
    pub kelas: Option<ClassSection>,
    #[serde(default)]
    pub status: StudentStatus,
    #[serde(default = "default_ipk")]
    pub ipk: Decimal,
    pub dosen_wali: Option<DbId>,
    pub tanggal_masuk: Date,
}

fn default_semester() -> i32 {
    1
}

fn default_ipk() -> Decimal {
    Decimal::new(0, 2)
}

impl From<&StudentProfile> for StudentForm {
    fn from(profile: &StudentProfile) -> Self {
        StudentForm {
            user: profile.user_id,
            nim: profile.nim.clone(),
            angkatan: profile.angkatan.clone(),
            semester: profile.semester,
            kelas: profile.kelas,
            status: profile.status,
            ipk: profile.ipk,
            dosen_wali: profile.dosen_wali_id,
            tanggal_masuk: profile.tanggal_masuk,
        }
    }
}

impl StudentForm {
    pub async fn clean(self, pool: &PgPool, existing: Option<DbId>) -> AppResult<SaveStudentProfile> {
        let input = StudentInput {
            user_id: self.user,
            nim: self.nim,
            angkatan: self.angkatan,
            semester: self.semester,
            kelas: self.kelas,
            status: self.status,
            ipk: self.ipk,
            dosen_wali: self.dosen_wali,
            tanggal_masuk: self.tanggal_masuk,
        };
        input.clean(pool, CONSOLE_OWNER, existing).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akademik_core::admin::{LECTURER_ADMIN, STUDENT_ADMIN, USER_ADMIN};

    fn keys<T: Serialize>(value: &T) -> Vec<String> {
        let mut keys: Vec<String> = serde_json::to_value(value)
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn sorted(fields: Vec<&'static str>) -> Vec<String> {
        let mut fields: Vec<String> = fields.into_iter().map(String::from).collect();
        fields.sort();
        fields
    }

    #[test]
    fn profile_forms_cover_their_fieldsets() {
        let lecturer: LecturerForm =
            serde_json::from_value(serde_json::json!({ "user": 1 })).unwrap();
        assert_eq!(keys(&lecturer), sorted(LECTURER_ADMIN.writable_fields(false)));

        let student: StudentForm = serde_json::from_value(serde_json::json!({
            "user": 1,
            "angkatan": "2024",
            "tanggal_masuk": "2024-08-19"
        }))
        .unwrap();
        assert_eq!(keys(&student), sorted(STUDENT_ADMIN.writable_fields(false)));
    }

    #[test]
    fn user_change_form_covers_edit_fieldsets_except_password() {
        let form: UserChangeForm = serde_json::from_value(serde_json::json!({
            "username": "sari",
            "full_name": null,
            "email": null,
            "phone_number": null,
            "profile_picture": null,
            "tempat_lahir": null,
            "birth_date": null,
            "gender": null,
            "program_studi": null,
            "user_type": "dosen",
            "is_active": true,
            "is_staff": false,
            "is_superuser": false
        }))
        .unwrap();
        let expected: Vec<&str> = USER_ADMIN
            .writable_fields(false)
            .into_iter()
            .filter(|f| *f != "password")
            .collect();
        assert_eq!(keys(&form), sorted(expected));
    }

    #[test]
    fn user_change_form_rejects_password_and_dates() {
        for field in ["password", "last_login", "date_joined"] {
            let mut body = serde_json::json!({
                "username": "sari",
                "user_type": "dosen",
                "is_active": true,
                "is_staff": false,
                "is_superuser": false
            });
            body[field] = serde_json::json!("x");
            assert!(serde_json::from_value::<UserChangeForm>(body).is_err(), "{field}");
        }
    }

    #[test]
    fn add_form_defaults() {
        let form: UserAddForm = serde_json::from_value(serde_json::json!({
            "username": "sari",
            "password1": "a",
            "password2": "a"
        }))
        .unwrap();
        assert_eq!(form.user_type, UserType::Student);
        assert!(form.is_active);
        assert!(!form.is_staff);
    }
}
