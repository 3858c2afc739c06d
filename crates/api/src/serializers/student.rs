//! Student profile write projections and the batched read projection.

use std::collections::HashMap;

use akademik_core::choices::{ClassSection, StudentStatus, UserType};
use akademik_core::error::CoreError;
use akademik_core::types::{Date, DbId};
use akademik_core::users::{blank_to_none, ensure_student_owner, validate_angkatan, validate_ipk};
use akademik_db::models::student::{SaveStudentProfile, StudentProfile, StudentResponse};
use akademik_db::repositories::{LecturerRepo, StudentRepo, UserRepo};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use super::{double_option, ensure_unique, resolve_owner, OwnerRule};
use crate::error::AppResult;

pub const ENTITY: &str = "student profile";

/// Owners on the resource API must be `mahasiswa` accounts.
pub const OWNER: OwnerRule = OwnerRule {
    field: "user_id",
    role: Some(UserType::Student),
};

fn default_semester() -> i32 {
    1
}

fn default_ipk() -> Decimal {
    Decimal::new(0, 2)
}

/// Full student profile write payload (POST, PUT).
///
/// `dosen_wali_name` is derived and therefore rejected on input.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StudentInput {
    pub user_id: DbId,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub nim: Option<String>,
    #[validate(custom(function = "validate_angkatan"))]
    pub angkatan: String,
    #[serde(default = "default_semester")]
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub semester: i32,
    pub kelas: Option<ClassSection>,
    #[serde(default)]
    pub status: StudentStatus,
    #[serde(default = "default_ipk")]
    #[validate(custom(function = "validate_ipk"))]
    pub ipk: Decimal,
    pub dosen_wali: Option<DbId>,
    pub tanggal_masuk: Date,
}

impl From<&StudentProfile> for StudentInput {
    fn from(profile: &StudentProfile) -> Self {
        StudentInput {
            user_id: profile.user_id,
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

impl StudentInput {
    /// Validate and resolve references, producing the row to write.
    ///
    /// The owner must exist within `owner`'s candidate set and must be a
    /// `mahasiswa` account. The advisor, when given, must be an existing
    /// lecturer profile.
    pub async fn clean(
        mut self,
        pool: &PgPool,
        owner: OwnerRule,
        existing: Option<DbId>,
    ) -> AppResult<SaveStudentProfile> {
        self.nim = blank_to_none(self.nim);
        self.validate()?;

        let user = resolve_owner(pool, self.user_id, owner).await?;
        ensure_student_owner(user.user_type)?;

        if let Some(advisor_id) = self.dosen_wali {
            if LecturerRepo::find_by_id(pool, advisor_id).await?.is_none() {
                return Err(CoreError::reference("dosen_wali", advisor_id).into());
            }
        }

        ensure_unique(
            StudentRepo::user_taken(pool, self.user_id, existing).await?,
            ENTITY,
            owner.field,
        )?;
        if let Some(nim) = self.nim.as_deref() {
            ensure_unique(StudentRepo::nim_taken(pool, nim, existing).await?, ENTITY, "nim")?;
        }

        Ok(SaveStudentProfile {
            user_id: self.user_id,
            nim: self.nim,
            angkatan: self.angkatan,
            semester: self.semester,
            kelas: self.kelas,
            status: self.status,
            ipk: self.ipk,
            dosen_wali_id: self.dosen_wali,
            tanggal_masuk: self.tanggal_masuk,
        })
    }
}

/// Partial student profile payload (PATCH).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentPatch {
    pub user_id: Option<DbId>,
    #[serde(default, deserialize_with = "double_option")]
    pub nim: Option<Option<String>>,
    pub angkatan: Option<String>,
    pub semester: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub kelas: Option<Option<ClassSection>>,
    pub status: Option<StudentStatus>,
    pub ipk: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub dosen_wali: Option<Option<DbId>>,
    pub tanggal_masuk: Option<Date>,
}

impl StudentPatch {
    pub fn apply(self, mut base: StudentInput) -> StudentInput {
        if let Some(v) = self.user_id {
            base.user_id = v;
        }
        if let Some(v) = self.nim {
            base.nim = v;
        }
        if let Some(v) = self.angkatan {
            base.angkatan = v;
        }
        if let Some(v) = self.semester {
            base.semester = v;
        }
        if let Some(v) = self.kelas {
            base.kelas = v;
        }
        if let Some(v) = self.status {
            base.status = v;
        }
        if let Some(v) = self.ipk {
            base.ipk = v;
        }
        if let Some(v) = self.dosen_wali {
            base.dosen_wali = v;
        }
        if let Some(v) = self.tanggal_masuk {
            base.tanggal_masuk = v;
        }
        base
    }
}

/// Build read projections, loading owners and advisor names in two queries.
pub async fn student_responses(
    pool: &PgPool,
    profiles: &[StudentProfile],
) -> AppResult<Vec<StudentResponse>> {
    let user_ids: Vec<DbId> = profiles.iter().map(|p| p.user_id).collect();
    let owners: HashMap<DbId, _> = UserRepo::find_by_ids(pool, &user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut advisor_ids: Vec<DbId> = profiles.iter().filter_map(|p| p.dosen_wali_id).collect();
    advisor_ids.sort_unstable();
    advisor_ids.dedup();
    let advisor_names: HashMap<DbId, Option<String>> =
        LecturerRepo::advisor_names(pool, &advisor_ids)
            .await?
            .into_iter()
            .collect();

    profiles
        .iter()
        .map(|profile| {
            let owner = owners.get(&profile.user_id).ok_or_else(|| {
                CoreError::Internal(format!("owner of student profile {} missing", profile.id))
            })?;
            let advisor_name = profile
                .dosen_wali_id
                .and_then(|id| advisor_names.get(&id).cloned().flatten());
            Ok(StudentResponse::new(profile, owner, advisor_name))
        })
        .collect()
}

pub async fn student_response(
    pool: &PgPool,
    profile: &StudentProfile,
) -> AppResult<StudentResponse> {
    let mut responses = student_responses(pool, std::slice::from_ref(profile)).await?;
    responses
        .pop()
        .ok_or_else(|| CoreError::Internal("empty student projection".into()).into())
}
