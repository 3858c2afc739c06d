//! Lecturer profile write projections and the batched read projection.

use std::collections::HashMap;

use akademik_core::choices::{AcademicRank, EducationLevel, EmploymentStatus, UserType};
use akademik_core::error::CoreError;
use akademik_core::types::DbId;
use akademik_core::users::blank_to_none;
use akademik_db::models::lecturer::{LecturerProfile, LecturerResponse, SaveLecturerProfile};
use akademik_db::repositories::{LecturerRepo, UserRepo};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use super::{double_option, ensure_unique, resolve_owner, OwnerRule};
use crate::error::AppResult;

pub const ENTITY: &str = "lecturer profile";

/// Owners on the resource API must be `dosen` accounts.
pub const OWNER: OwnerRule = OwnerRule {
    field: "user_id",
    role: Some(UserType::Lecturer),
};

/// Full lecturer profile write payload (POST, PUT).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LecturerInput {
    pub user_id: DbId,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub nip: Option<String>,
    pub jabatan_akademik: Option<AcademicRank>,
    #[serde(default)]
    pub pendidikan_terakhir: EducationLevel,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub bidang_keahlian: String,
    #[serde(default)]
    pub status_kepegawaian: EmploymentStatus,
}

impl From<&LecturerProfile> for LecturerInput {
    fn from(profile: &LecturerProfile) -> Self {
        LecturerInput {
            user_id: profile.user_id,
            nip: profile.nip.clone(),
            jabatan_akademik: profile.jabatan_akademik,
            pendidikan_terakhir: profile.pendidikan_terakhir,
            bidang_keahlian: profile.bidang_keahlian.clone(),
            status_kepegawaian: profile.status_kepegawaian,
        }
    }
}

impl LecturerInput {
    /// Validate and resolve references, producing the row to write.
    ///
    /// `existing` is the id of the profile being edited, excluded from the
    /// uniqueness checks.
    pub async fn clean(
        mut self,
        pool: &PgPool,
        owner: OwnerRule,
        existing: Option<DbId>,
    ) -> AppResult<SaveLecturerProfile> {
        self.nip = blank_to_none(self.nip);
        self.validate()?;

        resolve_owner(pool, self.user_id, owner).await?;
        ensure_unique(
            LecturerRepo::user_taken(pool, self.user_id, existing).await?,
            ENTITY,
            owner.field,
        )?;
        if let Some(nip) = self.nip.as_deref() {
            ensure_unique(LecturerRepo::nip_taken(pool, nip, existing).await?, ENTITY, "nip")?;
        }

        Ok(SaveLecturerProfile {
            user_id: self.user_id,
            nip: self.nip,
            jabatan_akademik: self.jabatan_akademik,
            pendidikan_terakhir: self.pendidikan_terakhir,
            bidang_keahlian: self.bidang_keahlian,
            status_kepegawaian: self.status_kepegawaian,
        })
    }
}

/// Partial lecturer profile payload (PATCH).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LecturerPatch {
    pub user_id: Option<DbId>,
    #[serde(default, deserialize_with = "double_option")]
    pub nip: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub jabatan_akademik: Option<Option<AcademicRank>>,
    pub pendidikan_terakhir: Option<EducationLevel>,
    pub bidang_keahlian: Option<String>,
    pub status_kepegawaian: Option<EmploymentStatus>,
}

impl LecturerPatch {
    pub fn apply(self, mut base: LecturerInput) -> LecturerInput {
        if let Some(v) = self.user_id {
            base.user_id = v;
        }
        if let Some(v) = self.nip {
            base.nip = v;
        }
        if let Some(v) = self.jabatan_akademik {
            base.jabatan_akademik = v;
        }
        if let Some(v) = self.pendidikan_terakhir {
            base.pendidikan_terakhir = v;
        }
        if let Some(v) = self.bidang_keahlian {
            base.bidang_keahlian = v;
        }
        if let Some(v) = self.status_kepegawaian {
            base.status_kepegawaian = v;
        }
        base
    }
}

/// Build read projections, loading every owner in one query.
pub async fn lecturer_responses(
    pool: &PgPool,
    profiles: &[LecturerProfile],
) -> AppResult<Vec<LecturerResponse>> {
    let ids: Vec<DbId> = profiles.iter().map(|p| p.user_id).collect();
    let owners: HashMap<DbId, _> = UserRepo::find_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    profiles
        .iter()
        .map(|profile| {
            let owner = owners.get(&profile.user_id).ok_or_else(|| {
                CoreError::Internal(format!("owner of lecturer profile {} missing", profile.id))
            })?;
            Ok(LecturerResponse::new(profile, owner))
        })
        .collect()
}

pub async fn lecturer_response(
    pool: &PgPool,
    profile: &LecturerProfile,
) -> AppResult<LecturerResponse> {
    let mut responses = lecturer_responses(pool, std::slice::from_ref(profile)).await?;
    responses
        .pop()
        .ok_or_else(|| CoreError::Internal("empty lecturer projection".into()).into())
}
