//! Lecturer (dosen) profile model and DTOs.

use akademik_core::choices::{AcademicRank, EducationLevel, EmploymentStatus};
use akademik_core::types::{DbId, Timestamp};
use akademik_core::users::lecturer_label;
use serde::Serialize;
use sqlx::FromRow;

use super::user::{User, UserResponse};

/// A row from the `lecturer_profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct LecturerProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub nip: Option<String>,
    pub jabatan_akademik: Option<AcademicRank>,
    pub pendidikan_terakhir: EducationLevel,
    pub bidang_keahlian: String,
    pub status_kepegawaian: EmploymentStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LecturerProfile {
    /// Console label, e.g. `"Dr. Sari - 198701012010"`.
    pub fn label(&self, owner: &User) -> String {
        lecturer_label(owner.display_name(), self.nip.as_deref())
    }
}

/// Read projection: the owning user is nested in full.
#[derive(Debug, Clone, Serialize)]
pub struct LecturerResponse {
    pub id: DbId,
    pub user: UserResponse,
    pub nip: Option<String>,
    pub jabatan_akademik: Option<AcademicRank>,
    pub pendidikan_terakhir: EducationLevel,
    pub bidang_keahlian: String,
    pub status_kepegawaian: EmploymentStatus,
}

impl LecturerResponse {
    pub fn new(profile: &LecturerProfile, owner: &User) -> Self {
        LecturerResponse {
            id: profile.id,
            user: UserResponse::from(owner),
            nip: profile.nip.clone(),
            jabatan_akademik: profile.jabatan_akademik,
            pendidikan_terakhir: profile.pendidikan_terakhir,
            bidang_keahlian: profile.bidang_keahlian.clone(),
            status_kepegawaian: profile.status_kepegawaian,
        }
    }
}

/// Full set of writable columns, used for both insert and update.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveLecturerProfile {
    pub user_id: DbId,
    pub nip: Option<String>,
    pub jabatan_akademik: Option<AcademicRank>,
    pub pendidikan_terakhir: EducationLevel,
    pub bidang_keahlian: String,
    pub status_kepegawaian: EmploymentStatus,
}

impl From<&LecturerProfile> for SaveLecturerProfile {
    fn from(profile: &LecturerProfile) -> Self {
        SaveLecturerProfile {
            user_id: profile.user_id,
            nip: profile.nip.clone(),
            jabatan_akademik: profile.jabatan_akademik,
            pendidikan_terakhir: profile.pendidikan_terakhir,
            bidang_keahlian: profile.bidang_keahlian.clone(),
            status_kepegawaian: profile.status_kepegawaian,
        }
    }
}
