//! Student (mahasiswa) profile model and DTOs.

use akademik_core::choices::{ClassSection, StudentStatus};
use akademik_core::types::{Date, DbId, Timestamp};
use akademik_core::users::student_label;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::user::{User, UserResponse};

/// A row from the `student_profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct StudentProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub nim: Option<String>,
    pub angkatan: String,
    pub semester: i32,
    pub kelas: Option<ClassSection>,
    pub status: StudentStatus,
    pub ipk: Decimal,
    pub dosen_wali_id: Option<DbId>,
    pub tanggal_masuk: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StudentProfile {
    /// Console label, e.g. `"Budi - 2401001 - Kelas B"`.
    pub fn label(&self, owner: &User) -> String {
        student_label(owner.display_name(), self.nim.as_deref(), self.kelas)
    }
}

/// Read projection: the owning user nested in full, the advisor as an id,
/// plus the advisor's full name resolved through the advisor relationship.
#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
    pub id: DbId,
    pub user: UserResponse,
    pub nim: Option<String>,
    pub angkatan: String,
    pub semester: i32,
    pub kelas: Option<ClassSection>,
    pub status: StudentStatus,
    pub ipk: Decimal,
    pub dosen_wali: Option<DbId>,
    pub dosen_wali_name: Option<String>,
    pub tanggal_masuk: Date,
}

impl StudentResponse {
    /// `advisor_name` is the advisor's `full_name` (not the username fallback).
    pub fn new(profile: &StudentProfile, owner: &User, advisor_name: Option<String>) -> Self {
        StudentResponse {
            id: profile.id,
            user: UserResponse::from(owner),
            nim: profile.nim.clone(),
            angkatan: profile.angkatan.clone(),
            semester: profile.semester,
            kelas: profile.kelas,
            status: profile.status,
            ipk: profile.ipk,
            dosen_wali: profile.dosen_wali_id,
            dosen_wali_name: advisor_name,
            tanggal_masuk: profile.tanggal_masuk,
        }
    }
}

/// Full set of writable columns, used for both insert and update.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveStudentProfile {
    pub user_id: DbId,
    pub nim: Option<String>,
    pub angkatan: String,
    pub semester: i32,
    pub kelas: Option<ClassSection>,
    pub status: StudentStatus,
    pub ipk: Decimal,
    pub dosen_wali_id: Option<DbId>,
    pub tanggal_masuk: Date,
}

impl From<&StudentProfile> for SaveStudentProfile {
    fn from(profile: &StudentProfile) -> Self {
        SaveStudentProfile {
            user_id: profile.user_id,
            nim: profile.nim.clone(),
            angkatan: profile.angkatan.clone(),
            semester: profile.semester,
            kelas: profile.kelas,
            status: profile.status,
            ipk: profile.ipk,
            dosen_wali_id: profile.dosen_wali_id,
            tanggal_masuk: profile.tanggal_masuk,
        }
    }
}
