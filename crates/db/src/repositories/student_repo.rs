//! Repository for the `student_profiles` table.

use akademik_core::types::DbId;
use sqlx::PgPool;

use crate::models::console::ConsoleQuery;
use crate::models::student::{SaveStudentProfile, StudentProfile};
use crate::repositories::console;

const COLUMNS: &str = "id, user_id, nim, angkatan, semester, kelas, status, ipk, \
                       dosen_wali_id, tanggal_masuk, created_at, updated_at";

const SP_COLUMNS: &str = "sp.id, sp.user_id, sp.nim, sp.angkatan, sp.semester, sp.kelas, \
                          sp.status, sp.ipk, sp.dosen_wali_id, sp.tanggal_masuk, \
                          sp.created_at, sp.updated_at";

/// Default listing order: cohort, then class, then student number.
const DEFAULT_ORDER: &str = "angkatan, kelas, nim, id";

fn console_column(field: &str) -> Option<&'static str> {
    Some(match field {
        "user" | "user__full_name" => "u.full_name",
        "user__username" => "u.username",
        "nim" => "sp.nim",
        "angkatan" => "sp.angkatan",
        "semester" => "sp.semester",
        "kelas" => "sp.kelas",
        "status" => "sp.status",
        "ipk" => "sp.ipk",
        "dosen_wali" => "sp.dosen_wali_id",
        "tanggal_masuk" => "sp.tanggal_masuk",
        "created_at" => "sp.created_at",
        _ => return None,
    })
}

/// Provides CRUD operations for student profiles.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a new student profile, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &SaveStudentProfile,
    ) -> Result<StudentProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO student_profiles
                (user_id, nim, angkatan, semester, kelas, status, ipk, dosen_wali_id,
                 tanggal_masuk)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(input.user_id)
            .bind(&input.nim)
            .bind(&input.angkatan)
            .bind(input.semester)
            .bind(input.kelas)
            .bind(input.status)
            .bind(input.ipk)
            .bind(input.dosen_wali_id)
            .bind(input.tanggal_masuk)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM student_profiles WHERE id = $1");
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the profile owned by `user_id`, if any.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM student_profiles WHERE user_id = $1");
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List profiles by cohort, class and student number.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StudentProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM student_profiles ORDER BY {DEFAULT_ORDER} LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Students advised by the given lecturer profile.
    pub async fn list_by_advisor(
        pool: &PgPool,
        lecturer_id: DbId,
    ) -> Result<Vec<StudentProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM student_profiles WHERE dosen_wali_id = $1 \
             ORDER BY {DEFAULT_ORDER}"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(lecturer_id)
            .fetch_all(pool)
            .await
    }

    /// Replace every writable column.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &SaveStudentProfile,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE student_profiles SET
                user_id = $2,
                nim = $3,
                angkatan = $4,
                semester = $5,
                kelas = $6,
                status = $7,
                ipk = $8,
                dosen_wali_id = $9,
                tanggal_masuk = $10
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(id)
            .bind(input.user_id)
            .bind(&input.nim)
            .bind(&input.angkatan)
            .bind(input.semester)
            .bind(input.kelas)
            .bind(input.status)
            .bind(input.ipk)
            .bind(input.dosen_wali_id)
            .bind(input.tanggal_masuk)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM student_profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether another profile (other than `exclude_id`) already has `nim`.
    pub async fn nim_taken(
        pool: &PgPool,
        nim: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM student_profiles
                           WHERE nim = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(nim)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Whether another profile (other than `exclude_id`) is owned by `user_id`.
    pub async fn user_taken(
        pool: &PgPool,
        user_id: DbId,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM student_profiles
                           WHERE user_id = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(user_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Console listing with search, filters and ordering.
    pub async fn console_list(
        pool: &PgPool,
        query: &ConsoleQuery,
    ) -> Result<Vec<StudentProfile>, sqlx::Error> {
        let sql = console::build(query, console_column, "sp.id")?;
        let statement = format!(
            "SELECT {SP_COLUMNS}
             FROM student_profiles sp
             JOIN users u ON u.id = sp.user_id
             {} {} {}",
            sql.where_clause,
            sql.order_clause,
            sql.page_clause()
        );
        sql.bind_to(
            sqlx::query_as::<_, StudentProfile>(&statement),
            query.limit,
            query.offset,
        )
        .fetch_all(pool)
        .await
    }
}
