//! Repository for the `lecturer_profiles` table.

use akademik_core::types::DbId;
use sqlx::PgPool;

use crate::models::console::ConsoleQuery;
use crate::models::lecturer::{LecturerProfile, SaveLecturerProfile};
use crate::repositories::console;

const COLUMNS: &str = "id, user_id, nip, jabatan_akademik, pendidikan_terakhir, \
                       bidang_keahlian, status_kepegawaian, created_at, updated_at";

const LP_COLUMNS: &str = "lp.id, lp.user_id, lp.nip, lp.jabatan_akademik, \
                          lp.pendidikan_terakhir, lp.bidang_keahlian, lp.status_kepegawaian, \
                          lp.created_at, lp.updated_at";

fn console_column(field: &str) -> Option<&'static str> {
    Some(match field {
        "user" | "user__full_name" => "u.full_name",
        "user__username" => "u.username",
        "nip" => "lp.nip",
        "jabatan_akademik" => "lp.jabatan_akademik",
        "pendidikan_terakhir" => "lp.pendidikan_terakhir",
        "bidang_keahlian" => "lp.bidang_keahlian",
        "status_kepegawaian" => "lp.status_kepegawaian",
        "created_at" => "lp.created_at",
        _ => return None,
    })
}

/// Provides CRUD operations for lecturer profiles.
pub struct LecturerRepo;

impl LecturerRepo {
    /// Insert a new lecturer profile, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &SaveLecturerProfile,
    ) -> Result<LecturerProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO lecturer_profiles
                (user_id, nip, jabatan_akademik, pendidikan_terakhir, bidang_keahlian,
                 status_kepegawaian)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LecturerProfile>(&query)
            .bind(input.user_id)
            .bind(&input.nip)
            .bind(input.jabatan_akademik)
            .bind(input.pendidikan_terakhir)
            .bind(&input.bidang_keahlian)
            .bind(input.status_kepegawaian)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<LecturerProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lecturer_profiles WHERE id = $1");
        sqlx::query_as::<_, LecturerProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<LecturerProfile>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM lecturer_profiles WHERE id = ANY($1)");
        sqlx::query_as::<_, LecturerProfile>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List profiles in creation order.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LecturerProfile>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM lecturer_profiles ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, LecturerProfile>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Replace every writable column.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &SaveLecturerProfile,
    ) -> Result<Option<LecturerProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE lecturer_profiles SET
                user_id = $2,
                nip = $3,
                jabatan_akademik = $4,
                pendidikan_terakhir = $5,
                bidang_keahlian = $6,
                status_kepegawaian = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LecturerProfile>(&query)
            .bind(id)
            .bind(input.user_id)
            .bind(&input.nip)
            .bind(input.jabatan_akademik)
            .bind(input.pendidikan_terakhir)
            .bind(&input.bidang_keahlian)
            .bind(input.status_kepegawaian)
            .fetch_optional(pool)
            .await
    }

    /// Delete a profile. Students advised by it keep their rows with the
    /// advisor cleared.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lecturer_profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether another profile (other than `exclude_id`) already has `nip`.
    pub async fn nip_taken(
        pool: &PgPool,
        nip: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM lecturer_profiles
                           WHERE nip = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(nip)
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
            "SELECT EXISTS(SELECT 1 FROM lecturer_profiles
                           WHERE user_id = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(user_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Resolve advisor profile ids to their owners' `full_name`.
    ///
    /// Profiles whose owner has no full name map to `None`.
    pub async fn advisor_names(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<(DbId, Option<String>)>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as(
            "SELECT lp.id, u.full_name
             FROM lecturer_profiles lp
             JOIN users u ON u.id = lp.user_id
             WHERE lp.id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Console listing with search, filters and ordering.
    pub async fn console_list(
        pool: &PgPool,
        query: &ConsoleQuery,
    ) -> Result<Vec<LecturerProfile>, sqlx::Error> {
        let sql = console::build(query, console_column, "lp.id")?;
        let statement = format!(
            "SELECT {LP_COLUMNS}
             FROM lecturer_profiles lp
             JOIN users u ON u.id = lp.user_id
             {} {} {}",
            sql.where_clause,
            sql.order_clause,
            sql.page_clause()
        );
        sql.bind_to(
            sqlx::query_as::<_, LecturerProfile>(&statement),
            query.limit,
            query.offset,
        )
        .fetch_all(pool)
        .await
    }
}
