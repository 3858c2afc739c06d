//! Repository for the `users` table.

use akademik_core::choices::UserType;
use akademik_core::types::DbId;
use sqlx::PgPool;

use crate::models::console::ConsoleQuery;
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repositories::console;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, password_hash, full_name, user_type, profile_picture, \
                       phone_number, email, program_studi, tempat_lahir, birth_date, gender, \
                       is_active, is_staff, is_superuser, last_login, date_joined, \
                       created_at, updated_at";

/// Same columns qualified with the `u` alias, for joined or filtered queries.
const U_COLUMNS: &str = "u.id, u.username, u.password_hash, u.full_name, u.user_type, \
                         u.profile_picture, u.phone_number, u.email, u.program_studi, \
                         u.tempat_lahir, u.birth_date, u.gender, u.is_active, u.is_staff, \
                         u.is_superuser, u.last_login, u.date_joined, u.created_at, u.updated_at";

/// Map a console field name onto its column.
fn console_column(field: &str) -> Option<&'static str> {
    Some(match field {
        "username" => "u.username",
        "full_name" => "u.full_name",
        "email" => "u.email",
        "user_type" => "u.user_type",
        "phone_number" => "u.phone_number",
        "program_studi" => "u.program_studi",
        "gender" => "u.gender",
        "is_active" => "u.is_active",
        "is_staff" => "u.is_staff",
        "is_superuser" => "u.is_superuser",
        "last_login" => "u.last_login",
        "date_joined" => "u.date_joined",
        "created_at" => "u.created_at",
        "updated_at" => "u.updated_at",
        _ => return None,
    })
}

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, password_hash, full_name, user_type, profile_picture,
                                phone_number, email, program_studi, tempat_lahir, birth_date,
                                gender, is_active, is_staff, is_superuser)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(input.user_type)
            .bind(&input.profile_picture)
            .bind(&input.phone_number)
            .bind(&input.email)
            .bind(input.program_studi)
            .bind(&input.tempat_lahir)
            .bind(input.birth_date)
            .bind(input.gender)
            .bind(input.is_active)
            .bind(input.is_staff)
            .bind(input.is_superuser)
            .fetch_one(pool)
            .await
    }

    /// Insert `input` (whose `password_hash` is the unusable marker), then
    /// replace the credential with `password_hash`, in one transaction.
    ///
    /// If either step fails nothing is persisted.
    pub async fn create_then_set_password(
        pool: &PgPool,
        input: &CreateUser,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO users (username, password_hash, full_name, user_type, profile_picture,
                                phone_number, email, program_studi, tempat_lahir, birth_date,
                                gender, is_active, is_staff, is_superuser)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING id"
        );
        let id: DbId = sqlx::query_scalar(&insert)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(input.user_type)
            .bind(&input.profile_picture)
            .bind(&input.phone_number)
            .bind(&input.email)
            .bind(input.program_studi)
            .bind(&input.tempat_lahir)
            .bind(input.birth_date)
            .bind(input.gender)
            .bind(input.is_active)
            .bind(input.is_staff)
            .bind(input.is_superuser)
            .fetch_one(&mut *tx)
            .await?;

        let update = format!("UPDATE users SET password_hash = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let user = sqlx::query_as::<_, User>(&update)
            .bind(id)
            .bind(password_hash)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by ID, but only if it has the given account type.
    ///
    /// Used to resolve owner references that are restricted to one role.
    pub async fn find_by_id_and_type(
        pool: &PgPool,
        id: DbId,
        user_type: UserType,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND user_type = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(user_type)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several users at once (order unspecified).
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<User>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = ANY($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Whether another user (other than `exclude_id`) already has `username`.
    pub async fn username_taken(
        pool: &PgPool,
        username: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users
                           WHERE username = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Whether another user (other than `exclude_id`) already has `email`.
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users
                           WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// List users, most recently created first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Replace a user's editable attributes and, when `password_hash` is
    /// given, the stored credential in the same statement.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = $2,
                full_name = $3,
                user_type = $4,
                profile_picture = $5,
                phone_number = $6,
                email = $7,
                program_studi = $8,
                tempat_lahir = $9,
                birth_date = $10,
                gender = $11,
                is_active = $12,
                is_staff = $13,
                is_superuser = $14,
                password_hash = COALESCE($15, password_hash)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.full_name)
            .bind(input.user_type)
            .bind(&input.profile_picture)
            .bind(&input.phone_number)
            .bind(&input.email)
            .bind(input.program_studi)
            .bind(&input.tempat_lahir)
            .bind(input.birth_date)
            .bind(input.gender)
            .bind(input.is_active)
            .bind(input.is_staff)
            .bind(input.is_superuser)
            .bind(password_hash)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a user; owned profiles go with it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `last_login` to now after a successful authentication.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Console listing with search, filters and ordering.
    pub async fn console_list(
        pool: &PgPool,
        query: &ConsoleQuery,
    ) -> Result<Vec<User>, sqlx::Error> {
        let sql = console::build(query, console_column, "u.id")?;
        let statement = format!(
            "SELECT {U_COLUMNS} FROM users u {} {} {}",
            sql.where_clause,
            sql.order_clause,
            sql.page_clause()
        );
        sql.bind_to(sqlx::query_as::<_, User>(&statement), query.limit, query.offset)
            .fetch_all(pool)
            .await
    }
}
