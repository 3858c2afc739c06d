//! Integration tests for the `/users` resource.

mod common;

use akademik_api::auth::password::verify_password;
use akademik_core::choices::UserType;
use akademik_core::principal::Principal;
use akademik_db::repositories::UserRepo;
use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, patch_json_auth, post_json_auth, put_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn operator_creates_and_reads_user(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app,
        "/api/v1/users",
        json!({
            "username": "sari",
            "full_name": "Dr. Sari",
            "email": "sari@example.ac.id",
            "user_type": "dosen",
            "gender": "Perempuan",
            "birth_date": "1987-01-01",
        }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await["data"].clone();
    assert_eq!(created["user_type"], "dosen");
    assert_eq!(created["is_active"], true);
    let id = created["id"].as_i64().unwrap();

    let stored = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(!stored.has_usable_password());
    assert!(!stored.is_staff);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/users/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await["data"].clone();
    assert_eq!(fetched, created);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn read_output_can_be_posted_back(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let original = json!({
        "username": "sari",
        "full_name": "Dr. Sari",
        "email": "sari@example.ac.id",
        "user_type": "dosen",
        "phone_number": "0812",
        "profile_picture": "profile_pictures/sari.png",
        "tempat_lahir": "Bandung",
        "birth_date": "1987-01-01",
        "gender": "Perempuan",
        "program_studi": "Program Studi Bisnis Digital",
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/users", original, &token).await;
    let first = body_json(response).await["data"].clone();

    let mut copy = first.clone();
    let object = copy.as_object_mut().unwrap();
    for read_only in ["id", "created_at", "updated_at"] {
        object.remove(read_only);
    }
    object.insert("username".into(), json!("sari2"));
    object.insert("email".into(), json!("sari2@example.ac.id"));

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/users", copy, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await["data"].clone();

    for field in [
        "full_name",
        "user_type",
        "phone_number",
        "profile_picture",
        "tempat_lahir",
        "birth_date",
        "gender",
        "program_studi",
        "is_active",
    ] {
        assert_eq!(second[field], first[field], "{field}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_user_with_password_hashes_it(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app,
        "/api/v1/users",
        json!({ "username": "budi", "password": "Rahasia123!" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let user = UserRepo::find_by_username(&pool, "budi")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.user_type, UserType::Student);
    assert!(verify_password("Rahasia123!", &user.password_hash));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_user_with_empty_password_gets_unusable_credential(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app,
        "/api/v1/users",
        json!({ "username": "budi", "password": "" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let user = UserRepo::find_by_username(&pool, "budi")
        .await
        .unwrap()
        .unwrap();
    assert!(!user.has_usable_password());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn read_only_fields_are_rejected(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/users",
        json!({ "id": 999, "username": "budi" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_choice_is_rejected(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/users",
        json!({ "username": "budi", "user_type": "guest" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_conflicts(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let body = |username: &str| json!({ "username": username, "email": "sama@example.ac.id" });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/users", body("satu"), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/users", body("dua"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["field"], "email");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_user_returns_404(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/users/424242", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "User with id 424242 not found");
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn put_replaces_and_patch_merges(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let user = common::create_user(&pool, "budi", UserType::Student).await;
    let uri = format!("/api/v1/users/{}", user.id);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &uri,
        json!({ "phone_number": "08123456789", "tempat_lahir": "Bandung" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched = body_json(response).await["data"].clone();
    assert_eq!(patched["phone_number"], "08123456789");
    assert_eq!(patched["full_name"], "budi full");

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(app, &uri, json!({ "tempat_lahir": null }), &token).await;
    let patched = body_json(response).await["data"].clone();
    assert!(patched["tempat_lahir"].is_null());
    assert_eq!(patched["phone_number"], "08123456789");

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &uri,
        json!({ "username": "budi2", "user_type": "mahasiswa" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let replaced = body_json(response).await["data"].clone();
    assert_eq!(replaced["username"], "budi2");
    assert!(replaced["full_name"].is_null());
    assert!(replaced["phone_number"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn patch_password_rehashes(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let user = common::create_user(&pool, "budi", UserType::Student).await;
    let app = common::build_test_app(pool.clone());

    let response = patch_json_auth(
        app,
        &format!("/api/v1/users/{}", user.id),
        json!({ "password": "BaruSekali1" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(verify_password("BaruSekali1", &stored.password_hash));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn patch_with_empty_password_keeps_credential(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let user = common::create_user(&pool, "budi", UserType::Student).await;
    let app = common::build_test_app(pool.clone());

    let response = patch_json_auth(
        app,
        &format!("/api/v1/users/{}", user.id),
        json!({ "password": "", "full_name": "Budi" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, user.password_hash);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_patch_does_not_change_password(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let user = common::create_user(&pool, "budi", UserType::Student).await;
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/users",
        json!({ "username": "sari", "email": "sari@example.ac.id" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/users/{}", user.id),
        json!({ "password": "BaruSekali1", "email": "sari@example.ac.id" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, user.password_hash);
    assert!(stored.email.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn patch_keeping_own_username_does_not_conflict(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let user = common::create_user(&pool, "budi", UserType::Student).await;
    let app = common::build_test_app(pool);

    let response = patch_json_auth(
        app,
        &format!("/api/v1/users/{}", user.id),
        json!({ "username": "budi" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Deactivate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_deactivates_instead_of_removing(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let user = common::create_user(&pool, "budi", UserType::Student).await;
    let app = common::build_test_app(pool.clone());

    let response = delete_auth(app, &format!("/api/v1/users/{}", user.id), &token).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_can_read_but_not_write(pool: PgPool) {
    let student = common::create_user(&pool, "budi", UserType::Student).await;
    let token = common::token_for(&student);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/users", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/users", json!({ "username": "x" }), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_lecturer_is_an_operator(pool: PgPool) {
    let lecturer = common::create_user(&pool, "sari", UserType::Lecturer).await;
    let mut update = akademik_db::models::user::UpdateUser::from(&lecturer);
    update.is_staff = true;
    UserRepo::update(&pool, lecturer.id, &update, None).await.unwrap();
    let token = common::token_for(&lecturer);
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/users", json!({ "username": "budi" }), &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
}
