//! Integration tests for the `/lecturers` and `/students` resources.

mod common;

use akademik_core::choices::UserType;
use akademik_db::repositories::StudentRepo;
use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, patch_json_auth, post_json_auth, put_json_auth,
};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_lecturer(pool: &PgPool, token: &str, user_id: i64, nip: &str) -> Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/lecturers",
        json!({
            "user_id": user_id,
            "nip": nip,
            "jabatan_akademik": "Lektor",
            "pendidikan_terakhir": "S3",
            "bidang_keahlian": "Sistem Informasi",
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn student_body(user_id: i64, nim: &str) -> Value {
    json!({
        "user_id": user_id,
        "nim": nim,
        "angkatan": "2024",
        "kelas": "B",
        "tanggal_masuk": "2024-09-01",
    })
}

// ---------------------------------------------------------------------------
// Lecturers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lecturer_profile_nests_owner(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let sari = common::create_user(&pool, "sari", UserType::Lecturer).await;

    let created = create_lecturer(&pool, &token, sari.id, "198701012010").await;

    assert_eq!(created["user"]["username"], "sari");
    assert_eq!(created["nip"], "198701012010");
    assert_eq!(created["status_kepegawaian"], "PNS");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/lecturers", &token).await;
    let list = body_json(response).await["data"].clone();
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lecturer_owner_must_be_dosen(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let budi = common::create_user(&pool, "budi", UserType::Student).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/lecturers",
        json!({ "user_id": budi.id, "nip": "1" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "REFERENCE_NOT_FOUND");
    assert_eq!(json["field"], "user_id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_nip_conflicts(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let sari = common::create_user(&pool, "sari", UserType::Lecturer).await;
    let andi = common::create_user(&pool, "andi", UserType::Lecturer).await;
    create_lecturer(&pool, &token, sari.id, "111").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/lecturers",
        json!({ "user_id": andi.id, "nip": "111" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["field"], "nip");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_profile_for_same_owner_conflicts(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let sari = common::create_user(&pool, "sari", UserType::Lecturer).await;
    create_lecturer(&pool, &token, sari.id, "111").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/lecturers",
        json!({ "user_id": sari.id, "nip": "222" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["field"], "user_id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_nips_do_not_collide(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let sari = common::create_user(&pool, "sari", UserType::Lecturer).await;
    let andi = common::create_user(&pool, "andi", UserType::Lecturer).await;

    let first = create_lecturer(&pool, &token, sari.id, "").await;
    let second = create_lecturer(&pool, &token, andi.id, "").await;

    assert!(first["nip"].is_null());
    assert!(second["nip"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lecturer_put_and_patch(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let sari = common::create_user(&pool, "sari", UserType::Lecturer).await;
    let created = create_lecturer(&pool, &token, sari.id, "111").await;
    let uri = format!("/api/v1/lecturers/{}", created["id"]);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(app, &uri, json!({ "jabatan_akademik": null }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched = body_json(response).await["data"].clone();
    assert!(patched["jabatan_akademik"].is_null());
    assert_eq!(patched["bidang_keahlian"], "Sistem Informasi");

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, &uri, json!({ "user_id": sari.id }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let replaced = body_json(response).await["data"].clone();
    assert!(replaced["nip"].is_null());
    assert_eq!(replaced["pendidikan_terakhir"], "S2");
    assert_eq!(replaced["bidang_keahlian"], "");
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_profile_defaults_and_advisor_name(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let sari = common::create_user(&pool, "sari", UserType::Lecturer).await;
    let budi = common::create_user(&pool, "budi", UserType::Student).await;
    let advisor = create_lecturer(&pool, &token, sari.id, "111").await;

    let mut body = student_body(budi.id, "2401001");
    body["dosen_wali"] = advisor["id"].clone();
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/students", body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await["data"].clone();
    assert_eq!(created["semester"], 1);
    assert_eq!(created["status"], "Aktif");
    assert_eq!(created["ipk"], "0.00");
    assert_eq!(created["dosen_wali"], advisor["id"]);
    assert_eq!(created["dosen_wali_name"], "sari full");
    assert_eq!(created["user"]["username"], "budi");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_owner_must_be_mahasiswa(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let sari = common::create_user(&pool, "sari", UserType::Lecturer).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(app, "/api/v1/students", student_body(sari.id, "1"), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "REFERENCE_NOT_FOUND");
    assert_eq!(json["field"], "user_id");
    assert!(StudentRepo::find_by_user_id(&pool, sari.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_advisor_is_rejected(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let budi = common::create_user(&pool, "budi", UserType::Student).await;
    let mut body = student_body(budi.id, "2401001");
    body["dosen_wali"] = json!(999_999);
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/students", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "REFERENCE_NOT_FOUND");
    assert_eq!(json["field"], "dosen_wali");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_gpa_and_semester_are_rejected(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let budi = common::create_user(&pool, "budi", UserType::Student).await;

    let mut body = student_body(budi.id, "2401001");
    body["ipk"] = json!("12.50");
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/students", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "ipk");

    let mut body = student_body(budi.id, "2401001");
    body["semester"] = json!(-1);
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/students", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "semester");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_nim_conflicts(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let budi = common::create_user(&pool, "budi", UserType::Student).await;
    let ani = common::create_user(&pool, "ani", UserType::Student).await;

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/students", student_body(budi.id, "2401001"), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response =
        post_json_auth(app, "/api/v1/students", student_body(ani.id, "2401001"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["field"], "nim");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn derived_advisor_name_is_rejected_on_input(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let budi = common::create_user(&pool, "budi", UserType::Student).await;
    let mut body = student_body(budi.id, "2401001");
    body["dosen_wali_name"] = json!("Dr. Sari");
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/students", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_advisor_clears_dosen_wali(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let sari = common::create_user(&pool, "sari", UserType::Lecturer).await;
    let budi = common::create_user(&pool, "budi", UserType::Student).await;
    let advisor = create_lecturer(&pool, &token, sari.id, "111").await;

    let mut body = student_body(budi.id, "2401001");
    body["dosen_wali"] = advisor["id"].clone();
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/students", body, &token).await;
    let student_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response =
        delete_auth(app, &format!("/api/v1/lecturers/{}", advisor["id"]), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/students/{student_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let student = body_json(response).await["data"].clone();
    assert!(student["dosen_wali"].is_null());
    assert!(student["dosen_wali_name"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_patch_updates_gpa_and_status(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let budi = common::create_user(&pool, "budi", UserType::Student).await;
    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/students", student_body(budi.id, "2401001"), &token).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = patch_json_auth(
        app,
        &format!("/api/v1/students/{id}"),
        json!({ "ipk": 3.75, "status": "Cuti", "semester": 3 }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let student = body_json(response).await["data"].clone();
    assert_eq!(student["ipk"], "3.75");
    assert_eq!(student["status"], "Cuti");
    assert_eq!(student["semester"], 3);
    assert_eq!(student["nim"], "2401001");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_missing_profile_returns_404(pool: PgPool) {
    let (_, token) = common::operator(&pool).await;
    let app = common::build_test_app(pool);

    let response = delete_auth(app, "/api/v1/students/5555", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
