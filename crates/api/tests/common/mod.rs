#![allow(dead_code)]

use std::sync::Arc;

use akademik_api::auth::jwt::{generate_access_token, JwtConfig};
use akademik_api::auth::password::hash_password;
use akademik_api::config::ServerConfig;
use akademik_api::router::build_app_router;
use akademik_api::state::AppState;
use akademik_core::choices::UserType;
use akademik_core::principal::unusable_password;
use akademik_db::models::user::{CreateUser, User};
use akademik_db::repositories::UserRepo;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

/// Password given to every account created by [`create_user`].
pub const TEST_PASSWORD: &str = "rahasia123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        min_password_length: 1,
        jwt: JwtConfig {
            secret: "test-secret-used-only-in-integration-tests".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router, with the production middleware stack,
/// on the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active account with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, username: &str, user_type: UserType) -> User {
    insert_user(pool, username, user_type, hash_password(TEST_PASSWORD).unwrap()).await
}

/// Insert an account with an unusable credential.
pub async fn create_passwordless_user(pool: &PgPool, username: &str, user_type: UserType) -> User {
    insert_user(pool, username, user_type, unusable_password()).await
}

async fn insert_user(
    pool: &PgPool,
    username: &str,
    user_type: UserType,
    password_hash: String,
) -> User {
    let input = CreateUser {
        username: username.to_string(),
        password_hash,
        full_name: Some(format!("{username} full")),
        user_type,
        profile_picture: None,
        phone_number: None,
        email: None,
        program_studi: None,
        tempat_lahir: None,
        birth_date: None,
        gender: None,
        is_active: true,
        is_staff: false,
        is_superuser: false,
    };
    UserRepo::create(pool, &input).await.unwrap()
}

/// Access token for `user`, signed with the test configuration.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.user_type, &test_config().jwt).unwrap()
}

/// Create a super admin and return it with its access token.
pub async fn operator(pool: &PgPool) -> (User, String) {
    let user = create_user(pool, "operator", UserType::SuperAdmin).await;
    let token = token_for(&user);
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(&body)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(&body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(&body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(&body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
