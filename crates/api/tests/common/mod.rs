#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use vortex_api::auth::cookie::CookieConfig;
use vortex_api::auth::jwt::{generate_access_token, JwtConfig};
use vortex_api::config::{CacheConfig, IdempotencyConfig, ServerConfig, TelegramConfig};
use vortex_api::router::build_app_router;
use vortex_api::state::AppState;
use vortex_core::cache::{KeyValueCache, MemoryCache};
use vortex_core::telegram::sign_fields;
use vortex_db::models::case::CreateCase;
use vortex_db::models::gift::{CreateGift, Gift};
use vortex_db::models::user::{UpsertTelegramUser, User};
use vortex_db::repositories::{CaseRepo, GiftRepo, UserRepo};

pub const BOT_TOKEN: &str = "123456:test-bot-token";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        debug: false,
        trust_forwarded_for: false,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 1440,
        },
        cookie: CookieConfig::default(),
        telegram: TelegramConfig {
            bot_token: BOT_TOKEN.to_string(),
            init_data_max_age_secs: 86_400,
        },
        cache: CacheConfig::default(),
        idempotency: IdempotencyConfig::default(),
    }
}

/// Build the full application router with a fresh in-memory cache.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_cache(pool, Arc::new(MemoryCache::new()))
}

/// Build the full application router, using the exact middleware stack
/// production uses, over the given pool and cache.
pub fn build_test_app_with_cache(pool: PgPool, cache: Arc<dyn KeyValueCache>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache,
    };
    build_app_router(state, &config)
}

/// A bearer token for `user`.
pub fn token_for(user: &User) -> String {
    generate_access_token(
        user.id,
        user.telegram_id,
        user.username.as_deref(),
        &test_config().jwt,
    )
    .expect("token generation should succeed")
}

/// Signed `initData` for `telegram_id`, issued now.
pub fn signed_init_data(telegram_id: i64, username: &str) -> String {
    let mut fields = BTreeMap::new();
    fields.insert("auth_date".to_string(), chrono::Utc::now().timestamp().to_string());
    fields.insert(
        "user".to_string(),
        format!(r#"{{"id":{telegram_id},"username":"{username}"}}"#),
    );
    let hash = sign_fields(&fields, BOT_TOKEN);
    let mut lines: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
    lines.push(format!("hash={hash}"));
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, telegram_id: i64) -> User {
    UserRepo::upsert_telegram(
        pool,
        &UpsertTelegramUser {
            telegram_id,
            username: Some(format!("user{telegram_id}")),
        },
    )
    .await
    .unwrap()
}

pub async fn create_gift(pool: &PgPool, name: &str, real: f64, visual: f64, price: f64) -> Gift {
    GiftRepo::create(
        pool,
        &CreateGift {
            name: name.to_string(),
            img: Some(format!("/img/{name}.png")),
            real_rarity: real,
            visual_rarity: visual,
            rarity_color: None,
            price,
        },
    )
    .await
    .unwrap()
}

pub async fn create_case(pool: &PgPool, name: &str, gift_ids: &[i64]) -> i64 {
    let case = CaseRepo::create(
        pool,
        &CreateCase {
            name: name.to_string(),
            img: None,
            price: 10.0,
        },
    )
    .await
    .unwrap();
    CaseRepo::add_gifts(pool, case.id, gift_ids).await.unwrap();
    case.id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
