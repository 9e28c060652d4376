//! Handlers for Telegram sign-in and the current user.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;
use vortex_core::error::CoreError;
use vortex_core::telegram::verify_init_data;
use vortex_db::models::user::{UpsertTelegramUser, User};
use vortex_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::telegram::{check_replay, enforce_rate_limit};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_ip::ClientIp;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/telegram`.
#[derive(Debug, Deserialize, Validate)]
pub struct TelegramAuthRequest {
    #[validate(length(min = 1, max = 4096))]
    pub init_data: String,
}

/// Successful sign-in response. The token is also set as an HttpOnly cookie.
#[derive(Debug, Serialize)]
pub struct TelegramAuthResponse {
    pub message: &'static str,
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/telegram
///
/// Verify Telegram Mini App `initData`, upsert the user and issue a JWT.
pub async fn telegram(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Json(input): Json<TelegramAuthRequest>,
) -> AppResult<Response> {
    input.validate()?;

    // 1. Rate limit per client IP.
    enforce_rate_limit(state.cache.as_ref(), &client_ip).await?;

    // 2. Signature and freshness.
    let telegram = &state.config.telegram;
    let identity = verify_init_data(
        &input.init_data,
        &telegram.bot_token,
        telegram.init_data_max_age_secs,
        Utc::now().timestamp(),
    )?;

    // 3. One sign-in per signed payload.
    check_replay(state.cache.as_ref(), &identity).await?;

    // 4. Persist the user.
    let user = UserRepo::upsert_telegram(
        &state.pool,
        &UpsertTelegramUser {
            telegram_id: identity.telegram_id,
            username: identity.username.clone(),
        },
    )
    .await?;

    // 5. Issue the token.
    let jwt = &state.config.jwt;
    let access_token =
        generate_access_token(user.id, user.telegram_id, user.username.as_deref(), jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let cookie = state
        .config
        .cookie
        .session_cookie(&access_token, jwt.expires_in_secs());
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::InternalError(format!("Invalid cookie value: {e}")))?;

    tracing::info!(user_id = user.id, telegram_id = user.telegram_id, "User signed in via Telegram");

    let body = TelegramAuthResponse {
        message: "authenticated",
        access_token,
        expires_in: jwt.expires_in_secs(),
        user,
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// GET /api/v1/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: user }))
}
