//! Telegram Mini App `initData` verification.
//!
//! `initData` arrives as newline-separated `key=value` lines. The `hash`
//! line is an HMAC-SHA256 (keyed by SHA-256 of the bot token) over the
//! remaining lines sorted by key and joined with `\n`.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Default freshness window for `auth_date` (24 hours).
pub const DEFAULT_MAX_AGE_SECS: i64 = 86_400;

/// A verified Telegram identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramIdentity {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub auth_date: i64,
    /// Hex signature as received; used for replay detection.
    pub hash: String,
}

#[derive(Deserialize)]
struct EmbeddedUser {
    id: i64,
    username: Option<String>,
}

/// Split `initData` into its fields. Lines without `=` are ignored.
pub fn parse_init_data(init_data: &str) -> BTreeMap<String, String> {
    init_data
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

/// Verify `initData` against the bot token and freshness window.
///
/// `now` is the current UTC Unix timestamp.
pub fn verify_init_data(
    init_data: &str,
    bot_token: &str,
    max_age_secs: i64,
    now: i64,
) -> Result<TelegramIdentity, CoreError> {
    let mut fields = parse_init_data(init_data);
    let received = fields
        .remove("hash")
        .ok_or_else(|| CoreError::Validation("Invalid init_data".into()))?;
    if !fields.contains_key("auth_date") {
        return Err(CoreError::Validation("Invalid init_data".into()));
    }

    let expected = hex::decode(&received)
        .map_err(|_| CoreError::Unauthorized("Invalid signature".into()))?;
    let mut mac = signer(bot_token);
    mac.update(data_check_string(&fields).as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| CoreError::Unauthorized("Invalid signature".into()))?;

    let auth_date: i64 = fields
        .get("auth_date")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| CoreError::Validation("Invalid auth_date".into()))?;
    if now.saturating_sub(auth_date) > max_age_secs {
        return Err(CoreError::Unauthorized("init_data expired".into()));
    }

    let (telegram_id, username) = identity_fields(&fields)?;

    Ok(TelegramIdentity {
        telegram_id,
        username,
        auth_date,
        hash: received,
    })
}

/// Sign a field set the way Telegram does. Returns the hex digest.
pub fn sign_fields(fields: &BTreeMap<String, String>, bot_token: &str) -> String {
    let mut mac = signer(bot_token);
    mac.update(data_check_string(fields).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn signer(bot_token: &str) -> HmacSha256 {
    let secret = Sha256::digest(bot_token.as_bytes());
    HmacSha256::new_from_slice(&secret).expect("HMAC accepts any key length")
}

fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .filter(|(k, _)| k.as_str() != "hash")
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn identity_fields(
    fields: &BTreeMap<String, String>,
) -> Result<(i64, Option<String>), CoreError> {
    if let Some(user) = fields.get("user") {
        if let Ok(embedded) = serde_json::from_str::<EmbeddedUser>(user) {
            return Ok((embedded.id, embedded.username));
        }
    }

    let raw_id = fields
        .get("user_id")
        .or_else(|| fields.get("id"))
        .or_else(|| fields.get("user"))
        .ok_or_else(|| CoreError::Validation("init_data carries no user id".into()))?;
    let telegram_id = raw_id
        .parse()
        .map_err(|_| CoreError::Validation("init_data user id is not numeric".into()))?;
    let username = fields.get("username").cloned().filter(|u| !u.is_empty());
    Ok((telegram_id, username))
}
