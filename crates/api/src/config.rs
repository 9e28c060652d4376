use crate::auth::cookie::CookieConfig;
use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on connection draining after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Development mode. Disables HSTS.
    pub debug: bool,
    /// Take the client address from `X-Forwarded-For` instead of the socket
    /// peer. Enable only behind a reverse proxy that sets the header.
    pub trust_forwarded_for: bool,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Session cookie attributes.
    pub cookie: CookieConfig,
    pub telegram: TelegramConfig,
    pub cache: CacheConfig,
    pub idempotency: IdempotencyConfig,
}

/// Telegram Mini App verification settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Maximum age of `initData` in seconds (default: `86400`).
    pub init_data_max_age_secs: i64,
}

/// External cache settings.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// `redis://` URL. When absent the server uses a process-local cache.
    pub redis_url: Option<String>,
    /// Prefix prepended to every Redis key.
    pub key_prefix: String,
}

/// Retention of upgrade idempotency records and their in-flight locks.
#[derive(Debug, Clone)]
pub struct IdempotencyConfig {
    pub record_ttl_secs: u64,
    pub lock_ttl_secs: u64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            record_ttl_secs: 86_400,
            lock_ttl_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                 |
    /// |-----------------------------------|-------------------------|
    /// | `HOST`                            | `0.0.0.0`               |
    /// | `PORT`                            | `8000`                  |
    /// | `CORS_ORIGINS`                    | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`            | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`           | `30`                    |
    /// | `DEBUG`                           | `false`                 |
    /// | `TRUST_FORWARDED_FOR`             | `false`                 |
    /// | `TELEGRAM_BOT_TOKEN`              | **required**            |
    /// | `TELEGRAM_INIT_DATA_MAX_AGE_SECS` | `86400`                 |
    /// | `REDIS_URL`                       | unset (in-memory cache) |
    /// | `CACHE_KEY_PREFIX`                | empty                   |
    /// | `IDEMPOTENCY_TTL_SECS`            | `86400`                 |
    /// | `IDEMPOTENCY_LOCK_SECS`           | `30`                    |
    ///
    /// JWT and cookie variables are documented on [`JwtConfig::from_env`]
    /// and [`CookieConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on malformed values or a missing bot token.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let debug = parse_flag(std::env::var("DEBUG").ok().as_deref());
        let trust_forwarded_for =
            parse_flag(std::env::var("TRUST_FORWARDED_FOR").ok().as_deref());

        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .expect("TELEGRAM_BOT_TOKEN must be set in the environment");
        assert!(!bot_token.is_empty(), "TELEGRAM_BOT_TOKEN must not be empty");

        let init_data_max_age_secs: i64 = std::env::var("TELEGRAM_INIT_DATA_MAX_AGE_SECS")
            .unwrap_or_else(|_| vortex_core::telegram::DEFAULT_MAX_AGE_SECS.to_string())
            .parse()
            .expect("TELEGRAM_INIT_DATA_MAX_AGE_SECS must be a valid i64");

        let cache = CacheConfig {
            redis_url: std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            key_prefix: std::env::var("CACHE_KEY_PREFIX").unwrap_or_default(),
        };

        let defaults = IdempotencyConfig::default();
        let idempotency = IdempotencyConfig {
            record_ttl_secs: std::env::var("IDEMPOTENCY_TTL_SECS")
                .map(|v| v.parse().expect("IDEMPOTENCY_TTL_SECS must be a valid u64"))
                .unwrap_or(defaults.record_ttl_secs),
            lock_ttl_secs: std::env::var("IDEMPOTENCY_LOCK_SECS")
                .map(|v| v.parse().expect("IDEMPOTENCY_LOCK_SECS must be a valid u64"))
                .unwrap_or(defaults.lock_ttl_secs),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            debug,
            trust_forwarded_for,
            jwt: JwtConfig::from_env(),
            cookie: CookieConfig::from_env(),
            telegram: TelegramConfig {
                bot_token,
                init_data_max_age_secs,
            },
            cache,
            idempotency,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Interpret a boolean-ish environment value. Unset means `false`.
pub fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            parse_origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn flags() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" YES ")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }
}
