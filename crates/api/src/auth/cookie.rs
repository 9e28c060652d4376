//! Session cookie rendering and parsing.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Attributes of the session cookie carrying the access token.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    /// `Lax`, `Strict` or `None`.
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "access_token".into(),
            secure: false,
            same_site: "Lax".into(),
        }
    }
}

impl CookieConfig {
    /// Load cookie attributes from environment variables.
    ///
    /// | Env Var                 | Default        |
    /// |-------------------------|----------------|
    /// | `TOKEN_COOKIE_NAME`     | `access_token` |
    /// | `TOKEN_COOKIE_SECURE`   | `false`        |
    /// | `TOKEN_COOKIE_SAMESITE` | `Lax`          |
    ///
    /// # Panics
    ///
    /// Panics on an unknown SameSite value.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let same_site = std::env::var("TOKEN_COOKIE_SAMESITE").unwrap_or(defaults.same_site);
        assert!(
            matches!(same_site.as_str(), "Lax" | "Strict" | "None"),
            "TOKEN_COOKIE_SAMESITE must be one of Lax, Strict, None"
        );
        Self {
            name: std::env::var("TOKEN_COOKIE_NAME").unwrap_or(defaults.name),
            secure: crate::config::parse_flag(std::env::var("TOKEN_COOKIE_SECURE").ok().as_deref()),
            same_site,
        }
    }

    /// `Set-Cookie` value for a freshly issued token.
    pub fn session_cookie(&self, token: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={token}; Path=/; HttpOnly; SameSite={}; Max-Age={max_age_secs}",
            self.name, self.same_site
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// The session token from the request's `Cookie` headers, if present.
    pub fn read_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn renders_http_only_cookie() {
        let config = CookieConfig::default();
        assert_eq!(
            config.session_cookie("abc", 60),
            "access_token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        let secure = CookieConfig {
            secure: true,
            same_site: "None".into(),
            ..CookieConfig::default()
        };
        assert!(secure.session_cookie("abc", 60).ends_with("SameSite=None; Max-Age=60; Secure"));
    }

    #[test]
    fn reads_token_among_other_cookies() {
        let config = CookieConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; access_token=tok.en; x=1"));
        assert_eq!(config.read_token(&headers).as_deref(), Some("tok.en"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        let config = CookieConfig::default();
        let mut headers = HeaderMap::new();
        assert_eq!(config.read_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(config.read_token(&headers), None);
    }
}
