use anyhow::{bail, Context, Result};
use std::env;

const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_POSTS_PER_PAGE: i64 = 10;
const DEFAULT_LOGIN_URL: &str = "/auth/login/";
const DEFAULT_SESSION_COOKIE: &str = "access_token";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8000,http://127.0.0.1:8000";

/// Settings read once at startup and handed to whoever needs them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub http_port: u16,
    pub posts_per_page: i64,
    pub login_url: String,
    pub session_cookie: String,
    pub cors_allowed_origins: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;

        let http_port = parse_or(&lookup, "HTTP_PORT", DEFAULT_HTTP_PORT)?;
        let database_max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let posts_per_page = parse_or(&lookup, "POSTS_PER_PAGE", DEFAULT_POSTS_PER_PAGE)?;
        if posts_per_page < 1 {
            bail!("POSTS_PER_PAGE must be positive, got {}", posts_per_page);
        }

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            http_port,
            posts_per_page,
            login_url: lookup("LOGIN_URL").unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
            session_cookie: lookup("SESSION_COOKIE")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        })
    }

    pub fn http_addr(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")]).unwrap();

        assert_eq!(config.http_port, 3000);
        assert_eq!(config.posts_per_page, 10);
        assert_eq!(config.login_url, "/auth/login/");
        assert_eq!(config.session_cookie, "access_token");
        assert_eq!(config.http_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn required_values_are_enforced() {
        let err = config(&[("JWT_SECRET", "s")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let base = [("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")];

        let err = config(&[base[0], base[1], ("POSTS_PER_PAGE", "ten")]).unwrap_err();
        assert!(err.to_string().contains("POSTS_PER_PAGE"));

        assert!(config(&[base[0], base[1], ("POSTS_PER_PAGE", "0")]).is_err());

        let config = config(&[base[0], base[1], ("POSTS_PER_PAGE", " 5 ")]).unwrap();
        assert_eq!(config.posts_per_page, 5);
    }
}
