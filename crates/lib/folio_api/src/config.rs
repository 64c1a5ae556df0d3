//! API server configuration.

use std::fmt;
use std::path::PathBuf;

use chrono::Duration;
use folio_core::auth::AuthError;
use folio_core::auth::jwt::{DEFAULT_TOKEN_TTL_SECS, JwtSecret};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/folio";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Token signing secret.
    pub jwt_secret: JwtSecret,
    /// Token validity window.
    pub token_ttl: Duration,
    /// Root directory for uploaded files.
    pub upload_dir: PathBuf,
    /// Largest accepted upload.
    pub max_upload_bytes: usize,
    /// Administrator account to create at startup, if any.
    pub admin: Option<AdminBootstrap>,
}

/// Credentials for the startup admin account.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable           | Default                            |
    /// |--------------------|------------------------------------|
    /// | `JWT_SECRET`       | required, at least 32 bytes        |
    /// | `JWT_TTL_SECS`     | `604800`                           |
    /// | `BIND_ADDR`        | `127.0.0.1:8080`                   |
    /// | `DATABASE_URL`     | `postgres://localhost:5432/folio`  |
    /// | `UPLOAD_DIR`       | `uploads`                          |
    /// | `MAX_UPLOAD_BYTES` | `5242880`                          |
    /// | `ADMIN_EMAIL` / `ADMIN_PASSWORD` / `ADMIN_NAME` | unset |
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .ok_or_else(|| AuthError::Configuration("JWT_SECRET must be set".into()))?;
        let jwt_secret = JwtSecret::new(secret)?;

        let ttl_secs = parse_or(&lookup, "JWT_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if ttl_secs <= 0 {
            return Err(AuthError::Configuration(
                "JWT_TTL_SECS must be positive".into(),
            ));
        }
        let token_ttl = Duration::try_seconds(ttl_secs).ok_or_else(|| {
            AuthError::Configuration(format!("JWT_TTL_SECS is out of range: {ttl_secs}"))
        })?;

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap {
                    email,
                    password,
                    name: lookup("ADMIN_NAME").unwrap_or_else(|| "Admin".into()),
                })
            }
            _ => None,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            jwt_secret,
            token_ttl,
            upload_dir: lookup("UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into())
                .into(),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            admin,
        })
    }

    /// Defaults around an already validated secret. Used by tests and embedders.
    pub fn for_secret(jwt_secret: JwtSecret) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            database_url: DEFAULT_DATABASE_URL.into(),
            jwt_secret,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            upload_dir: DEFAULT_UPLOAD_DIR.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            admin: None,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AuthError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AuthError::Configuration(format!("{key} is not a valid number: {raw}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.token_ttl, Duration::days(7));
        assert_eq!(config.max_upload_bytes, 5_242_880);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(config.admin.is_none());
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let err = ApiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn short_secret_is_a_configuration_error() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn bad_ttl_is_rejected() {
        let too_long = i64::MAX.to_string();
        for ttl in ["abc", "0", "-5", too_long.as_str()] {
            let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("JWT_TTL_SECS", ttl)]))
                .unwrap_err();
            assert!(matches!(err, AuthError::Configuration(_)), "ttl {ttl}");
        }
    }

    #[test]
    fn admin_bootstrap_needs_email_and_password() {
        let partial = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("ADMIN_EMAIL", "root@x.com"),
        ]))
        .unwrap();
        assert!(partial.admin.is_none());

        let full = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("ADMIN_EMAIL", "root@x.com"),
            ("ADMIN_PASSWORD", "hunter22"),
        ]))
        .unwrap();
        let admin = full.admin.unwrap();
        assert_eq!(admin.name, "Admin");
        assert!(!format!("{admin:?}").contains("hunter22"));
    }
}
