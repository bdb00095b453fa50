//! API server configuration.

use std::fmt::Display;
use std::str::FromStr;

use tokenpair_core::config::{AuthSettings, ConfigError, resolve_signing_key};
use tokenpair_core::notify::smtp::{DEFAULT_SMTP_PORT, SmtpSettings};

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Issuer, hashing and refresh settings.
    pub auth: AuthSettings,
    /// Email relay for origin-change warnings; warnings are only logged without it.
    pub smtp: Option<SmtpSettings>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                        | Default                                  |
    /// |---------------------------------|------------------------------------------|
    /// | `BIND_ADDR`                     | `127.0.0.1:3100`                         |
    /// | `DATABASE_URL`                  | `postgres://localhost:5432/tokenpair`    |
    /// | `TOKEN_ISSUER`                  | `tokenpair`                              |
    /// | `ACCESS_TOKEN_KEY`              | generated & persisted to file            |
    /// | `REFRESH_TOKEN_KEY`             | generated & persisted to file            |
    /// | `ACCESS_TOKEN_LIFETIME_MINUTES` | `15`                                     |
    /// | `REFRESH_TOKEN_LIFETIME_HOURS`  | `24`                                     |
    /// | `BCRYPT_COST`                   | `10`                                     |
    /// | `NOTIFY_FAILURE_POLICY`         | `ignore`                                 |
    /// | `SMTP_HOST`                     | unset (warnings are logged, not emailed) |
    /// | `SMTP_PORT`                     | `465`                                    |
    /// | `SMTP_USER` / `SMTP_PASSWORD`   | required with `SMTP_HOST`                |
    /// | `SENDER_EMAIL`                  | required with `SMTP_HOST`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ApiConfig::from_env`] with variables read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let key = |var: &str, file: &str| match lookup(var) {
            Some(k) if !k.is_empty() => Ok(k),
            _ => resolve_signing_key(var, file),
        };
        let mut auth = AuthSettings::new(
            key("ACCESS_TOKEN_KEY", "access-token.key")?,
            key("REFRESH_TOKEN_KEY", "refresh-token.key")?,
        );

        if let Some(issuer) = lookup("TOKEN_ISSUER") {
            auth.issuer_name = issuer;
        }
        if let Some(v) = parse(&lookup, "ACCESS_TOKEN_LIFETIME_MINUTES")? {
            auth.access_lifetime_minutes = v;
        }
        if let Some(v) = parse(&lookup, "REFRESH_TOKEN_LIFETIME_HOURS")? {
            auth.refresh_lifetime_hours = v;
        }
        if let Some(v) = parse(&lookup, "BCRYPT_COST")? {
            auth.bcrypt_cost = v;
        }
        if let Some(v) = parse(&lookup, "NOTIFY_FAILURE_POLICY")? {
            auth.notify_failure = v;
        }
        auth.validate()?;

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3100".into()),
            pg_connection_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/tokenpair".into()),
            auth,
            smtp: smtp_settings(&lookup)?,
        })
    }
}

fn smtp_settings(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<SmtpSettings>, ConfigError> {
    let Some(host) = lookup("SMTP_HOST").filter(|h| !h.is_empty()) else {
        return Ok(None);
    };
    let required = |name: &str| {
        lookup(name).filter(|v| !v.is_empty()).ok_or_else(|| {
            ConfigError::ValidationError(format!("{name} is required with SMTP_HOST"))
        })
    };
    Ok(Some(SmtpSettings {
        port: parse(&lookup, "SMTP_PORT")?.unwrap_or(DEFAULT_SMTP_PORT),
        user: required("SMTP_USER")?,
        password: required("SMTP_PASSWORD")?,
        sender: required("SENDER_EMAIL")?,
        host,
    }))
}

fn parse<T>(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| ConfigError::ValidationError(format!("{name}: {e}")))
        })
        .transpose()
}
