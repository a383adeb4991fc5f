use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use axum::http::HeaderValue;

/// Where completed quiz results are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    Postgres,
    Memory,
}

impl FromStr for HistoryBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(HistoryBackend::Postgres),
            "memory" | "in-memory" => Ok(HistoryBackend::Memory),
            other => Err(anyhow!("unknown history backend '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub port: u16,
    pub rust_log: String,
    /// Cooperative delay applied to login and registration.
    pub auth_delay: Duration,
    pub history_backend: HistoryBackend,
    pub question_bank_path: Option<PathBuf>,
    pub degree_programs_path: Option<PathBuf>,
    /// Allowed browser origin. Unset means any origin.
    pub frontend_url: Option<HeaderValue>,
    /// Requests allowed per client IP within `rate_limit_window` on `/api/` routes.
    pub rate_limit_max: u64,
    pub rate_limit_window: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_expires_in: parse_duration(&env_or("JWT_EXPIRES_IN", "7d"))
                .context("JWT_EXPIRES_IN must look like 30s, 15m, 24h or 7d")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            auth_delay: Duration::from_millis(
                env_or("AUTH_DELAY_MS", "800")
                    .parse::<u64>()
                    .context("AUTH_DELAY_MS must be a whole number of milliseconds")?,
            ),
            history_backend: env_or("HISTORY_BACKEND", "postgres").parse()?,
            question_bank_path: std::env::var("QUESTION_BANK_PATH").ok().map(PathBuf::from),
            degree_programs_path: std::env::var("DEGREE_PROGRAMS_PATH").ok().map(PathBuf::from),
            frontend_url: std::env::var("FRONTEND_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| HeaderValue::from_str(v.trim()))
                .transpose()
                .context("FRONTEND_URL must be a valid origin header value")?,
            rate_limit_max: env_or("RATE_LIMIT_MAX", "100")
                .parse::<u64>()
                .context("RATE_LIMIT_MAX must be a whole number")?,
            rate_limit_window: parse_duration(&env_or("RATE_LIMIT_WINDOW", "15m"))
                .context("RATE_LIMIT_WINDOW must look like 30s, 15m, 24h or 7d")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses `<n>s`, `<n>m`, `<n>h`, `<n>d` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&raw[..i], c),
        Some(_) => (raw, 's'),
        None => bail!("empty duration"),
    };
    let n: u64 = digits
        .parse()
        .with_context(|| format!("invalid duration '{raw}'"))?;
    let multiplier: u64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 60 * 60 * 24,
        other => bail!("unknown duration unit '{other}'"),
    };
    let Some(secs) = n.checked_mul(multiplier) else {
        bail!("duration '{raw}' is too large");
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("d").is_err());
        assert!(parse_duration("10w").is_err());
        assert!(parse_duration("abc").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_overflow() {
        assert!(parse_duration(&format!("{}d", u64::MAX / 2)).is_err());
        assert!(parse_duration(&format!("{}s", u64::MAX)).is_ok());
    }

    #[test]
    fn test_history_backend_from_str() {
        assert_eq!("postgres".parse::<HistoryBackend>().unwrap(), HistoryBackend::Postgres);
        assert_eq!("Memory".parse::<HistoryBackend>().unwrap(), HistoryBackend::Memory);
        assert!("redis".parse::<HistoryBackend>().is_err());
    }
}
