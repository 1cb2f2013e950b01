// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Number of results shown on the dashboard.
pub const DASHBOARD_RECENT_LIMIT: i64 = 5;

/// Where in-progress test sessions are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    /// Process-local map. Sessions are lost on restart.
    Memory,
    /// The `test_sessions` table.
    Database,
}

impl FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "database" | "db" => Ok(SessionBackend::Database),
            other => Err(format!("unknown session backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub session_backend: SessionBackend,
    /// Idle sessions older than this are dropped on read.
    pub session_ttl_secs: Option<u64>,
    /// Fixed seed for question ordering. Unset means a fresh random order per test.
    pub shuffle_seed: Option<u64>,
    pub seed_sample_questions: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://simulacros.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = parse_var("JWT_EXPIRATION").unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = parse_var("PORT").unwrap_or(3000);

        let session_backend = parse_var("SESSION_BACKEND").unwrap_or(SessionBackend::Database);

        let seed_sample_questions = parse_var("SEED_SAMPLE_QUESTIONS").unwrap_or(true);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            session_backend,
            session_ttl_secs: parse_var("SESSION_TTL_SECS"),
            shuffle_seed: parse_var("SHUFFLE_SEED"),
            seed_sample_questions,
        }
    }
}

/// Reads and parses an optional variable. Unparseable values are logged and ignored.
fn parse_var<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            // The subscriber is not up yet when config is read.
            eprintln!("Ignoring invalid {}={:?}: {}", key, raw, e);
            None
        }
    }
}
