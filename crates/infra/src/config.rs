//! Configuration loading and representation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid environment variable {name}: {reason}")]
    InvalidEnvVar { name: String, reason: String },
}

/// Which store backs the engine.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres { database_url: String },
}

impl core::fmt::Debug for StoreBackend {
    // The URL carries credentials.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreBackend::Memory => f.write_str("Memory"),
            StoreBackend::Postgres { .. } => f.write_str("Postgres { database_url: <redacted> }"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub backend: StoreBackend,
    pub max_connections: u32,
    /// Connection attempts before giving up (2 s apart).
    pub connect_retries: u32,
    pub run_migrations: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            max_connections: 10,
            connect_retries: 5,
            run_migrations: true,
        }
    }
}

impl EngineConfig {
    /// Load from the process environment.
    ///
    /// - `SPECTR_STORE`: `memory` (default) or `postgres`
    /// - `DATABASE_URL`: required for `postgres`
    /// - `DATABASE_MAX_CONNECTIONS`: default 10
    /// - `DATABASE_CONNECT_RETRIES`: default 5
    /// - `SPECTR_RUN_MIGRATIONS`: default `true`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup("SPECTR_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => StoreBackend::Memory,
            Some("postgres") => {
                let database_url = lookup("DATABASE_URL")
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;
                StoreBackend::Postgres { database_url }
            }
            Some(other) => {
                return Err(invalid(
                    "SPECTR_STORE",
                    format!("expected 'memory' or 'postgres', got '{other}'"),
                ));
            }
        };

        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?;
        if max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", "must be greater than zero"));
        }

        Ok(Self {
            backend,
            max_connections,
            connect_retries: parse_or(&lookup, "DATABASE_CONNECT_RETRIES", defaults.connect_retries)?,
            run_migrations: parse_or(&lookup, "SPECTR_RUN_MIGRATIONS", defaults.run_migrations)?,
        })
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e: T::Err| invalid(name, e.to_string())),
        _ => Ok(default),
    }
}
