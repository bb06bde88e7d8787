use std::str::FromStr;

use axum::http::HeaderValue;
use freelance_events::journal::DEFAULT_JOURNAL_CAPACITY;

/// Largest accepted `ACTIVITY_JOURNAL_CAPACITY`.
pub const MAX_JOURNAL_CAPACITY: usize = 100_000;

/// Startup configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Invalid CORS origin '{0}'")]
    InvalidOrigin(String),
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Apply the fixed per-operation workflow delays (default: `true`).
    pub simulated_latency: bool,
    /// Number of events kept by the activity journal (default: `256`).
    pub journal_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                    |
    /// | `SIMULATED_LATENCY`         | `true`                  |
    /// | `ACTIVITY_JOURNAL_CAPACITY` | `256`                   |
    ///
    /// `CORS_ORIGINS` must list explicit origins; `*` is rejected.
    /// `ACTIVITY_JOURNAL_CAPACITY` must be between 1 and
    /// [`MAX_JOURNAL_CAPACITY`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = parse_var(&lookup, "PORT", "u16", 3000u16)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Credentialed CORS cannot use the `*` wildcard.
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| o.as_str() == "*" || HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::InvalidOrigin(bad.clone()));
        }

        let request_timeout_secs = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "u64", 30u64)?;
        let shutdown_timeout_secs = parse_var(&lookup, "SHUTDOWN_TIMEOUT_SECS", "u64", 30u64)?;
        let simulated_latency = parse_var(&lookup, "SIMULATED_LATENCY", "bool", true)?;
        let journal_capacity = parse_var(
            &lookup,
            "ACTIVITY_JOURNAL_CAPACITY",
            "usize",
            DEFAULT_JOURNAL_CAPACITY,
        )?;
        if !(1..=MAX_JOURNAL_CAPACITY).contains(&journal_capacity) {
            return Err(ConfigError::Invalid {
                var: "ACTIVITY_JOURNAL_CAPACITY",
                expected: "usize between 1 and 100000",
                value: journal_capacity.to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            simulated_latency,
            journal_capacity,
        })
    }
}

fn parse_var<F, T>(
    lookup: &F,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert!(config.simulated_latency);
        assert_eq!(config.journal_capacity, 256);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("SIMULATED_LATENCY", "false"),
            ("ACTIVITY_JOURNAL_CAPACITY", "16"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.simulated_latency);
        assert_eq!(config.journal_capacity, 16);
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "PORT", .. });
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn test_invalid_bool_is_reported() {
        assert_matches!(
            load(&[("SIMULATED_LATENCY", "sometimes")]),
            Err(ConfigError::Invalid { var: "SIMULATED_LATENCY", .. })
        );
    }

    #[test]
    fn test_invalid_origin_is_reported() {
        assert_matches!(
            load(&[("CORS_ORIGINS", "http://ok.test,bad\norigin")]),
            Err(ConfigError::InvalidOrigin(_))
        );
    }

    #[test]
    fn test_wildcard_origin_is_reported() {
        assert_matches!(
            load(&[("CORS_ORIGINS", "http://ok.test, *")]),
            Err(ConfigError::InvalidOrigin(origin)) if origin == "*"
        );
    }

    #[test]
    fn test_oversized_journal_capacity_is_reported() {
        let err = load(&[("ACTIVITY_JOURNAL_CAPACITY", "18446744073709551615")]).unwrap_err();
        assert_matches!(
            err,
            ConfigError::Invalid { var: "ACTIVITY_JOURNAL_CAPACITY", .. }
        );
    }

    #[test]
    fn test_zero_journal_capacity_is_reported() {
        assert_matches!(
            load(&[("ACTIVITY_JOURNAL_CAPACITY", "0")]),
            Err(ConfigError::Invalid { var: "ACTIVITY_JOURNAL_CAPACITY", .. })
        );
    }

    #[test]
    fn test_max_journal_capacity_is_accepted() {
        let config = load(&[("ACTIVITY_JOURNAL_CAPACITY", "100000")]).unwrap();
        assert_eq!(config.journal_capacity, MAX_JOURNAL_CAPACITY);
    }
}
