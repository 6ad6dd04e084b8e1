use std::net::SocketAddr;

/// Application-level constants
pub const APP_NAME: &str = "Elixir";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address for the HTTP API.
const DEFAULT_BIND: &str = "127.0.0.1:4170";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "elixir=info".to_string()
}

/// Runtime configuration, loaded from `ELIXIR_*` environment variables.
///
/// The analysis-service URL/key, the auth secret, and the local credential
/// pair are required: there are no defaults safe for production use.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote analysis service.
    pub api_url: String,
    /// Key sent as `X-API-Key` on every upstream call.
    pub api_key: String,
    /// Secret used to sign and encrypt session tokens.
    pub auth_secret: String,
    /// The single local credential pair gating the UI.
    pub username: String,
    pub password: String,
    /// Listen address for the HTTP API.
    pub bind: SocketAddr,
}

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid ELIXIR_BIND address: {0}")]
    InvalidBind(String),
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an injected lookup, so tests never touch
    /// process-global environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(ConfigError::Missing(name)),
            }
        };

        let bind_raw = lookup("ELIXIR_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_raw))?;

        Ok(Self {
            api_url: require("ELIXIR_API_URL")?,
            api_key: require("ELIXIR_API_KEY")?,
            auth_secret: require("ELIXIR_AUTH_SECRET")?,
            username: require("ELIXIR_USERNAME")?,
            password: require("ELIXIR_PASSWORD")?,
            bind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("ELIXIR_API_URL", "https://analysis.example.com"),
            ("ELIXIR_API_KEY", "key-123"),
            ("ELIXIR_AUTH_SECRET", "secret"),
            ("ELIXIR_USERNAME", "user@example.com"),
            ("ELIXIR_PASSWORD", "hunter2"),
        ])
    }

    #[test]
    fn loads_complete_configuration() {
        let env = full_env();
        let config = AppConfig::from_lookup(|n| env.get(n).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_url, "https://analysis.example.com");
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let mut env = full_env();
        env.remove("ELIXIR_API_KEY");
        let result = AppConfig::from_lookup(|n| env.get(n).map(|v| v.to_string()));
        match result {
            Err(ConfigError::Missing(name)) => assert_eq!(name, "ELIXIR_API_KEY"),
            other => panic!("Expected Missing error, got: {other:?}"),
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut env = full_env();
        env.insert("ELIXIR_AUTH_SECRET", "");
        let result = AppConfig::from_lookup(|n| env.get(n).map(|v| v.to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::Missing("ELIXIR_AUTH_SECRET"))
        ));
    }

    #[test]
    fn custom_bind_address() {
        let mut env = full_env();
        env.insert("ELIXIR_BIND", "0.0.0.0:8080");
        let config = AppConfig::from_lookup(|n| env.get(n).map(|v| v.to_string())).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn invalid_bind_address_is_an_error() {
        let mut env = full_env();
        env.insert("ELIXIR_BIND", "not-an-address");
        let result = AppConfig::from_lookup(|n| env.get(n).map(|v| v.to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidBind(_))));
    }

    #[test]
    fn app_name_is_elixir() {
        assert_eq!(APP_NAME, "Elixir");
    }
}
