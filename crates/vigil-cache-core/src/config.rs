//! Manager configuration
//!
//! Most settings have defaults. Override with `VIGIL_*` environment
//! variables, or with the builder-style setters.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::ConfigError;

/// Configuration for the cache manager, immutable after construction
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Store host. Default: `localhost`.
    pub host: String,

    /// Store port. Default: `6379`.
    pub port: u16,

    /// Logical database index. Default: `0`.
    pub db: u32,

    /// Maximum concurrent connections to the store. Default: `20`.
    pub max_connections: u32,

    /// Attempts per connect sequence and per operation. Default: `3`.
    pub retry_attempts: u32,

    /// Base delay between retries. Default: `1s`.
    pub base_retry_delay: Duration,

    /// Interval between background health probes. Default: `30s`.
    pub health_check_interval: Duration,

    /// Timeout for checking a connection out of the pool. Default: `5s`.
    pub connection_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            max_connections: 20,
            retry_attempts: 3,
            base_retry_delay: Duration::from_secs(1),
            health_check_interval: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl ManagerConfig {
    const ENV_HOST: &'static str = "VIGIL_HOST";
    const ENV_PORT: &'static str = "VIGIL_PORT";
    const ENV_DB: &'static str = "VIGIL_DB";
    const ENV_MAX_CONNECTIONS: &'static str = "VIGIL_MAX_CONNECTIONS";
    const ENV_RETRY_ATTEMPTS: &'static str = "VIGIL_RETRY_ATTEMPTS";
    const ENV_RETRY_BASE_DELAY: &'static str = "VIGIL_RETRY_BASE_DELAY";
    const ENV_HEALTH_CHECK_INTERVAL: &'static str = "VIGIL_HEALTH_CHECK_INTERVAL";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Delay and interval variables are in seconds and accept fractions
    /// (e.g. `VIGIL_RETRY_BASE_DELAY=0.5`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: env::var(Self::ENV_HOST).unwrap_or(defaults.host),
            port: parse_value(Self::ENV_PORT, env::var(Self::ENV_PORT).ok(), defaults.port)?,
            db: parse_value(Self::ENV_DB, env::var(Self::ENV_DB).ok(), defaults.db)?,
            max_connections: parse_value(
                Self::ENV_MAX_CONNECTIONS,
                env::var(Self::ENV_MAX_CONNECTIONS).ok(),
                defaults.max_connections,
            )?,
            retry_attempts: parse_value(
                Self::ENV_RETRY_ATTEMPTS,
                env::var(Self::ENV_RETRY_ATTEMPTS).ok(),
                defaults.retry_attempts,
            )?,
            base_retry_delay: parse_secs(
                Self::ENV_RETRY_BASE_DELAY,
                env::var(Self::ENV_RETRY_BASE_DELAY).ok(),
                defaults.base_retry_delay,
            )?,
            health_check_interval: parse_secs(
                Self::ENV_HEALTH_CHECK_INTERVAL,
                env::var(Self::ENV_HEALTH_CHECK_INTERVAL).ok(),
                defaults.health_check_interval,
            )?,
            connection_timeout: defaults.connection_timeout,
        })
    }

    /// Set store host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set store port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set logical database index
    pub fn db(mut self, db: u32) -> Self {
        self.db = db;
        self
    }

    /// Set maximum concurrent connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set retry attempt count
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set base retry delay
    pub fn base_retry_delay(mut self, delay: Duration) -> Self {
        self.base_retry_delay = delay;
        self
    }

    /// Set health-check interval
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Set pool checkout timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Render the store connection URL (e.g. `redis://localhost:6379/0`)
    pub fn connection_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

fn parse_value<T>(var: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
            var: var.to_string(),
            message: format!("{e} (got {raw:?})"),
        }),
    }
}

fn parse_secs(var: &str, raw: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let secs: f64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
        var: var.to_string(),
        message: format!("{e} (got {raw:?})"),
    })?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::Invalid {
            var: var.to_string(),
            message: format!("seconds must be non-negative (got {raw:?})"),
        });
    }
    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 6379);
        assert_eq!(config.db, 0);
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.base_retry_delay, Duration::from_secs(1));
        assert_eq!(config.health_check_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_fluent() {
        let config = ManagerConfig::default()
            .host("cache.internal")
            .port(6380)
            .db(2)
            .max_connections(50)
            .retry_attempts(5)
            .base_retry_delay(Duration::from_millis(250))
            .health_check_interval(Duration::from_secs(10));

        assert_eq!(config.host, "cache.internal");
        assert_eq!(config.port, 6380);
        assert_eq!(config.db, 2);
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.base_retry_delay, Duration::from_millis(250));
        assert_eq!(config.health_check_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_connection_url() {
        let config = ManagerConfig::default().host("10.0.0.5").port(6380).db(3);
        assert_eq!(config.connection_url(), "redis://10.0.0.5:6380/3");
    }

    #[test]
    fn test_parse_value_uses_default_when_unset() {
        assert_eq!(parse_value::<u16>("VIGIL_PORT", None, 6379).unwrap(), 6379);
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        let err = parse_value::<u16>("VIGIL_PORT", Some("not-a-port".into()), 6379).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "VIGIL_PORT"));
    }

    #[test]
    fn test_parse_secs_accepts_fractions() {
        let delay = parse_secs("VIGIL_RETRY_BASE_DELAY", Some("0.5".into()), Duration::ZERO)
            .unwrap();
        assert_eq!(delay, Duration::from_millis(500));
    }

    #[test]
    fn test_parse_secs_rejects_negative() {
        let err = parse_secs("VIGIL_RETRY_BASE_DELAY", Some("-1".into()), Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
