//! Process-wide client configuration.
//!
//! A [`Config`] is built once, wrapped in an `Arc`, and shared read-only by
//! every descriptor. Request code never mutates it.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::identifiers::{AuthKey, PublishKey, SecretKey, SubscribeKey, UserId};

pub const DEFAULT_ORIGIN: &str = "ps.pndsn.com";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_NON_SUBSCRIBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Long enough to outlast the server's own long-poll hold time.
pub const DEFAULT_SUBSCRIBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(310);

/// Keys, identity, origin, and timeouts shared by every request.
#[derive(Debug, Clone)]
pub struct Config {
    pub subscribe_key: Option<SubscribeKey>,
    pub publish_key: Option<PublishKey>,
    /// When set, every request is signed (see [`crate::signature`]).
    pub secret_key: Option<SecretKey>,
    pub auth_key: Option<AuthKey>,
    pub uuid: UserId,

    /// Host name, without scheme.
    pub origin: String,
    /// `false` sends requests over plain HTTP.
    pub secure: bool,

    pub connect_timeout: Duration,
    pub non_subscribe_request_timeout: Duration,
    pub subscribe_request_timeout: Duration,

    /// Extra parameters added to every request. Operation parameters and the
    /// standard set take precedence.
    pub global_query_params: BTreeMap<String, String>,
}

impl Config {
    /// Creates a configuration with default origin and timeouts and a fresh
    /// random identity. Empty keys are treated as absent.
    pub fn new(subscribe_key: impl Into<String>, publish_key: impl Into<String>) -> Self {
        Self {
            subscribe_key: SubscribeKey::new(subscribe_key),
            publish_key: PublishKey::new(publish_key),
            secret_key: None,
            auth_key: None,
            uuid: UserId::new_random(),
            origin: DEFAULT_ORIGIN.to_string(),
            secure: true,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            non_subscribe_request_timeout: DEFAULT_NON_SUBSCRIBE_REQUEST_TIMEOUT,
            subscribe_request_timeout: DEFAULT_SUBSCRIBE_REQUEST_TIMEOUT,
            global_query_params: BTreeMap::new(),
        }
    }

    pub fn with_auth_key(mut self, auth_key: impl Into<String>) -> Self {
        self.auth_key = AuthKey::new(auth_key);
        self
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = SecretKey::new(secret_key);
        self
    }

    /// Replaces the identity. An empty value keeps the current one.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        if let Some(id) = UserId::new(uuid) {
            self.uuid = id;
        }
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_global_query_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.global_query_params.insert(key.into(), value.into());
        self
    }

    /// `https` unless TLS has been disabled.
    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// Loads configuration from `PUBSUB_*` environment variables.
    ///
    /// Missing variables fall back to the [`Config::new`] defaults. Present but
    /// malformed numbers or booleans are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let mut config = Self::new(
            var("PUBSUB_SUBSCRIBE_KEY").unwrap_or_default(),
            var("PUBSUB_PUBLISH_KEY").unwrap_or_default(),
        );

        if let Some(v) = var("PUBSUB_SECRET_KEY") {
            config = config.with_secret_key(v);
        }
        if let Some(v) = var("PUBSUB_AUTH_KEY") {
            config = config.with_auth_key(v);
        }
        if let Some(v) = var("PUBSUB_UUID") {
            config = config.with_uuid(v);
        }
        if let Some(v) = var("PUBSUB_ORIGIN") {
            config = config.with_origin(v);
        }
        if let Some(v) = var("PUBSUB_SECURE") {
            config.secure = parse_bool("PUBSUB_SECURE", &v)?;
        }
        if let Some(v) = var("PUBSUB_CONNECT_TIMEOUT") {
            config.connect_timeout = parse_seconds("PUBSUB_CONNECT_TIMEOUT", &v)?;
        }
        if let Some(v) = var("PUBSUB_REQUEST_TIMEOUT") {
            config.non_subscribe_request_timeout = parse_seconds("PUBSUB_REQUEST_TIMEOUT", &v)?;
        }
        if let Some(v) = var("PUBSUB_SUBSCRIBE_TIMEOUT") {
            config.subscribe_request_timeout = parse_seconds("PUBSUB_SUBSCRIBE_TIMEOUT", &v)?;
        }

        Ok(config)
    }
}

fn parse_seconds(variable: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| invalid(variable, value))
}

fn parse_bool(variable: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(variable, value)),
    }
}

fn invalid(variable: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        variable: variable.to_string(),
        value: value.to_string(),
    }
}
