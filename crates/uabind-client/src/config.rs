// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client configuration.
//!
//! Configuration can be built in code with [`ClientConfig::builder`] or loaded
//! from a YAML, TOML or JSON file with [`load_config`]. The file format is
//! chosen by extension. The `UABIND_ENDPOINT` and `UABIND_REQUEST_TIMEOUT`
//! environment variables override the loaded values.
//!
//! ```yaml
//! endpoint: "opc.tcp://plc-01:4840"
//! security_mode: sign_and_encrypt
//! security_policy: basic256_sha256
//! connect_timeout: 5s
//! request_timeout: 2s 500ms
//! conversion:
//!   wide_integers: text
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uabind_core::{ConfigurationError, ConversionOptions, UaError, UaResult};

/// Environment variable overriding the endpoint URL.
pub const ENV_ENDPOINT: &str = "UABIND_ENDPOINT";

/// Environment variable overriding the request timeout (humantime format).
pub const ENV_REQUEST_TIMEOUT: &str = "UABIND_REQUEST_TIMEOUT";

// =============================================================================
// SecurityMode
// =============================================================================

/// Message security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// Messages are neither signed nor encrypted.
    #[default]
    None,
    /// Messages are signed.
    Sign,
    /// Messages are signed and encrypted.
    SignAndEncrypt,
}

impl SecurityMode {
    /// Returns the OPC UA security mode value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Sign => 2,
            Self::SignAndEncrypt => 3,
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Sign => write!(f, "Sign"),
            Self::SignAndEncrypt => write!(f, "SignAndEncrypt"),
        }
    }
}

// =============================================================================
// SecurityPolicy
// =============================================================================

/// Security policy applied to the secure channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPolicy {
    /// No security.
    #[default]
    None,
    /// Basic256Sha256.
    Basic256Sha256,
    /// Aes128_Sha256_RsaOaep.
    Aes128Sha256RsaOaep,
    /// Aes256_Sha256_RsaPss.
    Aes256Sha256RsaPss,
}

impl SecurityPolicy {
    /// Returns the policy URI passed to the engine.
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::None => "http://opcfoundation.org/UA/SecurityPolicy#None",
            Self::Basic256Sha256 => "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256",
            Self::Aes128Sha256RsaOaep => {
                "http://opcfoundation.org/UA/SecurityPolicy#Aes128_Sha256_RsaOaep"
            }
            Self::Aes256Sha256RsaPss => {
                "http://opcfoundation.org/UA/SecurityPolicy#Aes256_Sha256_RsaPss"
            }
        }
    }
}

impl fmt::Display for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic256Sha256 => write!(f, "Basic256Sha256"),
            Self::Aes128Sha256RsaOaep => write!(f, "Aes128_Sha256_RsaOaep"),
            Self::Aes256Sha256RsaPss => write!(f, "Aes256_Sha256_RsaPss"),
        }
    }
}

// =============================================================================
// UserIdentity
// =============================================================================

/// How the client authenticates to the server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserIdentity {
    /// Anonymous authentication.
    #[default]
    Anonymous,
    /// Username and password.
    UserName {
        /// The username.
        username: String,
        /// The password.
        password: String,
    },
}

impl UserIdentity {
    /// Returns `true` for anonymous authentication.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "Anonymous"),
            Self::UserName { username, .. } => f
                .debug_struct("UserName")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

// =============================================================================
// ClientConfig
// =============================================================================

/// Connection and conversion settings for a [`crate::UaClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server endpoint URL (e.g., "opc.tcp://localhost:4840").
    pub endpoint: String,

    /// Security mode.
    #[serde(default)]
    pub security_mode: SecurityMode,

    /// Security policy.
    #[serde(default)]
    pub security_policy: SecurityPolicy,

    /// User identity.
    #[serde(default)]
    pub user: UserIdentity,

    /// Time allowed for the engine to open a connection.
    #[serde(default = "default_connect_timeout")]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Time allowed for each request.
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Host rendering and DataValue decoding options.
    #[serde(default)]
    pub conversion: ConversionOptions,
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

impl ClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Creates a configuration with just the endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Validates this configuration.
    pub fn validate(&self) -> UaResult<()> {
        if self.endpoint.is_empty() {
            return Err(ConfigurationError::missing_field("endpoint").into());
        }

        if !self.endpoint.starts_with("opc.tcp://") {
            return Err(ConfigurationError::invalid_endpoint(
                &self.endpoint,
                "Endpoint must start with opc.tcp://",
            )
            .into());
        }

        if self.endpoint.len() == "opc.tcp://".len() {
            return Err(
                ConfigurationError::invalid_endpoint(&self.endpoint, "Endpoint has no host").into(),
            );
        }

        if self.security_mode != SecurityMode::None && self.security_policy == SecurityPolicy::None
        {
            return Err(ConfigurationError::invalid_security(
                "Security mode requires a security policy other than None",
            )
            .into());
        }

        if self.security_mode == SecurityMode::None && self.security_policy != SecurityPolicy::None
        {
            return Err(ConfigurationError::invalid_security(
                "Security policy requires a security mode other than None",
            )
            .into());
        }

        if let UserIdentity::UserName { username, .. } = &self.user {
            if username.is_empty() {
                return Err(ConfigurationError::missing_field("user.username").into());
            }
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigurationError::invalid_timeout(
                self.connect_timeout,
                "Connect timeout must be greater than 0",
            )
            .into());
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigurationError::invalid_timeout(
                self.request_timeout,
                "Request timeout must be greater than 0",
            )
            .into());
        }

        Ok(())
    }

    /// Returns `true` if this configuration uses message security.
    #[inline]
    pub fn uses_security(&self) -> bool {
        self.security_mode != SecurityMode::None
    }

    /// Applies overrides from a variable lookup.
    ///
    /// [`load_config`] calls this with the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> UaResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            debug!(endpoint = %endpoint, "Endpoint overridden from environment");
            self.endpoint = endpoint;
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout = humantime::parse_duration(&raw).map_err(|e| {
                UaError::from(ConfigurationError::load(
                    ENV_REQUEST_TIMEOUT,
                    format!("invalid duration '{}': {}", raw, e),
                ))
            })?;
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            security_mode: SecurityMode::default(),
            security_policy: SecurityPolicy::default(),
            user: UserIdentity::default(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            conversion: ConversionOptions::default(),
        }
    }
}

// =============================================================================
// ClientConfigBuilder
// =============================================================================

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    endpoint: Option<String>,
    security_mode: Option<SecurityMode>,
    security_policy: Option<SecurityPolicy>,
    user: Option<UserIdentity>,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    conversion: Option<ConversionOptions>,
}

impl ClientConfigBuilder {
    /// Sets the server endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the security mode.
    pub fn security_mode(mut self, mode: SecurityMode) -> Self {
        self.security_mode = Some(mode);
        self
    }

    /// Sets the security policy.
    pub fn security_policy(mut self, policy: SecurityPolicy) -> Self {
        self.security_policy = Some(policy);
        self
    }

    /// Sets username/password authentication.
    pub fn username(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(UserIdentity::UserName {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Sets anonymous authentication.
    pub fn anonymous(mut self) -> Self {
        self.user = Some(UserIdentity::Anonymous);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the conversion options.
    pub fn conversion(mut self, options: ConversionOptions) -> Self {
        self.conversion = Some(options);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> UaResult<ClientConfig> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration without validation.
    pub fn build_unchecked(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            endpoint: self.endpoint.unwrap_or(defaults.endpoint),
            security_mode: self.security_mode.unwrap_or(defaults.security_mode),
            security_policy: self.security_policy.unwrap_or(defaults.security_policy),
            user: self.user.unwrap_or(defaults.user),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            conversion: self.conversion.unwrap_or(defaults.conversion),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> UaResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(ConfigurationError::UnsupportedFormat {
                path: path.display().to_string(),
            }
            .into()),
        }
    }
}

/// Loads, overrides from the environment, and validates a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> UaResult<ClientConfig> {
    let path = path.as_ref();
    info!("Loading client configuration from: {}", path.display());

    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .map_err(|e| UaError::from(ConfigurationError::load(path.display().to_string(), e.to_string())))?;

    let mut config = parse_config(&content, format)
        .map_err(|message| UaError::from(ConfigurationError::load(path.display().to_string(), message)))?;
    config.apply_overrides(|name| env::var(name).ok())?;
    config.validate()?;

    debug!(endpoint = %config.endpoint, security_mode = %config.security_mode, "Configuration loaded");
    Ok(config)
}

/// Parses and validates a configuration string. No environment overrides apply.
pub fn load_config_str(content: &str, format: ConfigFormat) -> UaResult<ClientConfig> {
    let config = parse_config(content, format)
        .map_err(|message| UaError::from(ConfigurationError::load("<string>", message)))?;
    config.validate()?;
    Ok(config)
}

fn parse_config(content: &str, format: ConfigFormat) -> Result<ClientConfig, String> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

// =============================================================================
// humantime_serde helper
// =============================================================================

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        humantime::format_duration(*duration)
            .to_string()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
