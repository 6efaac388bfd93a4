//! Client configuration: API root resolution, fixed headers and timeouts

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// API root template; `{region}` becomes `-<region>` or the empty string.
pub const API_URL_TEMPLATE: &str = "https://vocapi{region}.wirelesscar.net/customerapi/rest/v3.0";

/// Client identification headers sent with every request.
pub const CLIENT_HEADERS: [(&str, &str); 7] = [
    ("Content-Type", "application/json"),
    ("X-App-Name", "Volvo On Call"),
    ("X-Client-Version", "4.4.5.21126"),
    ("X-Device-Id", "Device"),
    ("X-Originator-Type", "App"),
    ("X-OS-Type", "Android"),
    ("X-OS-Version", "22"),
];

/// Default number of poll cycles (seconds) before a command times out
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u32 = 30;

/// VOC client configuration
///
/// Constructed programmatically with [`ClientConfig::builder`]; the
/// timeout block can also be embedded in a TOML/JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Timeout and polling settings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

/// Connection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Explicit API root; the service region must already be part of it
    #[serde(default)]
    pub base_url: Option<String>,

    /// Service region suffix (e.g. "na", "cn"); Europe when unset
    #[serde(default)]
    pub region: Option<String>,

    /// Additional headers added to the fixed client header set
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}

/// Timeout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// General request timeout in milliseconds (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_ms: u64,

    /// Connect timeout in milliseconds (default: 10s)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Pause between service-status polls in milliseconds (default: 1s)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Poll cycles allowed for commands other than unlock (default: 30)
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u32,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_ms: default_request_timeout(),
            connect_ms: default_connect_timeout(),
            poll_interval_ms: default_poll_interval(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_poll_interval() -> u64 {
    1_000
}

fn default_command_timeout() -> u32 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

impl ClientConfig {
    /// Create a builder for programmatic configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Resolve the API root.
    ///
    /// An explicit base URL wins and is used verbatim. Otherwise the region is
    /// inserted into the host name as a `-<region>` suffix.
    pub fn api_root(&self) -> String {
        if let Some(base_url) = self.connection.base_url.as_deref().filter(|u| !u.is_empty()) {
            return base_url.trim_end_matches('/').to_string();
        }
        let suffix = match self.connection.region.as_deref() {
            Some(region) if !region.is_empty() => format!("-{}", region),
            _ => String::new(),
        };
        API_URL_TEMPLATE.replace("{region}", &suffix)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.request_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.connect_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timeouts.poll_interval_ms)
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set an explicit API root (region already baked in)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.connection.base_url = Some(url.into());
        self
    }

    /// Set the service region suffix
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.connection.region = Some(region.into());
        self
    }

    /// Add a header sent with every request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .connection
            .extra_headers
            .insert(name.into(), value.into());
        self
    }

    /// Replace the whole timeout block
    pub fn timeouts(mut self, timeouts: TimeoutsConfig) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Set request timeout in milliseconds
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.request_ms = ms;
        self
    }

    /// Set the pause between service-status polls in milliseconds
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.poll_interval_ms = ms;
        self
    }

    /// Set the default command timeout (poll cycles)
    pub fn command_timeout_secs(mut self, secs: u32) -> Self {
        self.config.timeouts.command_timeout_secs = secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region_is_europe() {
        let config = ClientConfig::default();
        assert_eq!(
            config.api_root(),
            "https://vocapi.wirelesscar.net/customerapi/rest/v3.0"
        );
    }

    #[test]
    fn test_region_becomes_host_suffix() {
        let config = ClientConfig::builder().region("na").build();
        assert_eq!(
            config.api_root(),
            "https://vocapi-na.wirelesscar.net/customerapi/rest/v3.0"
        );
    }

    #[test]
    fn test_base_url_override_ignores_region() {
        let config = ClientConfig::builder()
            .region("cn")
            .base_url("http://127.0.0.1:9000/api/")
            .build();
        assert_eq!(config.api_root(), "http://127.0.0.1:9000/api");
    }

    #[test]
    fn test_timeout_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeouts.command_timeout_secs, 30);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_timeouts_from_toml() {
        let timeouts: TimeoutsConfig = toml::from_str(
            r#"
poll_interval_ms = 250
command_timeout_secs = 45
"#,
        )
        .unwrap();
        assert_eq!(timeouts.poll_interval_ms, 250);
        assert_eq!(timeouts.command_timeout_secs, 45);
        assert_eq!(timeouts.request_ms, 30_000);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .header("X-Trace", "1")
            .poll_interval_ms(10)
            .command_timeout_secs(5)
            .request_timeout_ms(2_000)
            .build();
        assert_eq!(
            config.connection.extra_headers.get("X-Trace").map(String::as_str),
            Some("1")
        );
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.timeouts.command_timeout_secs, 5);
        assert_eq!(config.timeouts.request_ms, 2_000);
    }
}
