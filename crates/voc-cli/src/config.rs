//! Configuration file handling for voc

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use voc_client::{ClientConfig, TimeoutsConfig};

/// Configuration for the CLI tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Volvo On Call username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Volvo On Call password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Service region suffix (e.g. "na", "cn")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Explicit API root, overrides the region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Default vehicle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Disable colored output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_color: Option<bool>,
    /// Extra request headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Request and polling timeouts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsConfig>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration, creating parent directories as needed.
    ///
    /// The file holds the account password, so on unix it is made
    /// readable by the owner only.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict permissions: {}", path.display()))?;
        }

        Ok(())
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("voc");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: &ArgOverrides) -> MergedConfig {
        let pick = |arg: &Option<String>, file: &Option<String>| {
            let set = |v: &Option<String>| v.clone().filter(|v| !v.is_empty());
            set(arg).or_else(|| set(file))
        };

        MergedConfig {
            username: pick(&args.username, &self.username),
            password: pick(&args.password, &self.password),
            region: pick(&args.region, &self.region),
            url: pick(&args.url, &self.url),
            vin: pick(&args.vin, &self.vin),
            output: args
                .output
                .clone()
                .or_else(|| self.output.clone())
                .unwrap_or_else(|| "table".to_string()),
            no_color: args.no_color || self.no_color.unwrap_or(false),
            headers: self.headers.clone(),
            timeouts: self.timeouts.clone().unwrap_or_default(),
        }
    }
}

/// Values given on the command line (or through `VOC_*` variables)
#[derive(Debug, Clone, Default)]
pub struct ArgOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub region: Option<String>,
    pub url: Option<String>,
    pub vin: Option<String>,
    pub output: Option<String>,
    pub no_color: bool,
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub region: Option<String>,
    pub url: Option<String>,
    pub vin: Option<String>,
    pub output: String,
    pub no_color: bool,
    pub headers: BTreeMap<String, String>,
    pub timeouts: TimeoutsConfig,
}

impl MergedConfig {
    /// Client configuration for the merged settings
    pub fn client_config(&self) -> ClientConfig {
        let mut builder = ClientConfig::builder().timeouts(self.timeouts.clone());
        if let Some(url) = &self.url {
            builder = builder.base_url(url);
        }
        if let Some(region) = &self.region {
            builder = builder.region(region);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config {
            username: Some("user@example.com".into()),
            password: Some("secret".into()),
            vin: Some("YV1XZ".into()),
            ..Default::default()
        };
        config.headers.insert("X-Extra".into(), "1".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("username = \"user@example.com\""));
        assert!(!raw.contains("region"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_parse_with_timeouts() {
        let config: Config = toml::from_str(
            r#"
            username = "user"
            password = "pass"
            region = "na"

            [timeouts]
            command_timeout_secs = 45
            "#,
        )
        .unwrap();

        let timeouts = config.timeouts.unwrap();
        assert_eq!(timeouts.command_timeout_secs, 45);
        assert_eq!(timeouts.poll_interval_ms, 1_000);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_args_win_over_file() {
        let config = Config {
            username: Some("file-user".into()),
            password: Some("file-pass".into()),
            vin: Some("FILEVIN".into()),
            output: Some("json".into()),
            ..Default::default()
        };
        let args = ArgOverrides {
            username: Some("arg-user".into()),
            vin: Some(String::new()),
            ..Default::default()
        };

        let merged = config.merge_with_args(&args);
        assert_eq!(merged.username.as_deref(), Some("arg-user"));
        assert_eq!(merged.password.as_deref(), Some("file-pass"));
        // An empty value counts as unset
        assert_eq!(merged.vin.as_deref(), Some("FILEVIN"));
        assert_eq!(merged.output, "json");
        assert!(!merged.no_color);
    }

    #[test]
    fn test_client_config_from_merged() {
        let config = Config {
            region: Some("na".into()),
            ..Default::default()
        };
        let merged = config.merge_with_args(&ArgOverrides::default());
        assert_eq!(
            merged.client_config().api_root(),
            "https://vocapi-na.wirelesscar.net/customerapi/rest/v3.0"
        );

        let args = ArgOverrides {
            url: Some("http://localhost:9080/api".into()),
            ..Default::default()
        };
        let merged = config.merge_with_args(&args);
        assert_eq!(merged.client_config().api_root(), "http://localhost:9080/api");
    }
}
