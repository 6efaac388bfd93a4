//! Register command - persist credentials to the config file

use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::output::OutputContext;

/// Values written by `voc register`
pub struct Registration {
    pub username: String,
    pub password: String,
    pub region: Option<String>,
    pub url: Option<String>,
    pub vin: Option<String>,
}

/// Save credentials, keeping any other settings already in the file
pub fn register(registration: Registration, path: &Path, out: &OutputContext) -> Result<()> {
    let mut config = if path.exists() {
        Config::load_from(path)?
    } else {
        Config::default()
    };

    config.username = Some(registration.username);
    config.password = Some(registration.password);
    if registration.region.is_some() {
        config.region = registration.region;
    }
    if registration.url.is_some() {
        config.url = registration.url;
    }
    if registration.vin.is_some() {
        config.vin = registration.vin;
    }

    config.save_to(path)?;
    out.success(&format!("Configuration saved to {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[test]
    fn test_register_keeps_existing_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let out = OutputContext::new(OutputFormat::Table, true, true);

        Config {
            vin: Some("OLDVIN".into()),
            output: Some("json".into()),
            ..Default::default()
        }
        .save_to(&path)
        .unwrap();

        register(
            Registration {
                username: "user".into(),
                password: "pass".into(),
                region: Some("na".into()),
                url: None,
                vin: None,
            },
            &path,
            &out,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.username.as_deref(), Some("user"));
        assert_eq!(config.password.as_deref(), Some("pass"));
        assert_eq!(config.region.as_deref(), Some("na"));
        assert_eq!(config.vin.as_deref(), Some("OLDVIN"));
        assert_eq!(config.output.as_deref(), Some("json"));
    }
}
