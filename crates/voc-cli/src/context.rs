//! Application context shared by every command handler

use anyhow::{anyhow, Context, Result};
use voc_client::VocClient;

use crate::config::MergedConfig;
use crate::output::OutputContext;

/// Built once in `main` and passed by reference to each command
pub struct AppContext {
    pub client: VocClient,
    pub out: OutputContext,
    vin: Option<String>,
}

impl AppContext {
    /// Create the client from merged settings; credentials are required
    pub fn new(merged: &MergedConfig, out: OutputContext) -> Result<Self> {
        let (username, password) = match (&merged.username, &merged.password) {
            (Some(username), Some(password)) => (username, password),
            _ => {
                return Err(anyhow!(
                    "username and password must be provided (flags, VOC_USERNAME/VOC_PASSWORD, or `voc register`)"
                ))
            }
        };

        let client = VocClient::with_config(username, password, merged.client_config())
            .context("Failed to create VOC client")?;

        Ok(Self {
            client,
            out,
            vin: merged.vin.clone(),
        })
    }

    /// The selected vehicle, from `--vin` or the config file
    pub fn vin(&self) -> Result<&str> {
        self.vin
            .as_deref()
            .ok_or_else(|| anyhow!("VIN must be provided either manually or in config"))
    }
}
