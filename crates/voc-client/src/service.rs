//! Service status: lifecycle of an asynchronous vehicle command
//!
//! A state-changing command returns a pending [`ServiceStatus`]. The client
//! drives it to a terminal state by re-fetching its `service` hyperlink once
//! per poll cycle:
//!
//! ```text
//!  Started ──► MessageDelivered ──► Successful
//!     │               │
//!     └───────────────┴──────────► Failed / <unrecognized>
//! ```
//!
//! `Successful`, `Failed` and any unrecognized value are terminal.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::client::VocClient;
use crate::error::{Result, VocError};

// =============================================================================
// State and Type
// =============================================================================

/// Status of an asynchronous command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceState {
    Started,
    MessageDelivered,
    Successful,
    Failed,
    /// Any value outside the known lifecycle; treated as a failure
    Unrecognized(String),
}

impl ServiceState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Started => "Started",
            Self::MessageDelivered => "MessageDelivered",
            Self::Successful => "Successful",
            Self::Failed => "Failed",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Whether the command can still change state
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Started | Self::MessageDelivered)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::Unrecognized(String::new())
    }
}

impl From<String> for ServiceState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Started" => Self::Started,
            "MessageDelivered" => Self::MessageDelivered,
            "Successful" => Self::Successful,
            "Failed" => Self::Failed,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<&str> for ServiceState {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ServiceState> for String {
    fn from(state: ServiceState) -> Self {
        match state {
            ServiceState::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which command a service status belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    /// `RDL`
    Lock,
    /// `RDU`
    Unlock,
    /// `RHBLF`
    BlinkLights,
    /// Any other service code, kept verbatim
    Other(String),
}

impl ServiceType {
    /// Wire code of the service
    pub fn code(&self) -> &str {
        match self {
            Self::Lock => "RDL",
            Self::Unlock => "RDU",
            Self::BlinkLights => "RHBLF",
            Self::Other(code) => code,
        }
    }
}

impl Default for ServiceType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ServiceType {
    fn from(code: String) -> Self {
        match code.as_str() {
            "RDL" => Self::Lock,
            "RDU" => Self::Unlock,
            "RHBLF" => Self::BlinkLights,
            _ => Self::Other(code),
        }
    }
}

impl From<ServiceType> for String {
    fn from(service_type: ServiceType) -> Self {
        match service_type {
            ServiceType::Other(code) => code,
            known => known.code().to_string(),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock => f.write_str("Lock Vehicle"),
            Self::Unlock => f.write_str("Unlock Vehicle"),
            Self::BlinkLights => f.write_str("Blink Lights"),
            Self::Other(code) => f.write_str(code),
        }
    }
}

// =============================================================================
// Service Status Resource
// =============================================================================

/// Server-side record of one in-flight command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceStatus {
    pub status: ServiceState,
    pub status_timestamp: String,
    pub start_time: String,
    pub service_type: ServiceType,
    /// Only populated when `status` is `Failed`
    pub failure_reason: Option<String>,
    /// Stable hyperlink to re-fetch this resource
    pub service: String,
    /// VIN
    pub vehicle_id: String,
    pub customer_service_id: String,
}

impl ServiceStatus {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Re-fetch this status through its `service` hyperlink.
    ///
    /// All fields are replaced by the fetched values; nothing is merged.
    pub async fn refresh(&mut self, client: &VocClient) -> Result<()> {
        *self = client.get_service_status(&self.service).await?;
        Ok(())
    }

    /// Classify the current state: `Ok(true)` when done, `Ok(false)` while
    /// pending, `Err` for any failed or unrecognized terminal state.
    fn outcome(&self) -> Result<bool> {
        let reason = || self.failure_reason.clone().unwrap_or_default();
        match &self.status {
            ServiceState::Started | ServiceState::MessageDelivered => Ok(false),
            ServiceState::Successful => Ok(true),
            ServiceState::Failed => Err(VocError::CommandFailed {
                service: self.service_type.to_string(),
                reason: reason(),
            }),
            ServiceState::Unrecognized(raw) => Err(VocError::UnrecognizedStatus {
                service: self.service_type.to_string(),
                status: raw.clone(),
                reason: reason(),
            }),
        }
    }
}

// =============================================================================
// Polling
// =============================================================================

impl VocClient {
    /// Drive `status` to a terminal state, allowing `timeout_secs` poll cycles.
    ///
    /// The first cycle evaluates the status as returned by the command without
    /// fetching. Every later cycle re-fetches it first. Pending states sleep
    /// one poll interval and advance the counter; once the counter reaches
    /// `timeout_secs` the call fails with [`VocError::Timeout`] before any
    /// further fetch. Transport errors during a refresh are returned as-is.
    #[instrument(skip(self, status), fields(service = %status.service_type, vin = %status.vehicle_id))]
    pub async fn evaluate_service_status(
        &self,
        status: &mut ServiceStatus,
        timeout_secs: u32,
    ) -> Result<()> {
        let poll_interval = self.config().poll_interval();
        let mut cycle: u32 = 0;

        loop {
            if cycle >= timeout_secs {
                return Err(VocError::Timeout {
                    seconds: timeout_secs,
                });
            }
            if cycle > 0 {
                status.refresh(self).await?;
            }

            if status.outcome()? {
                info!("{} completed after {} poll(s)", status.service_type, cycle);
                return Ok(());
            }

            debug!("{} is {}, waiting", status.service_type, status.status);
            tokio::time::sleep(poll_interval).await;
            cycle += 1;
        }
    }

    /// Like [`evaluate_service_status`](Self::evaluate_service_status) with
    /// the timeout chosen by [`command_timeout`](Self::command_timeout).
    pub async fn evaluate_service_status_auto(&self, status: &mut ServiceStatus) -> Result<()> {
        let timeout_secs = self.command_timeout(status).await?;
        self.evaluate_service_status(status, timeout_secs).await
    }

    /// Effective poll timeout for a command.
    ///
    /// Unlock negotiation time is vehicle-specific: for `Unlock` the vehicle's
    /// `unlockTimeFrame` replaces the configured default, and failing to fetch
    /// it fails the whole evaluation.
    pub async fn command_timeout(&self, status: &ServiceStatus) -> Result<u32> {
        if status.service_type != ServiceType::Unlock {
            return Ok(self.config().timeouts.command_timeout_secs);
        }

        let attributes = self.get_vehicle_attributes(&status.vehicle_id).await?;
        info!(
            "poll timeout set to {}s to match the unlock time frame of {}",
            attributes.unlock_time_frame, status.vehicle_id
        );
        Ok(attributes.unlock_time_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_parsing() {
        assert_eq!(ServiceState::from("Started"), ServiceState::Started);
        assert_eq!(
            ServiceState::from("MessageDelivered"),
            ServiceState::MessageDelivered
        );
        assert_eq!(ServiceState::from("Successful"), ServiceState::Successful);
        assert_eq!(ServiceState::from("Failed"), ServiceState::Failed);
        assert_eq!(
            ServiceState::from("Pending"),
            ServiceState::Unrecognized("Pending".into())
        );
    }

    #[test]
    fn test_state_terminality() {
        assert!(ServiceState::Started.is_pending());
        assert!(ServiceState::MessageDelivered.is_pending());
        assert!(ServiceState::Successful.is_terminal());
        assert!(ServiceState::Failed.is_terminal());
        assert!(ServiceState::from("Queued").is_terminal());
        assert!(ServiceState::default().is_terminal());
    }

    #[test]
    fn test_service_type_labels() {
        assert_eq!(ServiceType::from("RDL".to_string()), ServiceType::Lock);
        assert_eq!(ServiceType::from("RDU".to_string()).to_string(), "Unlock Vehicle");
        assert_eq!(ServiceType::BlinkLights.to_string(), "Blink Lights");
        assert_eq!(ServiceType::from("ERS".to_string()).to_string(), "ERS");
    }

    #[test]
    fn test_status_round_trips_raw_strings() {
        let json = serde_json::json!({
            "status": "Pending",
            "serviceType": "XYZ",
            "service": "https://example.test/services/1",
            "vehicleId": "YV1",
            "customerServiceId": "1-abc"
        });
        let status: ServiceStatus = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(status.status, ServiceState::Unrecognized("Pending".into()));
        assert_eq!(status.service_type, ServiceType::Other("XYZ".into()));

        let back = serde_json::to_value(&status).unwrap();
        assert_eq!(back["status"], "Pending");
        assert_eq!(back["serviceType"], "XYZ");
    }

    #[test]
    fn test_outcome_classification() {
        let mut status = ServiceStatus {
            status: ServiceState::Started,
            service_type: ServiceType::Lock,
            ..Default::default()
        };
        assert!(!status.outcome().unwrap());

        status.status = ServiceState::Successful;
        assert!(status.outcome().unwrap());

        status.status = ServiceState::Failed;
        status.failure_reason = Some("DoorOpen".into());
        let err = status.outcome().unwrap_err();
        assert_eq!(err.to_string(), "request (Lock Vehicle) failed: DoorOpen");

        status.status = ServiceState::from("Pending");
        let err = status.outcome().unwrap_err();
        assert_eq!(
            err.to_string(),
            "request (Lock Vehicle) failed with status (Pending): DoorOpen"
        );
    }
}
