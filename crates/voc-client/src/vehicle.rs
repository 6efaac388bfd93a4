//! Vehicle resource: lazily resolved links and capability-gated commands

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::account::AccountVehicleRelation;
use crate::client::VocClient;
use crate::error::{Result, VocError};
use crate::service::ServiceStatus;
use crate::types::{ChargingLocation, ClientPosition, DelayCharging, VehicleAttributes, VehicleStatus};

/// A vehicle as returned by `vehicles/{vin}`
///
/// Attributes, status and relations arrive as hyperlinks. They are fetched by
/// [`resolve_links`](Self::resolve_links), at most once per instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vehicle {
    /// VIN
    pub vehicle_id: String,

    #[serde(rename = "attributes")]
    pub attributes_link: String,

    #[serde(rename = "status")]
    pub status_link: String,

    #[serde(rename = "vehicleAccountRelations")]
    pub relation_links: Vec<String>,

    #[serde(skip)]
    pub attributes: Option<VehicleAttributes>,

    #[serde(skip)]
    pub status: Option<VehicleStatus>,

    #[serde(skip)]
    pub relations: Vec<AccountVehicleRelation>,

    #[serde(skip)]
    relations_resolved: bool,
}

impl Vehicle {
    /// Fetch every link not resolved yet, in order: attributes, status,
    /// relations. Stops at the first failure; whatever resolved before it
    /// stays populated.
    #[instrument(skip(self, client), fields(vin = %self.vehicle_id))]
    pub async fn resolve_links(&mut self, client: &VocClient) -> Result<()> {
        if self.attributes.is_none() {
            self.attributes = Some(if self.attributes_link.is_empty() {
                client.get_vehicle_attributes(&self.vehicle_id).await?
            } else {
                client.fetch_hyperlink(&self.attributes_link).await?
            });
        }

        if self.status.is_none() {
            self.status = Some(if self.status_link.is_empty() {
                client.get_vehicle_status(&self.vehicle_id).await?
            } else {
                client.fetch_hyperlink(&self.status_link).await?
            });
        }

        if !self.relations_resolved {
            self.relations.clear();
            for link in &self.relation_links {
                let relation = client.get_relation_by_hyperlink(link).await?;
                self.relations.push(relation);
            }
            self.relations_resolved = true;
        }

        Ok(())
    }

    /// Whether every link has been resolved
    pub fn is_resolved(&self) -> bool {
        self.attributes.is_some() && self.status.is_some() && self.relations_resolved
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    fn capability(&self, flag: impl Fn(&VehicleAttributes) -> bool) -> bool {
        self.attributes.as_ref().map(flag).unwrap_or(false)
    }

    pub fn is_lock_supported(&self) -> bool {
        self.capability(|a| a.lock_supported)
    }

    pub fn is_unlock_supported(&self) -> bool {
        self.capability(|a| a.unlock_supported)
    }

    pub fn is_engine_start_supported(&self) -> bool {
        self.capability(|a| a.engine_start_supported)
    }

    pub fn is_remote_heater_supported(&self) -> bool {
        self.capability(|a| a.remote_heater_supported)
    }

    pub fn is_preclimatization_supported(&self) -> bool {
        self.capability(|a| a.preclimatization_supported)
    }

    /// Remote heater or preclimatization
    pub fn is_heater_supported(&self) -> bool {
        self.is_remote_heater_supported() || self.is_preclimatization_supported()
    }

    pub fn is_honk_and_blink_supported(&self) -> bool {
        self.capability(|a| a.honk_and_blink_supported)
    }

    pub fn is_journal_log_supported(&self) -> bool {
        self.capability(|a| a.journal_log_supported)
    }

    pub fn is_journal_log_enabled(&self) -> bool {
        self.capability(|a| a.journal_log_enabled)
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn is_locked(&self) -> bool {
        self.status.as_ref().map(|s| s.car_locked).unwrap_or(false)
    }

    pub fn is_heater_on(&self) -> bool {
        let Some(status) = &self.status else {
            return false;
        };
        match status.heater.status.as_str() {
            "on" => true,
            "off" => false,
            other => {
                warn!("unexpected heater status: {}", other);
                false
            }
        }
    }

    /// "<registration> [<vin>]", used in capability errors
    pub fn label(&self) -> String {
        match &self.attributes {
            Some(a) => format!(
                "{} [{}]",
                a.registration_number,
                a.vin().unwrap_or(&self.vehicle_id)
            ),
            None => format!("[{}]", self.vehicle_id),
        }
    }

    fn unsupported(&self, operation: &str) -> VocError {
        VocError::Unsupported {
            operation: operation.to_string(),
            vehicle: self.label(),
        }
    }

    fn ensure(&self, supported: bool, operation: &str) -> Result<()> {
        if supported {
            Ok(())
        } else {
            Err(self.unsupported(operation))
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub async fn lock(&self, client: &VocClient) -> Result<ServiceStatus> {
        self.ensure(self.is_lock_supported(), "lock/unlock")?;
        client.lock_vehicle(&self.vehicle_id).await
    }

    pub async fn unlock(&self, client: &VocClient) -> Result<ServiceStatus> {
        self.ensure(self.is_unlock_supported(), "lock/unlock")?;
        client.unlock_vehicle(&self.vehicle_id).await
    }

    pub async fn start_engine(&self, client: &VocClient) -> Result<ServiceStatus> {
        self.ensure(self.is_engine_start_supported(), "engine start/stop")?;
        client.start_engine(&self.vehicle_id).await
    }

    pub async fn stop_engine(&self, client: &VocClient) -> Result<ServiceStatus> {
        self.ensure(self.is_engine_start_supported(), "engine start/stop")?;
        client.stop_engine(&self.vehicle_id).await
    }

    /// Start the remote heater, falling back to preclimatization
    pub async fn start_heater(&self, client: &VocClient) -> Result<ServiceStatus> {
        if self.is_remote_heater_supported() {
            client.start_heater(&self.vehicle_id).await
        } else if self.is_preclimatization_supported() {
            client.start_preclimatization(&self.vehicle_id).await
        } else {
            Err(self.unsupported("heater"))
        }
    }

    /// Stop the remote heater, falling back to preclimatization
    pub async fn stop_heater(&self, client: &VocClient) -> Result<ServiceStatus> {
        if self.is_remote_heater_supported() {
            client.stop_heater(&self.vehicle_id).await
        } else if self.is_preclimatization_supported() {
            client.stop_preclimatization(&self.vehicle_id).await
        } else {
            Err(self.unsupported("heater"))
        }
    }

    pub async fn blink_lights(
        &self,
        client: &VocClient,
        position: Option<ClientPosition>,
    ) -> Result<ServiceStatus> {
        client.blink_lights(&self.vehicle_id, position).await
    }

    pub async fn honk_and_blink(
        &self,
        client: &VocClient,
        position: Option<ClientPosition>,
    ) -> Result<ServiceStatus> {
        self.ensure(self.is_honk_and_blink_supported(), "honk and blink")?;
        client.honk_and_blink(&self.vehicle_id, position).await
    }

    /// Replace the delayed-charging window of a charging location
    pub async fn set_delay_charging(
        &self,
        client: &VocClient,
        charging_id: &str,
        delay_charging: DelayCharging,
    ) -> Result<Option<ChargingLocation>> {
        let update = ChargingLocation {
            status: Some("Accepted".to_string()),
            delay_charging: Some(delay_charging),
            ..Default::default()
        };
        client
            .update_charging_location(&self.vehicle_id, charging_id, &update)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(attributes: VehicleAttributes) -> Vehicle {
        Vehicle {
            vehicle_id: "YV1XZ".into(),
            attributes: Some(attributes),
            ..Default::default()
        }
    }

    #[test]
    fn test_unresolved_vehicle_supports_nothing() {
        let vehicle = Vehicle {
            vehicle_id: "YV1XZ".into(),
            ..Default::default()
        };
        assert!(!vehicle.is_lock_supported());
        assert!(!vehicle.is_heater_supported());
        assert!(!vehicle.is_locked());
        assert!(!vehicle.is_resolved());
        assert_eq!(vehicle.label(), "[YV1XZ]");
    }

    #[test]
    fn test_heater_supported_by_either_flag() {
        let remote = vehicle(VehicleAttributes {
            remote_heater_supported: true,
            ..Default::default()
        });
        let preclim = vehicle(VehicleAttributes {
            preclimatization_supported: true,
            ..Default::default()
        });
        assert!(remote.is_heater_supported());
        assert!(preclim.is_heater_supported());
        assert!(!preclim.is_remote_heater_supported());
    }

    #[test]
    fn test_heater_on_parsing() {
        let mut v = vehicle(VehicleAttributes::default());
        let mut status = VehicleStatus::default();
        status.heater.status = "on".into();
        v.status = Some(status.clone());
        assert!(v.is_heater_on());

        status.heater.status = "onOther".into();
        v.status = Some(status);
        assert!(!v.is_heater_on());
    }

    #[test]
    fn test_label_names_registration_and_vin() {
        let v = vehicle(VehicleAttributes {
            registration_number: "ABC123".into(),
            vin_upper: "YV1XZ".into(),
            ..Default::default()
        });
        assert_eq!(v.label(), "ABC123 [YV1XZ]");
    }

    #[test]
    fn test_links_deserialize_into_link_fields() {
        let json = serde_json::json!({
            "vehicleId": "YV1XZ",
            "attributes": "https://example.test/vehicles/YV1XZ/attributes",
            "status": "https://example.test/vehicles/YV1XZ/status",
            "vehicleAccountRelations": ["https://example.test/vehicle-account-relations/42"]
        });
        let v: Vehicle = serde_json::from_value(json).unwrap();
        assert_eq!(v.attributes_link, "https://example.test/vehicles/YV1XZ/attributes");
        assert_eq!(v.relation_links.len(), 1);
        assert!(v.attributes.is_none());
        assert!(!v.is_resolved());
    }
}
