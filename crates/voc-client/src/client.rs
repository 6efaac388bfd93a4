//! VOC HTTP client implementation

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::account::{AccountVehicleRelation, CustomerAccount};
use crate::config::ClientConfig;
use crate::error::{Result, VocError};
use crate::service::ServiceStatus;
use crate::transport::{default_headers, HttpTransport, Method, Transport};
use crate::types::*;
use crate::vehicle::Vehicle;

/// Endpoint of the signed-in customer account
pub(crate) const ACCOUNTS_ENDPOINT: &str = "customeraccounts";
/// Endpoint of vehicles, keyed by VIN
pub(crate) const VEHICLES_ENDPOINT: &str = "vehicles";
/// Endpoint of account/vehicle relations, keyed by numeric id
pub(crate) const RELATIONS_ENDPOINT: &str = "vehicle-account-relations";

/// Reject empty identifiers before anything goes on the wire
pub(crate) fn require(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VocError::invalid_input(format!("{} must not be empty", name)));
    }
    Ok(())
}

/// VOC customer API client
///
/// Holds the transport (with its fixed header set) and the resolved API root.
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct VocClient {
    transport: Arc<dyn Transport>,
    api_root: String,
    config: ClientConfig,
}

impl fmt::Debug for VocClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocClient")
            .field("api_root", &self.api_root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VocClient {
    /// Create a client for the default (European) service region
    pub fn new(username: &str, password: &str) -> Result<Self> {
        Self::with_config(username, password, ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(username: &str, password: &str, config: ClientConfig) -> Result<Self> {
        let headers = default_headers(username, password, &config)?;
        let transport = HttpTransport::new(headers, &config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Create a client on top of an arbitrary transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        let api_root = config.api_root();
        debug!("VOC client using {}", api_root);
        Self {
            transport,
            api_root,
            config,
        }
    }

    /// Get the resolved API root
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Get the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build an absolute URL by appending `segments` to the API root.
    ///
    /// Each segment is percent-encoded on its own, so `/`, `?` and `#` inside
    /// an identifier never change the target. `.` and `..` are rejected.
    pub fn make_url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(VocError::invalid_input(format!(
                "invalid path segment '{}'",
                dot
            )));
        }

        let mut url = Url::parse(&self.api_root)?;
        url.path_segments_mut()
            .map_err(|_| {
                VocError::Config(format!("API root cannot carry a path: {}", self.api_root))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Send a request to an absolute URL and decode the body.
    ///
    /// Escape hatch for endpoints without a typed wrapper. `None` means the
    /// server answered 204 No Content; no decode is attempted then.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<Option<T>> {
        let url = Url::parse(url)?;
        self.call(method, &url, payload).await
    }

    /// Fetch a resource from an absolute hyperlink returned by a prior fetch
    pub async fn fetch_hyperlink<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        require(url, "url")?;
        let url = Url::parse(url)?;
        self.fetch(&url).await
    }

    /// Fetch a resource from a path under the API root
    pub(crate) async fn fetch_path<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.make_url(segments)?;
        self.fetch(&url).await
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let body = self.call(Method::Get, url, None).await?;
        expect_body(body, url)
    }

    /// Send a body-carrying request whose response must decode as `T`
    pub(crate) async fn send_expecting<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &Url,
        payload: Option<&serde_json::Value>,
    ) -> Result<T> {
        let body = self.call(method, url, payload).await?;
        expect_body(body, url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &Url,
        payload: Option<&serde_json::Value>,
    ) -> Result<Option<T>> {
        match self.transport.execute(method, url, payload).await? {
            Some(body) => decode(&body).map(Some),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Customer Account
    // =========================================================================

    /// Get the signed-in customer account
    #[instrument(skip(self))]
    pub async fn get_account(&self) -> Result<CustomerAccount> {
        self.fetch_path(&[ACCOUNTS_ENDPOINT]).await
    }

    /// Get a customer account from a hyperlink
    #[instrument(skip(self))]
    pub async fn get_account_by_hyperlink(&self, url: &str) -> Result<CustomerAccount> {
        self.fetch_hyperlink(url).await
    }

    // =========================================================================
    // Account/Vehicle Relations
    // =========================================================================

    /// Get an account/vehicle relation by its numeric id
    #[instrument(skip(self))]
    pub async fn get_relation_by_id(&self, relation_id: u64) -> Result<AccountVehicleRelation> {
        self.fetch_path(&[RELATIONS_ENDPOINT, &relation_id.to_string()])
            .await
    }

    /// Get an account/vehicle relation from a hyperlink
    #[instrument(skip(self))]
    pub async fn get_relation_by_hyperlink(&self, url: &str) -> Result<AccountVehicleRelation> {
        self.fetch_hyperlink(url).await
    }

    // =========================================================================
    // Vehicles
    // =========================================================================

    /// Get a vehicle by VIN and resolve its attributes, status and relations
    #[instrument(skip(self))]
    pub async fn get_vehicle(&self, vin: &str) -> Result<Vehicle> {
        require(vin, "vin")?;
        let mut vehicle: Vehicle = self.fetch_path(&[VEHICLES_ENDPOINT, vin]).await?;
        vehicle.resolve_links(self).await?;
        Ok(vehicle)
    }

    /// Get a vehicle from a hyperlink and resolve its links
    #[instrument(skip(self))]
    pub async fn get_vehicle_by_hyperlink(&self, url: &str) -> Result<Vehicle> {
        let mut vehicle: Vehicle = self.fetch_hyperlink(url).await?;
        vehicle.resolve_links(self).await?;
        Ok(vehicle)
    }

    /// Get static vehicle attributes (capabilities, unlock time frame, ...)
    #[instrument(skip(self))]
    pub async fn get_vehicle_attributes(&self, vin: &str) -> Result<VehicleAttributes> {
        require(vin, "vin")?;
        self.fetch_path(&[VEHICLES_ENDPOINT, vin, "attributes"])
            .await
    }

    /// Get dynamic vehicle status
    #[instrument(skip(self))]
    pub async fn get_vehicle_status(&self, vin: &str) -> Result<VehicleStatus> {
        require(vin, "vin")?;
        self.fetch_path(&[VEHICLES_ENDPOINT, vin, "status"]).await
    }

    /// Get the last known vehicle position
    #[instrument(skip(self))]
    pub async fn get_vehicle_position(&self, vin: &str) -> Result<VehiclePosition> {
        require(vin, "vin")?;
        self.fetch_path(&[VEHICLES_ENDPOINT, vin, "position"]).await
    }

    /// Get recorded trips
    #[instrument(skip(self))]
    pub async fn get_vehicle_trips(&self, vin: &str) -> Result<VehicleTrips> {
        require(vin, "vin")?;
        self.fetch_path(&[VEHICLES_ENDPOINT, vin, "trips"]).await
    }

    // =========================================================================
    // Charging Locations
    // =========================================================================

    /// List charging locations registered for a vehicle
    #[instrument(skip(self))]
    pub async fn get_charging_locations(&self, vin: &str) -> Result<ChargingLocations> {
        require(vin, "vin")?;
        self.fetch_path(&[VEHICLES_ENDPOINT, vin, "chargeLocations"])
            .await
    }

    /// Get one charging location
    #[instrument(skip(self))]
    pub async fn get_charging_location(
        &self,
        vin: &str,
        charging_id: &str,
    ) -> Result<ChargingLocation> {
        require(vin, "vin")?;
        require(charging_id, "charging location id")?;
        self.fetch_path(&[VEHICLES_ENDPOINT, vin, "chargeLocations", charging_id])
            .await
    }

    /// Update a charging location; `None` when the server answers 204
    #[instrument(skip(self, location))]
    pub async fn update_charging_location(
        &self,
        vin: &str,
        charging_id: &str,
        location: &ChargingLocation,
    ) -> Result<Option<ChargingLocation>> {
        require(vin, "vin")?;
        require(charging_id, "charging location id")?;
        let url = self.make_url(&[VEHICLES_ENDPOINT, vin, "chargeLocations", charging_id])?;
        let body = encode(location)?;
        self.call(Method::Put, &url, Some(&body)).await
    }

    // =========================================================================
    // Service Status
    // =========================================================================

    /// Fetch a service status from its `service` hyperlink
    #[instrument(skip(self))]
    pub async fn get_service_status(&self, url: &str) -> Result<ServiceStatus> {
        self.fetch_hyperlink(url).await
    }

    /// Look up a service status from a vehicle's service history
    #[instrument(skip(self))]
    pub async fn retrieve_service_status(
        &self,
        vin: &str,
        customer_service_id: &str,
    ) -> Result<ServiceStatus> {
        require(vin, "vin")?;
        require(customer_service_id, "customerServiceId")?;
        self.fetch_path(&[VEHICLES_ENDPOINT, vin, "services", customer_service_id])
            .await
    }
}

/// Serialize a request body
pub(crate) fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|e| VocError::invalid_input(format!("Failed to encode request body: {}", e)))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| VocError::Decode(e.to_string()))
}

fn expect_body<T>(body: Option<T>, url: &Url) -> Result<T> {
    body.ok_or_else(|| VocError::NoContent {
        url: url.to_string(),
    })
}
