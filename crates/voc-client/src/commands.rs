//! Command dispatch: state-changing vehicle operations
//!
//! Every command POSTs to `vehicles/{vin}/<command>` and returns the pending
//! [`ServiceStatus`] exactly as the server reported it. Driving it to
//! completion is the caller's job (see [`VocClient::evaluate_service_status`]).

use tracing::{debug, instrument};

use crate::client::{encode, require, VocClient, VEHICLES_ENDPOINT};
use crate::error::Result;
use crate::service::ServiceStatus;
use crate::transport::Method;
use crate::types::{ClientPosition, EngineStartRequest, HonkBlinkRequest};

impl VocClient {
    async fn issue_command(
        &self,
        vin: &str,
        command: &[&str],
        payload: Option<serde_json::Value>,
    ) -> Result<ServiceStatus> {
        require(vin, "vin")?;

        let mut segments = vec![VEHICLES_ENDPOINT, vin];
        segments.extend_from_slice(command);
        let url = self.make_url(&segments)?;

        let status: ServiceStatus = self
            .send_expecting(Method::Post, &url, payload.as_ref())
            .await?;
        debug!(
            "{} accepted: {} ({})",
            command.join("/"),
            status.status,
            status.customer_service_id
        );
        Ok(status)
    }

    /// Position for blink/honk: the given one, or the vehicle's reported position
    async fn client_position(
        &self,
        vin: &str,
        position: Option<ClientPosition>,
    ) -> Result<ClientPosition> {
        match position {
            Some(position) => Ok(position),
            None => {
                let reported = self.get_vehicle_position(vin).await?;
                Ok(ClientPosition::from(&reported.position))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn lock_vehicle(&self, vin: &str) -> Result<ServiceStatus> {
        self.issue_command(vin, &["lock"], None).await
    }

    #[instrument(skip(self))]
    pub async fn unlock_vehicle(&self, vin: &str) -> Result<ServiceStatus> {
        self.issue_command(vin, &["unlock"], None).await
    }

    /// Start the engine for the default runtime of 15 minutes
    #[instrument(skip(self))]
    pub async fn start_engine(&self, vin: &str) -> Result<ServiceStatus> {
        let body = encode(&EngineStartRequest::default())?;
        self.issue_command(vin, &["engine", "start"], Some(body))
            .await
    }

    #[instrument(skip(self))]
    pub async fn stop_engine(&self, vin: &str) -> Result<ServiceStatus> {
        self.issue_command(vin, &["engine", "stop"], None).await
    }

    #[instrument(skip(self))]
    pub async fn start_heater(&self, vin: &str) -> Result<ServiceStatus> {
        self.issue_command(vin, &["heater", "start"], None).await
    }

    #[instrument(skip(self))]
    pub async fn stop_heater(&self, vin: &str) -> Result<ServiceStatus> {
        self.issue_command(vin, &["heater", "stop"], None).await
    }

    #[instrument(skip(self))]
    pub async fn start_preclimatization(&self, vin: &str) -> Result<ServiceStatus> {
        self.issue_command(vin, &["preclimatization", "start"], None)
            .await
    }

    #[instrument(skip(self))]
    pub async fn stop_preclimatization(&self, vin: &str) -> Result<ServiceStatus> {
        self.issue_command(vin, &["preclimatization", "stop"], None)
            .await
    }

    /// Blink the lights without sounding the horn.
    ///
    /// Without an explicit position the vehicle's reported position is
    /// fetched first and sent back as the client position.
    #[instrument(skip(self))]
    pub async fn blink_lights(
        &self,
        vin: &str,
        position: Option<ClientPosition>,
    ) -> Result<ServiceStatus> {
        require(vin, "vin")?;
        let position = self.client_position(vin, position).await?;
        let body = encode(&HonkBlinkRequest::from(position))?;
        self.issue_command(vin, &["honk_blink", "lights"], Some(body))
            .await
    }

    /// Blink the lights and sound the horn
    #[instrument(skip(self))]
    pub async fn honk_and_blink(
        &self,
        vin: &str,
        position: Option<ClientPosition>,
    ) -> Result<ServiceStatus> {
        require(vin, "vin")?;
        let position = self.client_position(vin, position).await?;
        let body = encode(&HonkBlinkRequest::from(position))?;
        self.issue_command(vin, &["honkAndBlink"], Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::VocError;
    use crate::service::{ServiceState, ServiceType};
    use crate::testing::ScriptedTransport;
    use pretty_assertions::assert_eq;

    const ROOT: &str = "http://voc.test/customerapi/rest/v3.0";

    fn setup() -> (Arc<ScriptedTransport>, VocClient) {
        let transport = Arc::new(ScriptedTransport::new());
        let config = ClientConfig::builder().base_url(ROOT).build();
        let client = VocClient::with_transport(transport.clone(), config);
        (transport, client)
    }

    fn started(service_type: &str) -> serde_json::Value {
        serde_json::json!({
            "status": "Started",
            "serviceType": service_type,
            "service": format!("{}/vehicles/YV1/services/1", ROOT),
            "vehicleId": "YV1",
            "customerServiceId": "1-abc"
        })
    }

    #[tokio::test]
    async fn test_lock_posts_without_body() {
        let (transport, client) = setup();
        transport.push_json(200, started("RDL"));

        let status = client.lock_vehicle("YV1").await.unwrap();
        assert_eq!(status.status, ServiceState::Started);
        assert_eq!(status.service_type, ServiceType::Lock);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].url, format!("{}/vehicles/YV1/lock", ROOT));
        assert!(requests[0].payload.is_none());
    }

    #[tokio::test]
    async fn test_returns_whatever_state_the_server_reports() {
        let (transport, client) = setup();
        let mut body = started("RDU");
        body["status"] = "MessageDelivered".into();
        transport.push_json(200, body);

        let status = client.unlock_vehicle("YV1").await.unwrap();
        assert_eq!(status.status, ServiceState::MessageDelivered);
    }

    #[tokio::test]
    async fn test_engine_start_body() {
        let (transport, client) = setup();
        transport.push_json(200, started("ERS"));

        client.start_engine("YV1").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, format!("{}/vehicles/YV1/engine/start", ROOT));
        assert_eq!(
            requests[0].payload,
            Some(serde_json::json!({ "runtime": 15 }))
        );
    }

    #[tokio::test]
    async fn test_empty_vin_sends_nothing() {
        let (transport, client) = setup();

        for result in [
            client.lock_vehicle("").await,
            client.stop_heater("  ").await,
            client.blink_lights("", None).await,
            client.honk_and_blink("", Some(ClientPosition::new(1.0, 2.0))).await,
        ] {
            assert!(matches!(result, Err(VocError::InvalidInput(_))));
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_honk_with_explicit_position_skips_lookup() {
        let (transport, client) = setup();
        transport.push_json(200, started("RHBL"));

        let position = ClientPosition {
            latitude: 57.7,
            longitude: 11.9,
            accuracy: 25.0,
        };
        client.honk_and_blink("YV1", Some(position)).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, format!("{}/vehicles/YV1/honkAndBlink", ROOT));
        assert_eq!(
            requests[0].payload,
            Some(serde_json::json!({
                "clientAccuracy": 25.0,
                "clientLatitude": 57.7,
                "clientLongitude": 11.9
            }))
        );
    }

    #[tokio::test]
    async fn test_blink_fetches_position_first() {
        let (transport, client) = setup();
        transport.push_json(
            200,
            serde_json::json!({
                "position": { "latitude": 57.7, "longitude": 11.9 },
                "calculatedPosition": { "latitude": 1.0, "longitude": 2.0 }
            }),
        );
        transport.push_json(200, started("RHBLF"));

        client.blink_lights("YV1", None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].url, format!("{}/vehicles/YV1/position", ROOT));
        assert_eq!(
            requests[1].url,
            format!("{}/vehicles/YV1/honk_blink/lights", ROOT)
        );
        assert_eq!(
            requests[1].payload,
            Some(serde_json::json!({
                "clientAccuracy": 0.0,
                "clientLatitude": 57.7,
                "clientLongitude": 11.9
            }))
        );
    }

    #[tokio::test]
    async fn test_position_failure_aborts_blink() {
        let (transport, client) = setup();
        transport.push_error(500, "position unavailable");

        let err = client.blink_lights("YV1", None).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.requests().len(), 1);
    }
}
