//! Request and response types for the VOC customer API
//!
//! Field names follow the server's camelCase JSON. Missing fields default;
//! unknown fields are ignored.

use serde::{Deserialize, Serialize};

// =============================================================================
// Vehicle Attributes
// =============================================================================

/// Country of registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    pub iso2: String,
}

/// Static vehicle attributes, including capability flags and timing parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleAttributes {
    pub engine_code: String,
    pub exterior_code: String,
    pub interior_code: String,
    pub tyre_dimension_code: String,
    pub tyre_inflation_pressure_light_code: String,
    pub tyre_inflation_pressure_heavy_code: String,
    pub gearbox_code: String,
    pub fuel_type: String,
    pub fuel_tank_volume: i64,
    pub gross_weight: i64,
    pub model_year: i64,
    pub vehicle_type: String,
    pub vehicle_type_code: String,
    pub number_of_doors: i64,
    pub registration_number: String,
    pub car_locator_distance: i64,
    pub honk_and_blink_distance: i64,
    pub b_call_assistance_number: String,
    pub car_locator_supported: bool,
    pub honk_and_blink_supported: bool,
    pub honk_and_blink_versions_supported: Vec<String>,
    pub remote_heater_supported: bool,
    pub unlock_supported: bool,
    pub lock_supported: bool,
    pub journal_log_supported: bool,
    pub assistance_call_supported: bool,
    /// Seconds the server keeps an unlock negotiation open
    pub unlock_time_frame: u32,
    pub verification_time_frame: i64,
    pub time_fully_accessible: i64,
    pub time_partially_accessible: i64,
    pub subscription_type: String,
    pub subscription_start_date: String,
    pub subscription_end_date: String,
    pub server_version: String,
    #[serde(rename = "VIN")]
    pub vin_upper: String,
    #[serde(rename = "vin")]
    pub vin_lower: String,
    pub journal_log_enabled: bool,
    pub high_voltage_battery_supported: bool,
    pub max_active_delay_charging_locations: i64,
    pub preclimatization_supported: bool,
    #[serde(rename = "sendPOIToVehicleVersionsSupported")]
    pub send_poi_to_vehicle_versions_supported: Vec<String>,
    pub climatization_calendar_versions_supported: Vec<String>,
    pub climatization_calendar_max_timers: i64,
    pub vehicle_platform: String,
    pub override_delay_charging_supported: bool,
    pub engine_start_supported: bool,
    #[serde(rename = "status.parkedIndoor.supported")]
    pub status_parked_indoor_supported: bool,
    pub country: Country,
}

impl VehicleAttributes {
    /// The VIN, preferring the upper-case `VIN` field over `vin`
    pub fn vin(&self) -> Option<&str> {
        [self.vin_upper.as_str(), self.vin_lower.as_str()]
            .into_iter()
            .find(|v| !v.is_empty())
    }
}

// =============================================================================
// Vehicle Status
// =============================================================================

/// Door state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Doors {
    pub tailgate_open: bool,
    pub rear_right_door_open: bool,
    pub rear_left_door_open: bool,
    pub front_right_door_open: bool,
    pub front_left_door_open: bool,
    pub hood_open: bool,
    pub timestamp: String,
}

impl Doors {
    /// Names of every open door, including the hood and the tailgate
    pub fn open(&self) -> Vec<&'static str> {
        [
            (self.hood_open, "hood"),
            (self.front_left_door_open, "front left"),
            (self.front_right_door_open, "front right"),
            (self.rear_left_door_open, "rear left"),
            (self.rear_right_door_open, "rear right"),
            (self.tailgate_open, "tailgate"),
        ]
        .into_iter()
        .filter_map(|(open, name)| open.then_some(name))
        .collect()
    }

    /// True if any door, the hood or the tailgate is open
    pub fn any_open(&self) -> bool {
        !self.open().is_empty()
    }
}

/// Window state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Windows {
    pub front_left_window_open: bool,
    pub front_right_window_open: bool,
    pub rear_left_window_open: bool,
    pub rear_right_window_open: bool,
    pub timestamp: String,
}

/// Seat heating selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeatSelection {
    pub front_driver_side: bool,
    pub front_passenger_side: bool,
    pub rear_driver_side: bool,
    pub rear_passenger_side: bool,
    pub rear_mid: bool,
}

/// Heater timer slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaterTimer {
    pub time: String,
    pub state: bool,
}

/// Heater state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Heater {
    pub seat_selection: SeatSelection,
    /// "on" / "off"; other values have been observed
    pub status: String,
    pub timer1: HeaterTimer,
    pub timer2: HeaterTimer,
    pub timestamp: String,
}

/// High-voltage battery state (electric and plug-in hybrid vehicles)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HvBattery {
    pub hv_battery_charge_status_derived: String,
    pub hv_battery_charge_status_derived_timestamp: String,
    pub hv_battery_charge_mode_status: String,
    pub hv_battery_charge_mode_status_timestamp: String,
    pub hv_battery_charge_status: String,
    pub hv_battery_charge_status_timestamp: String,
    pub hv_battery_level: i64,
    pub hv_battery_level_timestamp: String,
    #[serde(rename = "distanceToHVBatteryEmpty")]
    pub distance_to_hv_battery_empty: i64,
    #[serde(rename = "distanceToHVBatteryEmptyTimestamp")]
    pub distance_to_hv_battery_empty_timestamp: String,
    pub hv_battery_charge_warning: String,
    pub hv_battery_charge_warning_timestamp: String,
    #[serde(rename = "timeToHVBatteryFullyCharged")]
    pub time_to_hv_battery_fully_charged: i64,
    #[serde(rename = "timeToHVBatteryFullyChargedTimestamp")]
    pub time_to_hv_battery_fully_charged_timestamp: String,
}

/// Position at which the theft alarm last fired
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheftAlarm {
    pub longitude: f64,
    pub latitude: f64,
    pub timestamp: String,
}

/// Dynamic vehicle status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleStatus {
    pub average_fuel_consumption: f64,
    pub average_fuel_consumption_timestamp: String,
    pub average_speed: i64,
    pub average_speed_timestamp: String,
    pub brake_fluid: String,
    pub brake_fluid_timestamp: String,
    pub bulb_failures: Vec<String>,
    pub bulb_failures_timestamp: String,
    pub car_locked: bool,
    pub car_locked_timestamp: String,
    pub connection_status: String,
    pub connection_status_timestamp: String,
    pub distance_to_empty: i64,
    pub distance_to_empty_timestamp: String,
    pub doors: Doors,
    pub engine_running: bool,
    pub engine_running_timestamp: String,
    pub fuel_amount: i64,
    pub fuel_amount_level: i64,
    pub fuel_amount_level_timestamp: String,
    pub fuel_amount_timestamp: String,
    pub heater: Heater,
    pub hv_battery: HvBattery,
    pub odometer: i64,
    pub odometer_timestamp: String,
    pub parked_indoor: bool,
    pub parked_indoor_timestamp: String,
    pub remote_climatization_status: String,
    pub remote_climatization_status_timestamp: String,
    pub service_warning_status: String,
    pub service_warning_status_timestamp: String,
    pub theft_alarm: TheftAlarm,
    pub time_fully_accessible_until: String,
    pub time_partially_accessible_until: String,
    pub trip_meter1: i64,
    pub trip_meter1_timestamp: String,
    pub trip_meter2: i64,
    pub trip_meter2_timestamp: String,
    pub washer_fluid_level: String,
    pub washer_fluid_level_timestamp: String,
    pub windows: Windows,
}

// =============================================================================
// Position
// =============================================================================

/// A reported position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
    pub timestamp: String,
    /// Shape varies between vehicle platforms
    pub speed: serde_json::Value,
    /// Shape varies between vehicle platforms
    pub heading: serde_json::Value,
}

/// Response of `vehicles/{vin}/position`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehiclePosition {
    pub position: Position,
    pub calculated_position: Position,
}

impl VehiclePosition {
    /// The calculated position, when the server provided a usable one
    pub fn calculated(&self) -> Option<&Position> {
        let p = &self.calculated_position;
        (p.longitude != 0.0 || p.latitude != 0.0).then_some(p)
    }
}

/// Client position sent with blink/honk requests
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientPosition {
    pub latitude: f64,
    pub longitude: f64,
    /// Fixed at 0.0 unless the caller knows better
    pub accuracy: f64,
}

impl ClientPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: 0.0,
        }
    }
}

impl From<&Position> for ClientPosition {
    fn from(position: &Position) -> Self {
        Self::new(position.latitude, position.longitude)
    }
}

/// Body of the honk/blink endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HonkBlinkRequest {
    pub client_accuracy: f64,
    pub client_latitude: f64,
    pub client_longitude: f64,
}

impl From<ClientPosition> for HonkBlinkRequest {
    fn from(position: ClientPosition) -> Self {
        Self {
            client_accuracy: position.accuracy,
            client_latitude: position.latitude,
            client_longitude: position.longitude,
        }
    }
}

/// Body of the engine start endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EngineStartRequest {
    /// Minutes the engine keeps running
    pub runtime: u32,
}

impl Default for EngineStartRequest {
    fn default() -> Self {
        Self { runtime: 15 }
    }
}

// =============================================================================
// Trips
// =============================================================================

/// Axis-aligned bounding box of a route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub max_longitude: f64,
    pub max_latitude: f64,
}

/// Route summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteDetails {
    pub route: String,
    pub total_waypoints: i64,
    pub bounding_box: BoundingBox,
}

/// Resolved address of a trip endpoint or charging location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddressPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "ISO2CountryCode", skip_serializing_if = "Option::is_none")]
    pub iso2_country_code: Option<String>,
    #[serde(rename = "Region", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// One leg of a trip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripDetail {
    pub fuel_consumption: f64,
    pub electrical_consumption: f64,
    pub electrical_regeneration: f64,
    pub distance: f64,
    pub start_odometer: i64,
    pub start_time: String,
    pub start_position: AddressPosition,
    pub end_odometer: i64,
    pub end_time: String,
    pub end_position: AddressPosition,
}

/// A recorded trip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub user_notes: String,
    /// Self hyperlink
    pub trip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_details: Option<RouteDetails>,
    pub trip_details: Vec<TripDetail>,
}

/// Response of `vehicles/{vin}/trips`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTrips {
    pub trips: Vec<Trip>,
}

// =============================================================================
// Charging Locations
// =============================================================================

/// Delayed-charging window of a charging location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DelayCharging {
    pub enabled: bool,
    /// e.g. "21:30"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// e.g. "06:45"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<String>,
}

/// A charging location registered for a vehicle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChargingLocation {
    /// Self hyperlink; the trailing segment is the location id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plug_in_reminder_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<AddressPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_charging: Option<DelayCharging>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_at_charging_location: Option<bool>,
}

impl ChargingLocation {
    /// Location id taken from the trailing segment of the self hyperlink
    pub fn id(&self) -> Option<&str> {
        self.charge_location
            .as_deref()
            .and_then(|href| href.trim_end_matches('/').rsplit('/').next())
            .filter(|id| !id.is_empty())
    }
}

/// Response of `vehicles/{vin}/chargeLocations`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChargingLocations {
    pub charging_locations: Vec<ChargingLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attributes_vin_preference() {
        let mut attributes = VehicleAttributes {
            vin_lower: "lower".into(),
            ..Default::default()
        };
        assert_eq!(attributes.vin(), Some("lower"));

        attributes.vin_upper = "UPPER".into();
        assert_eq!(attributes.vin(), Some("UPPER"));

        assert_eq!(VehicleAttributes::default().vin(), None);
    }

    #[test]
    fn test_attributes_parsing() {
        let json = serde_json::json!({
            "VIN": "YV1XZ",
            "registrationNumber": "ABC123",
            "lockSupported": true,
            "unlockSupported": false,
            "unlockTimeFrame": 120,
            "status.parkedIndoor.supported": true,
            "country": { "iso2": "SE" },
            "someFutureField": 1
        });
        let attributes: VehicleAttributes = serde_json::from_value(json).unwrap();
        assert_eq!(attributes.vin(), Some("YV1XZ"));
        assert_eq!(attributes.registration_number, "ABC123");
        assert!(attributes.lock_supported);
        assert!(!attributes.unlock_supported);
        assert_eq!(attributes.unlock_time_frame, 120);
        assert!(attributes.status_parked_indoor_supported);
        assert_eq!(attributes.country.iso2, "SE");
    }

    #[test]
    fn test_open_doors() {
        let mut doors = Doors::default();
        assert!(!doors.any_open());
        assert!(doors.open().is_empty());

        doors.hood_open = true;
        doors.tailgate_open = true;
        assert!(doors.any_open());
        assert_eq!(doors.open(), vec!["hood", "tailgate"]);
    }

    #[test]
    fn test_honk_blink_payload() {
        let body = HonkBlinkRequest::from(ClientPosition::new(57.7, 11.9));
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({
                "clientAccuracy": 0.0,
                "clientLatitude": 57.7,
                "clientLongitude": 11.9
            })
        );
    }

    #[test]
    fn test_calculated_position_presence() {
        let mut position = VehiclePosition::default();
        assert!(position.calculated().is_none());
        position.calculated_position.longitude = 11.9;
        assert!(position.calculated().is_some());
    }

    #[test]
    fn test_charging_location_id() {
        let location = ChargingLocation {
            charge_location: Some(
                "https://vocapi.wirelesscar.net/customerapi/rest/v3.0/vehicles/YV1/chargeLocations/4075649"
                    .into(),
            ),
            ..Default::default()
        };
        assert_eq!(location.id(), Some("4075649"));
        assert_eq!(ChargingLocation::default().id(), None);
    }

    #[test]
    fn test_delay_charging_update_body() {
        let update = ChargingLocation {
            status: Some("Accepted".into()),
            delay_charging: Some(DelayCharging {
                enabled: false,
                start_time: None,
                stop_time: None,
            }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            serde_json::json!({
                "delayCharging": { "enabled": false },
                "status": "Accepted"
            })
        );
    }

    #[test]
    fn test_trips_parsing() {
        let json = serde_json::json!({
            "trips": [{
                "id": 7,
                "name": "Commute",
                "tripDetails": [{
                    "distance": 12500.0,
                    "startOdometer": 1000000,
                    "startPosition": { "city": "Gothenburg", "ISO2CountryCode": "SE" }
                }]
            }]
        });
        let trips: VehicleTrips = serde_json::from_value(json).unwrap();
        assert_eq!(trips.trips.len(), 1);
        let detail = &trips.trips[0].trip_details[0];
        assert_eq!(detail.start_odometer, 1_000_000);
        assert_eq!(detail.start_position.city.as_deref(), Some("Gothenburg"));
        assert_eq!(
            detail.start_position.iso2_country_code.as_deref(),
            Some("SE")
        );
        assert!(trips.trips[0].route_details.is_none());
    }
}
