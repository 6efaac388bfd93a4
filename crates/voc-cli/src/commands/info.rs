//! Read-only vehicle commands: attributes, status, position, trips

use anyhow::{Context, Result};
use serde_json::Value;
use voc_client::{VehiclePosition, VehicleStatus, VehicleTrips};

use crate::context::AppContext;
use crate::output::{display_value, maps_url, object_rows, select_field, OutputContext, TripRow};

/// How a resource should be rendered
pub struct View<'a> {
    /// Dump the raw resource as JSON
    pub json: bool,
    /// Only print these dotted paths
    pub fields: &'a [String],
}

/// Show static vehicle attributes
pub async fn attributes(ctx: &AppContext, view: View<'_>) -> Result<()> {
    let vehicle = ctx.client.get_vehicle(ctx.vin()?).await?;
    let attributes = vehicle.attributes.context("Vehicle attributes are not available")?;
    let value = serde_json::to_value(&attributes)?;

    if render_raw(&ctx.out, &value, &view)? {
        return Ok(());
    }
    ctx.out.print(&object_rows(&value))
}

/// Show a summary of the current vehicle status, followed by its position
pub async fn status(ctx: &AppContext, view: View<'_>) -> Result<()> {
    let vin = ctx.vin()?;
    let vehicle = ctx.client.get_vehicle(vin).await?;
    let status = vehicle.status.context("Vehicle status is not available")?;
    let value = serde_json::to_value(&status)?;

    if render_raw(&ctx.out, &value, &view)? {
        return Ok(());
    }
    ctx.out.print_kv(&status_summary(&status))?;

    let position = ctx.client.get_vehicle_position(vin).await?;
    print_position(&ctx.out, &position)
}

/// Show the last reported and calculated positions
pub async fn position(ctx: &AppContext, json: bool) -> Result<()> {
    let position = ctx.client.get_vehicle_position(ctx.vin()?).await?;
    if json || ctx.out.is_json() {
        return ctx.out.print_json(&position);
    }
    print_position(&ctx.out, &position)
}

/// Show recorded trips, most recent first
pub async fn trips(ctx: &AppContext, json: bool) -> Result<()> {
    let trips = ctx.client.get_vehicle_trips(ctx.vin()?).await?;
    if json || ctx.out.is_json() {
        return ctx.out.print_json(&trips.trips);
    }
    ctx.out.print(&trip_rows(&trips))
}

/// Print the JSON dump or the selected fields. Returns false when neither
/// was asked for and the caller should render its default view.
fn render_raw(out: &OutputContext, value: &Value, view: &View<'_>) -> Result<bool> {
    if !view.fields.is_empty() {
        let pairs: Vec<(&str, String)> = view
            .fields
            .iter()
            .map(|path| {
                let selected = select_field(value, path).map(display_value);
                (path.as_str(), selected.unwrap_or_default())
            })
            .collect();
        out.print_kv(&pairs)?;
        return Ok(true);
    }
    if view.json || out.is_json() {
        out.print_json(value)?;
        return Ok(true);
    }
    Ok(false)
}

fn status_summary(status: &VehicleStatus) -> Vec<(&'static str, String)> {
    let bulb_failures = if status.bulb_failures.is_empty() {
        "None".to_string()
    } else {
        status.bulb_failures.join(", ")
    };

    let doors_open = if status.doors.any_open() {
        status.doors.open().join(", ")
    } else {
        "None".to_string()
    };

    vec![
        (
            "Average Fuel Consumption",
            format!("{:.1} l/100 km", status.average_fuel_consumption / 10.0),
        ),
        ("Average Speed", format!("{} km/h", status.average_speed)),
        ("Brake Fluid", status.brake_fluid.clone()),
        ("Bulb Failures", bulb_failures),
        ("Car Locked", status.car_locked.to_string()),
        ("Distance to Empty", format!("{} km", status.distance_to_empty)),
        ("Doors Open", doors_open),
        ("Engine Running", status.engine_running.to_string()),
        ("Fuel Amount", format!("{} l", status.fuel_amount)),
        ("Fuel Level", format!("{}%", status.fuel_amount_level)),
    ]
}

fn print_position(out: &OutputContext, position: &VehiclePosition) -> Result<()> {
    let reported = &position.position;
    out.heading("Position");
    out.print_kv(&[
        ("Longitude", format!("{:.15}", reported.longitude)),
        ("Latitude", format!("{:.15}", reported.latitude)),
        ("Timestamp", reported.timestamp.clone()),
        ("Maps URL", maps_url(reported.latitude, reported.longitude)),
    ])?;

    match position.calculated() {
        Some(calculated) => {
            out.heading("Calculated Position");
            out.print_kv(&[
                ("Longitude", format!("{:.15}", calculated.longitude)),
                ("Latitude", format!("{:.15}", calculated.latitude)),
                ("Timestamp", calculated.timestamp.clone()),
                ("Maps URL", maps_url(calculated.latitude, calculated.longitude)),
            ])
        }
        None => {
            out.info("Calculated position is not available");
            Ok(())
        }
    }
}

/// One row per trip leg, most recent trip first
fn trip_rows(trips: &VehicleTrips) -> Vec<TripRow> {
    trips
        .trips
        .iter()
        .enumerate()
        .rev()
        .flat_map(|(index, trip)| {
            trip.trip_details.iter().map(move |detail| TripRow {
                trip: format!("{} ({})", index + 1, trip.id),
                name: trip.name.clone(),
                start_time: detail.start_time.clone(),
                end_time: detail.end_time.clone(),
                distance: format!("{:.3} km", detail.distance / 1000.0),
                fuel: format!("{:.3} l", detail.fuel_consumption / 100.0),
                energy: format!(
                    "{:.3} / {:.3} kWh",
                    detail.electrical_consumption / 1000.0,
                    detail.electrical_regeneration / 1000.0
                ),
                odometer: format!(
                    "{} - {} km",
                    detail.start_odometer / 1000,
                    detail.end_odometer / 1000
                ),
            })
        })
        .collect()
}
