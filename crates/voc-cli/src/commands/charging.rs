//! Charging command - list charging locations and manage delayed charging

use anyhow::{anyhow, bail, Result};
use voc_client::{AddressPosition, ChargingLocation, DelayCharging};

use crate::context::AppContext;
use crate::output::{maps_url, ChargingLocationRow};

/// Charging operations available from the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargingCommand {
    List,
    Get {
        id: String,
    },
    DelayEnable {
        id: String,
        start: Option<String>,
        stop: Option<String>,
    },
    DelayDisable {
        id: String,
    },
    DelayUpdate {
        id: String,
        start: String,
        stop: String,
    },
}

pub async fn charging(ctx: &AppContext, command: ChargingCommand) -> Result<()> {
    let vin = ctx.vin()?;
    match command {
        ChargingCommand::List => {
            let locations = ctx.client.get_charging_locations(vin).await?;
            if ctx.out.is_json() {
                return ctx.out.print_json(&locations.charging_locations);
            }
            let rows: Vec<ChargingLocationRow> =
                locations.charging_locations.iter().map(location_row).collect();
            ctx.out.print(&rows)
        }

        ChargingCommand::Get { id } => {
            let location = ctx.client.get_charging_location(vin, &id).await?;
            if ctx.out.is_json() {
                return ctx.out.print_json(&location);
            }
            ctx.out.print_kv(&location_details(&location))
        }

        ChargingCommand::DelayEnable { id, start, stop } => {
            let delay = match (start, stop) {
                (None, None) => {
                    let location = ctx.client.get_charging_location(vin, &id).await?;
                    delay_from_location(&location, &id)?
                }
                (Some(start), Some(stop)) => DelayCharging {
                    enabled: true,
                    start_time: Some(parse_clock(&start)?),
                    stop_time: Some(parse_clock(&stop)?),
                },
                _ => bail!("Start and stop times must be given together"),
            };
            apply(ctx, vin, &id, delay, "enabled").await
        }

        ChargingCommand::DelayDisable { id } => {
            let delay = DelayCharging {
                enabled: false,
                ..Default::default()
            };
            apply(ctx, vin, &id, delay, "disabled").await
        }

        ChargingCommand::DelayUpdate { id, start, stop } => {
            let start = parse_clock(&start)?;
            let stop = parse_clock(&stop)?;
            let location = ctx.client.get_charging_location(vin, &id).await?;
            let delay = DelayCharging {
                enabled: location
                    .delay_charging
                    .as_ref()
                    .map(|current| current.enabled)
                    .unwrap_or(false),
                start_time: Some(start),
                stop_time: Some(stop),
            };
            apply(ctx, vin, &id, delay, "updated").await
        }
    }
}

async fn apply(
    ctx: &AppContext,
    vin: &str,
    id: &str,
    delay: DelayCharging,
    action: &str,
) -> Result<()> {
    let vehicle = ctx.client.get_vehicle(vin).await?;
    let updated = vehicle.set_delay_charging(&ctx.client, id, delay).await?;

    match updated {
        Some(location) if ctx.out.is_json() => ctx.out.print_json(&location),
        _ => {
            ctx.out
                .success(&format!("Delayed charging {} for location {}", action, id));
            Ok(())
        }
    }
}

/// Enable with the window already stored on the location
fn delay_from_location(location: &ChargingLocation, id: &str) -> Result<DelayCharging> {
    let current = location.delay_charging.clone().unwrap_or_default();
    match (current.start_time, current.stop_time) {
        (Some(start_time), Some(stop_time)) => Ok(DelayCharging {
            enabled: true,
            start_time: Some(start_time),
            stop_time: Some(stop_time),
        }),
        _ => Err(anyhow!(
            "Charging location {} has no delay window; pass start and stop times",
            id
        )),
    }
}

/// Validate a 24h `HH:MM` clock time and zero-pad it
pub fn parse_clock(raw: &str) -> Result<String> {
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let parsed = raw
        .trim()
        .split_once(':')
        .filter(|(hours, minutes)| {
            (1..=2).contains(&hours.len()) && minutes.len() == 2 && digits(hours) && digits(minutes)
        })
        .and_then(|(hours, minutes)| {
            let hours: u8 = hours.parse().ok()?;
            let minutes: u8 = minutes.parse().ok()?;
            (hours < 24 && minutes < 60).then_some((hours, minutes))
        });
    match parsed {
        Some((hours, minutes)) => Ok(format!("{:02}:{:02}", hours, minutes)),
        None => bail!("Invalid time '{}', expected HH:MM", raw),
    }
}

fn location_row(location: &ChargingLocation) -> ChargingLocationRow {
    ChargingLocationRow {
        id: location.id().unwrap_or("-").to_string(),
        name: location.name.clone().unwrap_or_default(),
        status: location.status.clone().unwrap_or_default(),
        delay: describe_delay(location.delay_charging.as_ref()),
        at_location: location
            .vehicle_at_charging_location
            .unwrap_or(false)
            .to_string(),
        address: location
            .position
            .as_ref()
            .map(describe_address)
            .unwrap_or_default(),
    }
}

fn location_details(location: &ChargingLocation) -> Vec<(&'static str, String)> {
    let position = location.position.clone().unwrap_or_default();
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    let mut pairs = vec![
        ("Name", text(&location.name)),
        ("ID", location.id().unwrap_or("-").to_string()),
        ("Status", text(&location.status)),
        ("Delay Charging", describe_delay(location.delay_charging.as_ref())),
        (
            "Plug-in Reminder",
            location.plug_in_reminder_enabled.unwrap_or(false).to_string(),
        ),
        (
            "At Location",
            location
                .vehicle_at_charging_location
                .unwrap_or(false)
                .to_string(),
        ),
        ("Street Address", text(&position.street_address)),
        ("City", text(&position.city)),
        ("Postal Code", text(&position.postal_code)),
        ("Region", text(&position.region)),
        ("Country Code", text(&position.iso2_country_code)),
    ];
    if let (Some(latitude), Some(longitude)) = (position.latitude, position.longitude) {
        pairs.push(("Maps URL", maps_url(latitude, longitude)));
    }
    pairs
}

fn describe_delay(delay: Option<&DelayCharging>) -> String {
    match delay {
        None => "-".to_string(),
        Some(delay) => {
            let window = match (&delay.start_time, &delay.stop_time) {
                (Some(start), Some(stop)) => format!(" {}-{}", start, stop),
                _ => String::new(),
            };
            let state = if delay.enabled { "on" } else { "off" };
            format!("{}{}", state, window)
        }
    }
}

fn describe_address(position: &AddressPosition) -> String {
    [&position.street_address, &position.city]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
