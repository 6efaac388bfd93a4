//! Remote commands - issue a command and poll it to completion

use anyhow::Result;
use voc_client::{ServiceStatus, Vehicle, VocClient};

use crate::context::AppContext;

const UNLOCK_HINT: &str = "Within 2 minutes press once gently on the rubberised pressure plate \
underneath the boot lid handle to unlock the car";

/// State-changing commands available from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Lock,
    Unlock,
    StartHeater,
    StopHeater,
    StartEngine,
    StopEngine,
    StartPreclimatization,
    StopPreclimatization,
    Blink,
    Honk,
}

impl RemoteCommand {
    /// Progress text shown while the command is polled
    pub fn description(&self) -> &'static str {
        match self {
            Self::Lock => "Locking",
            Self::Unlock => "Unlocking",
            Self::StartHeater => "Starting heater",
            Self::StopHeater => "Stopping heater",
            Self::StartEngine => "Starting engine",
            Self::StopEngine => "Stopping engine",
            Self::StartPreclimatization => "Starting preclimatization",
            Self::StopPreclimatization => "Stopping preclimatization",
            Self::Blink => "Blinking lights",
            Self::Honk => "Honking and blinking",
        }
    }

    async fn issue(&self, client: &VocClient, vehicle: &Vehicle) -> voc_client::Result<ServiceStatus> {
        match self {
            Self::Lock => vehicle.lock(client).await,
            Self::Unlock => vehicle.unlock(client).await,
            Self::StartHeater => vehicle.start_heater(client).await,
            Self::StopHeater => vehicle.stop_heater(client).await,
            Self::StartEngine => vehicle.start_engine(client).await,
            Self::StopEngine => vehicle.stop_engine(client).await,
            Self::StartPreclimatization => {
                client.start_preclimatization(&vehicle.vehicle_id).await
            }
            Self::StopPreclimatization => client.stop_preclimatization(&vehicle.vehicle_id).await,
            Self::Blink => vehicle.blink_lights(client, None).await,
            Self::Honk => vehicle.honk_and_blink(client, None).await,
        }
    }
}

/// Issue a command against the selected vehicle and wait for the outcome
pub async fn remote(ctx: &AppContext, command: RemoteCommand) -> Result<()> {
    let vehicle = ctx.client.get_vehicle(ctx.vin()?).await?;
    let mut status = command.issue(&ctx.client, &vehicle).await?;

    if command == RemoteCommand::Unlock {
        ctx.out.info(UNLOCK_HINT);
    }

    let pb = ctx
        .out
        .spinner(format!("{} {}", command.description(), vehicle.label()))?;
    let result = ctx.client.evaluate_service_status_auto(&mut status).await;
    pb.finish_and_clear();
    result?;

    if ctx.out.is_json() {
        return ctx.out.print_json(&status);
    }
    ctx.out.success(&format!(
        "{} {}: {}",
        command.description(),
        vehicle.label(),
        status.status
    ));
    Ok(())
}
