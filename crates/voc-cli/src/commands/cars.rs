//! Cars command - list vehicles linked to the account

use anyhow::Result;

use crate::context::AppContext;
use crate::output::VehicleRow;

/// List every vehicle associated with the signed-in account
pub async fn cars(ctx: &AppContext) -> Result<()> {
    let mut account = ctx.client.get_account().await?;
    account.resolve_links(&ctx.client).await?;
    let vehicles = account.vehicles(&ctx.client).await?;

    let rows: Vec<VehicleRow> = vehicles
        .iter()
        .map(|vehicle| {
            let attributes = vehicle.attributes.clone().unwrap_or_default();
            VehicleRow {
                vin: vehicle.vehicle_id.clone(),
                registration: attributes.registration_number,
                model: attributes.vehicle_type,
                model_year: attributes.model_year.to_string(),
            }
        })
        .collect();

    ctx.out.heading(&format!(
        "Cars associated to Volvo Account ({}):",
        account.username
    ));
    ctx.out.print(&rows)
}
