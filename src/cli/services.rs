//! Service commands: list and add

use super::context::{screen_error, AppContext};
use super::output::{format_services_json, format_services_table};
use super::{ServicesAddArgs, ServicesListArgs};
use crate::api::ServiceRecord;
use crate::screens::{AddServiceForm, ServiceListScreen};

fn render(services: &[ServiceRecord], json: bool) -> Result<String, Box<dyn std::error::Error>> {
    if json {
        Ok(format_services_json(services)?)
    } else {
        Ok(format_services_table(services))
    }
}

/// Handle `watchtower services list` command
pub async fn handle_services_list(
    args: &ServicesListArgs,
    ctx: &AppContext,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut screen = ServiceListScreen::new(ctx.api.clone(), &ctx.session);
    let services = screen.load().await.map_err(screen_error)?;
    render(services, args.json)
}

/// Handle `watchtower services add` command
pub async fn handle_services_add(
    args: &ServicesAddArgs,
    ctx: &AppContext,
) -> Result<String, Box<dyn std::error::Error>> {
    let form = AddServiceForm {
        host: args.host.clone().unwrap_or_default(),
        port: args.port.clone().unwrap_or_default(),
        name: args.name.clone().unwrap_or_default(),
        metrics: args.metrics.clone(),
    };

    let mut screen = ServiceListScreen::new(ctx.api.clone(), &ctx.session)
        .with_announce(ctx.config.push.clone());
    let added = screen.add_service(&form).await;
    screen.wait_for_announces().await;
    let added = added.map_err(screen_error)?;

    let listing = render(screen.services(), args.json)?;
    if args.json {
        return Ok(listing);
    }
    Ok(format!(
        "✓ Registered '{}' at {}\n{}",
        added.name,
        added.target_url(),
        listing
    ))
}
