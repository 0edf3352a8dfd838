//! Watch command: live analytics for one service

use super::context::{screen_error, AppContext};
use super::output::{
    format_connection_state, format_detail_header, format_live_json, render_live,
};
use super::WatchArgs;
use crate::api::ServiceRecord;
use crate::metrics::IngestOutcome;
use crate::screens::{resolve_service, DetailUpdate, Navigation, ServiceDetailScreen, ServiceListScreen};

/// Record cached by the service list, when the user is logged in and owns
/// the service.
async fn navigation_state(ctx: &AppContext, id: &str) -> Option<ServiceRecord> {
    if !ctx.session.is_authenticated() {
        return None;
    }
    let mut list = ServiceListScreen::new(ctx.api.clone(), &ctx.session);
    if let Err(e) = list.load().await {
        tracing::warn!(error = %e, "Could not load service list, fetching service directly");
        return None;
    }
    match list.open_by_id(id) {
        Some(Navigation::ServiceDetail { service, .. }) => service,
        _ => None,
    }
}

/// Handle `watchtower watch` command
///
/// Runs until Ctrl-C, until `--frames` metrics frames were applied, or until
/// the push connection closes for good.
pub async fn handle_watch(
    args: &WatchArgs,
    ctx: &AppContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = navigation_state(ctx, &args.id).await;
    let service = resolve_service(ctx.api.as_ref(), &args.id, state)
        .await
        .map_err(screen_error)?;

    if !args.json {
        println!("{}", format_detail_header(&service));
    }

    let mut screen = ServiceDetailScreen::new(&ctx.config.dashboard, ctx.config.push.clone());
    screen.attach(service).await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut frames = 0u64;

    loop {
        let update = tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!("Interrupted");
                break;
            }
            update = screen.next_update() => update,
        };

        match update {
            None => break,
            Some(DetailUpdate::Connection(state)) => {
                eprintln!("connection: {}", format_connection_state(&state));
            }
            Some(DetailUpdate::Metrics(IngestOutcome::Applied { .. })) => {
                frames += 1;
                if args.json {
                    println!("{}", format_live_json(screen.live())?);
                } else {
                    println!("\n{}", render_live(screen.live()));
                }
                if args.frames.is_some_and(|limit| frames >= limit) {
                    break;
                }
            }
            Some(DetailUpdate::Metrics(IngestOutcome::ServerError(message))) => {
                eprintln!("server error: {}", message);
            }
            Some(DetailUpdate::Metrics(IngestOutcome::Ignored)) => {}
            Some(DetailUpdate::Dropped(e)) => {
                tracing::debug!(error = %e, "Skipped frame");
            }
        }
    }

    screen.close().await;
    Ok(())
}
