//! Per-service analytics view.

use super::ScreenError;
use crate::api::{MonitorApi, ServiceRecord};
use crate::config::{DashboardConfig, PushConfig};
use crate::metrics::{IngestError, IngestOutcome, LiveMetrics};
use crate::push::{ConnectionState, PushChannel, PushEvent};

/// Use the record handed over by the list screen, or fetch it by id.
pub async fn resolve_service(
    api: &dyn MonitorApi,
    id: &str,
    state: Option<ServiceRecord>,
) -> Result<ServiceRecord, ScreenError> {
    if let Some(service) = state {
        return Ok(service);
    }
    api.get_service(id).await.map_err(|e| {
        tracing::error!(service_id = %id, error = %e, "Failed to fetch service");
        e.into()
    })
}

/// One step of the detail view's event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailUpdate {
    Connection(ConnectionState),
    Metrics(IngestOutcome),
    /// Frame could not be decoded; nothing changed
    Dropped(IngestError),
}

/// Holds the live state and the single push connection for one service.
pub struct ServiceDetailScreen {
    push: PushConfig,
    service: Option<ServiceRecord>,
    live: LiveMetrics,
    channel: Option<PushChannel>,
}

impl ServiceDetailScreen {
    pub fn new(dashboard: &DashboardConfig, push: PushConfig) -> Self {
        Self {
            push,
            service: None,
            live: LiveMetrics::new(dashboard),
            channel: None,
        }
    }

    /// Show `service`, opening its push connection.
    ///
    /// Re-attaching the same service keeps the existing connection. A
    /// different service closes the old connection and starts from empty
    /// charts.
    pub async fn attach(&mut self, service: ServiceRecord) {
        let unchanged = self.channel.is_some()
            && self
                .service
                .as_ref()
                .is_some_and(|s| s.id == service.id && s.url == service.url);
        if unchanged {
            return;
        }

        self.close().await;
        self.live.reset();
        tracing::info!(service_id = %service.id, service_url = %service.url, "Opening live metrics");
        self.channel = Some(PushChannel::open(&self.push, service.url.clone()));
        self.service = Some(service);
    }

    pub fn service(&self) -> Option<&ServiceRecord> {
        self.service.as_ref()
    }

    pub fn live(&self) -> &LiveMetrics {
        &self.live
    }

    pub fn connection_state(&self) -> Option<ConnectionState> {
        self.channel.as_ref().map(PushChannel::state)
    }

    /// Waits for the next push event and applies it.
    ///
    /// Returns `None` when no service is attached or the connection has
    /// closed for good.
    pub async fn next_update(&mut self) -> Option<DetailUpdate> {
        let event = self.channel.as_mut()?.recv().await?;
        Some(match event {
            PushEvent::State(state) => DetailUpdate::Connection(state),
            PushEvent::Frame(frame) => match self.live.ingest_frame(&frame) {
                Ok(outcome) => DetailUpdate::Metrics(outcome),
                Err(e) => DetailUpdate::Dropped(e),
            },
        })
    }

    /// Tear down the push connection, keeping the last rendered state.
    pub async fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close().await;
        }
    }
}
