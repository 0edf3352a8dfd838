//! Service list and the add-service workflow.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::{FormError, Navigation, ScreenError};
use crate::api::{AddServiceRequest, MetricKind, MonitorApi, ServiceRecord, ServiceStatus};
use crate::config::PushConfig;
use crate::push;
use crate::session::Session;

/// Input of the "Add New Service" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddServiceForm {
    pub host: String,
    pub port: String,
    pub name: String,
    pub metrics: Vec<MetricKind>,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub metrics: Vec<MetricKind>,
}

impl NewService {
    /// Metrics endpoint of the target, e.g. `http://10.0.0.3:7000/metrics/`.
    pub fn target_url(&self) -> String {
        format!("http://{}:{}/metrics/", self.host, self.port)
    }
}

impl AddServiceForm {
    /// Select `metric` if absent, deselect it if present.
    pub fn toggle_metric(&mut self, metric: MetricKind) {
        if let Some(pos) = self.metrics.iter().position(|m| *m == metric) {
            self.metrics.remove(pos);
        } else {
            self.metrics.push(metric);
        }
    }

    pub fn validate(&self) -> Result<NewService, FormError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(FormError::Required("host"));
        }
        let port_str = self.port.trim();
        if port_str.is_empty() {
            return Err(FormError::Required("port"));
        }
        let port = match port_str.parse::<u16>() {
            Ok(p) if p != 0 => p,
            _ => return Err(FormError::InvalidPort(port_str.to_string())),
        };
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Required("name"));
        }
        if self.metrics.is_empty() {
            return Err(FormError::NoMetrics);
        }

        Ok(NewService {
            host: host.to_string(),
            port,
            name: name.to_string(),
            metrics: self.metrics.clone(),
        })
    }
}

/// The service list for the signed-in user.
///
/// After a successful registration the list is always re-fetched from the
/// server; no local record is appended.
pub struct ServiceListScreen<'a> {
    api: Arc<dyn MonitorApi>,
    session: &'a Session,
    /// Where to announce new targets; `None` skips the announce
    push: Option<PushConfig>,
    announces: Vec<JoinHandle<()>>,
    services: Vec<ServiceRecord>,
}

impl<'a> ServiceListScreen<'a> {
    pub fn new(api: Arc<dyn MonitorApi>, session: &'a Session) -> Self {
        Self {
            api,
            session,
            push: None,
            announces: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Announce newly registered targets on this push channel.
    pub fn with_announce(mut self, push: PushConfig) -> Self {
        self.push = Some(push);
        self
    }

    pub fn services(&self) -> &[ServiceRecord] {
        &self.services
    }

    /// Fetch the user's services. Without an identity this fails with
    /// [`ScreenError::Unauthenticated`], whose redirect is the login screen.
    pub async fn load(&mut self) -> Result<&[ServiceRecord], ScreenError> {
        let identity = self.session.require_identity()?;
        match self.api.get_services(&identity.userid).await {
            Ok(services) => {
                tracing::debug!(count = services.len(), "Loaded services");
                self.services = services;
                Ok(&self.services)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch services");
                Err(e.into())
            }
        }
    }

    /// Validate, register, announce and re-fetch.
    ///
    /// Validation failures issue no request. The announce runs whether or
    /// not registration succeeded.
    pub async fn add_service(&mut self, form: &AddServiceForm) -> Result<NewService, ScreenError> {
        let new_service = form.validate()?;
        let identity = self.session.require_identity()?;
        let target = new_service.target_url();

        let request = AddServiceRequest {
            url: target.clone(),
            service_name: new_service.name.clone(),
            status: ServiceStatus::Unknown,
            userid: identity.userid.clone(),
            metrics: new_service.metrics.clone(),
        };

        // Spawned first so the announce overlaps the registration request
        if let Some(push) = &self.push {
            self.announces
                .push(push::spawn_announce(push.clone(), target.clone()));
        }

        if let Err(e) = self.api.add_service(&request).await {
            tracing::error!(url = %target, error = %e, "Failed to save service");
            return Err(e.into());
        }

        self.load().await?;
        Ok(new_service)
    }

    /// Wait for outstanding announces. Each one is bounded by the
    /// configured announce timeout.
    pub async fn wait_for_announces(&mut self) {
        for handle in self.announces.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Announce task failed");
            }
        }
    }

    /// Navigation to the detail screen for the service at `index`,
    /// carrying the cached record along.
    pub fn open(&self, index: usize) -> Option<Navigation> {
        self.services.get(index).map(|service| Navigation::ServiceDetail {
            id: service.id.clone(),
            service: Some(service.clone()),
        })
    }

    /// Same as [`open`](Self::open), by service id.
    pub fn open_by_id(&self, id: &str) -> Option<Navigation> {
        let index = self.services.iter().position(|s| s.id == id)?;
        self.open(index)
    }
}
