//! HTTP client for the monitoring server.
//!
//! [`MonitorApi`] is the seam the screens talk to; [`HttpMonitorClient`]
//! is the reqwest-backed implementation.

mod client;
pub mod error;
pub mod types;

pub use client::HttpMonitorClient;
pub use error::ApiError;
pub use types::{
    AddServiceRequest, LoginRequest, MetricKind, ServiceRecord, ServiceStatus, ServicesResponse,
    SignupRequest,
};

use crate::session::Identity;
use async_trait::async_trait;

/// Operations exposed by the monitoring server.
///
/// None of these are retried; a failed call is reported once and the
/// caller keeps whatever it rendered last.
#[async_trait]
pub trait MonitorApi: Send + Sync + 'static {
    /// `POST /signup`. Success is judged by status code only.
    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError>;

    /// `POST /login`, returning the identity to store in the session.
    async fn login(&self, request: &LoginRequest) -> Result<Identity, ApiError>;

    /// `POST /add-service`. The server may echo the saved record or return nothing.
    async fn add_service(
        &self,
        request: &AddServiceRequest,
    ) -> Result<Option<ServiceRecord>, ApiError>;

    /// `GET /get-services/{userid}`.
    async fn get_services(&self, userid: &str) -> Result<Vec<ServiceRecord>, ApiError>;

    /// `GET /get-service/{id}`.
    async fn get_service(&self, id: &str) -> Result<ServiceRecord, ApiError>;
}
