//! Wire types for the monitoring server's HTTP API.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::session::Identity;

/// Body of `POST /signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The server answers bad credentials with 200 and an `error` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LoginReply {
    Rejected { error: String },
    Accepted(Identity),
}

/// Body of `POST /add-service`.
#[derive(Debug, Clone, Serialize)]
pub struct AddServiceRequest {
    pub url: String,
    pub service_name: String,
    pub status: ServiceStatus,
    pub userid: String,
    pub metrics: Vec<MetricKind>,
}

/// `GET /get-services/{userid}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesResponse {
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
}

/// `GET /get-service/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceResponse {
    pub service: ServiceRecord,
}

/// Client-side copy of a registered service.
///
/// `id` and `status` are owned by the server; this is a cached view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub service_name: Option<String>,
    /// Metrics URL of the monitored target
    pub url: String,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    pub metrics: Vec<String>,
}

impl ServiceRecord {
    /// Name to show, falling back to "Service {id}".
    pub fn display_name(&self) -> String {
        match &self.service_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Service {}", self.id),
        }
    }
}

/// Last-known status of a service. Unrecognised strings become `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceStatus {
    Healthy,
    Down,
    #[default]
    Unknown,
}

impl From<String> for ServiceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Healthy" => ServiceStatus::Healthy,
            "Down" => ServiceStatus::Down,
            _ => ServiceStatus::Unknown,
        }
    }
}

impl From<ServiceStatus> for String {
    fn from(status: ServiceStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceStatus::Healthy => "Healthy",
            ServiceStatus::Down => "Down",
            ServiceStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Metrics a service can be registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricKind {
    RequestCount,
    ErrorCount,
    MemoryUsage,
    ActiveUsers,
    RequestLatency,
    ResponseSize,
}

impl MetricKind {
    /// Catalogue in form order.
    pub const ALL: [MetricKind; 6] = [
        MetricKind::RequestCount,
        MetricKind::ErrorCount,
        MetricKind::MemoryUsage,
        MetricKind::ActiveUsers,
        MetricKind::RequestLatency,
        MetricKind::ResponseSize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::RequestCount => "REQUEST_COUNT",
            MetricKind::ErrorCount => "ERROR_COUNT",
            MetricKind::MemoryUsage => "MEMORY_USAGE",
            MetricKind::ActiveUsers => "ACTIVE_USERS",
            MetricKind::RequestLatency => "REQUEST_LATENCY",
            MetricKind::ResponseSize => "RESPONSE_SIZE",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown metric: {}. Use one of: {}",
                    s,
                    MetricKind::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

/// Accepts `42` or `"42"` and yields `"42"`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}
