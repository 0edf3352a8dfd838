use super::types::{LoginReply, ServiceResponse};
use super::{
    AddServiceRequest, ApiError, LoginRequest, MonitorApi, ServiceRecord, ServicesResponse,
    SignupRequest,
};
use crate::config::ApiConfig;
use crate::session::Identity;
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// reqwest-backed [`MonitorApi`].
#[derive(Debug, Clone)]
pub struct HttpMonitorClient {
    /// Base URL without trailing slash
    base_url: String,
    client: Client,
    timeout_seconds: u64,
}

impl HttpMonitorClient {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::with_client(config, client)
    }

    /// Build with a caller-provided HTTP client (for testing).
    pub fn with_client(config: &ApiConfig, client: Client) -> Result<Self, ApiError> {
        reqwest::Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL under the base path. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `..` stay inside their segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{}: cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout_seconds))?;
        Self::check_status(response).await
    }

    async fn get(&self, segments: &[&str]) -> Result<Response, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout_seconds))?;
        Self::check_status(response).await
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Decode a body that may legitimately be empty or `null`.
    async fn optional_json<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<Option<T>, ApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout_seconds))?;
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn required_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        self.optional_json(response)
            .await?
            .ok_or_else(|| ApiError::Decode("empty response body".to_string()))
    }
}

#[async_trait]
impl MonitorApi for HttpMonitorClient {
    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        let response = self.post(&["signup"], request).await?;
        let echo: Option<serde_json::Value> = self.optional_json(response).await.unwrap_or(None);
        tracing::info!(username = %request.username, ?echo, "Signup accepted");
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<Identity, ApiError> {
        let response = self.post(&["login"], request).await?;
        match self.required_json::<LoginReply>(response).await? {
            LoginReply::Accepted(identity) => {
                tracing::info!(userid = %identity.userid, "Login successful");
                Ok(identity)
            }
            LoginReply::Rejected { error } => Err(ApiError::Rejected(error)),
        }
    }

    async fn add_service(
        &self,
        request: &AddServiceRequest,
    ) -> Result<Option<ServiceRecord>, ApiError> {
        tracing::debug!(payload = ?request, "Registering service");
        let response = self.post(&["add-service"], request).await?;
        // The echo is informational; an unexpected shape is not a failure.
        let echo = match self.optional_json::<ServiceRecord>(response).await {
            Ok(echo) => echo,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unrecognised add-service echo");
                None
            }
        };
        tracing::info!(url = %request.url, "Service saved");
        Ok(echo)
    }

    async fn get_services(&self, userid: &str) -> Result<Vec<ServiceRecord>, ApiError> {
        let response = self.get(&["get-services", userid]).await?;
        let body: ServicesResponse = self.required_json(response).await?;
        Ok(body.services)
    }

    async fn get_service(&self, id: &str) -> Result<ServiceRecord, ApiError> {
        let response = self.get(&["get-service", id]).await?;
        let body: ServiceResponse = self.required_json(response).await?;
        Ok(body.service)
    }
}
