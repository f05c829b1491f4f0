//! ============================================================================
//! Portal API - Backend client
//! ============================================================================
//! HTTP client for the CivicEcho backend. Every endpoint answers the same
//! envelope: `{ success, message?, ...payload }`. A `success: false` reply
//! surfaces the backend message verbatim; a body that is not JSON is its own
//! failure class, distinct from transport errors. Requests are never retried.
//! ============================================================================

mod auth;
mod complaints;

pub use auth::{RegistrationForm, RegistrationLocation};
pub use complaints::{
    AttachmentUpload, CitizenDashboard, GovernmentDashboard, LocationOptions, SubmitReceipt,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::types::ApiError;

/// Client for the portal backend.
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    /// Create a client for the backend at `base_url`
    /// (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/backend/{}", self.base_url, name)
    }

    /// POST a JSON body and decode the `{success, ...}` envelope into `T`.
    pub(crate) async fn post_json<B, T>(&self, name: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(name);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::decode(name, response).await
    }

    /// POST a multipart form and decode the envelope into `T`.
    pub(crate) async fn post_multipart<T>(
        &self,
        name: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(name);
        debug!("POST {} (multipart)", url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::decode(name, response).await
    }

    async fn decode<T>(name: &str, response: reqwest::Response) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ApiError::InvalidResponse(format!(
                "{} returned an empty body (HTTP {})",
                name, status
            )));
        }

        let envelope: serde_json::Value = serde_json::from_str(&text).map_err(|_| {
            ApiError::InvalidResponse(format!("{} returned a non-JSON body (HTTP {})", name, status))
        })?;

        let success = envelope
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !success {
            let message = envelope
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Request failed")
                .to_string();
            return Err(ApiError::Rejected(message));
        }

        serde_json::from_value(envelope).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "{} payload did not match the expected shape: {}",
                name, e
            ))
        })
    }
}

/// Response for endpoints that only answer success/message.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Ack {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = PortalClient::new("http://localhost:8000/");
        assert_eq!(client.endpoint("login.php"), "http://localhost:8000/backend/login.php");
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_network_error() {
        // Port 9 (discard) refuses connections on any sane machine.
        let client = PortalClient::new("http://127.0.0.1:9");
        let result: Result<Ack, ApiError> = client
            .post_json("login.php", &serde_json::json!({"nid": "BD1"}))
            .await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }
}
