//! TFE HTTP client for API interactions

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::api;
use crate::error::{BackupError, Result};

/// TFE API client
///
/// Requests are stateless, so a single client is shared by all export jobs.
pub struct TfeClient {
    client: Client,
    token: String,
    host: String,
    /// Custom base URL override (for testing with mock servers)
    base_url_override: Option<String>,
}

impl TfeClient {
    /// Create a new TFE client with bounded timeouts
    pub fn new(token: String, host: String) -> Self {
        let client = Client::builder()
            // Connection pool settings - reuse connections
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(api::CONNECT_TIMEOUT)
            .timeout(api::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            host,
            base_url_override: None,
        }
    }

    /// Create a client with custom base URL (for testing with mock servers)
    pub fn with_base_url(token: String, host: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(api::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            host,
            base_url_override: Some(base_url),
        }
    }

    /// Build the base URL for API requests
    pub(crate) fn base_url(&self) -> String {
        if let Some(ref url) = self.base_url_override {
            return url.clone();
        }
        format!(
            "https://{}/{}",
            self.host,
            api::BASE_PATH.trim_start_matches('/')
        )
    }

    /// Build a full URL from an API path
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Get the configured host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Add standard headers to a request builder
    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", api::CONTENT_TYPE)
    }

    /// Create a GET request builder with standard headers
    pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.get(url))
    }

    /// Fetch the raw response body of an API URL
    ///
    /// Only URLs below the API base are accepted. Any non-2xx status is
    /// returned as `BackupError::Api`; no retries happen here.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let base = self.base_url();
        let below_base = url
            .strip_prefix(base.as_str())
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'));
        if !below_base {
            return Err(BackupError::Config(format!(
                "URL '{}' is not an endpoint of {}",
                url, base
            )));
        }

        debug!("Fetching: {}", url);
        let response = self.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackupError::Api {
                status: status.as_u16(),
                message: format!("GET {} failed: {}", url, body.trim()),
            });
        }

        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    /// Fetch an API URL and decode its JSON body
    pub async fn fetch_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.fetch(url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| BackupError::Json(format!("Failed to decode response from {}: {}", url, e)))
    }

    /// Fetch an API path and return its body after checking it is JSON
    ///
    /// Payloads are persisted byte-for-byte, so identical remote state
    /// always produces identical artifacts.
    pub async fn fetch_raw_json(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path);
        let body = self.fetch(&url).await?;
        serde_json::from_slice::<serde::de::IgnoredAny>(&body)
            .map_err(|e| BackupError::Json(format!("Invalid JSON from {}: {}", url, e)))?;
        Ok(body)
    }
}

#[cfg(test)]
impl TfeClient {
    /// Create a test client with mock base URL
    pub fn test_client(base_url: &str) -> Self {
        Self::with_base_url(
            "test-token".to_string(),
            "mock.terraform.io".to_string(),
            base_url.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url() {
        let client = TfeClient::new("token".to_string(), "example.com".to_string());
        assert_eq!(client.base_url(), "https://example.com/api/v2");
    }

    #[test]
    fn test_url_joins_path() {
        let client = TfeClient::new("token".to_string(), "app.terraform.io".to_string());
        assert_eq!(
            client.url("/workspaces/ws-1"),
            "https://app.terraform.io/api/v2/workspaces/ws-1"
        );
    }

    #[test]
    fn test_client_creation() {
        let client = TfeClient::new("my-token".to_string(), "tfe.example.com".to_string());
        assert_eq!(client.host(), "tfe.example.com");
        assert_eq!(client.token, "my-token");
    }

    #[tokio::test]
    async fn test_fetch_sends_auth_and_content_type() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/workspaces/ws-1"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Content-Type", "application/vnd.api+json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\":{}}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let body = client
            .fetch(&client.url("/workspaces/ws-1"))
            .await
            .unwrap();
        assert_eq!(body, b"{\"data\":{}}");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/workspaces/ws-1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        match client.fetch(&client.url("/workspaces/ws-1")).await {
            Err(BackupError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert!(message.contains("/workspaces/ws-1"));
            }
            other => panic!("Expected BackupError::Api, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_foreign_url() {
        let client = TfeClient::test_client("http://127.0.0.1:1");
        let result = client.fetch("https://evil.example.com/steal").await;
        assert!(matches!(result, Err(BackupError::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_sibling_of_base_path() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&format!("{}/api/v2", mock_server.uri()));

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(0)
            .mount(&mock_server)
            .await;

        let url = format!("{}/api/v2evil/steal", mock_server.uri());
        let result = client.fetch(&url).await;
        assert!(matches!(result, Err(BackupError::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"id": "x"}})),
            )
            .mount(&mock_server)
            .await;

        let value: serde_json::Value = client.fetch_json(&client.url("/thing")).await.unwrap();
        assert_eq!(value["data"]["id"], "x");
    }

    #[tokio::test]
    async fn test_fetch_raw_json_rejects_non_json() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let result = client.fetch_raw_json("/thing").await;
        assert!(matches!(result, Err(BackupError::Json(_))));
    }
}
